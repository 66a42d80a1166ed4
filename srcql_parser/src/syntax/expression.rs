//! Expression grammar, precedence-climbing.
//!
//! One function per precedence level, loosest first; every level is
//! left-associative. The primary parser decides the node form from at most
//! two tokens of lookahead and never backtracks.

use crate::config::compile_time::syntax::MAX_RECOVERY_SCAN_TOKENS;
use crate::grammar::ast::nodes::{BinaryOp, ExpressionNode, UnaryOp};
use crate::grammar::keywords::Keyword;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::syntax::parser::QueryParser;
use crate::tokens::token::Token;

/// EBNF: expression ::= or-expression
///
/// Entry point; counts one nesting level so pathological input hits the
/// depth limit instead of the stack.
pub(crate) fn parse_expression(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    p.descend()?;
    let result = parse_or(p);
    p.ascend();
    result
}

/// Parse an expression, recovering from recoverable errors by skipping one
/// token and retrying. Stops at clause boundaries; every failure is recorded
/// before returning `None`.
pub(crate) fn parse_expression_recovering(p: &mut QueryParser) -> Option<ExpressionNode> {
    let mut skipped = 0;
    loop {
        match parse_expression(p) {
            Ok(node) => return Some(node),
            Err(error) => {
                p.record_error(&error);
                if p.halted() || p.at_recovery_boundary() {
                    return None;
                }
                p.advance();
                skipped += 1;
                if skipped >= MAX_RECOVERY_SCAN_TOKENS {
                    return None;
                }
            }
        }
    }
}

/// EBNF: or-expression ::= and-expression { "||" and-expression }
fn parse_or(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_and(p)?;
    while p.check(&Token::OrOr) {
        p.advance();
        let right = parse_and(p)?;
        left = ExpressionNode::binary(BinaryOp::Or, left, right);
    }
    Ok(left)
}

/// EBNF: and-expression ::= equality-expression { "&&" equality-expression }
fn parse_and(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_equality(p)?;
    while p.check(&Token::AndAnd) {
        p.advance();
        let right = parse_equality(p)?;
        left = ExpressionNode::binary(BinaryOp::And, left, right);
    }
    Ok(left)
}

/// EBNF: equality-expression ::= relational-expression { ("==" | "!=") relational-expression }
fn parse_equality(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_relational(p)?;
    loop {
        let operator = match p.current() {
            Token::EqualEqual => BinaryOp::Equal,
            Token::NotEqual => BinaryOp::NotEqual,
            _ => break,
        };
        p.advance();
        let right = parse_relational(p)?;
        left = ExpressionNode::binary(operator, left, right);
    }
    Ok(left)
}

/// EBNF: relational-expression ::= additive-expression
///                                 { ("<" | ">" | "<=" | ">=" | "LIKE" | "in") additive-expression }
fn parse_relational(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_additive(p)?;
    loop {
        let operator = match p.current() {
            Token::Less => BinaryOp::Less,
            Token::Greater => BinaryOp::Greater,
            Token::LessEqual => BinaryOp::LessEqual,
            Token::GreaterEqual => BinaryOp::GreaterEqual,
            Token::Keyword(Keyword::Like) => BinaryOp::Like,
            Token::Keyword(Keyword::In) => BinaryOp::In,
            _ => break,
        };
        p.advance();
        let right = parse_additive(p)?;
        left = ExpressionNode::binary(operator, left, right);
    }
    Ok(left)
}

/// EBNF: additive-expression ::= multiplicative-expression { ("+" | "-") multiplicative-expression }
fn parse_additive(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_multiplicative(p)?;
    loop {
        let operator = match p.current() {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Subtract,
            _ => break,
        };
        p.advance();
        let right = parse_multiplicative(p)?;
        left = ExpressionNode::binary(operator, left, right);
    }
    Ok(left)
}

/// EBNF: multiplicative-expression ::= unary-expression { ("*" | "/") unary-expression }
fn parse_multiplicative(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let mut left = parse_unary(p)?;
    loop {
        let operator = match p.current() {
            Token::Star => BinaryOp::Multiply,
            Token::Slash => BinaryOp::Divide,
            _ => break,
        };
        p.advance();
        let right = parse_unary(p)?;
        left = ExpressionNode::binary(operator, left, right);
    }
    Ok(left)
}

/// EBNF: unary-expression ::= ("!" | "-") unary-expression | primary
fn parse_unary(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let operator = match p.current() {
        Token::Bang => Some(UnaryOp::Not),
        Token::Minus => Some(UnaryOp::Negate),
        _ => None,
    };
    if let Some(operator) = operator {
        p.advance();
        p.descend()?;
        let operand = parse_unary(p);
        p.ascend();
        return Ok(ExpressionNode::unary(operator, operand?));
    }
    parse_primary(p)
}

/// EBNF: primary ::= NUMBER | STRING | list-literal | "(" expression ")"
///                 | IDENTIFIER [ method-chain | argument-list ]
fn parse_primary(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let span = p.current_span();
    let token = p.current().clone();
    match token {
        Token::Number(text) => {
            p.advance();
            Ok(ExpressionNode::Literal { text })
        }
        Token::StringLiteral(literal) => {
            p.advance();
            Ok(ExpressionNode::Literal {
                text: literal.to_query_string(),
            })
        }
        Token::LeftParen => {
            p.advance();
            let inner = parse_expression(p)?;
            p.expect(&Token::RightParen, "')'")?;
            Ok(inner)
        }
        Token::LeftBracket => parse_list_literal(p),
        Token::Identifier(name) => parse_identifier_form(p, name),
        Token::Eof => Err(SyntaxError::end_of_input("an expression", span)),
        other => Err(SyntaxError::unexpected_token(
            "an expression",
            &other.to_string(),
            span,
        )),
    }
}

/// EBNF: list-literal ::= "[" expression { "," expression } "]"
///
/// `[]` is a structural error; membership tests need at least one element.
fn parse_list_literal(p: &mut QueryParser) -> SyntaxResult<ExpressionNode> {
    let open = p.expect(&Token::LeftBracket, "'['")?;
    if p.check(&Token::RightBracket) {
        let close = p.current_span();
        p.advance();
        return Err(SyntaxError::empty_list_literal(open.merge(close)));
    }

    let mut items = vec![parse_expression(p)?];
    while p.check(&Token::Comma) {
        p.advance();
        items.push(parse_expression(p)?);
    }
    p.expect(&Token::RightBracket, "']'")?;
    Ok(ExpressionNode::ListLiteral { items })
}

/// An identifier starts a variable, a qualified method chain, or a bare
/// call. One token of lookahead decides which.
fn parse_identifier_form(p: &mut QueryParser, name: String) -> SyntaxResult<ExpressionNode> {
    match p.peek(1) {
        Token::Dot => {
            p.advance();
            parse_method_chain(p, name)
        }
        Token::LeftParen => {
            p.advance();
            let arguments = parse_argument_list(p)?;
            if is_predicate_call(p, &name) {
                Ok(ExpressionNode::PredicateCall { name, arguments })
            } else {
                Ok(ExpressionNode::MethodCall {
                    qualifier: None,
                    name,
                    arguments,
                })
            }
        }
        _ => {
            p.advance();
            Ok(ExpressionNode::Variable { name })
        }
    }
}

/// A bare call is a predicate call when the name is already registered, or
/// inside a predicate body where forward references to later predicates must
/// still resolve by name at lookup time. A registered class name always
/// reads as a method call.
fn is_predicate_call(p: &QueryParser, name: &str) -> bool {
    if p.declarations().is_class(name) {
        return false;
    }
    p.declarations().has_predicate(name) || p.in_predicate_body()
}

/// EBNF: method-chain ::= "." IDENTIFIER [ argument-list ] { method-chain }
///
/// Each segment is a call or a bare variable segment. A chain ending in a
/// call keeps that terminal call node, with the rendered text of everything
/// left of it as the qualifier; a chain ending in a bare segment is a dotted
/// variable path (`c.name`) and becomes a `Variable` carrying the full path.
fn parse_method_chain(p: &mut QueryParser, first: String) -> SyntaxResult<ExpressionNode> {
    let mut qualifier = first;
    loop {
        p.expect(&Token::Dot, "'.'")?;
        let (name, _) = p.expect_identifier()?;

        if p.check(&Token::LeftParen) {
            let arguments = parse_argument_list(p)?;
            let call = ExpressionNode::MethodCall {
                qualifier: Some(qualifier),
                name,
                arguments,
            };
            if p.check(&Token::Dot) {
                qualifier = call.to_query_string();
                continue;
            }
            return Ok(call);
        }

        if p.check(&Token::Dot) {
            qualifier = format!("{}.{}", qualifier, name);
            continue;
        }
        return Ok(ExpressionNode::Variable {
            name: format!("{}.{}", qualifier, name),
        });
    }
}

/// EBNF: argument-list ::= "(" [ expression { "," expression } ] ")"
fn parse_argument_list(p: &mut QueryParser) -> SyntaxResult<Vec<ExpressionNode>> {
    p.expect(&Token::LeftParen, "'('")?;
    let mut arguments = Vec::new();
    if p.check(&Token::RightParen) {
        p.advance();
        return Ok(arguments);
    }

    arguments.push(parse_expression(p)?);
    while p.check(&Token::Comma) {
        p.advance();
        arguments.push(parse_expression(p)?);
    }
    p.expect(&Token::RightParen, "')'")?;
    Ok(arguments)
}

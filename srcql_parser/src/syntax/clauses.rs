//! Clause grammars: declarations, the select list and the projection.
//!
//! Declarations come first and feed the tables the expression grammar
//! consults; the select list and projection are flat comma-separated lists
//! with per-item recovery.

use crate::grammar::ast::nodes::{
    ClassDeclaration, MethodDeclaration, PredicateDefinition, ProjectionItem, SelectItem,
};
use crate::grammar::keywords::Keyword;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::syntax::expression;
use crate::syntax::parser::QueryParser;
use crate::tokens::token::Token;

/// EBNF: declarations ::= { predicate-declaration | class-declaration }
///
/// Every declaration is registered as soon as it closes; a failed one is
/// recorded and skipped so later declarations still land in the tables.
pub(crate) fn parse_declarations(p: &mut QueryParser) {
    loop {
        if p.check_keyword(Keyword::Predicate) {
            p.push_context("predicate declaration");
            let outcome = parse_predicate_declaration(p);
            p.pop_context();
            if let Err(error) = outcome {
                p.record_error(&error);
                if p.halted() {
                    return;
                }
                recover_declaration(p);
            }
        } else if p.check_keyword(Keyword::Class) {
            p.push_context("class declaration");
            let outcome = parse_class_declaration(p);
            p.pop_context();
            if let Err(error) = outcome {
                p.record_error(&error);
                if p.halted() {
                    return;
                }
                recover_declaration(p);
            }
        } else {
            return;
        }
    }
}

/// EBNF: predicate-declaration ::= "predicate" IDENTIFIER parameter-list "{" expression "}"
fn parse_predicate_declaration(p: &mut QueryParser) -> SyntaxResult<()> {
    p.expect_keyword(Keyword::Predicate)?;
    let (name, name_span) = p.expect_identifier()?;
    let parameters = parse_parameter_list(p)?;
    p.expect(&Token::LeftBrace, "'{'")?;

    // Bare calls in the body may reference predicates declared later; the
    // flag makes them read as predicate calls.
    p.set_in_predicate_body(true);
    let body = expression::parse_expression(p);
    p.set_in_predicate_body(false);
    let body = body?;

    p.expect(&Token::RightBrace, "'}'")?;

    let definition = PredicateDefinition {
        name,
        parameters,
        body,
    };
    p.declarations_mut()
        .register_predicate(definition)
        .map_err(|error| SyntaxError::declaration_limit(&error, name_span))
}

/// EBNF: class-declaration ::= "class" IDENTIFIER "{" { method-declaration } "}"
fn parse_class_declaration(p: &mut QueryParser) -> SyntaxResult<()> {
    p.expect_keyword(Keyword::Class)?;
    let (name, name_span) = p.expect_identifier()?;
    p.expect(&Token::LeftBrace, "'{'")?;

    let mut methods = Vec::new();
    while !p.check(&Token::RightBrace) && !p.at_end() {
        methods.push(parse_method_declaration(p)?);
    }
    p.expect(&Token::RightBrace, "'}'")?;

    let declaration = ClassDeclaration { name, methods };
    p.declarations_mut()
        .register_class(declaration)
        .map_err(|error| SyntaxError::declaration_limit(&error, name_span))
}

/// EBNF: method-declaration ::= IDENTIFIER IDENTIFIER parameter-list
///                              "{" "result" "=" expression "}"
fn parse_method_declaration(p: &mut QueryParser) -> SyntaxResult<MethodDeclaration> {
    let (return_type, _) = p.expect_identifier()?;
    let (name, _) = p.expect_identifier()?;
    let parameters = parse_parameter_list(p)?;
    p.expect(&Token::LeftBrace, "'{'")?;
    p.expect_keyword(Keyword::Result)?;
    p.expect(&Token::Assign, "'='")?;
    let result = expression::parse_expression(p)?;
    p.expect(&Token::RightBrace, "'}'")?;

    Ok(MethodDeclaration {
        return_type,
        name,
        parameters,
        result,
    })
}

/// EBNF: parameter-list ::= "(" [ IDENTIFIER { "," IDENTIFIER } ] ")"
fn parse_parameter_list(p: &mut QueryParser) -> SyntaxResult<Vec<String>> {
    p.expect(&Token::LeftParen, "'('")?;
    let mut parameters = Vec::new();
    if p.check(&Token::RightParen) {
        p.advance();
        return Ok(parameters);
    }

    let (first, _) = p.expect_identifier()?;
    parameters.push(first);
    while p.check(&Token::Comma) {
        p.advance();
        let (next, _) = p.expect_identifier()?;
        parameters.push(next);
    }
    p.expect(&Token::RightParen, "')'")?;
    Ok(parameters)
}

/// Skip past a broken declaration: stop at the start of the next declaration
/// or clause, or just past the closing brace of the current block.
fn recover_declaration(p: &mut QueryParser) {
    loop {
        if p.at_end() {
            return;
        }
        if let Some(keyword) = p.current().as_keyword() {
            if keyword.is_declaration_start() || keyword.is_query_root() {
                return;
            }
        }
        let was_close = p.check(&Token::RightBrace);
        p.advance();
        if was_close {
            return;
        }
    }
}

/// EBNF: select-list ::= select-item { "," select-item }
///       select-item ::= IDENTIFIER "AS" IDENTIFIER
pub(crate) fn parse_select_list(p: &mut QueryParser) -> Vec<SelectItem> {
    p.push_context("select list");
    let mut items = Vec::new();
    loop {
        match parse_select_item(p) {
            Ok(item) => items.push(item),
            Err(error) => {
                p.record_error(&error);
                if p.halted() {
                    break;
                }
                p.skip_to_list_boundary();
            }
        }
        if p.check(&Token::Comma) {
            p.advance();
        } else {
            break;
        }
    }
    p.pop_context();
    items
}

fn parse_select_item(p: &mut QueryParser) -> SyntaxResult<SelectItem> {
    let entity = parse_entity_name(p)?;
    p.expect_keyword(Keyword::As)?;
    let (alias, _) = p.expect_identifier()?;
    Ok(SelectItem { entity, alias })
}

/// Entity names share spellings with the lowercase keywords; `FROM class
/// AS c` reads `class` as an entity, not as a declaration opener.
fn parse_entity_name(p: &mut QueryParser) -> SyntaxResult<String> {
    if let Some(keyword) = p.current().as_keyword() {
        if matches!(
            keyword,
            Keyword::Class | Keyword::Predicate | Keyword::Result
        ) {
            p.advance();
            return Ok(keyword.as_str().to_string());
        }
    }
    let (entity, _) = p.expect_identifier()?;
    Ok(entity)
}

/// EBNF: select-clause ::= expression { "," expression }
///
/// Each item classifies itself from its expression shape.
pub(crate) fn parse_projection(p: &mut QueryParser) -> Vec<ProjectionItem> {
    p.push_context("projection");
    let mut items = Vec::new();
    loop {
        match expression::parse_expression(p) {
            Ok(expression) => items.push(ProjectionItem::new(expression)),
            Err(error) => {
                p.record_error(&error);
                if p.halted() {
                    break;
                }
                p.skip_to_list_boundary();
            }
        }
        if p.check(&Token::Comma) {
            p.advance();
        } else {
            break;
        }
    }
    p.pop_context();
    items
}

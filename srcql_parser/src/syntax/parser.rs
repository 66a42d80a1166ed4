//! Query parser driver.
//!
//! `QueryParser` owns the token stream, the declaration tables and the error
//! collector for one parse. Clause and expression grammars live in sibling
//! modules as free functions over the driver.
//!
//! Recovery model: recoverable errors are recorded and the parser skips a
//! single token before retrying the same grammar point, stopping at clause
//! boundaries (`WHERE`, `SELECT`, `}`, EOF). Non-recoverable errors halt the
//! parse. Either way, a parse that produces errors never produces a `Query`.

use crate::config::compile_time::syntax::{
    MAX_CONTEXT_STACK_DEPTH, MAX_PARSE_DEPTH, MAX_RECOVERY_SCAN_TOKENS,
};
use crate::declarations::DeclarationTables;
use crate::grammar::ast::nodes::Query;
use crate::grammar::keywords::Keyword;
use crate::syntax::error::{Diagnostics, SyntaxError, SyntaxResult};
use crate::syntax::{assembler, clauses, expression};
use crate::tokens::token::{SpannedToken, Token};
use crate::tokens::token_stream::TokenStream;
use crate::utils::Span;

pub struct QueryParser {
    tokens: TokenStream,
    diagnostics: Diagnostics,
    declarations: DeclarationTables,
    context_stack: Vec<String>,
    parse_depth: usize,
    halted: bool,
    in_predicate_body: bool,
}

impl QueryParser {
    pub fn new(tokens: TokenStream, diagnostics: Diagnostics) -> Self {
        QueryParser {
            tokens,
            diagnostics,
            declarations: DeclarationTables::new(),
            context_stack: Vec::new(),
            parse_depth: 0,
            halted: false,
            in_predicate_body: false,
        }
    }

    /// Parse one complete query.
    ///
    /// Returns `None` when the parse could not produce a query; in that case
    /// at least one error has been recorded. A `Some` result can still be
    /// accompanied by recorded errors and must then be discarded by the
    /// caller.
    pub fn parse(&mut self) -> Option<Query> {
        if self.tokens.is_blank() {
            self.record_error(&SyntaxError::EmptyQuery);
            return None;
        }

        clauses::parse_declarations(self);
        if self.halted {
            return None;
        }

        if !self.consume_query_root() {
            return None;
        }

        let select_list = clauses::parse_select_list(self);
        if self.halted {
            return None;
        }

        let filter = if self.consume_keyword(Keyword::Where) {
            expression::parse_expression_recovering(self)
        } else {
            None
        };
        if self.halted {
            return None;
        }

        let projection = if self.consume_keyword(Keyword::Select) {
            clauses::parse_projection(self)
        } else {
            Vec::new()
        };
        if self.halted {
            return None;
        }

        if !self.tokens.is_at_end() {
            let error = SyntaxError::trailing_tokens(
                &self.tokens.current_token().to_string(),
                self.tokens.current_span(),
            );
            self.record_error(&error);
        }

        let tables = std::mem::take(&mut self.declarations);
        Some(assembler::assemble(select_list, filter, projection, tables))
    }

    /// Consume `FROM` or the legacy `FIND`, scanning forward when the query
    /// starts with something else.
    fn consume_query_root(&mut self) -> bool {
        if self.at_query_root() {
            self.advance();
            return true;
        }

        let error = SyntaxError::unexpected_token(
            "'FROM' or 'FIND'",
            &self.tokens.current_token().to_string(),
            self.tokens.current_span(),
        );
        self.record_error(&error);

        let mut scanned = 0;
        while !self.tokens.is_at_end() && !self.at_query_root() {
            self.advance();
            scanned += 1;
            if scanned >= MAX_RECOVERY_SCAN_TOKENS {
                return false;
            }
        }
        if self.at_query_root() {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_query_root(&self) -> bool {
        matches!(
            self.tokens.current_token().as_keyword(),
            Some(keyword) if keyword.is_query_root()
        )
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    pub(crate) fn current(&self) -> &Token {
        self.tokens.current_token()
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens.current_span()
    }

    pub(crate) fn peek(&self, offset: usize) -> &Token {
        self.tokens.peek(offset)
    }

    pub(crate) fn advance(&mut self) -> Option<SpannedToken> {
        self.tokens.advance()
    }

    pub(crate) fn at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        self.tokens.check(token)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.tokens.current_token().is_keyword(keyword)
    }

    pub(crate) fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token matching `expected` by variant, or fail with a
    /// description of what the grammar wanted here.
    pub(crate) fn expect(&mut self, expected: &Token, description: &str) -> SyntaxResult<Span> {
        if self.tokens.check(expected) {
            let span = self.tokens.current_span();
            self.tokens.advance();
            return Ok(span);
        }
        if self.tokens.is_at_end() {
            Err(SyntaxError::end_of_input(
                description,
                self.tokens.current_span(),
            ))
        } else {
            Err(SyntaxError::unexpected_token(
                description,
                &self.tokens.current_token().to_string(),
                self.tokens.current_span(),
            ))
        }
    }

    /// Exact-keyword variant of [`expect`]; `check` compares token variants
    /// only and would accept any keyword.
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> SyntaxResult<Span> {
        if self.check_keyword(keyword) {
            let span = self.tokens.current_span();
            self.tokens.advance();
            return Ok(span);
        }
        let description = format!("'{}'", keyword.as_str());
        if self.tokens.is_at_end() {
            Err(SyntaxError::end_of_input(
                &description,
                self.tokens.current_span(),
            ))
        } else {
            Err(SyntaxError::unexpected_token(
                &description,
                &self.tokens.current_token().to_string(),
                self.tokens.current_span(),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> SyntaxResult<(String, Span)> {
        let span = self.tokens.current_span();
        let token = self.tokens.current_token().clone();
        match token {
            Token::Identifier(name) => {
                self.tokens.advance();
                Ok((name, span))
            }
            Token::Eof => Err(SyntaxError::end_of_input("an identifier", span)),
            other => Err(SyntaxError::unexpected_token(
                "an identifier",
                &other.to_string(),
                span,
            )),
        }
    }

    // ------------------------------------------------------------------
    // Error recording and recovery
    // ------------------------------------------------------------------

    pub(crate) fn record_error(&mut self, error: &SyntaxError) {
        self.diagnostics.record_syntax(error);
        let message = error.to_string();
        match error.span() {
            Some(span) => log_error!(
                error.error_code(),
                &message,
                span = span,
                "context" => self.current_context(),
                "detail" => self.tokens.format_error(&span, &message)
            ),
            None => log_error!(
                error.error_code(),
                &message,
                "context" => self.current_context()
            ),
        }
        if error.requires_halt() {
            self.halted = true;
        }
    }

    pub(crate) fn halted(&self) -> bool {
        self.halted
    }

    /// Token that ends the current recovery region: a clause keyword, a
    /// closing brace, or the end of the query.
    pub(crate) fn at_recovery_boundary(&self) -> bool {
        if self.tokens.is_at_end() || self.check(&Token::RightBrace) {
            return true;
        }
        matches!(
            self.tokens.current_token().as_keyword(),
            Some(keyword) if keyword.is_clause_start() || keyword.is_query_root()
        )
    }

    /// Skip forward to a comma or a recovery boundary, bounded.
    pub(crate) fn skip_to_list_boundary(&mut self) {
        let mut scanned = 0;
        while !self.at_recovery_boundary() && !self.check(&Token::Comma) {
            self.advance();
            scanned += 1;
            if scanned >= MAX_RECOVERY_SCAN_TOKENS {
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Depth and context tracking
    // ------------------------------------------------------------------

    /// Enter one level of expression nesting.
    pub(crate) fn descend(&mut self) -> SyntaxResult<()> {
        self.parse_depth += 1;
        if self.parse_depth > MAX_PARSE_DEPTH {
            return Err(SyntaxError::max_recursion_depth(self.current_span()));
        }
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.parse_depth = self.parse_depth.saturating_sub(1);
    }

    pub(crate) fn push_context(&mut self, context: &str) {
        if self.context_stack.len() >= MAX_CONTEXT_STACK_DEPTH {
            self.context_stack.remove(0);
        }
        self.context_stack.push(context.to_string());
    }

    pub(crate) fn pop_context(&mut self) {
        self.context_stack.pop();
    }

    pub(crate) fn current_context(&self) -> String {
        if self.context_stack.is_empty() {
            "query".to_string()
        } else {
            self.context_stack.join(" -> ")
        }
    }

    // ------------------------------------------------------------------
    // Declaration table access
    // ------------------------------------------------------------------

    pub(crate) fn declarations(&self) -> &DeclarationTables {
        &self.declarations
    }

    pub(crate) fn declarations_mut(&mut self) -> &mut DeclarationTables {
        &mut self.declarations
    }

    pub(crate) fn in_predicate_body(&self) -> bool {
        self.in_predicate_body
    }

    pub(crate) fn set_in_predicate_body(&mut self, value: bool) {
        self.in_predicate_body = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::nodes::{BinaryOp, ExpressionNode, ProjectionKind, UnaryOp};
    use crate::syntax::parse_query;
    use assert_matches::assert_matches;

    #[test]
    fn test_minimal_query() {
        let query = parse_query("FROM method AS m").unwrap();
        assert_eq!(query.select_list.len(), 1);
        assert_eq!(query.select_list[0].entity, "method");
        assert_eq!(query.select_list[0].alias, "m");
        assert!(query.filter.is_none());
        assert!(query.projection.is_empty());
        assert!(query.predicates.is_empty());
    }

    #[test]
    fn test_full_query_shape() {
        let query =
            parse_query("FROM method AS m WHERE m.name(\"GetUser\") SELECT m, m.name()").unwrap();

        let filter = query.filter.unwrap();
        assert_eq!(
            filter,
            ExpressionNode::MethodCall {
                qualifier: Some("m".to_string()),
                name: "name".to_string(),
                arguments: vec![ExpressionNode::literal("\"GetUser\"")],
            }
        );

        assert_eq!(query.projection.len(), 2);
        assert_eq!(query.projection[0].kind, ProjectionKind::Variable);
        assert_eq!(query.projection[1].kind, ProjectionKind::MethodChain);
    }

    #[test]
    fn test_legacy_find_with_wildcard_like() {
        let query = parse_query("FIND method AS m WHERE m.name() LIKE \"Get%\"").unwrap();
        let filter = query.filter.unwrap();
        assert_matches!(
            filter,
            ExpressionNode::Binary {
                operator: BinaryOp::Like,
                ..
            }
        );
        if let ExpressionNode::Binary { right, .. } = filter {
            assert_eq!(*right, ExpressionNode::literal("\"Get%\""));
        }
        assert!(query.projection.is_empty());
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let query = parse_query("FROM f AS q WHERE a || b && c SELECT q").unwrap();
        let expected = ExpressionNode::binary(
            BinaryOp::Or,
            ExpressionNode::variable("a"),
            ExpressionNode::binary(
                BinaryOp::And,
                ExpressionNode::variable("b"),
                ExpressionNode::variable("c"),
            ),
        );
        assert_eq!(query.filter.unwrap(), expected);
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let query = parse_query("FROM f AS q WHERE a - b - c == 0 SELECT q").unwrap();
        let expected = ExpressionNode::binary(
            BinaryOp::Equal,
            ExpressionNode::binary(
                BinaryOp::Subtract,
                ExpressionNode::binary(
                    BinaryOp::Subtract,
                    ExpressionNode::variable("a"),
                    ExpressionNode::variable("b"),
                ),
                ExpressionNode::variable("c"),
            ),
            ExpressionNode::literal("0"),
        );
        assert_eq!(query.filter.unwrap(), expected);
    }

    #[test]
    fn test_filter_round_trips_through_rendering() {
        let sources = [
            "a || b && c",
            "a - b - c == 0",
            "!m.flag() && -x < 5",
            "m.kind() in [\"call\", \"field\"]",
            "(a + b) * c",
            "m.name() LIKE \"Get%\"",
            "c.name == \"Main\"",
        ];
        for source in sources {
            let query =
                parse_query(&format!("FROM f AS m WHERE {} SELECT m", source)).unwrap();
            let filter = query.filter.unwrap();
            let rendered = filter.to_query_string();
            let reparsed =
                parse_query(&format!("FROM f AS m WHERE {} SELECT m", rendered)).unwrap();
            assert_eq!(reparsed.filter.unwrap(), filter, "source: {}", source);
        }
    }

    #[test]
    fn test_errors_are_never_silent() {
        for source in [
            "",
            "   \n\t",
            "FROM",
            "WHERE m",
            "FROM method AS",
            "FROM method AS m WHERE",
            "FROM method AS m WHERE SELECT m.name()",
            "FROM method AS m SELECT",
            "FROM f AS x WHERE [] in y SELECT x",
            "FROM f AS x SELECT x trailing",
        ] {
            let errors = parse_query(source).unwrap_err();
            assert!(!errors.is_empty(), "no errors for: {:?}", source);
        }
    }

    #[test]
    fn test_missing_query_root_names_both_spellings() {
        let errors = parse_query("WHERE m").unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.message.contains("'FROM' or 'FIND'")));
    }

    #[test]
    fn test_predicate_forward_visibility() {
        let query = parse_query(
            "predicate isPublic(m) { isNamed(m) && m.visibility() == \"public\" } \
             predicate isNamed(m) { m.name() != \"\" } \
             FROM method AS m WHERE isPublic(m) SELECT m",
        )
        .unwrap();

        // The filter call resolves through the table
        let filter = query.filter.unwrap();
        assert_matches!(filter, ExpressionNode::PredicateCall { ref name, .. } if name == "isPublic");

        // The body of isPublic references isNamed, declared later
        let is_public = &query.predicates["isPublic"];
        if let ExpressionNode::Binary { left, .. } = &is_public.body {
            assert_matches!(
                **left,
                ExpressionNode::PredicateCall { ref name, .. } if name == "isNamed"
            );
        } else {
            panic!("unexpected body shape: {:?}", is_public.body);
        }
        assert!(query.predicates.contains_key("isNamed"));
    }

    #[test]
    fn test_declared_predicate_call_in_filter() {
        let query = parse_query(
            "predicate isLong(m) { m.length() > 100 } \
             FROM method AS m WHERE isLong(m) SELECT m",
        )
        .unwrap();

        assert_eq!(
            query.filter.unwrap(),
            ExpressionNode::PredicateCall {
                name: "isLong".to_string(),
                arguments: vec![ExpressionNode::variable("m")],
            }
        );

        let definition = &query.predicates["isLong"];
        assert_eq!(definition.parameters, vec!["m".to_string()]);
        assert_eq!(
            definition.body,
            ExpressionNode::binary(
                BinaryOp::Greater,
                ExpressionNode::MethodCall {
                    qualifier: Some("m".to_string()),
                    name: "length".to_string(),
                    arguments: vec![],
                },
                ExpressionNode::literal("100"),
            )
        );
    }

    #[test]
    fn test_undeclared_bare_call_is_method_call() {
        let query = parse_query("FROM f AS x WHERE size(x) > 1 SELECT x").unwrap();
        if let ExpressionNode::Binary { left, .. } = query.filter.unwrap() {
            assert_eq!(
                *left,
                ExpressionNode::MethodCall {
                    qualifier: None,
                    name: "size".to_string(),
                    arguments: vec![ExpressionNode::variable("x")],
                }
            );
        } else {
            panic!("expected binary filter");
        }
    }

    #[test]
    fn test_predicate_shadowing_last_wins() {
        let query = parse_query(
            "predicate p(x) { x.a() } predicate p(x) { x.b() } \
             FROM f AS m WHERE p(m)",
        )
        .unwrap();

        let body = &query.predicates["p"].body;
        assert_matches!(
            body,
            ExpressionNode::MethodCall { ref name, .. } if name == "b"
        );
        assert_eq!(query.predicates.len(), 1);
    }

    #[test]
    fn test_class_declaration_and_disambiguation() {
        let query = parse_query(
            "class Method { string name() { result = \"\" } } \
             FROM Method AS m WHERE Method(m) SELECT m",
        )
        .unwrap();

        // A registered class name makes a bare call a method call, never a
        // predicate call.
        assert_eq!(
            query.filter.unwrap(),
            ExpressionNode::MethodCall {
                qualifier: None,
                name: "Method".to_string(),
                arguments: vec![ExpressionNode::variable("m")],
            }
        );
    }

    #[test]
    fn test_where_select_requires_expression() {
        let errors = parse_query("FROM method AS m WHERE SELECT m.name()").unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.message.contains("expression")));
    }

    #[test]
    fn test_deep_nesting_reports_instead_of_overflowing() {
        let depth = MAX_PARSE_DEPTH + 50;
        let source = format!(
            "FROM f AS x WHERE {}x{} SELECT x",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let errors = parse_query(&source).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.message.contains("nesting")));
    }

    #[test]
    fn test_trailing_tokens_are_an_error() {
        let errors = parse_query("FROM f AS x SELECT x garbage").unwrap_err();
        assert!(errors.iter().any(|error| error.message.contains("garbage")));
    }

    #[test]
    fn test_error_positions_point_into_source() {
        let errors = parse_query("FROM method AS m\nWHERE SELECT m").unwrap_err();
        assert!(errors.iter().any(|error| error.line == 2));
    }

    #[test]
    fn test_multiple_select_items() {
        let query = parse_query("FROM method AS m, field AS f WHERE m.uses(f) SELECT m, f")
            .unwrap();
        assert_eq!(query.select_list.len(), 2);
        assert_eq!(query.select_list[1].entity, "field");
        assert_eq!(query.select_list[1].alias, "f");
        assert_eq!(query.projection.len(), 2);
    }

    #[test]
    fn test_unary_operators_bind_tightest() {
        let query = parse_query("FROM f AS m WHERE !m.flag() && -x < 5 SELECT m").unwrap();
        let expected = ExpressionNode::binary(
            BinaryOp::And,
            ExpressionNode::unary(
                UnaryOp::Not,
                ExpressionNode::MethodCall {
                    qualifier: Some("m".to_string()),
                    name: "flag".to_string(),
                    arguments: vec![],
                },
            ),
            ExpressionNode::binary(
                BinaryOp::Less,
                ExpressionNode::unary(UnaryOp::Negate, ExpressionNode::variable("x")),
                ExpressionNode::literal("5"),
            ),
        );
        assert_eq!(query.filter.unwrap(), expected);
    }

    #[test]
    fn test_projection_literal_kind() {
        let query = parse_query("FROM f AS m SELECT \"label\", m").unwrap();
        assert_eq!(query.projection[0].kind, ProjectionKind::Literal);
        assert_eq!(
            query.projection[0].expression,
            ExpressionNode::literal("\"label\"")
        );
    }

    #[test]
    fn test_recovery_collects_multiple_errors() {
        // Both the bad select item and the bad filter get reported
        let errors = parse_query("FROM method AS WHERE m. SELECT m").unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_context_stack_capped() {
        let tokens = crate::tokens::TokenStreamBuilder::new().build();
        let mut parser = QueryParser::new(tokens, Diagnostics::new());
        for i in 0..(MAX_CONTEXT_STACK_DEPTH * 2) {
            parser.push_context(&format!("level{}", i));
        }
        assert!(parser.current_context().len() > 0);
        assert!(parser.context_stack.len() <= MAX_CONTEXT_STACK_DEPTH);
    }
}

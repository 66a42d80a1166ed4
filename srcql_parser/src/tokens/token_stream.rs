//! Filtered stream of spanned tokens.
//!
//! The stream holds every token the tokenizer produced but navigates only
//! the significant ones; whitespace stays addressable for span math without
//! ever appearing as `current`.

use crate::config::compile_time;
use crate::tokens::token::{SpannedToken, Token};
use crate::utils::{Position, SourceMap, Span};
use std::mem::discriminant;

const EOF_TOKEN: Token = Token::Eof;

/// Cursor over the significant tokens of one tokenized query.
#[derive(Debug, Clone)]
pub struct TokenStream {
    all_tokens: Vec<SpannedToken>,
    significant_indices: Vec<usize>,
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = build_significant_indices(&tokens);
        TokenStream {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = TokenStream::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    /// Significant token count, EOF included.
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    /// True when the stream holds nothing but whitespace and EOF.
    pub fn is_blank(&self) -> bool {
        self.significant_indices
            .iter()
            .all(|&index| self.all_tokens[index].value.is_eof())
    }

    pub fn current(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position)
            .map(|&index| &self.all_tokens[index])
    }

    /// Current token, or EOF when navigation ran past the end.
    pub fn current_token(&self) -> &Token {
        self.current().map(|spanned| &spanned.value).unwrap_or(&EOF_TOKEN)
    }

    /// Span of the current token; falls back to the last known span.
    pub fn current_span(&self) -> Span {
        if let Some(spanned) = self.current() {
            return spanned.span;
        }
        self.all_tokens
            .last()
            .map(|spanned| spanned.span)
            .unwrap_or_else(Span::dummy)
    }

    /// Significant token `offset` positions ahead; `peek(0)` is `current`.
    /// Lookahead distance is capped.
    pub fn peek(&self, offset: usize) -> &Token {
        let offset = offset.min(compile_time::syntax::MAX_LOOKAHEAD_TOKENS);
        self.significant_indices
            .get(self.position + offset)
            .map(|&index| &self.all_tokens[index].value)
            .unwrap_or(&EOF_TOKEN)
    }

    /// Consume and return the current significant token.
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let spanned = self.current().cloned();
        if spanned.is_some() {
            self.position += 1;
        }
        spanned
    }

    /// At the EOF token (or past every token).
    pub fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    /// Same-variant check, payloads ignored.
    pub fn check(&self, expected: &Token) -> bool {
        discriminant(self.current_token()) == discriminant(expected)
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    /// Every token, whitespace included.
    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Caret-rendered context for an error span, when source is attached.
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        match &self.source_map {
            Some(map) => map.format_error(span, message),
            None => format!("Error: {} at {}", message, span),
        }
    }
}

fn build_significant_indices(tokens: &[SpannedToken]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, spanned)| spanned.value.is_significant())
        .map(|(index, _)| index)
        .collect()
}

/// Builds token streams with consistent spans, mainly for parser tests.
#[derive(Debug, Default)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        TokenStreamBuilder::default()
    }

    /// Append a token whose source text is its canonical spelling.
    pub fn push(&mut self, token: Token) -> &mut Self {
        let text = token.to_query_string();
        self.push_with_text(token, &text)
    }

    /// Append a token covering `text` at the running position.
    pub fn push_with_text(&mut self, token: Token, text: &str) -> &mut Self {
        let start = self.position;
        self.position.advance_str(text);
        self.tokens
            .push(SpannedToken::new(token, Span::new(start, self.position)));
        self
    }

    /// Finish with an EOF token appended.
    pub fn build(mut self) -> TokenStream {
        self.tokens.push(SpannedToken::new(
            Token::Eof,
            Span::single(self.position),
        ));
        TokenStream::new(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::keywords::Keyword;

    fn sample_stream() -> TokenStream {
        let mut builder = TokenStreamBuilder::new();
        builder
            .push(Token::Keyword(Keyword::From))
            .push(Token::Space)
            .push(Token::Identifier("method".to_string()))
            .push(Token::Space)
            .push(Token::Keyword(Keyword::As))
            .push(Token::Space)
            .push(Token::Identifier("m".to_string()));
        builder.build()
    }

    #[test]
    fn test_whitespace_is_filtered() {
        let stream = sample_stream();
        // FROM, method, AS, m, EOF
        assert_eq!(stream.len(), 5);
        assert!(stream.all_tokens().len() > stream.len());
        assert!(stream.check(&Token::Keyword(Keyword::From)));
    }

    #[test]
    fn test_navigation() {
        let mut stream = sample_stream();
        assert_eq!(stream.peek(1).as_identifier(), Some("method"));
        assert!(stream.current_token().is_keyword(Keyword::From));

        stream.advance();
        assert_eq!(stream.current_token().as_identifier(), Some("method"));
        assert!(!stream.is_at_end());

        while !stream.is_at_end() {
            stream.advance();
        }
        assert!(stream.current_token().is_eof());
        // Advancing past EOF stays at EOF
        stream.advance();
        assert!(stream.current_token().is_eof());
    }

    #[test]
    fn test_check_ignores_payload() {
        let stream = sample_stream();
        // Variant match, not value match
        assert!(!stream.check(&Token::Identifier(String::new())));
        assert!(stream.check(&Token::Keyword(Keyword::Where)));
    }

    #[test]
    fn test_format_error_uses_attached_source() {
        let source = "FROM methd AS m";
        let mut start = Position::start();
        start.advance_str("FROM ");
        let mut end = start;
        end.advance_str("methd");
        let span = Span::new(start, end);

        let tokens = vec![
            SpannedToken::new(Token::Identifier("methd".to_string()), span),
            SpannedToken::new(Token::Eof, Span::single(end)),
        ];
        let stream = TokenStream::with_source_map(tokens, SourceMap::new(source));
        let rendered = stream.format_error(&span, "unknown entity");
        assert!(rendered.contains("unknown entity"));
        assert!(rendered.contains("FROM methd AS m"));

        // Without a source map the span alone is reported
        let bare = TokenStream::new(vec![]);
        assert!(bare.format_error(&span, "unknown entity").contains("1:6"));
    }

    #[test]
    fn test_spans_advance_with_text() {
        let stream = sample_stream();
        let first = stream.current().unwrap();
        assert_eq!(first.span.start.column, 1);
        assert_eq!(first.span.end.column, 5);

        // "method" starts after "FROM "
        assert_eq!(stream.peek(1).as_identifier(), Some("method"));
    }

    #[test]
    fn test_blank_stream() {
        let builder = TokenStreamBuilder::new();
        let stream = builder.build();
        assert!(stream.is_blank());
        assert!(stream.is_at_end());
    }
}

//! Hand-written tokenizer.
//!
//! One pass over the characters, at most one character of pushback-free
//! peeking per decision (two for the fraction check in numbers). Lexical
//! errors never abort the scan: the offending character is skipped, the
//! error is returned alongside the stream, and scanning resumes.

use crate::config::compile_time::lexical::{
    MAX_IDENTIFIER_LENGTH, MAX_STRING_SIZE, MAX_TOKEN_COUNT,
};
use crate::grammar::keywords::Keyword;
use crate::logging::codes::{self, Code};
use crate::tokens::token::{SpannedToken, StringLiteral, Token};
use crate::tokens::token_stream::TokenStream;
use crate::utils::{Position, SourceMap, Span};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerError {
    #[error("Unrecognized character '{character}'")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated string literal")]
    UnterminatedString { line: u32, column: u32 },

    #[error("String literal exceeds maximum size ({size} bytes)")]
    StringTooLarge { size: usize, line: u32, column: u32 },

    #[error("Identifier exceeds maximum length ({length} characters)")]
    IdentifierTooLong {
        length: usize,
        line: u32,
        column: u32,
    },

    #[error("Query produces too many tokens ({count})")]
    TooManyTokens { count: usize, line: u32, column: u32 },
}

impl LexerError {
    pub fn line(&self) -> u32 {
        match self {
            LexerError::InvalidCharacter { line, .. }
            | LexerError::UnterminatedString { line, .. }
            | LexerError::StringTooLarge { line, .. }
            | LexerError::IdentifierTooLong { line, .. }
            | LexerError::TooManyTokens { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            LexerError::InvalidCharacter { column, .. }
            | LexerError::UnterminatedString { column, .. }
            | LexerError::StringTooLarge { column, .. }
            | LexerError::IdentifierTooLong { column, .. }
            | LexerError::TooManyTokens { column, .. } => *column,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Counters for one tokenization run.
#[derive(Debug, Clone, Default)]
pub struct LexicalMetrics {
    pub token_count: usize,
    pub identifier_count: usize,
    pub string_count: usize,
    pub number_count: usize,
    pub error_count: usize,
    pub longest_string: usize,
}

impl LexicalMetrics {
    fn record_string(&mut self, length: usize) {
        self.string_count += 1;
        self.longest_string = self.longest_string.max(length);
    }
}

#[derive(Debug, Default)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        LexicalAnalyzer::default()
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a full query string.
    ///
    /// Always returns a usable stream (ending in EOF) even when errors were
    /// found; the caller decides what to do with the error list.
    pub fn tokenize(&mut self, source: &str) -> (TokenStream, Vec<LexerError>) {
        let mut tokens: Vec<SpannedToken> = Vec::new();
        let mut errors: Vec<LexerError> = Vec::new();
        let mut chars = source.char_indices().peekable();
        let mut pos = Position::start();

        while let Some((_, ch)) = chars.next() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                errors.push(LexerError::TooManyTokens {
                    count: tokens.len(),
                    line: pos.line,
                    column: pos.column,
                });
                break;
            }

            let start = pos;
            match ch {
                ' ' | '\r' => {
                    pos.advance(ch);
                    tokens.push(spanned(Token::Space, start, pos));
                }
                '\t' => {
                    pos.advance(ch);
                    tokens.push(spanned(Token::Tab, start, pos));
                }
                '\n' => {
                    pos.advance(ch);
                    tokens.push(spanned(Token::Newline, start, pos));
                }

                '"' => {
                    pos.advance(ch);
                    match self.scan_string(&mut chars, &mut pos, start) {
                        Ok(token) => tokens.push(spanned(token, start, pos)),
                        Err(error) => {
                            self.metrics.error_count += 1;
                            errors.push(error);
                        }
                    }
                }

                c if c.is_ascii_digit() => {
                    let text = scan_number(c, &mut chars);
                    pos.advance_str(&text);
                    self.metrics.number_count += 1;
                    tokens.push(spanned(Token::Number(text), start, pos));
                }

                c if c.is_ascii_alphabetic() || c == '_' => {
                    let word = scan_word(c, &mut chars);
                    pos.advance_str(&word);
                    if word.len() > MAX_IDENTIFIER_LENGTH {
                        self.metrics.error_count += 1;
                        errors.push(LexerError::IdentifierTooLong {
                            length: word.len(),
                            line: start.line,
                            column: start.column,
                        });
                    } else {
                        match Keyword::from_str(&word) {
                            Some(keyword) => tokens.push(spanned(
                                Token::Keyword(keyword),
                                start,
                                pos,
                            )),
                            None => {
                                self.metrics.identifier_count += 1;
                                tokens.push(spanned(Token::Identifier(word), start, pos));
                            }
                        }
                    }
                }

                '|' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '|'))) {
                        chars.next();
                        pos.advance('|');
                        tokens.push(spanned(Token::OrOr, start, pos));
                    } else {
                        self.metrics.error_count += 1;
                        errors.push(LexerError::InvalidCharacter {
                            character: '|',
                            line: start.line,
                            column: start.column,
                        });
                    }
                }
                '&' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '&'))) {
                        chars.next();
                        pos.advance('&');
                        tokens.push(spanned(Token::AndAnd, start, pos));
                    } else {
                        self.metrics.error_count += 1;
                        errors.push(LexerError::InvalidCharacter {
                            character: '&',
                            line: start.line,
                            column: start.column,
                        });
                    }
                }
                '=' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '='))) {
                        chars.next();
                        pos.advance('=');
                        tokens.push(spanned(Token::EqualEqual, start, pos));
                    } else {
                        tokens.push(spanned(Token::Assign, start, pos));
                    }
                }
                '!' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '='))) {
                        chars.next();
                        pos.advance('=');
                        tokens.push(spanned(Token::NotEqual, start, pos));
                    } else {
                        tokens.push(spanned(Token::Bang, start, pos));
                    }
                }
                '<' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '='))) {
                        chars.next();
                        pos.advance('=');
                        tokens.push(spanned(Token::LessEqual, start, pos));
                    } else {
                        tokens.push(spanned(Token::Less, start, pos));
                    }
                }
                '>' => {
                    pos.advance(ch);
                    if matches!(chars.peek(), Some(&(_, '='))) {
                        chars.next();
                        pos.advance('=');
                        tokens.push(spanned(Token::GreaterEqual, start, pos));
                    } else {
                        tokens.push(spanned(Token::Greater, start, pos));
                    }
                }

                '+' => single(&mut tokens, &mut pos, ch, start, Token::Plus),
                '-' => single(&mut tokens, &mut pos, ch, start, Token::Minus),
                '*' => single(&mut tokens, &mut pos, ch, start, Token::Star),
                '/' => single(&mut tokens, &mut pos, ch, start, Token::Slash),
                '.' => single(&mut tokens, &mut pos, ch, start, Token::Dot),
                ',' => single(&mut tokens, &mut pos, ch, start, Token::Comma),
                '(' => single(&mut tokens, &mut pos, ch, start, Token::LeftParen),
                ')' => single(&mut tokens, &mut pos, ch, start, Token::RightParen),
                '{' => single(&mut tokens, &mut pos, ch, start, Token::LeftBrace),
                '}' => single(&mut tokens, &mut pos, ch, start, Token::RightBrace),
                '[' => single(&mut tokens, &mut pos, ch, start, Token::LeftBracket),
                ']' => single(&mut tokens, &mut pos, ch, start, Token::RightBracket),

                other => {
                    pos.advance(other);
                    self.metrics.error_count += 1;
                    errors.push(LexerError::InvalidCharacter {
                        character: other,
                        line: start.line,
                        column: start.column,
                    });
                }
            }
        }

        tokens.push(spanned(Token::Eof, pos, pos));
        self.metrics.token_count = tokens.len();

        for error in &errors {
            log_error!(
                error.error_code(),
                &error.to_string(),
                "line" => error.line(),
                "column" => error.column()
            );
        }
        if errors.is_empty() {
            log_success!(
                codes::success::TOKENIZATION_COMPLETE,
                "Tokenization complete",
                "tokens" => tokens.len()
            );
        }

        (
            TokenStream::with_source_map(tokens, SourceMap::new(source)),
            errors,
        )
    }

    /// Scan the remainder of a quoted string; the opening quote is consumed.
    /// Only `\"` and `\\` are escapes, a lone backslash stays literal.
    fn scan_string(
        &mut self,
        chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
        pos: &mut Position,
        start: Position,
    ) -> Result<Token, LexerError> {
        let mut content = String::new();
        let mut terminated = false;

        while let Some((_, c)) = chars.next() {
            pos.advance(c);
            match c {
                '"' => {
                    terminated = true;
                    break;
                }
                '\\' => match chars.peek() {
                    Some(&(_, '"')) => {
                        chars.next();
                        pos.advance('"');
                        content.push('"');
                    }
                    Some(&(_, '\\')) => {
                        chars.next();
                        pos.advance('\\');
                        content.push('\\');
                    }
                    _ => content.push('\\'),
                },
                other => content.push(other),
            }
        }

        if !terminated {
            return Err(LexerError::UnterminatedString {
                line: start.line,
                column: start.column,
            });
        }
        if content.len() > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: content.len(),
                line: start.line,
                column: start.column,
            });
        }

        self.metrics.record_string(content.len());
        Ok(Token::StringLiteral(StringLiteral::from_content(content)))
    }
}

fn spanned(token: Token, start: Position, end: Position) -> SpannedToken {
    SpannedToken::new(token, Span::new(start, end))
}

fn single(
    tokens: &mut Vec<SpannedToken>,
    pos: &mut Position,
    ch: char,
    start: Position,
    token: Token,
) {
    pos.advance(ch);
    tokens.push(spanned(token, start, *pos));
}

/// Digits with an optional `.digits` fraction. The dot is consumed only when
/// a digit follows it, so `1.` tokenizes as `1` then `.`.
fn scan_number(
    first: char,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    let mut text = String::new();
    text.push(first);
    while let Some(&(_, d)) = chars.peek() {
        if d.is_ascii_digit() {
            text.push(d);
            chars.next();
        } else {
            break;
        }
    }

    if let Some(&(_, '.')) = chars.peek() {
        let mut ahead = chars.clone();
        ahead.next();
        if matches!(ahead.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
            text.push('.');
            chars.next();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    text.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }

    text
}

fn scan_word(
    first: char,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    let mut word = String::new();
    word.push(first);
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    word
}

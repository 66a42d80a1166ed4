//! Compile-time constants enforcing resource bounds on parsing.
//!
//! These limits cannot be changed at runtime. Every collection the parser
//! grows while processing untrusted query text is capped by one of them.

pub mod compile_time {
    /// Tokenization bounds.
    pub mod lexical {
        /// Maximum decoded string literal size in bytes.
        ///
        /// SECURITY: bounds memory consumed by a single quoted literal.
        pub const MAX_STRING_SIZE: usize = 1_048_576;

        /// Maximum identifier length in characters.
        ///
        /// SECURITY: bounds symbol storage for pathological input.
        pub const MAX_IDENTIFIER_LENGTH: usize = 255;

        /// Maximum number of tokens produced for one query.
        ///
        /// RESOURCE: bounds total token storage; queries are short in
        /// practice, this is a hard ceiling for adversarial input.
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
    }

    /// Parsing bounds.
    pub mod syntax {
        /// Maximum expression nesting depth.
        ///
        /// SECURITY: converts deep recursion into a reported error instead
        /// of a stack overflow.
        pub const MAX_PARSE_DEPTH: usize = 100;

        /// Maximum significant-token lookahead distance.
        ///
        /// The grammar needs at most two tokens of lookahead; this cap
        /// keeps any future helper from scanning unbounded.
        pub const MAX_LOOKAHEAD_TOKENS: usize = 4;

        /// Maximum tokens scanned while recovering from a syntax error.
        ///
        /// RESOURCE: keeps error recovery linear in the worst case.
        pub const MAX_RECOVERY_SCAN_TOKENS: usize = 1_000;

        /// Maximum parser context stack depth (diagnostics only).
        pub const MAX_CONTEXT_STACK_DEPTH: usize = 20;

        /// Maximum errors collected for one parse.
        ///
        /// RESOURCE: bounds the error list returned to the caller.
        pub const MAX_ERROR_COLLECTION: usize = 1_000;
    }

    /// Declaration table bounds.
    pub mod declarations {
        /// Maximum predicate declarations per query.
        pub const MAX_PREDICATES: usize = 10_000;

        /// Maximum class declarations per query.
        pub const MAX_CLASSES: usize = 10_000;

        /// Maximum parameters on one predicate declaration.
        pub const MAX_PREDICATE_PARAMETERS: usize = 64;
    }

    /// Logging bounds.
    pub mod logging {
        /// Maximum events retained by the in-memory logger.
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length in bytes.
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 2_000;
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::*;

    #[test]
    fn test_bounds_are_sane() {
        assert!(lexical::MAX_IDENTIFIER_LENGTH < lexical::MAX_STRING_SIZE);
        assert!(syntax::MAX_LOOKAHEAD_TOKENS >= 2);
        assert!(syntax::MAX_PARSE_DEPTH >= 32);
        assert!(syntax::MAX_ERROR_COLLECTION > 0);
        assert!(declarations::MAX_PREDICATE_PARAMETERS > 0);
    }
}

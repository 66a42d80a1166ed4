//! Predicate and class tables for one parse.
//!
//! Both tables allow shadowing: registering an existing name replaces the
//! previous entry and the latest one wins at lookup time. The class table
//! only feeds parsing decisions (a registered class name changes how a bare
//! call is read); nothing validates entity names against it.

use crate::config::compile_time::declarations::{
    MAX_CLASSES, MAX_PREDICATES, MAX_PREDICATE_PARAMETERS,
};
use crate::grammar::ast::nodes::{ClassDeclaration, PredicateDefinition};
use crate::logging::codes::{self, Code};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("Too many predicate declarations (limit {limit})")]
    TooManyPredicates { limit: usize },

    #[error("Too many class declarations (limit {limit})")]
    TooManyClasses { limit: usize },

    #[error("Predicate '{name}' declares {count} parameters (limit {limit})")]
    TooManyParameters {
        name: String,
        count: usize,
        limit: usize,
    },
}

impl DeclarationError {
    pub fn error_code(&self) -> Code {
        match self {
            DeclarationError::TooManyPredicates { .. } => {
                codes::declarations::TOO_MANY_PREDICATES
            }
            DeclarationError::TooManyClasses { .. } => codes::declarations::TOO_MANY_CLASSES,
            DeclarationError::TooManyParameters { .. } => {
                codes::declarations::TOO_MANY_PARAMETERS
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DeclarationTables {
    predicates: HashMap<String, PredicateDefinition>,
    classes: HashMap<String, ClassDeclaration>,
}

impl DeclarationTables {
    pub fn new() -> Self {
        DeclarationTables::default()
    }

    /// Register a predicate. A repeated name shadows the earlier definition.
    pub fn register_predicate(
        &mut self,
        definition: PredicateDefinition,
    ) -> Result<(), DeclarationError> {
        if definition.parameters.len() > MAX_PREDICATE_PARAMETERS {
            return Err(DeclarationError::TooManyParameters {
                name: definition.name.clone(),
                count: definition.parameters.len(),
                limit: MAX_PREDICATE_PARAMETERS,
            });
        }
        if !self.predicates.contains_key(&definition.name)
            && self.predicates.len() >= MAX_PREDICATES
        {
            return Err(DeclarationError::TooManyPredicates {
                limit: MAX_PREDICATES,
            });
        }

        if self.predicates.contains_key(&definition.name) {
            log_debug!(
                "Predicate shadowed by later declaration",
                "name" => definition.name
            );
        }
        self.predicates.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Latest definition registered under `name`.
    pub fn lookup_predicate(&self, name: &str) -> Option<&PredicateDefinition> {
        self.predicates.get(name)
    }

    pub fn has_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Register a class. A repeated name shadows the earlier declaration.
    pub fn register_class(
        &mut self,
        declaration: ClassDeclaration,
    ) -> Result<(), DeclarationError> {
        if !self.classes.contains_key(&declaration.name) && self.classes.len() >= MAX_CLASSES {
            return Err(DeclarationError::TooManyClasses { limit: MAX_CLASSES });
        }

        if self.classes.contains_key(&declaration.name) {
            log_debug!(
                "Class shadowed by later declaration",
                "name" => declaration.name
            );
        }
        self.classes.insert(declaration.name.clone(), declaration);
        Ok(())
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Hand the predicate map over to the assembled query.
    pub fn into_predicates(self) -> HashMap<String, PredicateDefinition> {
        self.predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::nodes::ExpressionNode;

    fn predicate(name: &str, body_text: &str) -> PredicateDefinition {
        PredicateDefinition {
            name: name.to_string(),
            parameters: vec![],
            body: ExpressionNode::literal(body_text),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut tables = DeclarationTables::new();
        tables.register_predicate(predicate("isLong", "1")).unwrap();

        assert!(tables.has_predicate("isLong"));
        assert!(!tables.has_predicate("isShort"));
        assert_eq!(tables.predicate_count(), 1);
        assert_eq!(
            tables.lookup_predicate("isLong").unwrap().body,
            ExpressionNode::literal("1")
        );
    }

    #[test]
    fn test_shadowing_last_wins() {
        let mut tables = DeclarationTables::new();
        tables.register_predicate(predicate("p", "1")).unwrap();
        tables.register_predicate(predicate("p", "2")).unwrap();

        assert_eq!(tables.predicate_count(), 1);
        assert_eq!(
            tables.lookup_predicate("p").unwrap().body,
            ExpressionNode::literal("2")
        );
    }

    #[test]
    fn test_parameter_limit() {
        let mut tables = DeclarationTables::new();
        let definition = PredicateDefinition {
            name: "wide".to_string(),
            parameters: (0..=MAX_PREDICATE_PARAMETERS)
                .map(|i| format!("p{}", i))
                .collect(),
            body: ExpressionNode::literal("1"),
        };

        let err = tables.register_predicate(definition).unwrap_err();
        assert!(matches!(err, DeclarationError::TooManyParameters { .. }));
        assert_eq!(tables.predicate_count(), 0);
    }

    #[test]
    fn test_class_registration() {
        let mut tables = DeclarationTables::new();
        tables
            .register_class(ClassDeclaration {
                name: "Method".to_string(),
                methods: vec![],
            })
            .unwrap();

        assert!(tables.is_class("Method"));
        assert!(!tables.is_class("Field"));
        assert_eq!(tables.class_count(), 1);
    }

    #[test]
    fn test_into_predicates() {
        let mut tables = DeclarationTables::new();
        tables.register_predicate(predicate("a", "1")).unwrap();
        tables.register_predicate(predicate("b", "2")).unwrap();

        let map = tables.into_predicates();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("a"));
        assert!(map.contains_key("b"));
    }
}

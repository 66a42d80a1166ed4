//! Abstract syntax tree for parsed queries.

pub mod nodes;

pub use nodes::{
    BinaryOp, ClassDeclaration, ExpressionNode, MethodDeclaration, PredicateDefinition,
    ProjectionItem, ProjectionKind, Query, SelectItem, UnaryOp,
};

//! AST node definitions.
//!
//! Nodes are plain data: the parser builds them, downstream consumers walk
//! them. No node evaluates anything. All nodes serialize with `serde` so a
//! parsed query can cross a process boundary.
//!
//! Design notes:
//! - Literal nodes keep their source text verbatim, quotes included, so a
//!   string literal and a number render back exactly as written.
//! - Grouping parentheses produce no node; precedence is structural.
//! - `to_query_string` re-parenthesizes nested operators, so rendering and
//!   reparsing yields a structurally identical tree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type Identifier = String;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negate,
}

impl UnaryOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Infix operators, one variant per spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Like,
    In,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::In => "in",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }

    pub fn parse(text: &str) -> Option<BinaryOp> {
        match text {
            "||" => Some(BinaryOp::Or),
            "&&" => Some(BinaryOp::And),
            "==" => Some(BinaryOp::Equal),
            "!=" => Some(BinaryOp::NotEqual),
            "<" => Some(BinaryOp::Less),
            ">" => Some(BinaryOp::Greater),
            "<=" => Some(BinaryOp::LessEqual),
            ">=" => Some(BinaryOp::GreaterEqual),
            "LIKE" => Some(BinaryOp::Like),
            "in" => Some(BinaryOp::In),
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Subtract),
            "*" => Some(BinaryOp::Multiply),
            "/" => Some(BinaryOp::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of a filter or projection expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionNode {
    /// String or number literal; `text` is the source spelling, quotes and
    /// all, so `"GetUser"` keeps its quotes and `10` stays `10`.
    Literal { text: String },
    /// Bare identifier, usually a select-list alias.
    Variable { name: Identifier },
    /// `qualifier.name(arguments)` or `name(arguments)` when the name is not
    /// a declared predicate.
    MethodCall {
        qualifier: Option<String>,
        name: Identifier,
        arguments: Vec<ExpressionNode>,
    },
    /// `name(arguments)` where `name` resolves through the predicate table.
    PredicateCall {
        name: Identifier,
        arguments: Vec<ExpressionNode>,
    },
    /// `[item, item, ...]`, never empty.
    ListLiteral { items: Vec<ExpressionNode> },
    Unary {
        operator: UnaryOp,
        operand: Box<ExpressionNode>,
    },
    Binary {
        operator: BinaryOp,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
}

impl ExpressionNode {
    pub fn binary(operator: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOp, operand: ExpressionNode) -> Self {
        ExpressionNode::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        ExpressionNode::Literal { text: text.into() }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        ExpressionNode::Variable { name: name.into() }
    }

    pub fn is_call(&self) -> bool {
        matches!(
            self,
            ExpressionNode::MethodCall { .. } | ExpressionNode::PredicateCall { .. }
        )
    }

    /// Render back to query text. Nested operator nodes are wrapped in
    /// parentheses so reparsing the output reproduces this tree.
    pub fn to_query_string(&self) -> String {
        match self {
            ExpressionNode::Literal { text } => text.clone(),
            ExpressionNode::Variable { name } => name.clone(),
            ExpressionNode::MethodCall {
                qualifier,
                name,
                arguments,
            } => {
                let args = render_arguments(arguments);
                match qualifier {
                    Some(qualifier) => format!("{}.{}({})", qualifier, name, args),
                    None => format!("{}({})", name, args),
                }
            }
            ExpressionNode::PredicateCall { name, arguments } => {
                format!("{}({})", name, render_arguments(arguments))
            }
            ExpressionNode::ListLiteral { items } => {
                format!("[{}]", render_arguments(items))
            }
            ExpressionNode::Unary { operator, operand } => {
                format!("{}{}", operator, wrap_operand(operand))
            }
            ExpressionNode::Binary {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                wrap_operand(left),
                operator,
                wrap_operand(right)
            ),
        }
    }
}

fn render_arguments(arguments: &[ExpressionNode]) -> String {
    arguments
        .iter()
        .map(ExpressionNode::to_query_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn wrap_operand(operand: &ExpressionNode) -> String {
    match operand {
        ExpressionNode::Binary { .. } | ExpressionNode::Unary { .. } => {
            format!("({})", operand.to_query_string())
        }
        _ => operand.to_query_string(),
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}

/// One `entity AS alias` entry of the select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    pub entity: Identifier,
    pub alias: Identifier,
}

/// A named predicate: `predicate name(params) { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateDefinition {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: ExpressionNode,
}

/// A method declaration inside a class block, with its trivial
/// `result = value` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub return_type: Identifier,
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub result: ExpressionNode,
}

/// A class declaration block; only its name participates in parsing
/// decisions, the method list is carried for consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: Identifier,
    pub methods: Vec<MethodDeclaration>,
}

/// How a projection entry was spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    Variable,
    MethodChain,
    Literal,
    Expression,
}

impl ProjectionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Variable => "variable",
            ProjectionKind::MethodChain => "method_chain",
            ProjectionKind::Literal => "literal",
            ProjectionKind::Expression => "expression",
        }
    }

    /// Classify a parsed projection expression.
    pub fn of(expression: &ExpressionNode) -> ProjectionKind {
        match expression {
            ExpressionNode::Variable { .. } => ProjectionKind::Variable,
            ExpressionNode::MethodCall { .. } | ExpressionNode::PredicateCall { .. } => {
                ProjectionKind::MethodChain
            }
            ExpressionNode::Literal { .. } => ProjectionKind::Literal,
            _ => ProjectionKind::Expression,
        }
    }
}

/// One entry of the `SELECT` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionItem {
    pub kind: ProjectionKind,
    pub expression: ExpressionNode,
}

impl ProjectionItem {
    pub fn new(expression: ExpressionNode) -> Self {
        ProjectionItem {
            kind: ProjectionKind::of(&expression),
            expression,
        }
    }
}

/// A fully parsed query. Immutable once assembled; predicates are carried
/// un-expanded for the consumer to inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub select_list: Vec<SelectItem>,
    pub filter: Option<ExpressionNode>,
    pub projection: Vec<ProjectionItem>,
    pub predicates: HashMap<String, PredicateDefinition>,
}

impl Query {
    /// One-line summary for log output.
    pub fn summary(&self) -> String {
        format!(
            "select_list={} filter={} projection={} predicates={}",
            self.select_list.len(),
            self.filter.is_some(),
            self.projection.len(),
            self.predicates.len()
        )
    }
}

//! Final assembly of a parsed query.
//!
//! Pure construction: by the time this runs every clause has been parsed and
//! the caller has already decided the parse is worth keeping. Predicates are
//! carried un-expanded; inlining them is the consumer's job.

use crate::declarations::DeclarationTables;
use crate::grammar::ast::nodes::{ExpressionNode, ProjectionItem, Query, SelectItem};
use crate::logging::codes;

pub(crate) fn assemble(
    select_list: Vec<SelectItem>,
    filter: Option<ExpressionNode>,
    projection: Vec<ProjectionItem>,
    tables: DeclarationTables,
) -> Query {
    let query = Query {
        select_list,
        filter,
        projection,
        predicates: tables.into_predicates(),
    };
    log_success!(
        codes::success::PARSE_COMPLETE,
        "Query assembled",
        "summary" => query.summary()
    );
    query
}

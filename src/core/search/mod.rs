//! Search session engine.
//!
//! - **query**: filter criteria to query expression
//! - **cursor**: sort keys and keyset pagination cursors
//! - **highlight**: abstract snippet selection
//! - **session**: paginated session state machine

pub mod cursor;
pub mod highlight;
pub mod query;
pub mod session;

pub use cursor::{compare_by, Direction, PaginationCursor, SortKey};
pub use highlight::ResultHighlighter;
pub use query::{build as build_query, QueryExpression, SearchField};
pub use session::{Phase, SearchSession, SessionSettings, SessionState};

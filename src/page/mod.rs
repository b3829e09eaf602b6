//! Rendered page access
//!
//! The search results view and the load-time decorations of article pages.

pub mod decorations;
pub mod results;

pub use decorations::{plan as plan_decorations, DecorationPlan, HeaderLink};
pub use results::{HtmlResultsPage, PageSelectors, ResultEntry, ResultsPage, SearchInput};

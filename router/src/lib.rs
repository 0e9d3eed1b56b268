pub mod driver;
pub mod queue;
pub mod search;

pub use driver::{RouteCtx, RouteSummary, route};

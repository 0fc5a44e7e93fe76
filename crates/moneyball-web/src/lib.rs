// Library root for the dashboard web layer: routing, handlers, HTML and
// chart rendering. Re-exported so integration tests can drive the router.

pub mod chart;
pub mod context;
pub mod error;
pub mod handlers;
pub mod html;
pub mod router;

pub use context::{AppContext, SharedContext};
pub use router::create_router;

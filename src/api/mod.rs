//! HTTP layer: router, handlers, extractors and error mapping

pub mod endpoints;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router_with_state;
pub use state::AppState;

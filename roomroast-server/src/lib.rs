pub mod config;
pub mod errors;
pub mod inference;
pub mod roast;
pub mod routes;

pub use routes::{build_router, AppState};

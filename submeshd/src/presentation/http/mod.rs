pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

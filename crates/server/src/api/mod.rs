pub mod handlers;
pub mod playlist;
pub mod queue;
pub mod routes;
pub mod search;

pub use routes::create_router;

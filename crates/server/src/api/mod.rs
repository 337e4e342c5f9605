pub mod explorer;
pub mod handlers;
pub mod middleware;
pub mod mint;
pub mod routes;
pub mod wallet;

pub use routes::create_router;

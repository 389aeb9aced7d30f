pub mod auth;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod session_store;

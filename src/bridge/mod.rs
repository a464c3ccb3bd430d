//! Local emulation bridge: serves a [`Handler`](crate::handler::Handler) over
//! plain HTTP, shaping each request like an API Gateway proxy event.

pub mod event;
pub mod response;
pub mod server;

pub use event::build_event;
pub use response::{error_response, into_http_response};
pub use server::{router, serve, serve_with_shutdown};

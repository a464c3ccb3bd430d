pub mod error;
pub mod event;
pub mod response;

pub use error::AppError;
pub use event::{GatewayEvent, RequestContext};
pub use response::{DateTimeResponse, HandlerResponse, HealthResponse};

pub mod auth;
pub mod request_id;

pub use auth::{AuthUser, BearerAuth, OptionalUser, RequiredUser};
pub use request_id::{RequestId, RequestIdMiddleware};

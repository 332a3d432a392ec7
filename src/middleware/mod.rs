/// Middleware module
///
/// Request extractors for authentication and the fileserver hit counter.

mod authentication;
mod hit_counter;

pub use authentication::{AuthenticatedUser, BearerToken};
pub use hit_counter::HitCounterMiddleware;

pub mod auth;
pub mod response;

pub use auth::{optional_auth, require_admin, require_auth, AuthUser, MaybeAuthUser};
pub use response::{message, ApiResponse, ApiResult, NoContent};

// handlers/protected/mod.rs - Handlers behind require_auth
//
// Security Level: valid `auth_token` cookie
// Route Prefix: /api/v1
// Middleware: require_auth, which places `AuthUser` in request extensions

pub mod me;
pub mod reviews;

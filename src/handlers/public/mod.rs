// handlers/public/mod.rs - Public handlers
//
// Security Level: none, or optional identity (reports and bookmarks)
// Route Prefix: /api/v1
// Middleware: optional_auth on reports and bookmarks

pub mod auth;
pub mod bookmarks;
pub mod categories;
pub mod reports;
pub mod reviews;
pub mod tools;

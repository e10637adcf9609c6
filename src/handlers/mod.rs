// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth or optional auth) → Protected (auth cookie) → Elevated (admin role)
//
// Routing lives in app.rs; each tier only exposes handler functions.
pub mod public;    // Tier 1: catalogue, sign-in, reports, bookmarks
pub mod protected; // Tier 2: the signed-in caller's own data
pub mod elevated;  // Tier 3: /admin back office

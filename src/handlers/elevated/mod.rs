// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: auth cookie whose claims carry role `admin`
// Route Prefix: /api/v1/admin/*
// Middleware: require_auth, then require_admin

pub mod admin;

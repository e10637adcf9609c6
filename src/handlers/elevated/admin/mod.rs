// handlers/elevated/admin/mod.rs - Back-office management

pub mod analytics;
pub mod badges;
pub mod categories;
pub mod moderation;
pub mod tags;
pub mod tools;

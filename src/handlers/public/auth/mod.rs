// handlers/public/auth/mod.rs - Account sign-up, sign-in and sign-out

pub mod login;
pub mod logout;
pub mod register;
mod utils;

pub use login::login;
pub use logout::logout;
pub use register::register;

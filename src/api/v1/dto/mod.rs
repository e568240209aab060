pub mod auth;
pub mod sports;

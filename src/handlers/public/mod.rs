// handlers/public/mod.rs - Handlers that accept anonymous callers
//
// Account flows, the health probe and the summary feed. Nothing here demands
// a session up front; handlers that optionally use one take an `Identity`.

pub mod auth;
pub mod catalog;
pub mod health;

pub use auth::{login, login_form, logout, register, register_form};
pub use catalog::items_feed;
pub use health::health;

// handlers/protected/mod.rs - Handlers that act for a signed-in user
//
// Page routes send anonymous browsers to the login page; the JSON API and
// script clients get 401 instead.

pub mod api;
pub mod export;
pub mod items;

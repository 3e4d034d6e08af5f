// handlers/mod.rs - Request handlers, split by who may call them
//
// public:    anonymous callers welcome (accounts, health, summary feed)
// protected: a session is required (catalog pages, item API, exports)

pub mod protected;
pub mod public;
pub mod utils;

pub mod item;
pub mod user;

pub use item::{Item, ItemDraft, ItemFilter, Owner};
pub use user::{User, UserRecord};

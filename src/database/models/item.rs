use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The user a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub username: String,
}

/// A product listing. Serializes to the full wire shape, with the owner nested
/// under `user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "user")]
    pub owner: Option<Owner>,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub is_featured: bool,
    pub brand: Option<String>,
    pub stock: i64,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn owner_id(&self) -> Option<i64> {
        self.owner.as_ref().map(|o| o.id)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id() == Some(user_id)
    }
}

/// Validated, user-editable fields of an item. Owner and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub is_featured: bool,
    pub brand: Option<String>,
    pub stock: i64,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    Owner(i64),
}

/// Row shape of `football_items LEFT JOIN users`.
#[derive(Debug, FromRow)]
pub(crate) struct ItemRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub owner_username: Option<String>,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub is_featured: bool,
    pub brand: Option<String>,
    pub stock: i64,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        let owner = match (row.user_id, row.owner_username) {
            (Some(id), Some(username)) => Some(Owner { id, username }),
            _ => None,
        };

        Self {
            id: row.id,
            owner,
            name: row.name,
            price: row.price,
            description: row.description,
            thumbnail: row.thumbnail,
            category: row.category,
            is_featured: row.is_featured,
            brand: row.brand,
            stock: row.stock,
            size: row.size,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

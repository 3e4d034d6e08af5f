//! JSON wire shapes for product records.
//!
//! Three shapes are served and each is part of a client contract:
//! - the full shape is `Item` itself (owner nested under `user`), used by the
//!   list endpoint in JSON mode and by the item API;
//! - the envelope shape (`model` / `pk` / `fields`) backs `/json/` and mirrors
//!   the markup export;
//! - the summary shape backs the public `/api/items/` feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MODEL_LABEL;
use crate::database::models::Item;

/// One record in the `model` / `pk` / `fields` envelope. `pk` is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEnvelope {
    pub model: String,
    pub pk: String,
    pub fields: EnvelopeFields,
}

/// Every attribute except the primary key; the owner is flattened to its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeFields {
    pub user: Option<i64>,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub is_featured: bool,
    pub brand: Option<String>,
    pub stock: i64,
    pub size: Option<String>,
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "millis")]
    pub updated_at: DateTime<Utc>,
}

/// Envelope timestamps carry milliseconds and a `Z` suffix, e.g.
/// `2024-09-01T10:00:00.123Z`.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

impl From<&Item> for ModelEnvelope {
    fn from(item: &Item) -> Self {
        Self {
            model: MODEL_LABEL.to_string(),
            pk: item.id.to_string(),
            fields: EnvelopeFields {
                user: item.owner_id(),
                name: item.name.clone(),
                price: item.price,
                description: item.description.clone(),
                thumbnail: item.thumbnail.clone(),
                category: item.category.clone(),
                is_featured: item.is_featured,
                brand: item.brand.clone(),
                stock: item.stock,
                size: item.size.clone(),
                created_at: item.created_at,
                updated_at: item.updated_at,
            },
        }
    }
}

/// Reduced view for callers without a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub is_featured: bool,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            description: item.description.clone(),
            thumbnail: item.thumbnail.clone(),
            category: item.category.clone(),
            is_featured: item.is_featured,
        }
    }
}

pub fn envelopes(items: &[Item]) -> Vec<ModelEnvelope> {
    items.iter().map(ModelEnvelope::from).collect()
}

pub fn summaries(items: &[Item]) -> Vec<ItemSummary> {
    items.iter().map(ItemSummary::from).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::models::Owner;
    use serde_json::json;

    pub(crate) fn sample_item() -> Item {
        let created = DateTime::parse_from_rfc3339("2024-09-01T10:00:00.123456Z").unwrap().with_timezone(&Utc);
        Item {
            id: 12,
            owner: Some(Owner {
                id: 4,
                username: "alice".to_string(),
            }),
            name: "Ball".to_string(),
            price: 1000,
            description: "x".to_string(),
            thumbnail: "http://x".to_string(),
            category: "Ball".to_string(),
            is_featured: true,
            brand: None,
            stock: 3,
            size: Some("5".to_string()),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn full_shape_nests_owner() {
        let value = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(value["id"], 12);
        assert_eq!(value["user"], json!({"id": 4, "username": "alice"}));
        assert_eq!(value["brand"], serde_json::Value::Null);
        assert!(value.get("owner").is_none());
    }

    #[test]
    fn envelope_round_trip_preserves_fields() {
        let item = sample_item();
        let text = serde_json::to_string(&envelopes(&[item.clone()])).unwrap();

        let parsed: Vec<ModelEnvelope> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        let envelope = &parsed[0];
        assert_eq!(envelope.model, "main.footballitem");
        assert_eq!(envelope.pk, "12");
        assert_eq!(envelope.pk.parse::<i64>().unwrap(), item.id);

        let fields = &envelope.fields;
        assert_eq!(fields.user, Some(4));
        assert_eq!(fields.name, item.name);
        assert_eq!(fields.price, item.price);
        assert_eq!(fields.description, item.description);
        assert_eq!(fields.thumbnail, item.thumbnail);
        assert_eq!(fields.category, item.category);
        assert_eq!(fields.is_featured, item.is_featured);
        assert_eq!(fields.brand, item.brand);
        assert_eq!(fields.stock, item.stock);
        assert_eq!(fields.size, item.size);
        assert_eq!(fields.created_at.timestamp_millis(), item.created_at.timestamp_millis());
        assert_eq!(fields.updated_at.timestamp_millis(), item.updated_at.timestamp_millis());
    }

    #[test]
    fn envelope_timestamps_have_millisecond_precision() {
        let value = serde_json::to_value(envelopes(&[sample_item()])).unwrap();
        assert_eq!(value[0]["fields"]["created_at"], "2024-09-01T10:00:00.123Z");
        assert_eq!(value[0]["fields"]["updated_at"], "2024-09-01T10:00:00.123Z");
    }

    #[test]
    fn summary_omits_private_fields() {
        let value = serde_json::to_value(summaries(&[sample_item()])).unwrap();
        let entry = value[0].as_object().unwrap();
        let mut keys: Vec<&str> = entry.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["category", "description", "id", "is_featured", "name", "price", "thumbnail"]
        );
    }
}

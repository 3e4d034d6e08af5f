use tracing::info;

use super::manager::DatabaseError;
use super::models::ItemDraft;
use super::store::ItemStore;

/// Catalog shown on a fresh install.
pub fn sample_items() -> Vec<ItemDraft> {
    vec![
        ItemDraft {
            name: "Manchester United Home Jersey".to_string(),
            price: 750_000,
            description: "Official Manchester United home jersey for the 2024/25 season. Made with high-quality \
                          materials and featuring the classic red color with white accents."
                .to_string(),
            thumbnail: "https://images.unsplash.com/photo-1551698618-1dfe5d97d256?w=400".to_string(),
            category: "Jersey".to_string(),
            is_featured: true,
            brand: Some("Adidas".to_string()),
            stock: 25,
            size: Some("L".to_string()),
        },
        ItemDraft {
            name: "Nike Premier League Football".to_string(),
            price: 450_000,
            description: "Official Nike Premier League match ball. FIFA Quality Pro certified with innovative \
                          design for superior flight and touch."
                .to_string(),
            thumbnail: "https://images.unsplash.com/photo-1486286701208-1d58e9338013?w=400".to_string(),
            category: "Ball".to_string(),
            is_featured: false,
            brand: Some("Nike".to_string()),
            stock: 15,
            size: Some("5".to_string()),
        },
        ItemDraft {
            name: "Adidas Predator Football Boots".to_string(),
            price: 1_200_000,
            description: "Professional football boots with innovative Predator technology. Designed for \
                          precision, power, and control on the pitch."
                .to_string(),
            thumbnail: "https://images.unsplash.com/photo-1544966503-7cc5ac882d5f?w=400".to_string(),
            category: "Boots".to_string(),
            is_featured: true,
            brand: Some("Adidas".to_string()),
            stock: 8,
            size: Some("42".to_string()),
        },
    ]
}

/// Inserts the sample catalog, unowned, when the store holds no items.
/// Returns how many items were inserted.
pub async fn seed_if_empty(store: &dyn ItemStore) -> Result<usize, DatabaseError> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    let samples = sample_items();
    let inserted = samples.len();
    for draft in samples {
        store.create(None, draft).await?;
    }

    info!("Seeded {} sample items", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ItemFilter;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn seeds_only_an_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 3);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);

        let items = store.list(ItemFilter::All).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.owner.is_none()));
    }

    #[test]
    fn samples_pass_validation() {
        for draft in sample_items() {
            let raw = [
                ("name", draft.name.clone()),
                ("price", draft.price.to_string()),
                ("description", draft.description.clone()),
                ("thumbnail", draft.thumbnail.clone()),
                ("category", draft.category.clone()),
                ("is_featured", draft.is_featured.to_string()),
                ("brand", draft.brand.clone().unwrap_or_default()),
                ("stock", draft.stock.to_string()),
                ("size", draft.size.clone().unwrap_or_default()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
            assert_eq!(crate::validation::validate_item(&raw).unwrap(), draft);
        }
    }
}

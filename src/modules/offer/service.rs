use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::middleware::{Document, DocumentLookup};
use crate::object_id;

use super::dto::{CreateOfferDto, UpdateOfferDto};
use super::entity::{City, Offer};

/// Storage contract for offers and per-user favorites.
///
/// Every `Option` return is `None` when no offer has the given id.
#[async_trait]
pub trait OfferService: Send + Sync {
    async fn create(&self, author_id: &str, dto: CreateOfferDto) -> anyhow::Result<Offer>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Offer>>;
    /// Newest first.
    async fn find(&self, limit: usize) -> anyhow::Result<Vec<Offer>>;
    async fn update_by_id(&self, id: &str, dto: UpdateOfferDto) -> anyhow::Result<Option<Offer>>;
    async fn delete_by_id(&self, id: &str) -> anyhow::Result<Option<Offer>>;
    /// Premium offers of `city`, newest first.
    async fn find_premium_by_city(&self, city: City, limit: usize) -> anyhow::Result<Vec<Offer>>;
    async fn find_favorites(&self, user_id: &str) -> anyhow::Result<Vec<Offer>>;
    async fn is_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<bool>;
    async fn add_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<()>;
    async fn remove_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<()>;
    /// Updates the comment count and average rating after a new comment.
    async fn register_comment(&self, offer_id: &str, rating: u8) -> anyhow::Result<Option<Offer>>;
}

#[derive(Default)]
struct Store {
    offers: HashMap<String, Offer>,
    favorites: HashMap<String, HashSet<String>>,
}

/// Process-local [`OfferService`]; contents are lost on restart.
#[derive(Default)]
pub struct MemoryOfferService {
    store: RwLock<Store>,
}

impl MemoryOfferService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut offers: Vec<Offer>, limit: usize) -> Vec<Offer> {
    offers.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then_with(|| b.id.cmp(&a.id)));
    offers.truncate(limit);
    offers
}

#[async_trait]
impl OfferService for MemoryOfferService {
    async fn create(&self, author_id: &str, dto: CreateOfferDto) -> anyhow::Result<Offer> {
        let offer = Offer {
            id: object_id::generate(),
            title: dto.title,
            description: dto.description,
            posted_at: Utc::now(),
            city: dto.city,
            preview_image: dto.preview_image,
            images: dto.images,
            is_premium: dto.is_premium,
            rating: dto.rating,
            offer_type: dto.offer_type,
            bedrooms: dto.bedrooms,
            max_adults: dto.max_adults,
            price: dto.price,
            goods: dto.goods,
            author_id: author_id.to_owned(),
            comment_count: 0,
            location: dto.location,
        };

        self.store.write().await.offers.insert(offer.id.clone(), offer.clone());
        info!(offer_id = %offer.id, title = %offer.title, "offer created");
        Ok(offer)
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Offer>> {
        Ok(self.store.read().await.offers.get(id).cloned())
    }

    async fn find(&self, limit: usize) -> anyhow::Result<Vec<Offer>> {
        let offers = self.store.read().await.offers.values().cloned().collect();
        Ok(newest_first(offers, limit))
    }

    async fn update_by_id(&self, id: &str, dto: UpdateOfferDto) -> anyhow::Result<Option<Offer>> {
        let mut store = self.store.write().await;
        Ok(store.offers.get_mut(id).map(|offer| {
            dto.apply(offer);
            offer.clone()
        }))
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<Option<Offer>> {
        let mut store = self.store.write().await;
        let removed = store.offers.remove(id);
        if removed.is_some() {
            for favorites in store.favorites.values_mut() {
                favorites.remove(id);
            }
        }
        Ok(removed)
    }

    async fn find_premium_by_city(&self, city: City, limit: usize) -> anyhow::Result<Vec<Offer>> {
        let offers = self.store.read().await.offers.values()
            .filter(|o| o.is_premium && o.city == city)
            .cloned()
            .collect();
        Ok(newest_first(offers, limit))
    }

    async fn find_favorites(&self, user_id: &str) -> anyhow::Result<Vec<Offer>> {
        let store = self.store.read().await;
        let offers = store.favorites.get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| store.offers.get(id).cloned())
            .collect();
        Ok(newest_first(offers, usize::MAX))
    }

    async fn is_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<bool> {
        let store = self.store.read().await;
        Ok(store.favorites.get(user_id).is_some_and(|ids| ids.contains(offer_id)))
    }

    async fn add_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<()> {
        let mut store = self.store.write().await;
        if store.offers.contains_key(offer_id) {
            store.favorites.entry(user_id.to_owned()).or_default().insert(offer_id.to_owned());
        }
        Ok(())
    }

    async fn remove_favorite(&self, offer_id: &str, user_id: &str) -> anyhow::Result<()> {
        if let Some(ids) = self.store.write().await.favorites.get_mut(user_id) {
            ids.remove(offer_id);
        }
        Ok(())
    }

    async fn register_comment(&self, offer_id: &str, rating: u8) -> anyhow::Result<Option<Offer>> {
        let mut store = self.store.write().await;
        Ok(store.offers.get_mut(offer_id).map(|offer| {
            offer.add_rating(rating);
            offer.clone()
        }))
    }
}

/// Lets `ResourceExists` resolve offers; the document is an [`Offer`].
pub struct OfferLookup(pub Arc<dyn OfferService>);

#[async_trait]
impl DocumentLookup for OfferLookup {
    async fn find_document(&self, id: &str) -> anyhow::Result<Option<Document>> {
        Ok(self.0.find_by_id(id).await?.map(Document::new))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::modules::offer::entity::{Good, Location, OfferType};

    pub(crate) fn create_dto(city: City, is_premium: bool) -> CreateOfferDto {
        CreateOfferDto {
            title: "Quiet room near the park".into(),
            description: "Clean, quiet and close to public transport.".into(),
            city,
            preview_image: "preview.jpg".into(),
            images: (1..=6).map(|i| format!("{i}.jpg")).collect(),
            is_premium,
            rating: 4.0,
            offer_type: OfferType::Room,
            bedrooms: 1,
            max_adults: 2,
            price: 100,
            goods: vec![Good::Washer],
            location: Location { latitude: 48.85, longitude: 2.35 },
        }
    }

    #[tokio::test]
    async fn find_is_newest_first_and_limited() {
        let service = MemoryOfferService::new();
        let first = service.create("u1", create_dto(City::Paris, false)).await.unwrap();
        let second = service.create("u1", create_dto(City::Paris, false)).await.unwrap();

        let all = service.find(60).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].posted_at >= all[1].posted_at);

        let one = service.find(1).await.unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].id == first.id || one[0].id == second.id);
    }

    #[tokio::test]
    async fn premium_filters_by_city_and_flag() {
        let service = MemoryOfferService::new();
        service.create("u1", create_dto(City::Paris, true)).await.unwrap();
        service.create("u1", create_dto(City::Paris, false)).await.unwrap();
        service.create("u1", create_dto(City::Hamburg, true)).await.unwrap();

        let premium = service.find_premium_by_city(City::Paris, 3).await.unwrap();
        assert_eq!(premium.len(), 1);
        assert!(premium[0].is_premium && premium[0].city == City::Paris);
    }

    #[tokio::test]
    async fn favorites_are_per_user_and_cleared_on_delete() {
        let service = MemoryOfferService::new();
        let offer = service.create("u1", create_dto(City::Brussels, false)).await.unwrap();

        service.add_favorite(&offer.id, "u2").await.unwrap();
        assert!(service.is_favorite(&offer.id, "u2").await.unwrap());
        assert!(!service.is_favorite(&offer.id, "u3").await.unwrap());

        service.delete_by_id(&offer.id).await.unwrap();
        assert!(service.find_favorites("u2").await.unwrap().is_empty());
        assert!(!service.is_favorite(&offer.id, "u2").await.unwrap());
    }

    #[tokio::test]
    async fn comments_update_count_and_average() {
        let service = MemoryOfferService::new();
        let offer = service.create("u1", create_dto(City::Cologne, false)).await.unwrap();

        service.register_comment(&offer.id, 5).await.unwrap();
        let updated = service.register_comment(&offer.id, 2).await.unwrap().unwrap();
        assert_eq!(updated.comment_count, 2);
        assert_eq!(updated.rating, 3.5);

        assert!(service.register_comment("000000000000000000000000", 5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_wraps_offer_as_document() {
        let service: Arc<dyn OfferService> = Arc::new(MemoryOfferService::new());
        let offer = service.create("u1", create_dto(City::Paris, false)).await.unwrap();
        let lookup = OfferLookup(Arc::clone(&service));

        let doc = lookup.find_document(&offer.id).await.unwrap().unwrap();
        assert_eq!(doc.downcast::<Offer>().unwrap().id, offer.id);
        assert!(lookup.find_document("ffffffffffffffffffffffff").await.unwrap().is_none());
    }
}

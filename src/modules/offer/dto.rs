//! Offer request shapes, typed request bodies and response records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shape::{BodyShape, FieldKind, FieldRule};

use super::entity::{CITY_NAMES, City, GOODS, Good, Location, OFFER_TYPES, Offer, OfferType};

pub const IMAGE_COUNT: usize = 6;

fn location_kind() -> FieldKind {
    FieldKind::Object(vec![
        FieldRule::required("latitude", FieldKind::number(-90.0, 90.0)),
        FieldRule::required("longitude", FieldKind::number(-180.0, 180.0)),
    ])
}

pub fn create_offer_shape() -> BodyShape {
    BodyShape::new("CreateOfferDto")
        .required("title", FieldKind::text(10, 100))
        .required("description", FieldKind::text(20, 1024))
        .required("city", FieldKind::OneOf(CITY_NAMES))
        .required("previewImage", FieldKind::text(1, 256))
        .required("images", FieldKind::list(FieldKind::text(1, 256), IMAGE_COUNT, IMAGE_COUNT))
        .required("isPremium", FieldKind::Boolean)
        .required("rating", FieldKind::number(1.0, 5.0))
        .required("type", FieldKind::OneOf(OFFER_TYPES))
        .required("bedrooms", FieldKind::integer(1, 8))
        .required("maxAdults", FieldKind::integer(1, 10))
        .required("price", FieldKind::integer(100, 100_000))
        .required("goods", FieldKind::list(FieldKind::OneOf(GOODS), 1, GOODS.len()))
        .required("location", location_kind())
}

/// Same fields as [`create_offer_shape`], all optional.
pub fn update_offer_shape() -> BodyShape {
    BodyShape::new("UpdateOfferDto")
        .optional("title", FieldKind::text(10, 100))
        .optional("description", FieldKind::text(20, 1024))
        .optional("city", FieldKind::OneOf(CITY_NAMES))
        .optional("previewImage", FieldKind::text(1, 256))
        .optional("images", FieldKind::list(FieldKind::text(1, 256), IMAGE_COUNT, IMAGE_COUNT))
        .optional("isPremium", FieldKind::Boolean)
        .optional("rating", FieldKind::number(1.0, 5.0))
        .optional("type", FieldKind::OneOf(OFFER_TYPES))
        .optional("bedrooms", FieldKind::integer(1, 8))
        .optional("maxAdults", FieldKind::integer(1, 10))
        .optional("price", FieldKind::integer(100, 100_000))
        .optional("goods", FieldKind::list(FieldKind::OneOf(GOODS), 1, GOODS.len()))
        .optional("location", location_kind())
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferDto {
    pub title: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub rating: f64,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub bedrooms: u8,
    pub max_adults: u8,
    pub price: u32,
    pub goods: Vec<Good>,
    pub location: Location,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<City>,
    pub preview_image: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub offer_type: Option<OfferType>,
    pub bedrooms: Option<u8>,
    pub max_adults: Option<u8>,
    pub price: Option<u32>,
    pub goods: Option<Vec<Good>>,
    pub location: Option<Location>,
}

impl UpdateOfferDto {
    pub fn apply(self, offer: &mut Offer) {
        let Self {
            title, description, city, preview_image, images, is_premium, rating,
            offer_type, bedrooms, max_adults, price, goods, location,
        } = self;

        if let Some(v) = title { offer.title = v; }
        if let Some(v) = description { offer.description = v; }
        if let Some(v) = city { offer.city = v; }
        if let Some(v) = preview_image { offer.preview_image = v; }
        if let Some(v) = images { offer.images = v; }
        if let Some(v) = is_premium { offer.is_premium = v; }
        if let Some(v) = rating { offer.rating = v; }
        if let Some(v) = offer_type { offer.offer_type = v; }
        if let Some(v) = bedrooms { offer.bedrooms = v; }
        if let Some(v) = max_adults { offer.max_adults = v; }
        if let Some(v) = price { offer.price = v; }
        if let Some(v) = goods { offer.goods = v; }
        if let Some(v) = location { offer.location = v; }
    }
}

/// Offer as returned to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRdo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub city: City,
    pub preview_image: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub is_favorite: bool,
    pub rating: f64,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub bedrooms: u8,
    pub max_adults: u8,
    pub price: u32,
    pub goods: Vec<Good>,
    pub author_id: String,
    pub comment_count: u32,
    pub location: Location,
}

impl OfferRdo {
    pub fn new(offer: Offer, is_favorite: bool) -> Self {
        Self {
            id: offer.id,
            title: offer.title,
            description: offer.description,
            posted_at: offer.posted_at,
            city: offer.city,
            preview_image: offer.preview_image,
            images: offer.images,
            is_premium: offer.is_premium,
            is_favorite,
            rating: offer.rating,
            offer_type: offer.offer_type,
            bedrooms: offer.bedrooms,
            max_adults: offer.max_adults,
            price: offer.price,
            goods: offer.goods,
            author_id: offer.author_id,
            comment_count: offer.comment_count,
            location: offer.location,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRdo {
    pub preview_image: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Canal view studio",
            "description": "A bright studio a few steps from the canals.",
            "city": "Amsterdam",
            "previewImage": "preview.jpg",
            "images": ["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg", "6.jpg"],
            "isPremium": false,
            "rating": 4.2,
            "type": "room",
            "bedrooms": 1,
            "maxAdults": 2,
            "price": 120,
            "goods": ["Breakfast", "Air conditioning"],
            "location": { "latitude": 52.37, "longitude": 4.89 }
        })
    }

    #[test]
    fn valid_create_body_deserializes() {
        let normalized = create_offer_shape().validate(&valid_body()).unwrap();
        let dto: CreateOfferDto = serde_json::from_value(normalized).unwrap();
        assert_eq!(dto.city, City::Amsterdam);
        assert_eq!(dto.offer_type, OfferType::Room);
        assert_eq!(dto.goods, [Good::Breakfast, Good::AirConditioning]);
    }

    #[test]
    fn create_requires_exactly_six_images() {
        let mut body = valid_body();
        body["images"] = json!(["1.jpg"]);
        let err = create_offer_shape().validate(&body).unwrap_err();
        assert_eq!(err[0].field, "images");
    }

    #[test]
    fn update_accepts_partial_body() {
        let normalized = update_offer_shape().validate(&json!({ "price": 250 })).unwrap();
        let dto: UpdateOfferDto = serde_json::from_value(normalized).unwrap();
        assert_eq!(dto.price, Some(250));
        assert!(dto.title.is_none());
    }
}

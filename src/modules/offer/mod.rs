//! Rental offers and per-user favorites.

mod controller;
mod dto;
mod entity;
mod service;

pub use controller::{DEFAULT_OFFER_COUNT, OFFER, PREMIUM_OFFER_COUNT, controller};
pub(crate) use controller::resolved as resolved_offer;
pub use dto::{CreateOfferDto, OfferRdo, UpdateOfferDto, UploadImageRdo, create_offer_shape, update_offer_shape};
pub use entity::{City, Good, Location, Offer, OfferType};
pub use service::{MemoryOfferService, OfferLookup, OfferService};

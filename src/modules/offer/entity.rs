use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CITY_NAMES: &[&str] = &["Paris", "Cologne", "Brussels", "Amsterdam", "Hamburg", "Dusseldorf"];
pub const OFFER_TYPES: &[&str] = &["apartment", "house", "room", "hotel"];
pub const GOODS: &[&str] = &[
    "Breakfast",
    "Air conditioning",
    "Laptop friendly workspace",
    "Baby seat",
    "Washer",
    "Towels",
    "Fridge",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Paris,
    Cologne,
    Brussels,
    Amsterdam,
    Hamburg,
    Dusseldorf,
}

impl City {
    pub fn as_str(self) -> &'static str {
        match self {
            City::Paris => "Paris",
            City::Cologne => "Cologne",
            City::Brussels => "Brussels",
            City::Amsterdam => "Amsterdam",
            City::Hamburg => "Hamburg",
            City::Dusseldorf => "Dusseldorf",
        }
    }
}

impl FromStr for City {
    type Err = ();

    /// Case-insensitive, so `/offers/premium/paris` works as well as `Paris`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [City::Paris, City::Cologne, City::Brussels, City::Amsterdam, City::Hamburg, City::Dusseldorf]
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Apartment,
    House,
    Room,
    Hotel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Good {
    Breakfast,
    #[serde(rename = "Air conditioning")]
    AirConditioning,
    #[serde(rename = "Laptop friendly workspace")]
    LaptopFriendlyWorkspace,
    #[serde(rename = "Baby seat")]
    BabySeat,
    Washer,
    Towels,
    Fridge,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A rental listing as stored by the offer service.
///
/// Favorites are per user and live beside the offers, so the stored record
/// has no favorite flag; see [`OfferRdo`](super::OfferRdo).
#[derive(Clone, Debug, PartialEq)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub city: City,
    pub preview_image: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub rating: f64,
    pub offer_type: OfferType,
    pub bedrooms: u8,
    pub max_adults: u8,
    pub price: u32,
    pub goods: Vec<Good>,
    pub author_id: String,
    pub comment_count: u32,
    pub location: Location,
}

impl Offer {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    /// Folds one more comment rating into the running average, rounded to
    /// one decimal.
    pub(crate) fn add_rating(&mut self, rating: u8) {
        let count = f64::from(self.comment_count);
        let average = if self.comment_count == 0 {
            f64::from(rating)
        } else {
            (self.rating * count + f64::from(rating)) / (count + 1.0)
        };
        self.rating = (average * 10.0).round() / 10.0;
        self.comment_count += 1;
    }
}

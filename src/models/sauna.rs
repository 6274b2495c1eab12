//! Sauna venue records and their facilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::{FacilityId, SaunaId};

/// A sauna venue in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sauna {
    pub id: SaunaId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    /// Free-form bucket such as "~1000yen"; never parsed, only displayed.
    pub price_range: String,
    /// Mean rating over public reviews; 0.0 when there are none.
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Facility category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityCategory {
    Sauna,
    Bath,
    Amenity,
    Other,
}

impl FacilityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityCategory::Sauna => "SAUNA",
            FacilityCategory::Bath => "BATH",
            FacilityCategory::Amenity => "AMENITY",
            FacilityCategory::Other => "OTHER",
        }
    }
}

impl FromStr for FacilityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SAUNA" => Ok(FacilityCategory::Sauna),
            "BATH" => Ok(FacilityCategory::Bath),
            "AMENITY" => Ok(FacilityCategory::Amenity),
            "OTHER" => Ok(FacilityCategory::Other),
            other => Err(format!("Unknown facility category: {}", other)),
        }
    }
}

/// A single amenity inside a sauna (steam room, cold bath, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub sauna_id: SaunaId,
    pub name: String,
    pub category: FacilityCategory,
    /// Celsius, where it makes sense for the facility.
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

/// Insert payload for a new sauna, including nested facilities.
#[derive(Debug, Clone)]
pub struct NewSauna {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub price_range: String,
    pub facilities: Vec<NewFacility>,
}

/// Insert payload for a facility created together with its sauna.
#[derive(Debug, Clone)]
pub struct NewFacility {
    pub name: String,
    pub category: FacilityCategory,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_category_parse() {
        assert_eq!(
            "bath".parse::<FacilityCategory>().unwrap(),
            FacilityCategory::Bath
        );
        assert_eq!(FacilityCategory::Amenity.as_str(), "AMENITY");
        assert!("onsen".parse::<FacilityCategory>().is_err());
    }
}

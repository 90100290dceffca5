use serde::{Deserialize, Serialize};

use models::errors::ModelError;
use models::restaurant::{GeoPoint, MenuItem, NewRestaurant, RestaurantPatch};

use crate::pagination::QueryOptions;

/// Validated create request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantInput {
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub rating: f64,
    pub review_count: i32,
    /// `[longitude, latitude]`
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub menu: Option<Vec<MenuItem>>,
}

impl CreateRestaurantInput {
    /// Build the insert payload, wrapping `location` into a GeoJSON point.
    pub fn into_new_restaurant(self) -> Result<NewRestaurant, ModelError> {
        let location = self.location.map(|[lng, lat]| GeoPoint::new(lng, lat)).transpose()?;
        Ok(NewRestaurant {
            name: self.name,
            description: self.description,
            address: self.address,
            city: self.city,
            state: self.state,
            rating: Some(self.rating),
            review_count: Some(self.review_count),
            location,
            menu: self.menu.unwrap_or_default(),
        })
    }
}

/// Validated update request body; absent fields stay as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i32>,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub menu: Option<Vec<MenuItem>>,
}

impl UpdateRestaurantInput {
    pub fn into_patch(self) -> Result<RestaurantPatch, ModelError> {
        let location = self.location.map(|[lng, lat]| GeoPoint::new(lng, lat)).transpose()?;
        Ok(RestaurantPatch {
            name: self.name,
            description: self.description,
            address: self.address,
            city: self.city,
            state: self.state,
            rating: self.rating,
            review_count: self.review_count,
            location,
            menu: self.menu,
        })
    }
}

/// Store filter for list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantFilter {
    /// Exact name match
    pub name: Option<String>,
}

/// Validated list query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: RestaurantFilter,
    pub options: QueryOptions,
}

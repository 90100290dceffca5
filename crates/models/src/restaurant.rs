use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, FromJsonQueryResult, IntoActiveModel, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

/// GeoJSON geometry tag. Only points are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    #[default]
    Point,
}

/// Restaurant position as a GeoJSON point, `coordinates` is `[longitude, latitude]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoKind,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, errors::ModelError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(errors::ModelError::Validation("longitude must be within [-180, 180]".into()));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(errors::ModelError::Validation("latitude must be within [-90, 90]".into()));
        }
        Ok(Self { kind: GeoKind::Point, coordinates: [longitude, latitude] })
    }

    pub fn longitude(&self) -> f64 { self.coordinates[0] }

    pub fn latitude(&self) -> f64 { self.coordinates[1] }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_category: Option<String>,
}

impl MenuItem {
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            item_name: trim(self.item_name),
            item_value: trim(self.item_value),
            item_category: trim(self.item_category),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Menu(pub Vec<MenuItem>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurant")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub review_count: i32,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub location: Option<GeoPoint>,
    #[sea_orm(column_type = "JsonBinary")]
    pub menu: Menu,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

pub type Restaurant = Model;

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.stamp(insert);
        Ok(self)
    }
}

impl ActiveModel {
    /// Refresh `updated_at`, and `created_at` as well on insert.
    pub fn stamp(&mut self, insert: bool) {
        let now: DateTimeWithTimeZone = Utc::now().into();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
    }
}

pub fn validate_text(field: &str, value: &str) -> Result<(), errors::ModelError> {
    if value.trim().is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} required")));
    }
    Ok(())
}

pub fn validate_rating(rating: f64) -> Result<(), errors::ModelError> {
    if !rating.is_finite() || rating < 0.0 {
        return Err(errors::ModelError::Validation("rating must be a non-negative number".into()));
    }
    Ok(())
}

pub fn validate_review_count(count: i32) -> Result<(), errors::ModelError> {
    if count < 0 {
        return Err(errors::ModelError::Validation("reviewCount must be >= 0".into()));
    }
    Ok(())
}

/// Insert payload. `rating` and `review_count` fall back to 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub location: Option<GeoPoint>,
    pub menu: Vec<MenuItem>,
}

impl NewRestaurant {
    /// Trim every text field, menu items included.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            menu: self.menu.into_iter().map(MenuItem::trimmed).collect(),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate_text("name", &self.name)?;
        validate_text("description", &self.description)?;
        validate_text("address", &self.address)?;
        validate_text("city", &self.city)?;
        validate_text("state", &self.state)?;
        if let Some(r) = self.rating { validate_rating(r)?; }
        if let Some(c) = self.review_count { validate_review_count(c)?; }
        Ok(())
    }
}

impl IntoActiveModel<ActiveModel> for NewRestaurant {
    fn into_active_model(self) -> ActiveModel {
        let now: DateTimeWithTimeZone = Utc::now().into();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(self.name),
            description: Set(self.description),
            address: Set(self.address),
            city: Set(self.city),
            state: Set(self.state),
            rating: Set(self.rating.unwrap_or(0.0)),
            review_count: Set(self.review_count.unwrap_or(0)),
            location: Set(self.location),
            menu: Set(Menu(self.menu)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub location: Option<GeoPoint>,
    pub menu: Option<Vec<MenuItem>>,
}

impl RestaurantPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            name: trim(self.name),
            description: trim(self.description),
            address: trim(self.address),
            city: trim(self.city),
            state: trim(self.state),
            menu: self.menu.map(|m| m.into_iter().map(MenuItem::trimmed).collect()),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), errors::ModelError> {
        if let Some(v) = &self.name { validate_text("name", v)?; }
        if let Some(v) = &self.description { validate_text("description", v)?; }
        if let Some(v) = &self.address { validate_text("address", v)?; }
        if let Some(v) = &self.city { validate_text("city", v)?; }
        if let Some(v) = &self.state { validate_text("state", v)?; }
        if let Some(r) = self.rating { validate_rating(r)?; }
        if let Some(c) = self.review_count { validate_review_count(c)?; }
        Ok(())
    }

    /// Set the provided fields on `am`; the rest keep their current state.
    pub fn apply(self, am: &mut ActiveModel) {
        if let Some(v) = self.name { am.name = Set(v); }
        if let Some(v) = self.description { am.description = Set(v); }
        if let Some(v) = self.address { am.address = Set(v); }
        if let Some(v) = self.city { am.city = Set(v); }
        if let Some(v) = self.state { am.state = Set(v); }
        if let Some(v) = self.rating { am.rating = Set(v); }
        if let Some(v) = self.review_count { am.review_count = Set(v); }
        if let Some(v) = self.location { am.location = Set(Some(v)); }
        if let Some(v) = self.menu { am.menu = Set(Menu(v)); }
    }
}

/// Whether another record already uses `name` (exact match after trimming).
/// `exclude_id` lets a record keep its own name on update.
pub async fn is_name_taken(db: &DatabaseConnection, name: &str, exclude_id: Option<Uuid>) -> Result<bool, errors::ModelError> {
    let mut finder = Entity::find().filter(Column::Name.eq(name.trim()));
    if let Some(id) = exclude_id { finder = finder.filter(Column::Id.ne(id)); }
    let found = finder.one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, new: NewRestaurant) -> Result<Model, errors::ModelError> {
    let new = new.normalized();
    new.validate()?;
    new.into_active_model().insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Merge `patch` into the stored record `current` and persist it.
pub async fn update(db: &DatabaseConnection, current: Model, patch: RestaurantPatch) -> Result<Model, errors::ModelError> {
    let patch = patch.normalized();
    patch.validate()?;
    let mut am: ActiveModel = current.into();
    patch.apply(&mut am);
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::TryIntoModel;

    fn sample() -> NewRestaurant {
        NewRestaurant {
            name: "  Golden Wok ".into(),
            description: " Cantonese kitchen".into(),
            address: "12 Harbour St ".into(),
            city: "Springfield".into(),
            state: " IL".into(),
            rating: Some(4.5),
            review_count: None,
            location: Some(GeoPoint::new(-89.65, 39.78).unwrap()),
            menu: vec![MenuItem { item_name: Some(" Dumplings ".into()), item_value: Some("6.50".into()), item_category: None }],
        }
    }

    #[test]
    fn normalized_trims_text_and_menu() {
        let n = sample().normalized();
        assert_eq!(n.name, "Golden Wok");
        assert_eq!(n.description, "Cantonese kitchen");
        assert_eq!(n.address, "12 Harbour St");
        assert_eq!(n.state, "IL");
        assert_eq!(n.menu[0].item_name.as_deref(), Some("Dumplings"));
    }

    #[test]
    fn validate_rejects_blank_and_negative_values() {
        let mut n = sample().normalized();
        n.city = "   ".into();
        assert!(n.validate().is_err());

        let mut n = sample();
        n.rating = Some(-1.0);
        assert!(n.validate().is_err());
    }

    #[test]
    fn into_active_model_applies_defaults() {
        let m = sample().normalized().into_active_model().try_into_model().unwrap();
        assert_eq!(m.review_count, 0);
        assert_eq!(m.rating, 4.5);
        assert_eq!(m.created_at, m.updated_at);
        assert_eq!(m.menu.0.len(), 1);
    }

    #[test]
    fn patch_sets_only_provided_fields() {
        let current = sample().normalized().into_active_model().try_into_model().unwrap();
        let mut am: ActiveModel = current.clone().into();
        RestaurantPatch { city: Some("Chicago".into()), ..Default::default() }.apply(&mut am);

        assert!(am.city.is_set());
        assert!(am.name.is_unchanged());
        assert!(am.rating.is_unchanged());

        let merged = am.try_into_model().unwrap();
        assert_eq!(merged.city, "Chicago");
        assert_eq!(merged.name, current.name);
        assert_eq!(merged.location, current.location);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(RestaurantPatch::default().is_empty());
        assert!(!RestaurantPatch { rating: Some(0.0), ..Default::default() }.is_empty());
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn geo_point_serializes_as_geojson() {
        let p = GeoPoint::new(103.85, 1.29).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, serde_json::json!({ "type": "Point", "coordinates": [103.85, 1.29] }));
        assert_eq!(p.longitude(), 103.85);
        assert_eq!(p.latitude(), 1.29);
    }

    #[test]
    fn json_projection_uses_camel_case() {
        let m = sample().normalized().into_active_model().try_into_model().unwrap();
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("reviewCount").is_some());
        assert!(v.get("createdAt").is_some());
        assert!(v.get("updatedAt").is_some());
        assert!(v.get("review_count").is_none());
        assert_eq!(v["menu"][0]["itemName"], "Dumplings");
        assert!(v["menu"][0].get("itemCategory").is_none());
    }
}

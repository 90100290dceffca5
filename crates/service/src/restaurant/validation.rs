//! Request rule sets for the five restaurant operations.
//!
//! Each `validate_*` runs before the matching service call and turns untyped
//! request parts into typed inputs. None of them touch the store.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::pagination::{parse_sort_by, QueryOptions};
use crate::validation::{FieldRule, Rule, RuleSet, Segment, ValidationErrors};

use super::domain::{CreateRestaurantInput, ListQuery, RestaurantFilter, UpdateRestaurantInput};

const TEXT: Rule = Rule::Text { min_len: 1 };
const RATING: Rule = Rule::Number { min: Some(0.0) };
const REVIEW_COUNT: Rule = Rule::Integer { min: Some(0), max: Some(i32::MAX as i64) };
const PAGE_NUMBER: Rule = Rule::Integer { min: Some(1), max: None };

pub const CREATE_BODY: RuleSet = RuleSet {
    segment: Segment::Body,
    fields: &[
        FieldRule::required("name", TEXT),
        FieldRule::required("description", TEXT),
        FieldRule::required("address", TEXT),
        FieldRule::required("city", TEXT),
        FieldRule::required("state", TEXT),
        FieldRule::required("rating", RATING),
        FieldRule::required("reviewCount", REVIEW_COUNT),
        FieldRule::optional("location", Rule::Coordinates),
        FieldRule::optional("menu", Rule::MenuItems),
    ],
    min_keys: 0,
};

pub const LIST_QUERY: RuleSet = RuleSet {
    segment: Segment::Query,
    fields: &[
        FieldRule::optional("name", Rule::Text { min_len: 3 }),
        FieldRule::optional("sortBy", Rule::SortBy),
        FieldRule::optional("limit", PAGE_NUMBER),
        FieldRule::optional("page", PAGE_NUMBER),
    ],
    min_keys: 0,
};

/// Path parameters of get, update and delete.
pub const RESTAURANT_PARAMS: RuleSet = RuleSet {
    segment: Segment::Params,
    fields: &[FieldRule::required("restaurantId", Rule::ObjectId)],
    min_keys: 0,
};

pub const UPDATE_BODY: RuleSet = RuleSet {
    segment: Segment::Body,
    fields: &[
        FieldRule::optional("name", TEXT),
        FieldRule::optional("description", TEXT),
        FieldRule::optional("address", TEXT),
        FieldRule::optional("city", TEXT),
        FieldRule::optional("state", TEXT),
        FieldRule::optional("rating", RATING),
        FieldRule::optional("reviewCount", REVIEW_COUNT),
        FieldRule::optional("location", Rule::Coordinates),
        FieldRule::optional("menu", Rule::MenuItems),
    ],
    min_keys: 1,
};

fn typed<T: DeserializeOwned>(segment: Segment, map: Map<String, Value>) -> Result<T, ValidationErrors> {
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        let mut errs = ValidationErrors::default();
        errs.push(segment, segment.as_str(), e.to_string());
        errs
    })
}

fn restaurant_id(params: &Value) -> Result<Uuid, ValidationErrors> {
    let map = RESTAURANT_PARAMS.check(params)?;
    let raw = map.get("restaurantId").and_then(Value::as_str).unwrap_or_default();
    Uuid::parse_str(raw).map_err(|_| {
        let mut errs = ValidationErrors::default();
        errs.push(Segment::Params, "restaurantId", "\"restaurantId\" must be a valid id");
        errs
    })
}

pub fn validate_create(body: &Value) -> Result<CreateRestaurantInput, ValidationErrors> {
    let map = CREATE_BODY.check(body)?;
    typed(Segment::Body, map)
}

pub fn validate_list(query: &Value) -> Result<ListQuery, ValidationErrors> {
    let map = LIST_QUERY.check(query)?;
    let name = map.get("name").and_then(Value::as_str).map(str::to_string);
    let sort_by = match map.get("sortBy").and_then(Value::as_str) {
        Some(expr) => parse_sort_by(expr).map_err(|e| {
            let mut errs = ValidationErrors::default();
            errs.push(Segment::Query, "sortBy", format!("\"sortBy\" is invalid: {e}"));
            errs
        })?,
        None => Vec::new(),
    };
    let number = |key: &str| map.get(key).and_then(Value::as_u64);
    Ok(ListQuery {
        filter: RestaurantFilter { name },
        options: QueryOptions { sort_by, limit: number("limit"), page: number("page") },
    })
}

pub fn validate_get(params: &Value) -> Result<Uuid, ValidationErrors> {
    restaurant_id(params)
}

pub fn validate_delete(params: &Value) -> Result<Uuid, ValidationErrors> {
    restaurant_id(params)
}

/// Checks both segments and reports their errors together.
pub fn validate_update(params: &Value, body: &Value) -> Result<(Uuid, UpdateRestaurantInput), ValidationErrors> {
    let id = restaurant_id(params);
    let body = UPDATE_BODY.check(body);
    match (id, body) {
        (Ok(id), Ok(map)) => Ok((id, typed(Segment::Body, map)?)),
        (Err(mut errs), Err(body_errs)) => {
            errs.extend(body_errs);
            Err(errs)
        }
        (Err(errs), _) | (_, Err(errs)) => Err(errs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{SortField, SortKey, SortOrder};
    use serde_json::json;

    fn create_body() -> Value {
        json!({
            "name": "Casa Verde",
            "description": "Oaxacan small plates",
            "address": "88 Elm Ave",
            "city": "Austin",
            "state": "TX",
            "rating": 4.6,
            "reviewCount": 120,
            "location": [-97.74, 30.27],
            "menu": [{ "itemName": "Mole", "itemValue": "18", "itemCategory": "mains" }]
        })
    }

    #[test]
    fn create_accepts_full_body() {
        let input = validate_create(&create_body()).unwrap();
        assert_eq!(input.name, "Casa Verde");
        assert_eq!(input.review_count, 120);
        assert_eq!(input.location, Some([-97.74, 30.27]));
        assert_eq!(input.menu.unwrap()[0].item_name.as_deref(), Some("Mole"));
    }

    #[test]
    fn create_reports_each_missing_required_field() {
        for field in ["name", "description", "address", "city", "state", "rating", "reviewCount"] {
            let mut body = create_body();
            body.as_object_mut().unwrap().remove(field);
            let errs = validate_create(&body).unwrap_err();
            assert!(errs.has_field(field), "missing {field} not reported: {errs}");
            assert_eq!(errs.errors[0].message, format!("\"{field}\" is required"));
            assert_eq!(errs.errors[0].segment, Segment::Body);
        }
    }

    #[test]
    fn create_coerces_numeric_strings() {
        let mut body = create_body();
        body["rating"] = json!("3.5");
        body["reviewCount"] = json!("42");
        let input = validate_create(&body).unwrap();
        assert_eq!(input.rating, 3.5);
        assert_eq!(input.review_count, 42);
    }

    #[test]
    fn create_rejects_bad_menu_and_location() {
        let mut body = create_body();
        body["menu"] = json!([{ "itemName": 5, "price": "1" }]);
        body["location"] = json!([10.0, 95.0]);
        let errs = validate_create(&body).unwrap_err();
        assert!(errs.has_field("menu[0].itemName"));
        assert!(errs.has_field("menu[0].price"));
        assert!(errs.has_field("location[1]"));
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let mut body = create_body();
        body["owner"] = json!("someone");
        assert!(validate_create(&body).unwrap_err().has_field("owner"));
    }

    #[test]
    fn list_parses_query_string_values() {
        let q = validate_list(&json!({ "name": "Casa", "sortBy": "rating:desc", "limit": "5", "page": "2" })).unwrap();
        assert_eq!(q.filter.name.as_deref(), Some("Casa"));
        assert_eq!(q.options.sort_by, vec![SortKey { field: SortField::Rating, order: SortOrder::Desc }]);
        assert_eq!(q.options.limit, Some(5));
        assert_eq!(q.options.page, Some(2));
    }

    #[test]
    fn list_rejects_short_name_and_bad_sort() {
        let errs = validate_list(&json!({ "name": "ab", "sortBy": "secret:asc", "page": 0 })).unwrap_err();
        assert!(errs.has_field("name"));
        assert!(errs.has_field("sortBy"));
        assert!(errs.has_field("page"));
        assert!(errs.errors.iter().all(|e| e.segment == Segment::Query));
    }

    #[test]
    fn list_accepts_empty_query() {
        let q = validate_list(&Value::Null).unwrap();
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn get_and_delete_require_valid_id() {
        let id = Uuid::new_v4();
        assert_eq!(validate_get(&json!({ "restaurantId": id.to_string() })).unwrap(), id);
        assert_eq!(validate_delete(&json!({ "restaurantId": id.to_string() })).unwrap(), id);

        let errs = validate_get(&json!({ "restaurantId": "5f8d0d55b54764421b7156c3" })).unwrap_err();
        assert_eq!(errs.errors[0].field, "restaurantId");
        assert_eq!(errs.errors[0].segment, Segment::Params);
        assert!(validate_delete(&json!({ "restaurantId": "not-an-id" })).is_err());
        assert!(validate_delete(&json!({})).unwrap_err().has_field("restaurantId"));
    }

    #[test]
    fn update_accepts_single_field() {
        let id = Uuid::new_v4();
        let (got, input) = validate_update(&json!({ "restaurantId": id.to_string() }), &json!({ "city": "Dallas" })).unwrap();
        assert_eq!(got, id);
        assert_eq!(input, UpdateRestaurantInput { city: Some("Dallas".into()), ..Default::default() });
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let errs = validate_update(&json!({ "restaurantId": Uuid::new_v4().to_string() }), &json!({})).unwrap_err();
        assert!(errs.has_field("body"));
    }

    #[test]
    fn update_reports_params_and_body_together() {
        let errs = validate_update(&json!({ "restaurantId": "nope" }), &json!({ "rating": "high" })).unwrap_err();
        assert!(errs.has_field("restaurantId"));
        assert!(errs.has_field("rating"));
    }

    #[test]
    fn update_location_uses_coordinate_pair() {
        let params = json!({ "restaurantId": Uuid::new_v4().to_string() });
        let (_, input) = validate_update(&params, &json!({ "location": [2.35, 48.85] })).unwrap();
        assert_eq!(input.location, Some([2.35, 48.85]));
        assert!(validate_update(&params, &json!({ "location": [{ "lat": "1", "long": "2" }] })).is_err());
    }
}

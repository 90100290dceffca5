//! Request validation engine.
//!
//! A [`RuleSet`] is a static list of [`FieldRule`]s for one request segment.
//! [`RuleSet::check`] evaluates it against untyped JSON, coercing numeric
//! strings the way query strings arrive, and reports every violation as a
//! [`FieldError`] instead of stopping at the first one.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use uuid::Uuid;
use validator::{ValidateLength, ValidateRange};

use crate::pagination::parse_sort_by;

/// Part of the request a rule set applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Body,
    Query,
    Params,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Body => "body",
            Segment::Query => "query",
            Segment::Params => "params",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub segment: Segment,
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool { self.errors.is_empty() }

    pub fn push(&mut self, segment: Segment, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { segment, field: field.into(), message: message.into() });
    }

    pub fn extend(&mut self, other: ValidationErrors) { self.errors.extend(other.errors); }

    /// Whether some error points at `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result<T>(self, ok: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(ok) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("validation failed");
        }
        let msgs: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&msgs.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Shape constraint for a single field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    /// Non-blank string of at least `min_len` characters.
    Text { min_len: usize },
    Number { min: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    /// `[longitude, latitude]`
    Coordinates,
    /// List of `{itemName, itemValue, itemCategory}` text triples.
    MenuItems,
    /// Store identifier (UUID).
    ObjectId,
    /// `field:asc|desc[,...]`
    SortBy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, rule: Rule) -> Self { Self { name, rule, required: true } }

    pub const fn optional(name: &'static str, rule: Rule) -> Self { Self { name, rule, required: false } }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleSet {
    pub segment: Segment,
    pub fields: &'static [FieldRule],
    /// Minimum number of known fields that must be present.
    pub min_keys: usize,
}

const MENU_ITEM_KEYS: [&str; 3] = ["itemName", "itemValue", "itemCategory"];

type Violations = Vec<(String, String)>;

impl RuleSet {
    /// Validate `input` and return it with coerced values, or every violation found.
    /// `null` input is treated as an empty object.
    pub fn check(&self, input: &Value) -> Result<Map<String, Value>, ValidationErrors> {
        let seg = self.segment;
        let empty = Map::new();
        let obj = match input {
            Value::Object(m) => m,
            Value::Null => &empty,
            _ => {
                let mut errs = ValidationErrors::default();
                errs.push(seg, seg.as_str(), format!("\"{}\" must be of type object", seg.as_str()));
                return Err(errs);
            }
        };

        let mut errs = ValidationErrors::default();
        for key in obj.keys() {
            if !self.fields.iter().any(|f| f.name == key) {
                errs.push(seg, key.as_str(), format!("\"{key}\" is not allowed"));
            }
        }

        let mut out = Map::new();
        for field in self.fields {
            match obj.get(field.name) {
                None => {
                    if field.required {
                        errs.push(seg, field.name, format!("\"{}\" is required", field.name));
                    }
                }
                Some(value) => match check_value(field.rule, field.name, value) {
                    Ok(v) => { out.insert(field.name.to_string(), v); }
                    Err(violations) => {
                        for (path, msg) in violations { errs.push(seg, path, msg); }
                    }
                },
            }
        }

        let present = self.fields.iter().filter(|f| obj.contains_key(f.name)).count();
        if present < self.min_keys {
            errs.push(seg, seg.as_str(), format!("\"{}\" must have at least {} key", seg.as_str(), self.min_keys));
        }

        errs.into_result(out)
    }
}

fn violation(path: &str, msg: &str) -> Violations {
    vec![(path.to_string(), format!("\"{path}\" {msg}"))]
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn check_text(path: &str, value: &Value, min_len: usize) -> Result<Value, Violations> {
    let Value::String(s) = value else { return Err(violation(path, "must be a string")) };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(violation(path, "is not allowed to be empty"));
    }
    if !trimmed.validate_length(Some(min_len as u64), None, None) {
        return Err(violation(path, &format!("length must be at least {min_len} characters long")));
    }
    Ok(value.clone())
}

fn check_value(rule: Rule, path: &str, value: &Value) -> Result<Value, Violations> {
    match rule {
        Rule::Text { min_len } => check_text(path, value, min_len),
        Rule::Number { min } => {
            let n = as_f64(value).ok_or_else(|| violation(path, "must be a number"))?;
            if !n.validate_range(min, None, None, None) {
                let min = min.unwrap_or_default();
                return Err(violation(path, &format!("must be greater than or equal to {min}")));
            }
            Number::from_f64(n).map(Value::Number).ok_or_else(|| violation(path, "must be a number"))
        }
        Rule::Integer { min, max } => {
            if as_f64(value).is_none() {
                return Err(violation(path, "must be a number"));
            }
            let n = as_i64(value).ok_or_else(|| violation(path, "must be an integer"))?;
            if !n.validate_range(min, None, None, None) {
                let min = min.unwrap_or_default();
                return Err(violation(path, &format!("must be greater than or equal to {min}")));
            }
            if !n.validate_range(None, max, None, None) {
                let max = max.unwrap_or_default();
                return Err(violation(path, &format!("must be less than or equal to {max}")));
            }
            Ok(Value::from(n))
        }
        Rule::Coordinates => {
            let Value::Array(items) = value else { return Err(violation(path, "must be an array")) };
            if items.len() != 2 {
                return Err(violation(path, "must contain exactly 2 items [longitude, latitude]"));
            }
            let mut violations = Vec::new();
            let mut coords = Vec::with_capacity(2);
            for (i, (item, bound)) in items.iter().zip([180.0, 90.0]).enumerate() {
                let p = format!("{path}[{i}]");
                match as_f64(item) {
                    Some(c) if c.validate_range(Some(-bound), Some(bound), None, None) => coords.push(Value::from(c)),
                    Some(_) => violations.extend(violation(&p, &format!("must be within [-{bound}, {bound}]"))),
                    None => violations.extend(violation(&p, "must be a number")),
                }
            }
            if violations.is_empty() { Ok(Value::Array(coords)) } else { Err(violations) }
        }
        Rule::MenuItems => {
            let Value::Array(items) = value else { return Err(violation(path, "must be an array")) };
            let mut violations = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let p = format!("{path}[{i}]");
                let Value::Object(obj) = item else {
                    violations.extend(violation(&p, "must be of type object"));
                    continue;
                };
                for (key, v) in obj {
                    let kp = format!("{p}.{key}");
                    if !MENU_ITEM_KEYS.contains(&key.as_str()) {
                        violations.extend(violation(&kp, "is not allowed"));
                    } else if let Err(e) = check_text(&kp, v, 1) {
                        violations.extend(e);
                    }
                }
            }
            if violations.is_empty() { Ok(value.clone()) } else { Err(violations) }
        }
        Rule::ObjectId => {
            let ok = value.as_str().map(|s| Uuid::parse_str(s).is_ok()).unwrap_or(false);
            if ok { Ok(value.clone()) } else { Err(violation(path, "must be a valid id")) }
        }
        Rule::SortBy => {
            let Value::String(s) = value else { return Err(violation(path, "must be a string")) };
            parse_sort_by(s).map_err(|e| violation(path, &format!("is invalid: {e}")))?;
            Ok(value.clone())
        }
    }
}

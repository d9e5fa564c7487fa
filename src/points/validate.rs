//! Request body validation for point payloads.
//!
//! Each payload shape is a table of [`FieldRule`]s. Bodies are checked against
//! the table as raw JSON first so every violation is reported at once, then
//! deserialised into the typed request.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, FieldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
    /// A string that must not be empty.
    NonEmptyString,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::String | FieldKind::NonEmptyString => "string",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A request body type described by a rule table.
pub trait Schema: DeserializeOwned {
    const RULES: &'static [FieldRule];
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_field(rule: &FieldRule, value: Option<&Value>) -> Option<FieldError> {
    let Some(value) = value else {
        return rule
            .required
            .then(|| FieldError::new(rule.name, "Required"));
    };

    let type_ok = match rule.kind {
        FieldKind::Number => value.is_number(),
        FieldKind::String | FieldKind::NonEmptyString => value.is_string(),
    };
    if !type_ok {
        return Some(FieldError::new(
            rule.name,
            format!(
                "Expected {}, received {}",
                rule.kind.expected(),
                json_type(value)
            ),
        ));
    }

    if rule.kind == FieldKind::NonEmptyString && value.as_str() == Some("") {
        return Some(FieldError::new(rule.name, "Must not be empty"));
    }
    None
}

/// Check a JSON object against `rules`, collecting every violation.
pub fn check_object(body: &Map<String, Value>, rules: &[FieldRule]) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = rules
        .iter()
        .filter_map(|rule| check_field(rule, body.get(rule.name)))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse and validate a raw body. An empty body counts as `{}`.
pub fn validate<T: Schema>(raw: &[u8]) -> Result<T, AppError> {
    let value: Value = if raw.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(raw).map_err(|e| {
            AppError::Validation(vec![FieldError::new("body", format!("Invalid JSON: {e}"))])
        })?
    };

    let Value::Object(body) = &value else {
        return Err(AppError::Validation(vec![FieldError::new(
            "body",
            format!("Expected object, received {}", json_type(&value)),
        )]));
    };
    check_object(body, T::RULES).map_err(AppError::Validation)?;

    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(vec![FieldError::new("body", e.to_string())]))
}

/// Body extractor that rejects with field-level detail before the handler runs.
#[derive(Debug)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        validate::<T>(&bytes).map(Validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::dto::{CreatePointRequest, UpdatePointRequest};
    use serde_json::json;

    fn fields(err: AppError) -> Vec<(String, String)> {
        match err {
            AppError::Validation(errors) => errors
                .into_iter()
                .map(|e| (e.field, e.message))
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn raw(v: Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "lat": 61.1,
            "lng": 26.2,
            "labelSize": "medium",
            "category": "1",
            "installYear": 2024,
            "usageState": "1",
            "owner": "1"
        })
    }

    #[test]
    fn create_accepts_full_payload() {
        let req: CreatePointRequest = validate(&raw(full_payload())).unwrap();
        assert_eq!(req.lat, 61.1);
        assert_eq!(req.lng, 26.2);
        assert_eq!(req.label_size, "medium");
        assert_eq!(req.install_year, 2024.0);
        assert_eq!(req.owner, "1");
    }

    #[test]
    fn create_reports_every_missing_field() {
        let err = validate::<CreatePointRequest>(&raw(json!({ "lat": 1.0 }))).unwrap_err();
        let names: Vec<String> = fields(err).into_iter().map(|(f, _)| f).collect();
        assert_eq!(
            names,
            vec!["lng", "labelSize", "category", "installYear", "usageState", "owner"]
        );
    }

    #[test]
    fn create_reports_wrong_types() {
        let mut body = full_payload();
        body["lat"] = json!("61.1");
        body["owner"] = json!(1);
        body["installYear"] = Value::Null;
        let errors = fields(validate::<CreatePointRequest>(&raw(body)).unwrap_err());
        assert_eq!(
            errors,
            vec![
                ("lat".to_string(), "Expected number, received string".to_string()),
                ("installYear".to_string(), "Expected number, received null".to_string()),
                ("owner".to_string(), "Expected string, received number".to_string()),
            ]
        );
    }

    #[test]
    fn create_rejects_empty_label_size() {
        let mut body = full_payload();
        body["labelSize"] = json!("");
        let errors = fields(validate::<CreatePointRequest>(&raw(body)).unwrap_err());
        assert_eq!(errors, vec![("labelSize".to_string(), "Must not be empty".to_string())]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut body = full_payload();
        body["createdBy"] = json!("00000000-0000-0000-0000-000000000000");
        body["id"] = json!("123");
        assert!(validate::<CreatePointRequest>(&raw(body)).is_ok());
    }

    #[test]
    fn update_accepts_empty_body() {
        let empty: UpdatePointRequest = validate(b"").unwrap();
        assert!(empty.is_empty());
        let braces: UpdatePointRequest = validate(b"{}").unwrap();
        assert!(braces.is_empty());
    }

    #[test]
    fn update_accepts_partial_body() {
        let req: UpdatePointRequest = validate(&raw(json!({ "owner": "2", "lat": 60 }))).unwrap();
        assert_eq!(req.owner.as_deref(), Some("2"));
        assert_eq!(req.lat, Some(60.0));
        assert_eq!(req.lng, None);
    }

    #[test]
    fn update_rejects_null_and_wrong_types() {
        let errors = fields(
            validate::<UpdatePointRequest>(&raw(json!({ "lng": null, "category": 3 }))).unwrap_err(),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0, "lng");
        assert_eq!(errors[1].0, "category");
    }

    #[test]
    fn non_object_and_malformed_bodies_are_rejected() {
        let errors = fields(validate::<UpdatePointRequest>(b"[1,2]").unwrap_err());
        assert_eq!(errors, vec![("body".to_string(), "Expected object, received array".to_string())]);

        let errors = fields(validate::<CreatePointRequest>(b"{\"lat\":").unwrap_err());
        assert_eq!(errors[0].0, "body");
        assert!(errors[0].1.starts_with("Invalid JSON"));
    }

    #[test]
    fn empty_body_fails_create() {
        let errors = fields(validate::<CreatePointRequest>(b"").unwrap_err());
        assert_eq!(errors.len(), CreatePointRequest::RULES.len());
        assert!(errors.iter().all(|(_, m)| m == "Required"));
    }
}

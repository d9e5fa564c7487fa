use serde::{Deserialize, Serialize};

use super::repo::Point;
use super::validate::{FieldKind, FieldRule, Schema};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePointRequest {
    pub lat: f64,
    pub lng: f64,
    pub label_size: String,
    pub category: String,
    pub install_year: f64,
    pub usage_state: String,
    pub owner: String,
}

impl Schema for CreatePointRequest {
    const RULES: &'static [FieldRule] = &[
        FieldRule::required("lat", FieldKind::Number),
        FieldRule::required("lng", FieldKind::Number),
        FieldRule::required("labelSize", FieldKind::NonEmptyString),
        FieldRule::required("category", FieldKind::String),
        FieldRule::required("installYear", FieldKind::Number),
        FieldRule::required("usageState", FieldKind::String),
        FieldRule::required("owner", FieldKind::String),
    ];
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub label_size: Option<String>,
    pub category: Option<String>,
    pub install_year: Option<f64>,
    pub usage_state: Option<String>,
    pub owner: Option<String>,
}

impl UpdatePointRequest {
    pub fn is_empty(&self) -> bool {
        self.lat.is_none()
            && self.lng.is_none()
            && self.label_size.is_none()
            && self.category.is_none()
            && self.install_year.is_none()
            && self.usage_state.is_none()
            && self.owner.is_none()
    }
}

impl Schema for UpdatePointRequest {
    const RULES: &'static [FieldRule] = &[
        FieldRule::optional("lat", FieldKind::Number),
        FieldRule::optional("lng", FieldKind::Number),
        FieldRule::optional("labelSize", FieldKind::NonEmptyString),
        FieldRule::optional("category", FieldKind::String),
        FieldRule::optional("installYear", FieldKind::Number),
        FieldRule::optional("usageState", FieldKind::String),
        FieldRule::optional("owner", FieldKind::String),
    ];
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Update replies with the row, or a message when no owned row matched.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateResponse {
    Updated { data: Point },
    Missing { message: &'static str },
}

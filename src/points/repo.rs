use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{CreatePointRequest, UpdatePointRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Point {
    pub id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub label_size: String,
    pub category: String,
    pub install_year: f64,
    pub usage_state: String,
    pub owner: String,
    #[serde(rename = "createAt", with = "time::serde::rfc3339")]
    #[sqlx(rename = "createAt")]
    pub created_at: OffsetDateTime,
    pub created_by: Uuid,
}

// Numeric columns may be NUMERIC in older deployments; cast so they always
// decode as f64. "createAt" is a zone-less TIMESTAMP stored in UTC.
const POINT_COLUMNS: &str = r#"
    id,
    lat::float8 AS lat,
    lng::float8 AS lng,
    "labelSize",
    category,
    "installYear"::float8 AS "installYear",
    "usageState",
    owner,
    ("createAt" AT TIME ZONE 'UTC') AS "createAt",
    "createdBy"
"#;

pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Point>> {
    let sql = format!(
        r#"
        SELECT {POINT_COLUMNS}
        FROM points
        WHERE "createdBy" = $1
        ORDER BY "createAt" ASC, id ASC
        "#
    );
    let rows = sqlx::query_as::<_, Point>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list points by owner")?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    p: &CreatePointRequest,
) -> anyhow::Result<Point> {
    let sql = format!(
        r#"
        INSERT INTO points (lat, lng, "labelSize", category, "installYear", "usageState", owner, "createdBy")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {POINT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Point>(&sql)
        .bind(p.lat)
        .bind(p.lng)
        .bind(&p.label_size)
        .bind(&p.category)
        .bind(p.install_year)
        .bind(&p.usage_state)
        .bind(&p.owner)
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("insert point")?;
    Ok(row)
}

/// Update the point only if `user_id` owns it. `None` when no owned row matched.
pub async fn update_owned(
    db: &PgPool,
    user_id: Uuid,
    point_id: Uuid,
    p: &UpdatePointRequest,
) -> anyhow::Result<Option<Point>> {
    let sql = format!(
        r#"
        UPDATE points SET
            lat = COALESCE($1, lat),
            lng = COALESCE($2, lng),
            "labelSize" = COALESCE($3, "labelSize"),
            category = COALESCE($4, category),
            "installYear" = COALESCE($5, "installYear"),
            "usageState" = COALESCE($6, "usageState"),
            owner = COALESCE($7, owner)
        WHERE id = $8 AND "createdBy" = $9
        RETURNING {POINT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Point>(&sql)
        .bind(p.lat)
        .bind(p.lng)
        .bind(p.label_size.as_deref())
        .bind(p.category.as_deref())
        .bind(p.install_year)
        .bind(p.usage_state.as_deref())
        .bind(p.owner.as_deref())
        .bind(point_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("update point")?;
    Ok(row)
}

/// Delete the point only if `user_id` owns it, returning its final state.
pub async fn delete_owned(
    db: &PgPool,
    user_id: Uuid,
    point_id: Uuid,
) -> anyhow::Result<Option<Point>> {
    let sql = format!(
        r#"
        DELETE FROM points
        WHERE id = $1 AND "createdBy" = $2
        RETURNING {POINT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Point>(&sql)
        .bind(point_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("delete point")?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn point_serializes_camel_case() {
        let point = Point {
            id: Uuid::nil(),
            lat: 61.378466381494114,
            lng: 26.308762691638652,
            label_size: "medium".into(),
            category: "1".into(),
            install_year: 2024.0,
            usage_state: "1".into(),
            owner: "1".into(),
            created_at: datetime!(2024-03-01 16:58:50 UTC),
            created_by: Uuid::nil(),
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["labelSize"], json!("medium"));
        assert_eq!(value["usageState"], json!("1"));
        assert_eq!(value["lat"].as_f64(), Some(61.378466381494114));
        assert_eq!(value["installYear"].as_f64(), Some(2024.0));
        assert_eq!(value["createAt"], json!("2024-03-01T16:58:50Z"));
        assert!(value.get("createdAt").is_none());
        assert_eq!(value["createdBy"], json!(Uuid::nil().to_string()));
    }
}

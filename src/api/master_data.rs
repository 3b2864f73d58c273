//! Master data API endpoints
//!
//! One set of generic handlers serves every lookup kind; the kind arrives
//! as a path segment (`/master-data/industry`, `/master-data/skill`, ...).
//!
//! - GET /api/v1/master-data/{kind} - Dropdown options, filtered by parent
//! - GET /api/v1/master-data/{kind}/{id}/chain - Full cascade chain
//! - POST /api/v1/master-data/{kind} - Create an item (admin)
//! - PUT /api/v1/master-data/{kind}/{id} - Update an item (admin)
//! - DELETE /api/v1/master-data/{kind}/{id} - Delete an item (admin)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::MasterDataItemResponse;
use crate::models::{CreateMasterDataInput, MasterDataKind, UpdateMasterDataInput};

/// Query parameters for the options lookup
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    /// Restrict to children of this item (dependent dropdowns)
    pub parent_id: Option<i64>,
    /// Include inactive items (admins only)
    #[serde(default)]
    pub include_inactive: bool,
}

/// Request body for creating a master data item
#[derive(Debug, Deserialize)]
pub struct CreateMasterDataRequest {
    pub label: String,
    pub slug: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
}

/// Request body for updating a master data item
#[derive(Debug, Deserialize)]
pub struct UpdateMasterDataRequest {
    pub label: Option<String>,
    pub slug: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Response for the options lookup
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub kind: String,
    pub options: Vec<MasterDataItemResponse>,
}

/// Response for the cascade chain lookup
#[derive(Debug, Serialize)]
pub struct CascadeChainResponse {
    pub chain: Vec<MasterDataItemResponse>,
}

/// Parse the kind path segment; unknown kinds are a 404, not a 400
fn parse_kind(kind: &str) -> Result<MasterDataKind, ApiError> {
    kind.parse()
        .map_err(|_| ApiError::not_found(format!("Unknown master data kind: {}", kind)))
}

/// GET /api/v1/master-data/{kind} - List dropdown options
///
/// With `parent_id` this serves the dependent half of a cascade (for
/// example `/master-data/sub-industry?parent_id=3` lists the sub-industries
/// of industry 3). Inactive items are only shown to admins asking for them.
pub async fn list_options_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<OptionsQuery>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let kind = parse_kind(&kind)?;

    let is_admin = user.map(|u| u.0 .0.is_admin()).unwrap_or(false);
    let include_inactive = query.include_inactive && is_admin;

    let options = state
        .master_data_service
        .options(kind, query.parent_id, include_inactive)
        .await?;

    Ok(Json(OptionsResponse {
        kind: kind.to_string(),
        options: options.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/master-data/{kind}/{id}/chain - Resolve the cascade chain
///
/// Returns the item and its ancestors, root first. For a specialization
/// that is `[education level, course, specialization]`.
pub async fn cascade_chain_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<CascadeChainResponse>, ApiError> {
    let kind = parse_kind(&kind)?;

    // The id must actually be of the addressed kind
    state.master_data_service.get(kind, id).await?;

    let chain = state.master_data_service.cascade_chain(id).await?;
    Ok(Json(CascadeChainResponse {
        chain: chain.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/master-data/{kind} - Create an item (admin)
pub async fn create_item_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<CreateMasterDataRequest>,
) -> Result<Json<MasterDataItemResponse>, ApiError> {
    let kind = parse_kind(&kind)?;

    let item = state
        .master_data_service
        .create(
            kind,
            CreateMasterDataInput {
                label: request.label,
                slug: request.slug,
                parent_id: request.parent_id,
                sort_order: request.sort_order,
            },
        )
        .await?;

    Ok(Json(item.into()))
}

/// PUT /api/v1/master-data/{kind}/{id} - Update an item (admin)
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Json(request): Json<UpdateMasterDataRequest>,
) -> Result<Json<MasterDataItemResponse>, ApiError> {
    let kind = parse_kind(&kind)?;

    let item = state
        .master_data_service
        .update(
            kind,
            id,
            UpdateMasterDataInput {
                label: request.label,
                slug: request.slug,
                sort_order: request.sort_order,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(item.into()))
}

/// DELETE /api/v1/master-data/{kind}/{id} - Delete an item (admin)
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    state.master_data_service.delete(kind, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_known_and_unknown() {
        assert!(parse_kind("industry").is_ok());
        assert!(parse_kind("sub-industry").is_ok());
        assert!(parse_kind("education-level").is_ok());

        let err = parse_kind("salary-band").unwrap_err();
        assert_eq!(err.error.code, "NOT_FOUND");
    }
}

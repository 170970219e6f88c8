use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use models::domain::{DomainPatch, Model};
use service::domain::service::{BatchStatus, CreateDomainInput, StatusEntry};
use service::ids::{parse_id, parse_id_str};
use service::pagination::{Page, Pagination};
use service::upload::ImagePart;

use super::auth::ServerState;
use crate::errors::JsonApiError;

const FILE_FIELDS: [&str; 2] = ["logo", "meta_ico"];

/// Collect the create form. Empty file parts count as absent.
async fn read_form(mut multipart: Multipart) -> Result<CreateDomainInput, JsonApiError> {
    let mut input = CreateDomainInput::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid request payload", Some(e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if FILE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid request payload", Some(e.body_text())))?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            let part = ImagePart { field: name.clone(), file_name, content_type, bytes: bytes.to_vec() };
            if name == "logo" {
                input.logo = Some(part);
            } else {
                input.meta_ico = Some(part);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid request payload", Some(e.body_text())))?;
        match name.as_str() {
            "name" => input.name = value,
            "meta_title" => input.meta_title = value,
            "meta_desc" => input.meta_desc = value,
            "meta_keyword" => input.meta_keyword = value,
            "modul" => input.modul = value,
            "status" => input.status = value,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(input)
}

#[utoipa::path(post, path = "/api/domain/post", tag = "domain",
    request_body(content = crate::openapi::DomainForm, content_type = "multipart/form-data"),
    responses((status = 200, description = "Successfully saved data"), (status = 400, description = "Validation, upload or duplicate name"),
              (status = 401, description = "Unauthenticated")))]
pub async fn post(State(state): State<ServerState>, multipart: Multipart) -> Result<Json<Value>, JsonApiError> {
    let input = read_form(multipart).await?;
    let row = state.domains.create(input).await?;
    Ok(Json(json!({ "message": "Successfully saved data", "data": { "id": row.id } })))
}

/// Body of `PUT /api/domain/update`; `aksi` picks which part is read.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    aksi: Option<String>,
    #[serde(flatten)]
    fields: UpdateAllBody,
    #[serde(default)]
    data: Option<Vec<StatusEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateAllBody {
    id: Option<Value>,
    name: Option<String>,
    logo: Option<String>,
    meta_title: Option<String>,
    meta_desc: Option<String>,
    meta_keyword: Option<String>,
    meta_ico: Option<String>,
    modul: Option<String>,
    status: Option<String>,
}

impl UpdateAllBody {
    fn into_patch(self) -> DomainPatch {
        DomainPatch {
            name: self.name,
            logo: self.logo,
            meta_title: self.meta_title,
            meta_desc: self.meta_desc,
            meta_keyword: self.meta_keyword,
            meta_ico: self.meta_ico,
            modul: self.modul,
            status: self.status,
        }
    }
}

#[utoipa::path(put, path = "/api/domain/update", tag = "domain", request_body = crate::openapi::DomainUpdateRequest,
    responses((status = 200, description = "Updated"), (status = 207, description = "Batch partially applied"),
              (status = 400, description = "Invalid action, payload or every batch item failed"), (status = 404, description = "Domain not found"),
              (status = 401, description = "Unauthenticated")))]
pub async fn update(
    State(state): State<ServerState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let Json(req) = payload
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid request payload", Some(e.body_text())))?;

    match req.aksi.as_deref() {
        None | Some("") => Err(JsonApiError::bad_request("Action (aksi) is required")),
        Some("updateAll") => update_all(&state, req.fields).await,
        Some("updateStatus") => update_status(&state, req.data.unwrap_or_default()).await,
        Some(other) => Err(JsonApiError::bad_request(format!("Invalid action specified: {}", other))),
    }
}

async fn update_all(state: &ServerState, body: UpdateAllBody) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let id = match &body.id {
        None | Some(Value::Null) => return Err(JsonApiError::bad_request("ID is required")),
        Some(raw) => parse_id(raw).map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid ID format", Some(e)))?,
    };

    let id = state.domains.update_all(id, body.into_patch()).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Successfully updated domain", "data": { "id": id } }))))
}

async fn update_status(state: &ServerState, items: Vec<StatusEntry>) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    if items.is_empty() {
        return Err(JsonApiError::bad_request("No data provided"));
    }
    let outcome = state.domains.update_status(&items).await?;

    let (status, message) = match outcome.status() {
        BatchStatus::Complete => (StatusCode::OK, format!("Successfully updated {} domains", outcome.updated)),
        BatchStatus::Partial => (
            StatusCode::MULTI_STATUS,
            format!("Partially updated: {} success, {} failed", outcome.updated, outcome.errors.len()),
        ),
        BatchStatus::Failed => (
            StatusCode::BAD_REQUEST,
            format!("Partially updated: {} success, {} failed", outcome.updated, outcome.errors.len()),
        ),
    };
    let mut body = json!({ "message": message, "updated": outcome.updated });
    if !outcome.errors.is_empty() {
        body["errors"] = json!(outcome.errors);
    }
    Ok((status, Json(body)))
}

/// Raw query values; anything unparsable falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn lenient(v: &Option<String>) -> u32 {
    v.as_deref().and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0)
}

#[utoipa::path(get, path = "/api/domain", tag = "domain",
    params(("page" = Option<u32>, Query, description = "1-based page"), ("limit" = Option<u32>, Query, description = "rows per page, max 100")),
    responses((status = 200, description = "Newest first with paging meta"), (status = 401, description = "Unauthenticated")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<Model>>, JsonApiError> {
    let p = Pagination { page: lenient(&q.page), per_page: lenient(&q.limit) };
    Ok(Json(state.domains.list(p).await?))
}

#[utoipa::path(get, path = "/api/domain/{id}", tag = "domain", params(("id" = i32, Path, description = "domain id")),
    responses((status = 200, description = "Domain row"), (status = 400, description = "Invalid ID format"),
              (status = 404, description = "domain not found"), (status = 401, description = "Unauthenticated")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id_str(&id).map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid ID format", Some(e)))?;
    let row = state.domains.get(id).await?;
    Ok(Json(json!({ "data": row })))
}

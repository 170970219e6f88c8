use axum::{
    extract::{Path, State},
    Json,
};

use common::types::MessageBody;
use service::ids::parse_id_str;

use super::auth::ServerState;
use crate::errors::JsonApiError;

#[utoipa::path(get, path = "/api/dashboard/{dmn}", tag = "dashboard", params(("dmn" = i32, Path, description = "domain id")),
    responses((status = 200, description = "Page ready to action"), (status = 404, description = "Page not Found"),
              (status = 401, description = "Unauthenticated")))]
pub async fn dashboard(
    State(state): State<ServerState>,
    Path(dmn): Path<String>,
) -> Result<Json<MessageBody>, JsonApiError> {
    let Ok(id) = parse_id_str(&dmn) else {
        return Err(JsonApiError::not_found("Page not Found"));
    };
    if !state.domains.exists(id).await? {
        return Err(JsonApiError::not_found("Page not Found"));
    }
    Ok(Json(MessageBody::new("Page ready to action")))
}

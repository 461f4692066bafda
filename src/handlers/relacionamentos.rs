// src/handlers/relacionamentos.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::JsonBody},
    models::relacionamento::{DesvincularPayload, OkResponse, RelacionamentosView, VincularPayload},
    services::relacionamento_service::VincularRequest,
};

// GET /relacionamentos
#[utoipa::path(
    get,
    path = "/relacionamentos",
    tag = "Relacionamentos",
    responses(
        (status = 200, description = "Aparelhos com a grade de slots e os chips livres", body = RelacionamentosView),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_relacionamentos(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .relacionamento_service
        .view()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /relacionamentos/vincular
#[utoipa::path(
    post,
    path = "/relacionamentos/vincular",
    tag = "Relacionamentos",
    request_body = VincularPayload,
    responses(
        (status = 200, description = "Chip vinculado", body = OkResponse),
        (status = 400, description = "Chip, aparelho ou slot ausente"),
        (status = 404, description = "Chip ou aparelho não encontrado"),
        (status = 409, description = "Slot ocupado, fora da capacidade ou de outro tipo")
    ),
    security(("api_jwt" = []))
)]
pub async fn vincular(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<VincularPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let req = VincularRequest::try_from_payload(&payload)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .relacionamento_service
        .vincular(&app_state.db_pool, &req, user.usuario())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(OkResponse { ok: true })))
}

// POST /relacionamentos/desvincular
#[utoipa::path(
    post,
    path = "/relacionamentos/desvincular",
    tag = "Relacionamentos",
    request_body = DesvincularPayload,
    responses(
        (status = 200, description = "Chip desvinculado", body = OkResponse),
        (status = 400, description = "Chip ausente"),
        (status = 404, description = "Chip não encontrado"),
        (status = 409, description = "Chip não está vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn desvincular(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<DesvincularPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .relacionamento_service
        .desvincular(&app_state.db_pool, &payload, user.usuario())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(OkResponse { ok: true })))
}

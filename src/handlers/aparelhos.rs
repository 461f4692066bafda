// src/handlers/aparelhos.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::aparelho::{AparelhoForm, AparelhoInput, AparelhoResumo},
};

// GET /aparelhos
#[utoipa::path(
    get,
    path = "/aparelhos",
    tag = "Aparelhos",
    responses(
        (status = 200, description = "Aparelhos com ocupação dos slots", body = [AparelhoResumo]),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_aparelhos(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let aparelhos = app_state
        .aparelho_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(aparelhos)))
}

// POST /aparelhos/add
#[utoipa::path(
    post,
    path = "/aparelhos/add",
    tag = "Aparelhos",
    request_body(content = AparelhoForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Salvo; redireciona para /aparelhos"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Capacidade não comporta os chips vinculados")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_aparelho(
    State(app_state): State<AppState>,
    locale: Locale,
    Form(form): Form<AparelhoForm>,
) -> Result<impl IntoResponse, ApiError> {
    form.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let input = AparelhoInput::try_from_form(&form)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .aparelho_service
        .save(&app_state.db_pool, &input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to("/aparelhos"))
}

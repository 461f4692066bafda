// src/handlers/chips.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::JsonBody},
    models::{
        aparelho::AparelhoResumo,
        chip::{ChipForm, ChipInput, ChipPainel, ChipSaveResponse},
        evento::{MovimentoPayload, MovimentoResponse, TimelineEntry},
        recarga::Recarga,
    },
    services::chip_service::ChipSaved,
};

// Página de chips: a tabela e os aparelhos do seletor de edição
#[derive(Debug, Serialize, ToSchema)]
pub struct ChipsPage {
    pub chips: Vec<ChipPainel>,
    pub aparelhos: Vec<AparelhoResumo>,
}

// GET /chips
#[utoipa::path(
    get,
    path = "/chips",
    tag = "Chips",
    responses(
        (status = 200, description = "Chips e aparelhos", body = ChipsPage),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_chips(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let chips = app_state
        .chip_service
        .list_painel()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let aparelhos = app_state
        .aparelho_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ChipsPage { chips, aparelhos })))
}

// GET /chips/{id}
#[utoipa::path(
    get,
    path = "/chips/{id}",
    tag = "Chips",
    params(("id" = String, Path, description = "id_chip (chave de negócio)")),
    responses(
        (status = 200, description = "Chip encontrado", body = ChipPainel),
        (status = 404, description = "Chip não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_chip(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id_chip): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chip = app_state
        .chip_service
        .get_by_id_chip(&id_chip)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chip)))
}

async fn save_form(
    app_state: &AppState,
    user: &AuthenticatedUser,
    form: &ChipForm,
) -> Result<ChipSaved, AppError> {
    form.validate()?;
    let input = ChipInput::try_from_form(form)?;
    app_state
        .chip_service
        .save(&app_state.db_pool, &input, user.usuario())
        .await
}

// POST /chips/add
#[utoipa::path(
    post,
    path = "/chips/add",
    tag = "Chips",
    request_body(content = ChipForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Salvo; redireciona para /chips"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Aparelho sem slot compatível")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_chip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Form(form): Form<ChipForm>,
) -> Result<impl IntoResponse, ApiError> {
    save_form(&app_state, &user, &form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to("/chips"))
}

// POST /chips/update
#[utoipa::path(
    post,
    path = "/chips/update",
    tag = "Chips",
    request_body(content = ChipForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Salvo; redireciona para /chips"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Conflito de slot")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_chip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Form(form): Form<ChipForm>,
) -> Result<impl IntoResponse, ApiError> {
    save_form(&app_state, &user, &form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to("/chips"))
}

// POST /chips/update-json
#[utoipa::path(
    post,
    path = "/chips/update-json",
    tag = "Chips",
    request_body = ChipForm,
    responses(
        (status = 200, description = "Chip salvo", body = ChipSaveResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Conflito de slot")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_chip_json(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let form = ChipForm::from_json(&body);
    let saved = save_form(&app_state, &user, &form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(ChipSaveResponse {
            success: true,
            created: saved.created,
            chip: saved.chip,
            changes: saved.changes,
        }),
    ))
}

// POST /chips/movimento
#[utoipa::path(
    post,
    path = "/chips/movimento",
    tag = "Chips",
    request_body = MovimentoPayload,
    responses(
        (status = 201, description = "Movimento registrado", body = MovimentoResponse),
        (status = 400, description = "Chip ou tipo ausente"),
        (status = 404, description = "Chip não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn movimento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<MovimentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let evento = app_state
        .chip_service
        .movimento(&app_state.db_pool, &payload, user.usuario())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(MovimentoResponse { success: true, evento })))
}

// GET /chips/{id}/timeline
#[utoipa::path(
    get,
    path = "/chips/{id}/timeline",
    tag = "Chips",
    params(("id" = i64, Path, description = "sk_chip")),
    responses(
        (status = 200, description = "Eventos do chip, do mais recente ao mais antigo", body = [TimelineEntry])
    ),
    security(("api_jwt" = []))
)]
pub async fn timeline(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(sk_chip): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let eventos = app_state
        .chip_service
        .timeline(sk_chip)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(eventos)))
}

// GET /chips/{id}/recargas
#[utoipa::path(
    get,
    path = "/chips/{id}/recargas",
    tag = "Chips",
    params(("id" = i64, Path, description = "sk_chip")),
    responses(
        (status = 200, description = "Recargas do chip, da mais recente à mais antiga", body = [Recarga])
    ),
    security(("api_jwt" = []))
)]
pub async fn recargas(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(sk_chip): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let recargas = app_state
        .chip_service
        .recargas(sk_chip)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(recargas)))
}

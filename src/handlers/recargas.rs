// src/handlers/recargas.rs

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use chrono::Local;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::recarga::{RecargaForm, RecargaInput},
};

// POST /recargas/add
#[utoipa::path(
    post,
    path = "/recargas/add",
    tag = "Recargas",
    request_body(content = RecargaForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Recarga registrada; redireciona para /dashboard"),
        (status = 400, description = "Chip, valor ou data inválidos"),
        (status = 404, description = "Chip não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_recarga(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Form(form): Form<RecargaForm>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Local::now().date_naive();
    let input = RecargaInput::try_from_form(&form, today)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .recarga_service
        .registrar(&app_state.db_pool, &input, user.usuario())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to("/dashboard"))
}

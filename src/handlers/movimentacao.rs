// src/handlers/movimentacao.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        chip::{ChipBusca, ChipPainel},
        evento::TimelineEntry,
    },
};

const MIN_TERMO: usize = 2;
const LIMITE_BUSCA: i64 = 20;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BuscaQuery {
    /// Parte do número do chip
    pub q: Option<String>,
}

// GET /movimentacao
#[utoipa::path(
    get,
    path = "/movimentacao",
    tag = "Movimentação",
    responses(
        (status = 200, description = "Chips para a página de movimentação", body = [ChipPainel])
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

    Ok((StatusCode::OK, Json(chips)))
}

// GET /movimentacao/buscar?q=
#[utoipa::path(
    get,
    path = "/movimentacao/buscar",
    tag = "Movimentação",
    params(BuscaQuery),
    responses(
        (status = 200, description = "Até 20 chips cujo número contém o termo", body = [ChipBusca])
    ),
    security(("api_jwt" = []))
)]
pub async fn buscar(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<BuscaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let termo = query.q.as_deref().unwrap_or_default().trim();
    if termo.chars().count() < MIN_TERMO {
        return Ok((StatusCode::OK, Json(Vec::<ChipBusca>::new())));
    }

    let chips = app_state
        .chip_service
        .buscar(termo, LIMITE_BUSCA)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chips)))
}

// GET /movimentacao/historico/{sk_chip}
#[utoipa::path(
    get,
    path = "/movimentacao/historico/{sk_chip}",
    tag = "Movimentação",
    params(("sk_chip" = i64, Path, description = "Chave do chip")),
    responses(
        (status = 200, description = "Timeline do chip", body = [TimelineEntry])
    ),
    security(("api_jwt" = []))
)]
pub async fn historico(
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

// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_overview,

        // --- Chips ---
        handlers::chips::list_chips,
        handlers::chips::get_chip,
        handlers::chips::add_chip,
        handlers::chips::update_chip,
        handlers::chips::update_chip_json,
        handlers::chips::movimento,
        handlers::chips::timeline,
        handlers::chips::recargas,

        // --- Aparelhos ---
        handlers::aparelhos::list_aparelhos,
        handlers::aparelhos::add_aparelho,

        // --- Relacionamentos ---
        handlers::relacionamentos::get_relacionamentos,
        handlers::relacionamentos::vincular,
        handlers::relacionamentos::desvincular,

        // --- Movimentação ---
        handlers::movimentacao::list_chips,
        handlers::movimentacao::buscar,
        handlers::movimentacao::historico,

        // --- Recargas ---
        handlers::recargas::add_recarga,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Dashboard ---
            models::dashboard::DashboardKpis,
            models::dashboard::RechargeAlert,
            models::dashboard::DashboardOverview,

            // --- Chips ---
            models::chip::Chip,
            models::chip::ChipPainel,
            models::chip::ChipBusca,
            models::chip::ChipForm,
            models::chip::ChipSaveResponse,
            handlers::chips::ChipsPage,

            // --- Aparelhos ---
            models::aparelho::Aparelho,
            models::aparelho::AparelhoResumo,
            models::aparelho::AparelhoForm,

            // --- Relacionamentos ---
            models::relacionamento::SlotKind,
            models::relacionamento::SlotChip,
            models::relacionamento::Slot,
            models::relacionamento::DeviceSlots,
            models::relacionamento::ChipLivre,
            models::relacionamento::RelacionamentosView,
            models::relacionamento::VincularPayload,
            models::relacionamento::DesvincularPayload,
            models::relacionamento::OkResponse,

            // --- Eventos e recargas ---
            models::evento::ChipEvento,
            models::evento::TimelineEntry,
            models::evento::MovimentoPayload,
            models::evento::MovimentoResponse,
            models::recarga::Recarga,
            models::recarga::RecargaForm,
        )
    ),
    tags(
        (name = "Auth", description = "Login e cadastro de operadores"),
        (name = "Users", description = "Operador autenticado"),
        (name = "Dashboard", description = "KPIs e alertas de recarga"),
        (name = "Chips", description = "Cadastro, edição auditada e timeline dos chips"),
        (name = "Aparelhos", description = "Cadastro de aparelhos e capacidade de WhatsApp"),
        (name = "Relacionamentos", description = "Vínculo de chips aos slots dos aparelhos"),
        (name = "Movimentação", description = "Busca de chips e histórico de eventos"),
        (name = "Recargas", description = "Registro de recargas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

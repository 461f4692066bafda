// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::relacionamento::SlotKind;

// Erros de domínio. Cada variante tem uma chave de tradução (ver `code`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo que não é um objeto JSON, ou chave obrigatória ausente/inválida
    #[error("Dados inválidos")]
    InvalidBody,

    // Campo de formulário ausente ou impossível de interpretar
    #[error("Campo inválido: {0}")]
    InvalidField(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Chip não encontrado: {0}")]
    ChipNotFound(String),

    #[error("Aparelho não encontrado: {0}")]
    DeviceNotFound(i64),

    #[error("Chip {0} está inativo")]
    ChipInactive(i64),

    #[error("Aparelho {0} está inativo")]
    DeviceInactive(i64),

    #[error("Slot {slot} fora da capacidade ({capacity})")]
    SlotOutOfRange { slot: i32, capacity: i32 },

    #[error("Slot {slot} já ocupado pelo chip {sk_chip}")]
    SlotOccupied { slot: i32, sk_chip: i64 },

    #[error("Slot {slot} é {expected}, chip é {found}")]
    SlotTypeMismatch { slot: i32, expected: SlotKind, found: SlotKind },

    #[error("Chip já vinculado ao aparelho {sk_aparelho} no slot {slot}")]
    ChipAlreadyLinked { sk_aparelho: i64, slot: i32 },

    #[error("Chip {0} não está vinculado")]
    ChipNotLinked(i64),

    #[error("Aparelho {0} sem slot livre compatível")]
    NoFreeSlot(i64),

    #[error("Capacidade não comporta o slot ocupado {slot}")]
    CapacityConflict { slot: i32 },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave de tradução usada pelo `I18nStore`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::InvalidBody => "invalid_body",
            AppError::InvalidField(_) => "invalid_field",
            AppError::EmailAlreadyExists => "email_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::ChipNotFound(_) => "chip_not_found",
            AppError::DeviceNotFound(_) => "device_not_found",
            AppError::ChipInactive(_) => "chip_inactive",
            AppError::DeviceInactive(_) => "device_inactive",
            AppError::SlotOutOfRange { .. } => "slot_out_of_range",
            AppError::SlotOccupied { .. } => "slot_occupied",
            AppError::SlotTypeMismatch { .. } => "slot_type_mismatch",
            AppError::ChipAlreadyLinked { .. } => "chip_already_linked",
            AppError::ChipNotLinked(_) => "chip_not_linked",
            AppError::NoFreeSlot(_) => "no_free_slot",
            AppError::CapacityConflict { .. } => "capacity_conflict",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidBody | AppError::InvalidField(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::ChipNotFound(_) | AppError::DeviceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::EmailAlreadyExists
            | AppError::ChipInactive(_)
            | AppError::DeviceInactive(_)
            | AppError::SlotOutOfRange { .. }
            | AppError::SlotOccupied { .. }
            | AppError::SlotTypeMismatch { .. }
            | AppError::ChipAlreadyLinked { .. }
            | AppError::ChipNotLinked(_)
            | AppError::NoFreeSlot(_)
            | AppError::CapacityConflict { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Parâmetros interpolados na mensagem traduzida
    fn args(&self) -> Vec<(&'static str, String)> {
        match self {
            AppError::InvalidField(field) => vec![("field", field.to_string())],
            AppError::ChipNotFound(id) => vec![("id", id.clone())],
            AppError::DeviceNotFound(id)
            | AppError::ChipInactive(id)
            | AppError::DeviceInactive(id)
            | AppError::ChipNotLinked(id)
            | AppError::NoFreeSlot(id) => vec![("id", id.to_string())],
            AppError::SlotOutOfRange { slot, capacity } => {
                vec![("slot", slot.to_string()), ("capacity", capacity.to_string())]
            }
            AppError::SlotOccupied { slot, sk_chip } => {
                vec![("slot", slot.to_string()), ("chip", sk_chip.to_string())]
            }
            AppError::SlotTypeMismatch { slot, expected, found } => vec![
                ("slot", slot.to_string()),
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            AppError::ChipAlreadyLinked { sk_aparelho, slot } => vec![
                ("device", sk_aparelho.to_string()),
                ("slot", slot.to_string()),
            ],
            AppError::CapacityConflict { slot } => vec![("slot", slot.to_string())],
            _ => Vec::new(),
        }
    }

    /// Converte o erro de domínio na resposta HTTP, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let message = store.translate(&locale.0, self.code(), &self.args());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| Value::String(m.to_string()))
                                .unwrap_or_else(|| Value::String(e.code.to_string()))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(fields))
            }
            _ => None,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        ApiError { status, error: message, details }
    }
}

// O erro já traduzido, pronto para virar resposta
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "ok": false, "error": self.error, "details": details }),
            None => json!({ "ok": false, "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

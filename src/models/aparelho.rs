// src/models/aparelho.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{
    error::AppError,
    form_utils::{clean_text, clean_upper, to_int},
};

pub const STATUS_PADRAO: &str = "ATIVO";

// --- Linha da dimensão dim_aparelho ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Aparelho {
    pub sk_aparelho: i64,
    pub id_aparelho: String,
    #[schema(example = "Samsung")]
    pub marca: String,
    #[schema(example = "Galaxy A15")]
    pub modelo: String,
    pub imei: String,
    pub status: String,
    #[schema(example = 2)]
    pub cap_whats_business: i32,
    #[schema(example = 2)]
    pub cap_whats_normal: i32,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Linha da view vw_aparelhos ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AparelhoResumo {
    pub sk_aparelho: i64,
    pub id_aparelho: String,
    pub marca: String,
    pub modelo: String,
    pub imei: String,
    pub status: String,
    pub cap_whats_business: i32,
    pub cap_whats_normal: i32,
    pub ativo: bool,
    pub slots_ocupados: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AparelhoForm {
    pub id_aparelho: Option<String>,

    #[validate(
        required(message = "O modelo é obrigatório."),
        length(min = 1, max = 120, message = "O modelo deve ter entre 1 e 120 caracteres.")
    )]
    pub modelo: Option<String>,

    pub marca: Option<String>,

    #[validate(length(max = 20, message = "O IMEI deve ter no máximo 20 caracteres."))]
    pub imei: Option<String>,

    pub status: Option<String>,
    pub cap_whats_business: Option<String>,
    pub cap_whats_normal: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AparelhoInput {
    pub id_aparelho: Option<String>,
    pub modelo: String,
    pub marca: String,
    pub imei: String,
    pub status: String,
    pub cap_whats_business: i32,
    pub cap_whats_normal: i32,
}

impl AparelhoInput {
    pub fn try_from_form(form: &AparelhoForm) -> Result<Self, AppError> {
        Ok(Self {
            id_aparelho: clean_text(form.id_aparelho.as_deref()),
            modelo: clean_text(form.modelo.as_deref()).ok_or(AppError::InvalidField("modelo"))?,
            marca: clean_text(form.marca.as_deref()).unwrap_or_default(),
            imei: clean_text(form.imei.as_deref()).unwrap_or_default(),
            status: clean_upper(form.status.as_deref()).unwrap_or_else(|| STATUS_PADRAO.to_string()),
            cap_whats_business: capacity(form.cap_whats_business.as_deref(), "cap_whats_business")?,
            cap_whats_normal: capacity(form.cap_whats_normal.as_deref(), "cap_whats_normal")?,
        })
    }
}

// Capacidade em branco vale 0; negativa ou absurda é erro
fn capacity(value: Option<&str>, field: &'static str) -> Result<i32, AppError> {
    match to_int(value) {
        None if clean_text(value).is_none() => Ok(0),
        None => Err(AppError::InvalidField(field)),
        Some(n) if (0..=64).contains(&n) => Ok(n as i32),
        Some(_) => Err(AppError::InvalidField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_blank_fields() {
        let form = AparelhoForm {
            modelo: Some("Moto G".into()),
            status: Some("".into()),
            cap_whats_business: Some("2".into()),
            ..Default::default()
        };
        let input = AparelhoInput::try_from_form(&form).unwrap();
        assert_eq!(input.status, STATUS_PADRAO);
        assert_eq!(input.cap_whats_business, 2);
        assert_eq!(input.cap_whats_normal, 0);
        assert_eq!(input.id_aparelho, None);
    }

    #[test]
    fn negative_or_garbage_capacity_is_rejected() {
        let mut form = AparelhoForm {
            modelo: Some("Moto G".into()),
            cap_whats_normal: Some("-1".into()),
            ..Default::default()
        };
        assert!(matches!(
            AparelhoInput::try_from_form(&form),
            Err(AppError::InvalidField("cap_whats_normal"))
        ));

        form.cap_whats_normal = Some("dois".into());
        assert!(AparelhoInput::try_from_form(&form).is_err());
    }
}

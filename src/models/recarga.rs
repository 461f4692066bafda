// src/models/recarga.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{
    error::AppError,
    form_utils::{clean_text, parse_date, parse_decimal, to_int},
};

// --- Linha do fato f_recarga ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Recarga {
    pub id: Uuid,
    pub sk_chip: i64,
    pub valor: Decimal,
    pub data_recarga: NaiveDate,
    pub origem: String,
    pub usuario: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RecargaForm {
    #[schema(example = "12")]
    pub sk_chip: Option<String>,
    #[schema(example = "20,00")]
    pub valor: Option<String>,
    #[schema(example = "2025-06-01")]
    pub data_recarga: Option<String>,
    pub origem: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecargaInput {
    pub sk_chip: i64,
    pub valor: Decimal,
    pub data_recarga: NaiveDate,
    pub origem: Option<String>,
}

impl RecargaInput {
    /// Valida o formulário: chip, valor positivo e data que não esteja no futuro.
    pub fn try_from_form(form: &RecargaForm, today: NaiveDate) -> Result<Self, AppError> {
        let sk_chip = to_int(form.sk_chip.as_deref()).ok_or(AppError::InvalidField("sk_chip"))?;

        let valor = parse_decimal(form.valor.as_deref(), "valor")?
            .filter(|v| *v > Decimal::ZERO)
            .ok_or(AppError::InvalidField("valor"))?;

        let data_recarga = parse_date(form.data_recarga.as_deref(), "data_recarga")?
            .filter(|d| *d <= today)
            .ok_or(AppError::InvalidField("data_recarga"))?;

        Ok(Self {
            sk_chip,
            valor,
            data_recarga,
            origem: clean_text(form.origem.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn form(valor: &str, data: &str) -> RecargaForm {
        RecargaForm {
            sk_chip: Some("7".into()),
            valor: Some(valor.into()),
            data_recarga: Some(data.into()),
            origem: None,
        }
    }

    #[test]
    fn valid_form_is_accepted() {
        let input = RecargaInput::try_from_form(&form("15,50", "2025-06-01"), today()).unwrap();
        assert_eq!(input.sk_chip, 7);
        assert_eq!(input.valor, Decimal::new(1550, 2));
        assert_eq!(input.data_recarga, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn non_positive_value_is_rejected() {
        assert!(matches!(
            RecargaInput::try_from_form(&form("0", "2025-06-01"), today()),
            Err(AppError::InvalidField("valor"))
        ));
        assert!(matches!(
            RecargaInput::try_from_form(&form("", "2025-06-01"), today()),
            Err(AppError::InvalidField("valor"))
        ));
    }

    #[test]
    fn future_date_is_rejected() {
        assert!(matches!(
            RecargaInput::try_from_form(&form("10", "2025-06-11"), today()),
            Err(AppError::InvalidField("data_recarga"))
        ));
    }

    #[test]
    fn missing_chip_is_rejected() {
        let mut f = form("10", "2025-06-01");
        f.sk_chip = Some("".into());
        assert!(matches!(
            RecargaInput::try_from_form(&f, today()),
            Err(AppError::InvalidField("sk_chip"))
        ));
    }
}

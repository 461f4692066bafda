// src/models/chip.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{
    error::AppError,
    form_utils::{clean_text, clean_upper, json_text, parse_date, parse_decimal, to_int},
};
use crate::models::relacionamento::SlotKind;

pub const STATUS_PADRAO: &str = "DISPONIVEL";

// --- Linha da dimensão dim_chip ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Chip {
    pub sk_chip: i64,
    #[schema(example = "2f1c6a0e-1f7e-4f7a-9d55-2a1f4b6b2e10")]
    pub id_chip: String,
    #[schema(example = "11988887777")]
    pub numero: String,
    #[schema(example = "Vivo")]
    pub operadora: String,
    pub operador: Option<String>,
    #[schema(example = "Controle 20GB")]
    pub plano: String,
    #[schema(example = "ATIVO")]
    pub status: String,
    #[schema(example = "BUSINESS")]
    pub tipo_whatsapp: Option<String>,
    pub dt_inicio: Option<NaiveDate>,
    pub ultima_recarga_valor: Decimal,
    pub ultima_recarga_data: Option<NaiveDate>,
    pub total_gasto: Decimal,
    pub observacao: Option<String>,
    pub sk_aparelho_atual: Option<i64>,
    pub slot_whatsapp: Option<i32>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Linha da view vw_chips_painel (chip + aparelho atual) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChipPainel {
    pub sk_chip: i64,
    pub id_chip: String,
    pub numero: String,
    pub operadora: String,
    pub operador: Option<String>,
    pub plano: String,
    pub status: String,
    pub tipo_whatsapp: Option<String>,
    pub dt_inicio: Option<NaiveDate>,
    pub ultima_recarga_data: Option<NaiveDate>,
    pub ultima_recarga_valor: Decimal,
    pub total_gasto: Decimal,
    pub observacao: Option<String>,
    pub sk_aparelho_atual: Option<i64>,
    pub slot_whatsapp: Option<i32>,
    pub ativo: bool,
    pub id_aparelho: Option<String>,
    pub modelo_aparelho: Option<String>,
    pub marca_aparelho: Option<String>,
    pub imei_aparelho: Option<String>,
    pub status_aparelho: Option<String>,
}

// Resultado do autocomplete da movimentação
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ChipBusca {
    pub sk_chip: i64,
    pub numero: String,
    pub operadora: String,
}

// ---
// Payload: formulário de chip (form-urlencoded ou JSON do modal de edição)
// ---
// Tudo chega como texto; a conversão tolerante acontece em `ChipInput::try_from_form`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ChipForm {
    pub id_chip: Option<String>,

    #[validate(
        required(message = "O número é obrigatório."),
        length(min = 1, max = 32, message = "O número deve ter entre 1 e 32 caracteres.")
    )]
    pub numero: Option<String>,

    pub operadora: Option<String>,
    pub operador: Option<String>,
    pub plano: Option<String>,
    pub status: Option<String>,
    pub tipo_whatsapp: Option<String>,
    pub dt_inicio: Option<String>,
    pub ultima_recarga_data: Option<String>,
    pub ultima_recarga_valor: Option<String>,
    pub total_gasto: Option<String>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub observacao: Option<String>,

    pub sk_aparelho_atual: Option<String>,
}

impl ChipForm {
    // O modal de edição manda números como número ou texto, indistintamente
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        let text = |key: &str| json_text(obj.get(key));
        Self {
            id_chip: text("id_chip"),
            numero: text("numero"),
            operadora: text("operadora"),
            operador: text("operador"),
            plano: text("plano"),
            status: text("status"),
            tipo_whatsapp: text("tipo_whatsapp"),
            dt_inicio: text("dt_inicio"),
            ultima_recarga_data: text("ultima_recarga_data"),
            ultima_recarga_valor: text("ultima_recarga_valor"),
            total_gasto: text("total_gasto"),
            observacao: text("observacao"),
            sk_aparelho_atual: text("sk_aparelho_atual"),
        }
    }
}

/// Valores já normalizados de um upsert de chip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipInput {
    pub id_chip: Option<String>,
    pub numero: String,
    pub operadora: String,
    pub operador: Option<String>,
    pub plano: String,
    pub status: String,
    pub tipo_whatsapp: Option<SlotKind>,
    pub dt_inicio: Option<NaiveDate>,
    pub ultima_recarga_valor: Decimal,
    pub ultima_recarga_data: Option<NaiveDate>,
    pub total_gasto: Decimal,
    pub observacao: Option<String>,
    pub sk_aparelho_atual: Option<i64>,
}

impl ChipInput {
    pub fn try_from_form(form: &ChipForm) -> Result<Self, AppError> {
        let tipo_whatsapp = match clean_upper(form.tipo_whatsapp.as_deref()) {
            None => None,
            Some(t) if t == "A DEFINIR" => None,
            Some(t) => Some(
                t.parse::<SlotKind>()
                    .map_err(|_| AppError::InvalidField("tipo_whatsapp"))?,
            ),
        };

        Ok(Self {
            id_chip: clean_text(form.id_chip.as_deref()),
            numero: clean_text(form.numero.as_deref()).ok_or(AppError::InvalidField("numero"))?,
            operadora: clean_text(form.operadora.as_deref()).unwrap_or_default(),
            operador: clean_text(form.operador.as_deref()),
            plano: clean_text(form.plano.as_deref()).unwrap_or_default(),
            status: clean_upper(form.status.as_deref()).unwrap_or_else(|| STATUS_PADRAO.to_string()),
            tipo_whatsapp,
            dt_inicio: parse_date(form.dt_inicio.as_deref(), "dt_inicio")?,
            ultima_recarga_valor: parse_decimal(
                form.ultima_recarga_valor.as_deref(),
                "ultima_recarga_valor",
            )?
            .unwrap_or(Decimal::ZERO),
            ultima_recarga_data: parse_date(
                form.ultima_recarga_data.as_deref(),
                "ultima_recarga_data",
            )?,
            total_gasto: parse_decimal(form.total_gasto.as_deref(), "total_gasto")?
                .unwrap_or(Decimal::ZERO),
            observacao: clean_text(form.observacao.as_deref()),
            sk_aparelho_atual: to_int(form.sk_aparelho_atual.as_deref()),
        })
    }
}

impl Chip {
    /// Retrato dos campos auditados, lido sempre de uma linha gravada.
    pub fn audit_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("numero", Some(self.numero.clone())),
            ("operadora", Some(self.operadora.clone())),
            ("operador", self.operador.clone()),
            ("plano", Some(self.plano.clone())),
            ("status", Some(self.status.clone())),
            ("tipo_whatsapp", self.tipo_whatsapp.clone()),
            ("dt_inicio", self.dt_inicio.map(|d| d.to_string())),
            ("ultima_recarga_valor", Some(self.ultima_recarga_valor.normalize().to_string())),
            ("ultima_recarga_data", self.ultima_recarga_data.map(|d| d.to_string())),
            ("total_gasto", Some(self.total_gasto.normalize().to_string())),
            ("observacao", self.observacao.clone()),
        ]
    }

    pub fn slot_kind(&self) -> Option<SlotKind> {
        self.tipo_whatsapp.as_deref().and_then(|t| t.parse().ok())
    }
}

// Resposta do /chips/update-json
#[derive(Debug, Serialize, ToSchema)]
pub struct ChipSaveResponse {
    pub success: bool,
    pub created: bool,
    pub chip: Chip,
    pub changes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::diff_fields;

    fn form() -> ChipForm {
        ChipForm {
            numero: Some(" 11999990000 ".into()),
            operadora: Some("Claro".into()),
            status: Some("ativo".into()),
            tipo_whatsapp: Some("business".into()),
            ultima_recarga_valor: Some("19,90".into()),
            ultima_recarga_data: Some("2025-01-10".into()),
            total_gasto: Some("".into()),
            sk_aparelho_atual: Some("None".into()),
            ..Default::default()
        }
    }

    #[test]
    fn form_is_normalized() {
        let input = ChipInput::try_from_form(&form()).unwrap();
        assert_eq!(input.numero, "11999990000");
        assert_eq!(input.status, "ATIVO");
        assert_eq!(input.tipo_whatsapp, Some(SlotKind::Business));
        assert_eq!(input.ultima_recarga_valor, Decimal::new(1990, 2));
        assert_eq!(input.total_gasto, Decimal::ZERO);
        assert_eq!(input.sk_aparelho_atual, None);
        assert_eq!(input.id_chip, None);
    }

    #[test]
    fn blank_status_defaults_to_available() {
        let mut f = form();
        f.status = Some("  ".into());
        let input = ChipInput::try_from_form(&f).unwrap();
        assert_eq!(input.status, STATUS_PADRAO);
    }

    #[test]
    fn unknown_whatsapp_type_is_rejected() {
        let mut f = form();
        f.tipo_whatsapp = Some("premium".into());
        assert!(matches!(
            ChipInput::try_from_form(&f),
            Err(AppError::InvalidField("tipo_whatsapp"))
        ));
    }

    #[test]
    fn undefined_whatsapp_type_means_none() {
        let mut f = form();
        f.tipo_whatsapp = Some("A DEFINIR".into());
        assert_eq!(ChipInput::try_from_form(&f).unwrap().tipo_whatsapp, None);
    }

    #[test]
    fn json_body_accepts_numbers_and_text() {
        let body = serde_json::json!({
            "id_chip": "abc",
            "numero": 11977776666u64,
            "total_gasto": 35.5,
            "sk_aparelho_atual": "4",
            "observacao": null
        });
        let form = ChipForm::from_json(body.as_object().unwrap());
        assert_eq!(form.numero.as_deref(), Some("11977776666"));
        assert_eq!(form.observacao, None);

        let input = ChipInput::try_from_form(&form).unwrap();
        assert_eq!(input.id_chip.as_deref(), Some("abc"));
        assert_eq!(input.total_gasto, Decimal::new(355, 1));
        assert_eq!(input.sk_aparelho_atual, Some(4));
    }

    fn stored(valor: Decimal) -> Chip {
        Chip {
            sk_chip: 1,
            id_chip: "abc".into(),
            numero: "11999990000".into(),
            operadora: "Claro".into(),
            operador: None,
            plano: String::new(),
            status: "ATIVO".into(),
            tipo_whatsapp: Some("BUSINESS".into()),
            dt_inicio: None,
            ultima_recarga_valor: valor,
            ultima_recarga_data: NaiveDate::from_ymd_opt(2025, 1, 10),
            total_gasto: Decimal::ZERO,
            observacao: None,
            sk_aparelho_atual: None,
            slot_whatsapp: None,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn money_is_rounded_to_cents() {
        let mut f = form();
        f.ultima_recarga_valor = Some("19,999".into());
        let input = ChipInput::try_from_form(&f).unwrap();
        assert_eq!(input.ultima_recarga_valor, Decimal::new(2000, 2));

        // NUMERIC(12,2) devolve 20.00; regravar o mesmo valor não é alteração
        let before = stored(Decimal::new(2000, 2));
        let after = stored(input.ultima_recarga_valor);
        assert!(diff_fields(&before.audit_fields(), &after.audit_fields()).is_empty());
    }

    #[test]
    fn missing_number_fails_validation() {
        let mut f = form();
        f.numero = None;
        assert!(f.validate().is_err());
        f.numero = Some(String::new());
        assert!(f.validate().is_err());
    }
}

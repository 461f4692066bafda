// src/models/relacionamento.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// Tipo de slot de WhatsApp de um aparelho
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotKind {
    Business, // "BUSINESS"
    Normal,   // "NORMAL"
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Business => "BUSINESS",
            SlotKind::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUSINESS" => Ok(SlotKind::Business),
            "NORMAL" => Ok(SlotKind::Normal),
            other => Err(format!("tipo de WhatsApp desconhecido: {other}")),
        }
    }
}

// --- Linha da view vw_relacionamentos_whatsapp (aparelho + chip vinculado, se houver) ---
#[derive(Debug, Clone, FromRow)]
pub struct RelacionamentoRow {
    pub sk_aparelho: i64,
    pub marca: String,
    pub modelo: String,
    pub cap_whats_business: i32,
    pub cap_whats_normal: i32,
    pub sk_chip: Option<i64>,
    pub numero: Option<String>,
    pub operadora: Option<String>,
    pub tipo_whatsapp: Option<String>,
    pub slot_whatsapp: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SlotChip {
    pub sk_chip: i64,
    pub numero: String,
    pub operadora: String,
    pub tipo_whatsapp: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Slot {
    pub slot: i32,
    pub tipo: SlotKind,
    pub chip: Option<SlotChip>,
}

// Um aparelho com a sua grade de slots numerados
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceSlots {
    pub sk_aparelho: i64,
    pub marca: String,
    pub modelo: String,
    pub capacidade_total: i32,
    pub cap_whats_business: i32,
    pub cap_whats_normal: i32,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ChipLivre {
    pub sk_chip: i64,
    pub numero: String,
    pub operadora: String,
    pub tipo_whatsapp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RelacionamentosView {
    pub aparelhos: Vec<DeviceSlots>,
    pub chips_livres: Vec<ChipLivre>,
}

// Capacidade declarada de um aparelho
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct DeviceCapacity {
    pub sk_aparelho: i64,
    pub cap_whats_business: i32,
    pub cap_whats_normal: i32,
    pub ativo: bool,
}

impl DeviceCapacity {
    pub fn total(&self) -> i32 {
        self.cap_whats_business.max(0) + self.cap_whats_normal.max(0)
    }
}

// Chip ocupando um slot de um aparelho
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SlotOccupant {
    pub sk_chip: i64,
    pub slot_whatsapp: i32,
    pub tipo_whatsapp: Option<String>,
}

// O que precisamos saber de um chip para vinculá-lo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipLinkState {
    pub sk_chip: i64,
    pub ativo: bool,
    pub tipo_whatsapp: Option<SlotKind>,
    pub sk_aparelho_atual: Option<i64>,
    pub slot_whatsapp: Option<i32>,
}

// Resultado da validação de um vínculo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPlan {
    Link { slot: i32, kind: SlotKind },
    AlreadyLinked,
}

// ---
// Payloads (JSON). Os ids aceitam número ou texto, como o front-end envia.
// ---
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VincularPayload {
    #[schema(value_type = Option<i64>, example = 12)]
    pub sk_chip: Option<Value>,
    #[schema(value_type = Option<i64>, example = 3)]
    pub sk_aparelho: Option<Value>,
    #[schema(value_type = Option<i32>, example = 1)]
    pub slot: Option<Value>,
    pub origem: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DesvincularPayload {
    #[schema(value_type = Option<i64>, example = 12)]
    pub sk_chip: Option<Value>,
    pub origem: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

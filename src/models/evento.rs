// src/models/evento.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ORIGEM_PAINEL: &str = "Painel";

// Tipos de evento gravados pelo próprio painel. Movimentos manuais podem usar outros.
pub mod tipo {
    pub const CRIACAO: &str = "CRIACAO";
    pub const EDICAO: &str = "EDICAO";
    pub const STATUS: &str = "STATUS";
    pub const VINCULO: &str = "VINCULO";
    pub const DESVINCULO: &str = "DESVINCULO";
    pub const RECARGA: &str = "RECARGA";
}

// --- Linha do fato f_chip_evento (append-only) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ChipEvento {
    pub id: Uuid,
    pub sk_chip: i64,
    pub sk_aparelho: Option<i64>,
    #[schema(example = "STATUS")]
    pub tipo_evento: String,
    #[schema(example = "status")]
    pub campo: Option<String>,
    #[schema(example = "MATURANDO")]
    pub valor_antigo: Option<String>,
    #[schema(example = "ATIVO")]
    pub valor_novo: Option<String>,
    pub origem: String,
    pub observacao: String,
    pub usuario: Option<String>,
    pub data_evento: DateTime<Utc>,
}

// --- Linha da view vw_chip_timeline ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub sk_chip: i64,
    pub numero: String,
    pub sk_aparelho: Option<i64>,
    pub modelo_aparelho: Option<String>,
    pub tipo_evento: String,
    pub campo: Option<String>,
    pub valor_antigo: Option<String>,
    pub valor_novo: Option<String>,
    pub origem: String,
    pub observacao: String,
    pub usuario: Option<String>,
    pub data_evento: DateTime<Utc>,
}

/// Evento a gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvento {
    pub sk_chip: i64,
    pub sk_aparelho: Option<i64>,
    pub tipo_evento: String,
    pub campo: Option<String>,
    pub valor_antigo: Option<String>,
    pub valor_novo: Option<String>,
    pub origem: String,
    pub observacao: String,
}

impl NewEvento {
    pub fn new(sk_chip: i64, tipo_evento: &str) -> Self {
        Self {
            sk_chip,
            sk_aparelho: None,
            tipo_evento: tipo_evento.to_string(),
            campo: None,
            valor_antigo: None,
            valor_novo: None,
            origem: ORIGEM_PAINEL.to_string(),
            observacao: String::new(),
        }
    }

    pub fn aparelho(mut self, sk_aparelho: Option<i64>) -> Self {
        self.sk_aparelho = sk_aparelho;
        self
    }

    pub fn campo(mut self, campo: &str) -> Self {
        self.campo = Some(campo.to_string());
        self
    }

    pub fn valores(mut self, antigo: Option<String>, novo: Option<String>) -> Self {
        self.valor_antigo = antigo;
        self.valor_novo = novo;
        self
    }

    pub fn origem(mut self, origem: Option<String>) -> Self {
        if let Some(o) = origem {
            self.origem = o;
        }
        self
    }

    pub fn observacao(mut self, observacao: impl Into<String>) -> Self {
        self.observacao = observacao.into();
        self
    }
}

// Payload do movimento manual (/chips/movimento)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MovimentoPayload {
    #[schema(value_type = Option<i64>, example = 12)]
    pub sk_chip: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub sk_aparelho: Option<Value>,
    #[schema(example = "MANUTENCAO")]
    pub tipo: Option<String>,
    pub origem: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovimentoResponse {
    pub success: bool,
    pub evento: ChipEvento,
}

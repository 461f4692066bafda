// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::chip::ChipPainel;

// 1. Os Cards do Topo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardKpis {
    pub total_chips: usize,
    pub chips_ativos: usize,
    pub disparando: usize,
    pub banidos: usize,
}

// 2. Chip há muito tempo sem recarga
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RechargeAlert {
    pub sk_chip: i64,
    pub numero: String,
    pub status: String,
    pub operadora: String,
    pub ultima_recarga_data: NaiveDate,
    pub ultima_recarga_valor: Decimal,
    pub dias_sem_recarga: i64,
}

// 3. A página inteira do dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub tabela: Vec<ChipPainel>,
    #[serde(flatten)]
    pub kpis: DashboardKpis,
    pub lista_status: Vec<String>,
    pub lista_operadora: Vec<String>,
    pub limite_dias_recarga: i64,
    pub alerta_recarga: Vec<RechargeAlert>,
    pub qtd_alerta: usize,
}

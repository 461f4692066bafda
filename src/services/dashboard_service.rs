// src/services/dashboard_service.rs

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::{
    common::error::AppError,
    db::ChipRepository,
    models::{
        chip::ChipPainel,
        dashboard::{DashboardKpis, DashboardOverview, RechargeAlert},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    chip_repo: ChipRepository,
    limite_dias_recarga: i64,
}

impl DashboardService {
    pub fn new(chip_repo: ChipRepository, limite_dias_recarga: i64) -> Self {
        Self { chip_repo, limite_dias_recarga }
    }

    pub async fn overview(&self, today: NaiveDate) -> Result<DashboardOverview, AppError> {
        let tabela = self.chip_repo.list_painel().await?;
        Ok(build_overview(tabela, today, self.limite_dias_recarga))
    }
}

/// Monta a página do dashboard a partir das linhas da view.
pub fn build_overview(tabela: Vec<ChipPainel>, today: NaiveDate, limite: i64) -> DashboardOverview {
    let kpis = compute_kpis(&tabela);
    // status comparam sem caixa, como nos KPIs
    let lista_status = distinct_sorted(tabela.iter().map(|c| c.status.trim().to_uppercase()));
    let lista_operadora = distinct_sorted(tabela.iter().map(|c| c.operadora.trim().to_string()));
    let alerta_recarga = recharge_alerts(&tabela, today, limite);
    let qtd_alerta = alerta_recarga.len();

    DashboardOverview {
        tabela,
        kpis,
        lista_status,
        lista_operadora,
        limite_dias_recarga: limite,
        alerta_recarga,
        qtd_alerta,
    }
}

pub fn compute_kpis(chips: &[ChipPainel]) -> DashboardKpis {
    let count = |status: &str| {
        chips
            .iter()
            .filter(|c| c.status.trim().eq_ignore_ascii_case(status))
            .count()
    };
    DashboardKpis {
        total_chips: chips.len(),
        chips_ativos: count("ATIVO"),
        disparando: count("DISPARANDO"),
        banidos: count("BANIDO"),
    }
}

pub fn days_since(today: NaiveDate, date: NaiveDate) -> i64 {
    (today - date).num_days()
}

/// Chips com a última recarga há mais de `limite` dias, do mais antigo para o mais recente.
pub fn recharge_alerts(chips: &[ChipPainel], today: NaiveDate, limite: i64) -> Vec<RechargeAlert> {
    let mut alerts: Vec<RechargeAlert> = chips
        .iter()
        .filter_map(|c| {
            let data = c.ultima_recarga_data?;
            let dias = days_since(today, data);
            (dias > limite).then(|| RechargeAlert {
                sk_chip: c.sk_chip,
                numero: c.numero.clone(),
                status: c.status.clone(),
                operadora: c.operadora.clone(),
                ultima_recarga_data: data,
                ultima_recarga_valor: c.ultima_recarga_valor,
                dias_sem_recarga: dias,
            })
        })
        .collect();
    alerts.sort_by(|a, b| b.dias_sem_recarga.cmp(&a.dias_sem_recarga));
    alerts
}

// Valores distintos, ordenados, sem vazios
fn distinct_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// src/services/aparelho_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AparelhoRepository, ChipRepository},
    models::aparelho::{Aparelho, AparelhoInput, AparelhoResumo},
    services::slots,
};

#[derive(Clone)]
pub struct AparelhoService {
    aparelho_repo: AparelhoRepository,
    chip_repo: ChipRepository,
}

impl AparelhoService {
    pub fn new(aparelho_repo: AparelhoRepository, chip_repo: ChipRepository) -> Self {
        Self { aparelho_repo, chip_repo }
    }

    pub async fn list(&self) -> Result<Vec<AparelhoResumo>, AppError> {
        self.aparelho_repo.list_resumo().await
    }

    /// Cria ou atualiza o aparelho. Uma capacidade nova precisa continuar
    /// comportando os chips que já estão nos slots.
    pub async fn save<'e, E>(&self, executor: E, input: &AparelhoInput) -> Result<Aparelho, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let id_aparelho = input
            .id_aparelho
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some(existing) = self
            .aparelho_repo
            .find_by_id_for_update(&mut *tx, &id_aparelho)
            .await?
        {
            let occupants = self
                .chip_repo
                .list_occupants(&mut *tx, existing.sk_aparelho)
                .await?;
            slots::check_capacity_change(
                existing.cap_whats_business,
                input.cap_whats_business,
                input.cap_whats_normal,
                &occupants,
            )?;
        }

        let aparelho = self.aparelho_repo.upsert(&mut *tx, &id_aparelho, input).await?;

        tx.commit().await?;

        tracing::info!("Aparelho {} salvo ({})", aparelho.id_aparelho, aparelho.modelo);
        Ok(aparelho)
    }
}

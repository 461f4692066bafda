// src/services/recarga_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{ChipRepository, EventoRepository, RecargaRepository},
    models::{
        evento::{tipo, NewEvento, ORIGEM_PAINEL},
        recarga::{Recarga, RecargaInput},
    },
};

#[derive(Clone)]
pub struct RecargaService {
    recarga_repo: RecargaRepository,
    chip_repo: ChipRepository,
    evento_repo: EventoRepository,
}

impl RecargaService {
    pub fn new(
        recarga_repo: RecargaRepository,
        chip_repo: ChipRepository,
        evento_repo: EventoRepository,
    ) -> Self {
        Self { recarga_repo, chip_repo, evento_repo }
    }

    /// Registra a recarga, atualiza os totais do chip e grava o evento, tudo ou nada.
    pub async fn registrar<'e, E>(
        &self,
        executor: E,
        input: &RecargaInput,
        usuario: Option<&str>,
    ) -> Result<Recarga, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let chip = self
            .chip_repo
            .find_by_sk_for_update(&mut *tx, input.sk_chip)
            .await?
            .ok_or_else(|| AppError::ChipNotFound(input.sk_chip.to_string()))?;

        let origem = input.origem.as_deref().unwrap_or(ORIGEM_PAINEL);
        let recarga = self.recarga_repo.insert(&mut *tx, input, origem, usuario).await?;

        let atualizado = self
            .chip_repo
            .apply_recarga(&mut *tx, chip.sk_chip, input.valor, input.data_recarga)
            .await?;

        let evento = NewEvento::new(chip.sk_chip, tipo::RECARGA)
            .aparelho(chip.sk_aparelho_atual)
            .valores(
                Some(chip.total_gasto.normalize().to_string()),
                Some(atualizado.total_gasto.normalize().to_string()),
            )
            .origem(Some(origem.to_string()))
            .observacao(format!(
                "Recarga de {} em {}",
                input.valor.normalize(),
                input.data_recarga.format("%d/%m/%Y")
            ));
        self.evento_repo.insert(&mut *tx, &evento, usuario).await?;

        tx.commit().await?;

        tracing::info!("Recarga de {} registrada para o chip {}", input.valor, chip.sk_chip);
        Ok(recarga)
    }
}

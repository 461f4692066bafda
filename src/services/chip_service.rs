// src/services/chip_service.rs

use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        form_utils::{clean_text, clean_upper, json_id},
    },
    db::{AparelhoRepository, ChipRepository, EventoRepository, RecargaRepository},
    models::{
        chip::{Chip, ChipBusca, ChipInput, ChipPainel},
        evento::{tipo, ChipEvento, MovimentoPayload, NewEvento, TimelineEntry},
        recarga::Recarga,
        relacionamento::{ChipLinkState, LinkPlan},
    },
    services::{audit::diff_fields, slots},
};

// Resultado de um upsert de chip
#[derive(Debug)]
pub struct ChipSaved {
    pub chip: Chip,
    pub created: bool,
    pub changes: usize,
}

impl From<&Chip> for ChipLinkState {
    fn from(chip: &Chip) -> Self {
        Self {
            sk_chip: chip.sk_chip,
            ativo: chip.ativo,
            tipo_whatsapp: chip.slot_kind(),
            sk_aparelho_atual: chip.sk_aparelho_atual,
            slot_whatsapp: chip.slot_whatsapp,
        }
    }
}

#[derive(Clone)]
pub struct ChipService {
    chip_repo: ChipRepository,
    aparelho_repo: AparelhoRepository,
    evento_repo: EventoRepository,
    recarga_repo: RecargaRepository,
}

impl ChipService {
    pub fn new(
        chip_repo: ChipRepository,
        aparelho_repo: AparelhoRepository,
        evento_repo: EventoRepository,
        recarga_repo: RecargaRepository,
    ) -> Self {
        Self { chip_repo, aparelho_repo, evento_repo, recarga_repo }
    }

    pub async fn list_painel(&self) -> Result<Vec<ChipPainel>, AppError> {
        self.chip_repo.list_painel().await
    }

    pub async fn get_by_id_chip(&self, id_chip: &str) -> Result<ChipPainel, AppError> {
        self.chip_repo
            .find_painel_by_id_chip(id_chip)
            .await?
            .ok_or_else(|| AppError::ChipNotFound(id_chip.to_string()))
    }

    pub async fn buscar(&self, termo: &str, limite: i64) -> Result<Vec<ChipBusca>, AppError> {
        self.chip_repo.search_by_numero(termo, limite).await
    }

    pub async fn timeline(&self, sk_chip: i64) -> Result<Vec<TimelineEntry>, AppError> {
        self.evento_repo.list_timeline(sk_chip).await
    }

    pub async fn recargas(&self, sk_chip: i64) -> Result<Vec<Recarga>, AppError> {
        self.recarga_repo.list_by_chip(sk_chip).await
    }

    // ---
    // Upsert com auditoria
    // ---
    // Trava o chip, compara, grava e registra um evento por campo alterado.
    // Mudança de aparelho passa pelo mesmo caminho do vínculo/desvínculo.
    pub async fn save<'e, E>(
        &self,
        executor: E,
        input: &ChipInput,
        usuario: Option<&str>,
    ) -> Result<ChipSaved, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let existing = match input.id_chip.as_deref() {
            Some(id_chip) => self.chip_repo.find_by_id_chip_for_update(&mut *tx, id_chip).await?,
            None => None,
        };

        let (mut chip, created, changes) = match existing {
            Some(before) => {
                let after = self.chip_repo.update_fields(&mut *tx, before.sk_chip, input).await?;
                // Compara com a linha gravada, já com o arredondamento do banco
                let changes = diff_fields(&before.audit_fields(), &after.audit_fields());
                let total = changes.len();
                for change in changes {
                    let evento = change.into_evento(after.sk_chip, after.sk_aparelho_atual);
                    self.evento_repo.insert(&mut *tx, &evento, usuario).await?;
                }
                (after, false, total)
            }
            None => {
                let id_chip = input
                    .id_chip
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let chip = self.chip_repo.insert(&mut *tx, &id_chip, input).await?;
                let evento = NewEvento::new(chip.sk_chip, tipo::CRIACAO)
                    .valores(None, Some(chip.numero.clone()))
                    .observacao("Chip cadastrado");
                self.evento_repo.insert(&mut *tx, &evento, usuario).await?;
                (chip, true, 0)
            }
        };

        chip = self
            .route_device(&mut tx, chip, input.sk_aparelho_atual, usuario)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Chip {} salvo (novo: {}, alterações: {})",
            chip.id_chip,
            created,
            changes
        );
        Ok(ChipSaved { chip, created, changes })
    }

    // Leva o chip ao aparelho pedido no formulário (ou o tira do atual)
    async fn route_device(
        &self,
        conn: &mut PgConnection,
        chip: Chip,
        desired: Option<i64>,
        usuario: Option<&str>,
    ) -> Result<Chip, AppError> {
        let current = chip.sk_aparelho_atual;

        if desired == current {
            // Continua no mesmo aparelho: o tipo do chip ainda precisa bater com o slot
            if let (Some(sk_aparelho), Some(slot), Some(found)) =
                (current, chip.slot_whatsapp, chip.slot_kind())
            {
                let device = self
                    .aparelho_repo
                    .find_capacity_for_update(&mut *conn, sk_aparelho)
                    .await?
                    .ok_or(AppError::DeviceNotFound(sk_aparelho))?;
                let expected = slots::slot_kind(slot, device.cap_whats_business);
                if expected != found {
                    return Err(AppError::SlotTypeMismatch { slot, expected, found });
                }
            }
            return Ok(chip);
        }

        let mut chip = chip;
        if let (Some(sk_aparelho), Some(slot)) = (current, chip.slot_whatsapp) {
            chip = self.chip_repo.set_slot(&mut *conn, chip.sk_chip, None).await?;
            let evento = NewEvento::new(chip.sk_chip, tipo::DESVINCULO)
                .aparelho(Some(sk_aparelho))
                .valores(Some(format!("{sk_aparelho}:{slot}")), None)
                .observacao("Chip removido do aparelho na edição");
            self.evento_repo.insert(&mut *conn, &evento, usuario).await?;
        }

        let Some(sk_aparelho) = desired else {
            return Ok(chip);
        };

        let device = self
            .aparelho_repo
            .find_capacity_for_update(&mut *conn, sk_aparelho)
            .await?
            .ok_or(AppError::DeviceNotFound(sk_aparelho))?;
        if !device.ativo {
            return Err(AppError::DeviceInactive(sk_aparelho));
        }
        let occupants = self.chip_repo.list_occupants(&mut *conn, sk_aparelho).await?;

        let slot = slots::first_free_slot(&device, &occupants, chip.slot_kind())
            .ok_or(AppError::NoFreeSlot(sk_aparelho))?;

        match slots::check_link(&device, &occupants, &ChipLinkState::from(&chip), slot)? {
            LinkPlan::AlreadyLinked => Ok(chip),
            LinkPlan::Link { slot, kind } => {
                let chip = self
                    .chip_repo
                    .set_slot(&mut *conn, chip.sk_chip, Some((sk_aparelho, slot)))
                    .await?;
                let evento = NewEvento::new(chip.sk_chip, tipo::VINCULO)
                    .aparelho(Some(sk_aparelho))
                    .valores(None, Some(format!("{sk_aparelho}:{slot}")))
                    .observacao(format!("Chip vinculado ao slot {slot} ({kind}) na edição"));
                self.evento_repo.insert(&mut *conn, &evento, usuario).await?;
                Ok(chip)
            }
        }
    }

    // ---
    // Movimento manual (linha livre na timeline)
    // ---
    pub async fn movimento<'e, E>(
        &self,
        executor: E,
        payload: &MovimentoPayload,
        usuario: Option<&str>,
    ) -> Result<ChipEvento, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (sk_chip, tipo_evento) = validate_movimento(payload)?;

        let mut tx = executor.begin().await?;

        let chip = self
            .chip_repo
            .find_by_sk_for_update(&mut *tx, sk_chip)
            .await?
            .ok_or_else(|| AppError::ChipNotFound(sk_chip.to_string()))?;

        // Sem aparelho explícito, o evento fica com o aparelho atual do chip
        let sk_aparelho = json_id(payload.sk_aparelho.as_ref()).or(chip.sk_aparelho_atual);

        let evento = NewEvento::new(chip.sk_chip, &tipo_evento)
            .aparelho(sk_aparelho)
            .origem(clean_text(payload.origem.as_deref()))
            .observacao(clean_text(payload.observacao.as_deref()).unwrap_or_default());
        let evento = self.evento_repo.insert(&mut *tx, &evento, usuario).await?;

        tx.commit().await?;

        tracing::info!("Movimento {} registrado para o chip {}", evento.tipo_evento, sk_chip);
        Ok(evento)
    }
}

/// Campos obrigatórios do movimento: chip e tipo.
pub fn validate_movimento(payload: &MovimentoPayload) -> Result<(i64, String), AppError> {
    let sk_chip = json_id(payload.sk_chip.as_ref()).ok_or(AppError::InvalidField("sk_chip"))?;
    let tipo_evento = clean_upper(payload.tipo.as_deref()).ok_or(AppError::InvalidField("tipo"))?;
    Ok((sk_chip, tipo_evento))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movimento_requires_chip_and_type() {
        let payload = MovimentoPayload {
            sk_chip: Some(json!("12")),
            tipo: Some(" manutencao ".into()),
            ..Default::default()
        };
        assert_eq!(validate_movimento(&payload).unwrap(), (12, "MANUTENCAO".to_string()));

        let sem_tipo = MovimentoPayload { sk_chip: Some(json!(12)), ..Default::default() };
        assert!(matches!(validate_movimento(&sem_tipo), Err(AppError::InvalidField("tipo"))));

        let sem_chip = MovimentoPayload { tipo: Some("TROCA".into()), ..Default::default() };
        assert!(matches!(validate_movimento(&sem_chip), Err(AppError::InvalidField("sk_chip"))));
    }
}

// src/services/relacionamento_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        form_utils::{clean_text, json_id},
    },
    db::{AparelhoRepository, ChipRepository, EventoRepository},
    models::{
        chip::Chip,
        evento::{tipo, NewEvento},
        relacionamento::{
            ChipLinkState, DesvincularPayload, LinkPlan, RelacionamentosView, VincularPayload,
        },
    },
    services::slots,
};

// Pedido de vínculo já convertido
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VincularRequest {
    pub sk_chip: i64,
    pub sk_aparelho: i64,
    pub slot: i32,
    pub origem: Option<String>,
    pub observacao: Option<String>,
}

impl VincularRequest {
    pub fn try_from_payload(payload: &VincularPayload) -> Result<Self, AppError> {
        let sk_chip = json_id(payload.sk_chip.as_ref()).ok_or(AppError::InvalidField("sk_chip"))?;
        let sk_aparelho =
            json_id(payload.sk_aparelho.as_ref()).ok_or(AppError::InvalidField("sk_aparelho"))?;
        let slot = json_id(payload.slot.as_ref())
            .and_then(|s| i32::try_from(s).ok())
            .ok_or(AppError::InvalidField("slot"))?;
        Ok(Self {
            sk_chip,
            sk_aparelho,
            slot,
            origem: clean_text(payload.origem.as_deref()),
            observacao: clean_text(payload.observacao.as_deref()),
        })
    }
}

#[derive(Clone)]
pub struct RelacionamentoService {
    chip_repo: ChipRepository,
    aparelho_repo: AparelhoRepository,
    evento_repo: EventoRepository,
}

impl RelacionamentoService {
    pub fn new(
        chip_repo: ChipRepository,
        aparelho_repo: AparelhoRepository,
        evento_repo: EventoRepository,
    ) -> Self {
        Self { chip_repo, aparelho_repo, evento_repo }
    }

    pub async fn view(&self) -> Result<RelacionamentosView, AppError> {
        let rows = self.aparelho_repo.list_relacionamentos().await?;
        let chips_livres = self.chip_repo.list_free().await?;
        Ok(RelacionamentosView {
            aparelhos: slots::group_device_slots(&rows),
            chips_livres,
        })
    }

    // ---
    // Vínculo: chip e aparelho travados na mesma transação
    // ---
    pub async fn vincular<'e, E>(
        &self,
        executor: E,
        req: &VincularRequest,
        usuario: Option<&str>,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let chip = self
            .chip_repo
            .find_by_sk_for_update(&mut *tx, req.sk_chip)
            .await?
            .ok_or_else(|| AppError::ChipNotFound(req.sk_chip.to_string()))?;

        let device = self
            .aparelho_repo
            .find_capacity_for_update(&mut *tx, req.sk_aparelho)
            .await?
            .ok_or(AppError::DeviceNotFound(req.sk_aparelho))?;

        let occupants = self.chip_repo.list_occupants(&mut *tx, req.sk_aparelho).await?;

        let chip = match slots::check_link(&device, &occupants, &ChipLinkState::from(&chip), req.slot)? {
            LinkPlan::AlreadyLinked => chip,
            LinkPlan::Link { slot, kind } => {
                let linked = self
                    .chip_repo
                    .set_slot(&mut *tx, chip.sk_chip, Some((req.sk_aparelho, slot)))
                    .await?;
                let observacao = req
                    .observacao
                    .clone()
                    .unwrap_or_else(|| format!("Chip vinculado ao slot {slot} ({kind})"));
                let evento = NewEvento::new(linked.sk_chip, tipo::VINCULO)
                    .aparelho(Some(req.sk_aparelho))
                    .valores(None, Some(format!("{}:{slot}", req.sk_aparelho)))
                    .origem(req.origem.clone())
                    .observacao(observacao);
                self.evento_repo.insert(&mut *tx, &evento, usuario).await?;
                tracing::info!(
                    "Chip {} vinculado ao aparelho {} (slot {})",
                    linked.sk_chip,
                    req.sk_aparelho,
                    slot
                );
                linked
            }
        };

        tx.commit().await?;
        Ok(chip)
    }

    pub async fn desvincular<'e, E>(
        &self,
        executor: E,
        payload: &DesvincularPayload,
        usuario: Option<&str>,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let sk_chip = json_id(payload.sk_chip.as_ref()).ok_or(AppError::InvalidField("sk_chip"))?;

        let mut tx = executor.begin().await?;

        let chip = self
            .chip_repo
            .find_by_sk_for_update(&mut *tx, sk_chip)
            .await?
            .ok_or_else(|| AppError::ChipNotFound(sk_chip.to_string()))?;

        let (Some(sk_aparelho), Some(slot)) = (chip.sk_aparelho_atual, chip.slot_whatsapp) else {
            return Err(AppError::ChipNotLinked(sk_chip));
        };

        let chip = self.chip_repo.set_slot(&mut *tx, sk_chip, None).await?;
        let evento = NewEvento::new(sk_chip, tipo::DESVINCULO)
            .aparelho(Some(sk_aparelho))
            .valores(Some(format!("{sk_aparelho}:{slot}")), None)
            .origem(clean_text(payload.origem.as_deref()))
            .observacao(
                clean_text(payload.observacao.as_deref())
                    .unwrap_or_else(|| format!("Chip removido do slot {slot}")),
            );
        self.evento_repo.insert(&mut *tx, &evento, usuario).await?;

        tx.commit().await?;

        tracing::info!("Chip {} desvinculado do aparelho {}", sk_chip, sk_aparelho);
        Ok(chip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_ids_are_accepted() {
        let payload = VincularPayload {
            sk_chip: Some(json!("12")),
            sk_aparelho: Some(json!(3)),
            slot: Some(json!("2.0")),
            ..Default::default()
        };
        let req = VincularRequest::try_from_payload(&payload).unwrap();
        assert_eq!((req.sk_chip, req.sk_aparelho, req.slot), (12, 3, 2));
        assert_eq!(req.origem, None);
    }

    #[test]
    fn missing_values_are_rejected() {
        let payload = VincularPayload {
            sk_chip: Some(json!(12)),
            sk_aparelho: Some(json!("")),
            slot: Some(json!(1)),
            ..Default::default()
        };
        assert!(matches!(
            VincularRequest::try_from_payload(&payload),
            Err(AppError::InvalidField("sk_aparelho"))
        ));

        let payload = VincularPayload {
            sk_chip: Some(json!(12)),
            sk_aparelho: Some(json!(3)),
            slot: None,
            ..Default::default()
        };
        assert!(matches!(
            VincularRequest::try_from_payload(&payload),
            Err(AppError::InvalidField("slot"))
        ));
    }

    #[test]
    fn zero_ids_are_rejected() {
        let payload = VincularPayload {
            sk_chip: Some(json!(0)),
            sk_aparelho: Some(json!(3)),
            slot: Some(json!(1)),
            ..Default::default()
        };
        assert!(matches!(
            VincularRequest::try_from_payload(&payload),
            Err(AppError::InvalidField("sk_chip"))
        ));

        let payload = VincularPayload {
            sk_chip: Some(json!(12)),
            sk_aparelho: Some(json!("0")),
            slot: Some(json!(1)),
            ..Default::default()
        };
        assert!(matches!(
            VincularRequest::try_from_payload(&payload),
            Err(AppError::InvalidField("sk_aparelho"))
        ));
    }
}

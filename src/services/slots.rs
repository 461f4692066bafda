// src/services/slots.rs
//
// Regras dos slots de WhatsApp de um aparelho. Os slots 1..=cap_whats_business são
// BUSINESS, os seguintes (até a capacidade total) são NORMAL.

use std::collections::BTreeMap;

use crate::{
    common::error::AppError,
    models::relacionamento::{
        ChipLinkState, DeviceCapacity, DeviceSlots, LinkPlan, RelacionamentoRow, Slot, SlotChip,
        SlotKind, SlotOccupant,
    },
};

pub fn slot_kind(slot: i32, cap_business: i32) -> SlotKind {
    if slot <= cap_business {
        SlotKind::Business
    } else {
        SlotKind::Normal
    }
}

/// Monta a grade de slots de cada aparelho a partir das linhas da view de relacionamentos.
///
/// Linhas sem chip, sem slot ou com slot fora da capacidade são ignoradas. Um chip sem
/// `tipo_whatsapp` definido assume o tipo do slot onde está.
pub fn group_device_slots(rows: &[RelacionamentoRow]) -> Vec<DeviceSlots> {
    let mut grouped: BTreeMap<i64, Vec<&RelacionamentoRow>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.sk_aparelho > 0) {
        grouped.entry(row.sk_aparelho).or_default().push(row);
    }

    grouped
        .into_iter()
        .map(|(sk_aparelho, group)| {
            let first = group[0];
            let cap_bus = first.cap_whats_business.max(0);
            let cap_norm = first.cap_whats_normal.max(0);
            let capacidade_total = cap_bus + cap_norm;

            let mut slots: Vec<Slot> = (1..=capacidade_total)
                .map(|slot| Slot { slot, tipo: slot_kind(slot, cap_bus), chip: None })
                .collect();

            for row in &group {
                let (Some(sk_chip), Some(slot)) = (row.sk_chip, row.slot_whatsapp) else {
                    continue;
                };
                if slot < 1 || slot > capacidade_total {
                    continue;
                }
                let entry = &mut slots[(slot - 1) as usize];
                let tipo_whatsapp = row
                    .tipo_whatsapp
                    .as_deref()
                    .and_then(|t| t.parse::<SlotKind>().ok())
                    .unwrap_or(entry.tipo);

                entry.chip = Some(SlotChip {
                    sk_chip,
                    numero: row.numero.clone().unwrap_or_default(),
                    operadora: row.operadora.clone().unwrap_or_default(),
                    tipo_whatsapp,
                });
            }

            DeviceSlots {
                sk_aparelho,
                marca: first.marca.clone(),
                modelo: first.modelo.clone(),
                capacidade_total,
                cap_whats_business: cap_bus,
                cap_whats_normal: cap_norm,
                slots,
            }
        })
        .collect()
}

/// Valida o vínculo de `chip` ao `slot` de `device`, dados os ocupantes atuais do aparelho.
pub fn check_link(
    device: &DeviceCapacity,
    occupants: &[SlotOccupant],
    chip: &ChipLinkState,
    slot: i32,
) -> Result<LinkPlan, AppError> {
    if !chip.ativo {
        return Err(AppError::ChipInactive(chip.sk_chip));
    }
    if !device.ativo {
        return Err(AppError::DeviceInactive(device.sk_aparelho));
    }

    let capacity = device.total();
    if slot < 1 || slot > capacity {
        return Err(AppError::SlotOutOfRange { slot, capacity });
    }

    if let (Some(sk_aparelho), Some(current_slot)) = (chip.sk_aparelho_atual, chip.slot_whatsapp) {
        if sk_aparelho == device.sk_aparelho && current_slot == slot {
            return Ok(LinkPlan::AlreadyLinked);
        }
        return Err(AppError::ChipAlreadyLinked { sk_aparelho, slot: current_slot });
    }

    if let Some(other) = occupants
        .iter()
        .find(|o| o.slot_whatsapp == slot && o.sk_chip != chip.sk_chip)
    {
        return Err(AppError::SlotOccupied { slot, sk_chip: other.sk_chip });
    }

    let kind = slot_kind(slot, device.cap_whats_business);
    if let Some(found) = chip.tipo_whatsapp {
        if found != kind {
            return Err(AppError::SlotTypeMismatch { slot, expected: kind, found });
        }
    }

    Ok(LinkPlan::Link { slot, kind })
}

/// Menor slot livre compatível com o tipo do chip (qualquer tipo quando indefinido).
pub fn first_free_slot(
    device: &DeviceCapacity,
    occupants: &[SlotOccupant],
    tipo: Option<SlotKind>,
) -> Option<i32> {
    (1..=device.total()).find(|slot| {
        let free = !occupants.iter().any(|o| o.slot_whatsapp == *slot);
        let compatible = tipo.is_none_or(|t| t == slot_kind(*slot, device.cap_whats_business));
        free && compatible
    })
}

/// Garante que uma nova capacidade continua comportando os chips já vinculados,
/// inclusive o tipo de cada slot ocupado.
///
/// Um ocupante sem `tipo_whatsapp` declarado tem o tipo que o slot tem hoje
/// (`current_business`), e esse tipo também não pode mudar.
pub fn check_capacity_change(
    current_business: i32,
    cap_business: i32,
    cap_normal: i32,
    occupants: &[SlotOccupant],
) -> Result<(), AppError> {
    let capacity = cap_business + cap_normal;
    for occupant in occupants {
        let slot = occupant.slot_whatsapp;
        if slot < 1 || slot > capacity {
            return Err(AppError::CapacityConflict { slot });
        }
        let kind = occupant
            .tipo_whatsapp
            .as_deref()
            .and_then(|t| t.parse::<SlotKind>().ok())
            .unwrap_or_else(|| slot_kind(slot, current_business));
        if kind != slot_kind(slot, cap_business) {
            return Err(AppError::CapacityConflict { slot });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sk_aparelho: i64, sk_chip: Option<i64>, slot: Option<i32>, tipo: Option<&str>) -> RelacionamentoRow {
        RelacionamentoRow {
            sk_aparelho,
            marca: "Samsung".into(),
            modelo: "A15".into(),
            cap_whats_business: 2,
            cap_whats_normal: 2,
            sk_chip,
            numero: sk_chip.map(|c| format!("1190000{c:04}")),
            operadora: sk_chip.map(|_| "Vivo".to_string()),
            tipo_whatsapp: tipo.map(str::to_string),
            slot_whatsapp: slot,
        }
    }

    fn device() -> DeviceCapacity {
        DeviceCapacity { sk_aparelho: 1, cap_whats_business: 2, cap_whats_normal: 2, ativo: true }
    }

    fn free_chip(tipo: Option<SlotKind>) -> ChipLinkState {
        ChipLinkState {
            sk_chip: 10,
            ativo: true,
            tipo_whatsapp: tipo,
            sk_aparelho_atual: None,
            slot_whatsapp: None,
        }
    }

    fn occupant(sk_chip: i64, slot: i32, tipo: Option<&str>) -> SlotOccupant {
        SlotOccupant { sk_chip, slot_whatsapp: slot, tipo_whatsapp: tipo.map(str::to_string) }
    }

    #[test]
    fn slot_kind_splits_business_then_normal() {
        assert_eq!(slot_kind(1, 2), SlotKind::Business);
        assert_eq!(slot_kind(2, 2), SlotKind::Business);
        assert_eq!(slot_kind(3, 2), SlotKind::Normal);
        assert_eq!(slot_kind(1, 0), SlotKind::Normal);
    }

    #[test]
    fn groups_rows_into_numbered_slots() {
        let rows = vec![
            row(1, Some(5), Some(3), None),
            row(1, Some(6), Some(1), Some("BUSINESS")),
            row(2, None, None, None),
        ];
        let devices = group_device_slots(&rows);

        assert_eq!(devices.len(), 2);
        let first = &devices[0];
        assert_eq!(first.sk_aparelho, 1);
        assert_eq!(first.capacidade_total, 4);
        assert_eq!(first.slots.len(), 4);
        assert_eq!(first.slots[0].chip.as_ref().unwrap().sk_chip, 6);
        assert!(first.slots[1].chip.is_none());

        let third = first.slots[2].chip.as_ref().unwrap();
        assert_eq!(third.sk_chip, 5);
        // sem tipo declarado: herda o tipo do slot
        assert_eq!(third.tipo_whatsapp, SlotKind::Normal);

        assert!(devices[1].slots.iter().all(|s| s.chip.is_none()));
    }

    #[test]
    fn rows_outside_capacity_are_ignored() {
        let rows = vec![row(1, Some(5), Some(9), None), row(1, Some(6), Some(0), None)];
        let devices = group_device_slots(&rows);
        assert!(devices[0].slots.iter().all(|s| s.chip.is_none()));
    }

    #[test]
    fn device_without_capacity_has_no_slots() {
        let mut r = row(3, Some(1), Some(1), None);
        r.cap_whats_business = 0;
        r.cap_whats_normal = 0;
        let devices = group_device_slots(&[r]);
        assert_eq!(devices[0].capacidade_total, 0);
        assert!(devices[0].slots.is_empty());
    }

    #[test]
    fn link_into_free_compatible_slot() {
        let plan = check_link(&device(), &[], &free_chip(Some(SlotKind::Normal)), 3).unwrap();
        assert_eq!(plan, LinkPlan::Link { slot: 3, kind: SlotKind::Normal });
    }

    #[test]
    fn link_rejects_out_of_range_slot() {
        let err = check_link(&device(), &[], &free_chip(None), 5).unwrap_err();
        assert!(matches!(err, AppError::SlotOutOfRange { slot: 5, capacity: 4 }));
        let err = check_link(&device(), &[], &free_chip(None), 0).unwrap_err();
        assert!(matches!(err, AppError::SlotOutOfRange { slot: 0, .. }));
    }

    #[test]
    fn link_rejects_occupied_slot() {
        let err = check_link(&device(), &[occupant(99, 2, None)], &free_chip(None), 2).unwrap_err();
        assert!(matches!(err, AppError::SlotOccupied { slot: 2, sk_chip: 99 }));
    }

    #[test]
    fn link_rejects_type_mismatch() {
        let err = check_link(&device(), &[], &free_chip(Some(SlotKind::Business)), 4).unwrap_err();
        assert!(matches!(
            err,
            AppError::SlotTypeMismatch { slot: 4, expected: SlotKind::Normal, found: SlotKind::Business }
        ));
    }

    #[test]
    fn chip_holds_at_most_one_slot() {
        let mut chip = free_chip(None);
        chip.sk_aparelho_atual = Some(7);
        chip.slot_whatsapp = Some(1);
        let err = check_link(&device(), &[], &chip, 1).unwrap_err();
        assert!(matches!(err, AppError::ChipAlreadyLinked { sk_aparelho: 7, slot: 1 }));
    }

    #[test]
    fn relinking_same_slot_is_a_no_op() {
        let mut chip = free_chip(None);
        chip.sk_aparelho_atual = Some(1);
        chip.slot_whatsapp = Some(2);
        let plan = check_link(&device(), &[occupant(10, 2, None)], &chip, 2).unwrap();
        assert_eq!(plan, LinkPlan::AlreadyLinked);
    }

    #[test]
    fn inactive_chip_or_device_cannot_be_linked() {
        let mut chip = free_chip(None);
        chip.ativo = false;
        assert!(matches!(check_link(&device(), &[], &chip, 1), Err(AppError::ChipInactive(10))));

        let mut dev = device();
        dev.ativo = false;
        assert!(matches!(
            check_link(&dev, &[], &free_chip(None), 1),
            Err(AppError::DeviceInactive(1))
        ));
    }

    #[test]
    fn first_free_slot_respects_type() {
        let occupants = [occupant(1, 1, None), occupant(2, 3, None)];
        assert_eq!(first_free_slot(&device(), &occupants, None), Some(2));
        assert_eq!(first_free_slot(&device(), &occupants, Some(SlotKind::Business)), Some(2));
        assert_eq!(first_free_slot(&device(), &occupants, Some(SlotKind::Normal)), Some(4));

        let full = [occupant(1, 1, None), occupant(2, 2, None)];
        assert_eq!(first_free_slot(&device(), &full, Some(SlotKind::Business)), None);
    }

    #[test]
    fn capacity_cannot_orphan_occupied_slots() {
        let occupants = [occupant(1, 4, None)];
        assert!(check_capacity_change(2, 2, 2, &occupants).is_ok());
        assert!(matches!(
            check_capacity_change(2, 2, 1, &occupants),
            Err(AppError::CapacityConflict { slot: 4 })
        ));
    }

    #[test]
    fn capacity_cannot_retype_occupied_slots() {
        let occupants = [occupant(1, 2, Some("BUSINESS"))];
        assert!(check_capacity_change(2, 2, 2, &occupants).is_ok());
        // slot 2 passaria a ser NORMAL
        assert!(matches!(
            check_capacity_change(2, 1, 3, &occupants),
            Err(AppError::CapacityConflict { slot: 2 })
        ));
    }

    #[test]
    fn untyped_occupant_keeps_its_slot_type() {
        // chip sem tipo no slot 1, hoje BUSINESS
        let occupants = [occupant(1, 1, None)];
        assert!(matches!(
            check_capacity_change(2, 0, 2, &occupants),
            Err(AppError::CapacityConflict { slot: 1 })
        ));
        assert!(check_capacity_change(2, 1, 3, &occupants).is_ok());

        // slot 3, hoje NORMAL, viraria BUSINESS
        let occupants = [occupant(2, 3, None)];
        assert!(matches!(
            check_capacity_change(2, 3, 1, &occupants),
            Err(AppError::CapacityConflict { slot: 3 })
        ));
    }
}

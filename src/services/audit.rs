// src/services/audit.rs

use crate::models::evento::{tipo, NewEvento};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub campo: &'static str,
    pub valor_antigo: Option<String>,
    pub valor_novo: Option<String>,
}

impl FieldChange {
    pub fn tipo_evento(&self) -> &'static str {
        if self.campo == "status" {
            tipo::STATUS
        } else {
            tipo::EDICAO
        }
    }

    pub fn into_evento(self, sk_chip: i64, sk_aparelho: Option<i64>) -> NewEvento {
        NewEvento::new(sk_chip, self.tipo_evento())
            .aparelho(sk_aparelho)
            .campo(self.campo)
            .observacao(format!("Campo '{}' alterado", self.campo))
            .valores(self.valor_antigo, self.valor_novo)
    }
}

fn normalize(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Compara campo a campo dois retratos do mesmo registro.
///
/// Os dois lados devem listar os mesmos campos na mesma ordem; campos presentes só em
/// `after` são ignorados. Vazio e nulo são equivalentes.
pub fn diff_fields(
    before: &[(&'static str, Option<String>)],
    after: &[(&'static str, Option<String>)],
) -> Vec<FieldChange> {
    before
        .iter()
        .filter_map(|(campo, old)| {
            let (_, new) = after.iter().find(|(c, _)| c == campo)?;
            let (old_n, new_n) = (normalize(old), normalize(new));
            (old_n != new_n).then(|| FieldChange {
                campo: *campo,
                valor_antigo: old_n.map(str::to_string),
                valor_novo: new_n.map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(status: &str, plano: Option<&str>, obs: Option<&str>) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("status", Some(status.to_string())),
            ("plano", plano.map(str::to_string)),
            ("observacao", obs.map(str::to_string)),
        ]
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let a = snap("ATIVO", Some("Controle"), None);
        assert!(diff_fields(&a, &a.clone()).is_empty());
    }

    #[test]
    fn one_change_per_modified_field() {
        let before = snap("MATURANDO", Some("Controle"), None);
        let after = snap("ATIVO", Some("Pré"), None);
        let changes = diff_fields(&before, &after);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].campo, "status");
        assert_eq!(changes[0].valor_antigo.as_deref(), Some("MATURANDO"));
        assert_eq!(changes[0].valor_novo.as_deref(), Some("ATIVO"));
        assert_eq!(changes[0].tipo_evento(), tipo::STATUS);
        assert_eq!(changes[1].campo, "plano");
        assert_eq!(changes[1].tipo_evento(), tipo::EDICAO);
    }

    #[test]
    fn empty_and_null_are_equivalent() {
        let before = snap("ATIVO", Some(""), Some("  "));
        let after = snap("ATIVO", None, None);
        assert!(diff_fields(&before, &after).is_empty());
    }

    #[test]
    fn clearing_a_field_is_recorded() {
        let before = snap("ATIVO", None, Some("trocar chip"));
        let after = snap("ATIVO", None, None);
        let changes = diff_fields(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].valor_antigo.as_deref(), Some("trocar chip"));
        assert_eq!(changes[0].valor_novo, None);
    }

    #[test]
    fn change_becomes_event() {
        let change = FieldChange {
            campo: "status",
            valor_antigo: Some("ATIVO".into()),
            valor_novo: Some("BANIDO".into()),
        };
        let evento = change.into_evento(3, Some(8));
        assert_eq!(evento.sk_chip, 3);
        assert_eq!(evento.sk_aparelho, Some(8));
        assert_eq!(evento.tipo_evento, tipo::STATUS);
        assert_eq!(evento.campo.as_deref(), Some("status"));
        assert_eq!(evento.valor_novo.as_deref(), Some("BANIDO"));
    }
}

// src/db/evento_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::evento::{ChipEvento, NewEvento, TimelineEntry},
};

// Mais recente primeiro; dentro de uma transação vale a ordem de gravação
const TIMELINE_SQL: &str = r#"
    SELECT
        id, sk_chip, numero, sk_aparelho, modelo_aparelho, tipo_evento, campo,
        valor_antigo, valor_novo, origem, observacao, usuario, data_evento
    FROM vw_chip_timeline
    WHERE sk_chip = $1
    ORDER BY data_evento DESC, seq DESC
"#;

// Fato append-only: só existe INSERT e leitura
#[derive(Clone)]
pub struct EventoRepository {
    pool: PgPool,
}

impl EventoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        evento: &NewEvento,
        usuario: Option<&str>,
    ) -> Result<ChipEvento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ChipEvento>(
            r#"
            INSERT INTO f_chip_evento (
                id, sk_chip, sk_aparelho, tipo_evento, campo,
                valor_antigo, valor_novo, origem, observacao, usuario
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(evento.sk_chip)
        .bind(evento.sk_aparelho)
        .bind(&evento.tipo_evento)
        .bind(&evento.campo)
        .bind(&evento.valor_antigo)
        .bind(&evento.valor_novo)
        .bind(&evento.origem)
        .bind(&evento.observacao)
        .bind(usuario)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Eventos do chip, do mais recente para o mais antigo.
    pub async fn list_timeline(&self, sk_chip: i64) -> Result<Vec<TimelineEntry>, AppError> {
        let rows = sqlx::query_as::<_, TimelineEntry>(TIMELINE_SQL)
            .bind(sk_chip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/20250601000000_painel_chips.sql");

    #[test]
    fn timeline_breaks_ties_by_insertion_order() {
        assert!(TIMELINE_SQL.contains("ORDER BY data_evento DESC, seq DESC"));
        // NOW() repetiria o início da transação em todos os eventos
        assert!(SCHEMA.contains("data_evento   TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()"));
        assert!(SCHEMA.contains("seq           BIGSERIAL NOT NULL"));
    }
}

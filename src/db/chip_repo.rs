// src/db/chip_repo.rs

use rust_decimal::Decimal;
use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        chip::{Chip, ChipBusca, ChipInput, ChipPainel},
        relacionamento::{ChipLivre, SlotOccupant},
    },
};

const PAINEL_COLUMNS: &str = r#"
    sk_chip, id_chip, numero, operadora, operador, plano, status, tipo_whatsapp,
    dt_inicio, ultima_recarga_data, ultima_recarga_valor, total_gasto, observacao,
    sk_aparelho_atual, slot_whatsapp, ativo,
    id_aparelho, modelo_aparelho, marca_aparelho, imei_aparelho, status_aparelho
"#;

#[derive(Clone)]
pub struct ChipRepository {
    pool: PgPool,
}

impl ChipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (views do painel)
    // ---
    // Leituras simples usam a pool principal.

    pub async fn list_painel(&self) -> Result<Vec<ChipPainel>, AppError> {
        let sql = format!("SELECT {PAINEL_COLUMNS} FROM vw_chips_painel ORDER BY numero");
        let chips = sqlx::query_as::<_, ChipPainel>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(chips)
    }

    pub async fn find_painel_by_id_chip(&self, id_chip: &str) -> Result<Option<ChipPainel>, AppError> {
        let sql = format!("SELECT {PAINEL_COLUMNS} FROM vw_chips_painel WHERE id_chip = $1");
        let chip = sqlx::query_as::<_, ChipPainel>(&sql)
            .bind(id_chip)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chip)
    }

    /// Autocomplete: número contendo `term`, sem diferenciar maiúsculas.
    pub async fn search_by_numero(&self, term: &str, limit: i64) -> Result<Vec<ChipBusca>, AppError> {
        let pattern = format!("%{}%", escape_like(term));
        let chips = sqlx::query_as::<_, ChipBusca>(
            r#"
            SELECT sk_chip, numero, operadora
            FROM vw_chips_painel
            WHERE numero ILIKE $1 ESCAPE '\'
            ORDER BY numero
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(chips)
    }

    /// Chips ativos que não estão em nenhum aparelho.
    pub async fn list_free(&self) -> Result<Vec<ChipLivre>, AppError> {
        let chips = sqlx::query_as::<_, ChipLivre>(
            r#"
            SELECT
                sk_chip,
                numero,
                operadora,
                COALESCE(tipo_whatsapp, 'A DEFINIR') AS tipo_whatsapp
            FROM dim_chip
            WHERE ativo = TRUE
              AND sk_aparelho_atual IS NULL
            ORDER BY numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(chips)
    }

    // ---
    // Funções de "Escrita" (rodam dentro da transação do serviço)
    // ---

    pub async fn find_by_id_chip_for_update<'e, E>(
        &self,
        executor: E,
        id_chip: &str,
    ) -> Result<Option<Chip>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>("SELECT * FROM dim_chip WHERE id_chip = $1 FOR UPDATE")
            .bind(id_chip)
            .fetch_optional(executor)
            .await?;
        Ok(chip)
    }

    pub async fn find_by_sk_for_update<'e, E>(
        &self,
        executor: E,
        sk_chip: i64,
    ) -> Result<Option<Chip>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>("SELECT * FROM dim_chip WHERE sk_chip = $1 FOR UPDATE")
            .bind(sk_chip)
            .fetch_optional(executor)
            .await?;
        Ok(chip)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        id_chip: &str,
        input: &ChipInput,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>(
            r#"
            INSERT INTO dim_chip (
                id_chip, numero, operadora, operador, plano, status, tipo_whatsapp,
                dt_inicio, ultima_recarga_valor, ultima_recarga_data, total_gasto, observacao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(id_chip)
        .bind(&input.numero)
        .bind(&input.operadora)
        .bind(&input.operador)
        .bind(&input.plano)
        .bind(&input.status)
        .bind(input.tipo_whatsapp.map(|t| t.as_str()))
        .bind(input.dt_inicio)
        .bind(input.ultima_recarga_valor)
        .bind(input.ultima_recarga_data)
        .bind(input.total_gasto)
        .bind(&input.observacao)
        .fetch_one(executor)
        .await?;
        Ok(chip)
    }

    /// Substitui os campos cadastrais (não mexe no vínculo com aparelho).
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        sk_chip: i64,
        input: &ChipInput,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>(
            r#"
            UPDATE dim_chip SET
                numero = $2,
                operadora = $3,
                operador = $4,
                plano = $5,
                status = $6,
                tipo_whatsapp = $7,
                dt_inicio = $8,
                ultima_recarga_valor = $9,
                ultima_recarga_data = $10,
                total_gasto = $11,
                observacao = $12,
                updated_at = NOW()
            WHERE sk_chip = $1
            RETURNING *
            "#,
        )
        .bind(sk_chip)
        .bind(&input.numero)
        .bind(&input.operadora)
        .bind(&input.operador)
        .bind(&input.plano)
        .bind(&input.status)
        .bind(input.tipo_whatsapp.map(|t| t.as_str()))
        .bind(input.dt_inicio)
        .bind(input.ultima_recarga_valor)
        .bind(input.ultima_recarga_data)
        .bind(input.total_gasto)
        .bind(&input.observacao)
        .fetch_one(executor)
        .await?;
        Ok(chip)
    }

    /// Coloca o chip num slot (`Some((aparelho, slot))`) ou o libera (`None`).
    pub async fn set_slot<'e, E>(
        &self,
        executor: E,
        sk_chip: i64,
        slot: Option<(i64, i32)>,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>(
            r#"
            UPDATE dim_chip SET
                sk_aparelho_atual = $2,
                slot_whatsapp = $3,
                updated_at = NOW()
            WHERE sk_chip = $1
            RETURNING *
            "#,
        )
        .bind(sk_chip)
        .bind(slot.map(|(aparelho, _)| aparelho))
        .bind(slot.map(|(_, s)| s))
        .fetch_one(executor)
        .await?;
        Ok(chip)
    }

    /// Soma a recarga ao gasto total; a "última recarga" só avança se a data não for mais antiga.
    pub async fn apply_recarga<'e, E>(
        &self,
        executor: E,
        sk_chip: i64,
        valor: Decimal,
        data_recarga: NaiveDate,
    ) -> Result<Chip, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip = sqlx::query_as::<_, Chip>(
            r#"
            UPDATE dim_chip SET
                total_gasto = total_gasto + $2,
                ultima_recarga_valor = CASE
                    WHEN ultima_recarga_data IS NULL OR $3 >= ultima_recarga_data THEN $2
                    ELSE ultima_recarga_valor
                END,
                ultima_recarga_data = CASE
                    WHEN ultima_recarga_data IS NULL OR $3 >= ultima_recarga_data THEN $3
                    ELSE ultima_recarga_data
                END,
                updated_at = NOW()
            WHERE sk_chip = $1
            RETURNING *
            "#,
        )
        .bind(sk_chip)
        .bind(valor)
        .bind(data_recarga)
        .fetch_one(executor)
        .await?;
        Ok(chip)
    }

    pub async fn list_occupants<'e, E>(
        &self,
        executor: E,
        sk_aparelho: i64,
    ) -> Result<Vec<SlotOccupant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let occupants = sqlx::query_as::<_, SlotOccupant>(
            r#"
            SELECT sk_chip, slot_whatsapp, tipo_whatsapp
            FROM dim_chip
            WHERE sk_aparelho_atual = $1
              AND slot_whatsapp IS NOT NULL
            ORDER BY slot_whatsapp
            "#,
        )
        .bind(sk_aparelho)
        .fetch_all(executor)
        .await?;
        Ok(occupants)
    }
}

// Escapa os curingas do LIKE para que o termo seja buscado literalmente
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("119"), "119");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}

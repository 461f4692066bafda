// src/db/aparelho_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        aparelho::{Aparelho, AparelhoInput, AparelhoResumo},
        relacionamento::{DeviceCapacity, RelacionamentoRow},
    },
};

#[derive(Clone)]
pub struct AparelhoRepository {
    pool: PgPool,
}

impl AparelhoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_resumo(&self) -> Result<Vec<AparelhoResumo>, AppError> {
        let aparelhos = sqlx::query_as::<_, AparelhoResumo>(
            r#"
            SELECT
                sk_aparelho, id_aparelho, marca, modelo, imei, status,
                cap_whats_business, cap_whats_normal, ativo, slots_ocupados
            FROM vw_aparelhos
            ORDER BY modelo, sk_aparelho
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(aparelhos)
    }

    // Uma linha por chip vinculado (ou uma linha vazia por aparelho sem chips)
    pub async fn list_relacionamentos(&self) -> Result<Vec<RelacionamentoRow>, AppError> {
        let rows = sqlx::query_as::<_, RelacionamentoRow>(
            r#"
            SELECT
                sk_aparelho, marca, modelo, cap_whats_business, cap_whats_normal,
                sk_chip, numero, operadora, tipo_whatsapp, slot_whatsapp
            FROM vw_relacionamentos_whatsapp
            ORDER BY sk_aparelho, slot_whatsapp
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Trava a linha do aparelho: vínculos concorrentes ao mesmo aparelho ficam em fila.
    pub async fn find_capacity_for_update<'e, E>(
        &self,
        executor: E,
        sk_aparelho: i64,
    ) -> Result<Option<DeviceCapacity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let device = sqlx::query_as::<_, DeviceCapacity>(
            r#"
            SELECT sk_aparelho, cap_whats_business, cap_whats_normal, ativo
            FROM dim_aparelho
            WHERE sk_aparelho = $1
            FOR UPDATE
            "#,
        )
        .bind(sk_aparelho)
        .fetch_optional(executor)
        .await?;
        Ok(device)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id_aparelho: &str,
    ) -> Result<Option<Aparelho>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aparelho = sqlx::query_as::<_, Aparelho>(
            "SELECT * FROM dim_aparelho WHERE id_aparelho = $1 FOR UPDATE",
        )
        .bind(id_aparelho)
        .fetch_optional(executor)
        .await?;
        Ok(aparelho)
    }

    // Cria ou substitui o aparelho pela chave de negócio
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        id_aparelho: &str,
        input: &AparelhoInput,
    ) -> Result<Aparelho, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aparelho = sqlx::query_as::<_, Aparelho>(
            r#"
            INSERT INTO dim_aparelho (
                id_aparelho, modelo, marca, imei, status, cap_whats_business, cap_whats_normal
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id_aparelho) DO UPDATE SET
                modelo = EXCLUDED.modelo,
                marca = EXCLUDED.marca,
                imei = EXCLUDED.imei,
                status = EXCLUDED.status,
                cap_whats_business = EXCLUDED.cap_whats_business,
                cap_whats_normal = EXCLUDED.cap_whats_normal,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id_aparelho)
        .bind(&input.modelo)
        .bind(&input.marca)
        .bind(&input.imei)
        .bind(&input.status)
        .bind(input.cap_whats_business)
        .bind(input.cap_whats_normal)
        .fetch_one(executor)
        .await?;
        Ok(aparelho)
    }
}

// src/db/recarga_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::recarga::{Recarga, RecargaInput},
};

#[derive(Clone)]
pub struct RecargaRepository {
    pool: PgPool,
}

impl RecargaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        input: &RecargaInput,
        origem: &str,
        usuario: Option<&str>,
    ) -> Result<Recarga, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recarga = sqlx::query_as::<_, Recarga>(
            r#"
            INSERT INTO f_recarga (id, sk_chip, valor, data_recarga, origem, usuario)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.sk_chip)
        .bind(input.valor)
        .bind(input.data_recarga)
        .bind(origem)
        .bind(usuario)
        .fetch_one(executor)
        .await?;
        Ok(recarga)
    }

    pub async fn list_by_chip(&self, sk_chip: i64) -> Result<Vec<Recarga>, AppError> {
        let recargas = sqlx::query_as::<_, Recarga>(
            r#"
            SELECT id, sk_chip, valor, data_recarga, origem, usuario, created_at
            FROM f_recarga
            WHERE sk_chip = $1
            ORDER BY data_recarga DESC, created_at DESC
            "#,
        )
        .bind(sk_chip)
        .fetch_all(&self.pool)
        .await?;
        Ok(recargas)
    }
}

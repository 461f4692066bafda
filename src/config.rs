// src/config.rs

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::{env, str::FromStr, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{AparelhoRepository, ChipRepository, EventoRepository, RecargaRepository, UserRepository},
    services::{
        AparelhoService, AuthService, ChipService, DashboardService, RecargaService,
        RelacionamentoService,
    },
};

// Configuração lida uma única vez na inicialização
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub warehouse_schema: String,
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_statement_timeout_ms: u64,
    pub recharge_alert_days: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte de variáveis.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{key} deve ser definida"));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            warehouse_schema: get("WAREHOUSE_SCHEMA").unwrap_or_else(|| "public".to_string()),
            app_name: get("APP_NAME").unwrap_or_else(|| "painel-chips".to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(
                get("DB_ACQUIRE_TIMEOUT_SECS"),
                "DB_ACQUIRE_TIMEOUT_SECS",
                3,
            )?,
            db_statement_timeout_ms: parse_or(
                get("DB_STATEMENT_TIMEOUT_MS"),
                "DB_STATEMENT_TIMEOUT_MS",
                15_000,
            )?,
            recharge_alert_days: parse_or(get("RECHARGE_ALERT_DAYS"), "RECHARGE_ALERT_DAYS", 80)?,
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    // Esquema, nome da aplicação e timeout valem para toda conexão da pool
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let statement_timeout = self.db_statement_timeout_ms.to_string();
        Ok(PgConnectOptions::from_str(&self.database_url)
            .context("DATABASE_URL inválida")?
            .application_name(&self.app_name)
            .options([
                ("search_path", self.warehouse_schema.as_str()),
                ("statement_timeout", statement_timeout.as_str()),
            ]))
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} inválida: {v}")),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub chip_service: ChipService,
    pub aparelho_service: AparelhoService,
    pub relacionamento_service: RelacionamentoService,
    pub recarga_service: RecargaService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_parts(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let chip_repo = ChipRepository::new(db_pool.clone());
        let aparelho_repo = AparelhoRepository::new(db_pool.clone());
        let evento_repo = EventoRepository::new(db_pool.clone());
        let recarga_repo = RecargaRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone());
        let chip_service = ChipService::new(
            chip_repo.clone(),
            aparelho_repo.clone(),
            evento_repo.clone(),
            recarga_repo.clone(),
        );
        let aparelho_service = AparelhoService::new(aparelho_repo.clone(), chip_repo.clone());
        let relacionamento_service =
            RelacionamentoService::new(chip_repo.clone(), aparelho_repo, evento_repo.clone());
        let recarga_service = RecargaService::new(recarga_repo, chip_repo.clone(), evento_repo);
        let dashboard_service = DashboardService::new(chip_repo, config.recharge_alert_days);

        Self {
            db_pool,
            config,
            i18n_store: I18nStore::new(),
            auth_service,
            chip_service,
            aparelho_service,
            relacionamento_service,
            recarga_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.warehouse_schema, "public");
        assert_eq!(config.app_name, "painel-chips");
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout_secs, 3);
        assert_eq!(config.db_statement_timeout_ms, 15_000);
        assert_eq!(config.recharge_alert_days, 80);
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn missing_required_var_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/painel")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn unparsable_number_is_an_error() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
            ("PORT", "oitenta"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
            ("WAREHOUSE_SCHEMA", "dw"),
            ("PORT", "9000"),
            ("RECHARGE_ALERT_DAYS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.warehouse_schema, "dw");
        assert_eq!(config.port, 9000);
        assert_eq!(config.recharge_alert_days, 30);
    }
}

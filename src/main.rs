// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o nível; padrão info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = Config::from_env()?;
    let addr = config.addr();
    let admin = config.admin_email.clone().zip(config.admin_password.clone());

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!(
        "✅ Migrações executadas no esquema '{}' ({})",
        app_state.config.warehouse_schema,
        app_state.config.app_name
    );

    if let Some((email, password)) = admin {
        app_state
            .auth_service
            .ensure_admin(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar o operador inicial: {e}"))?;
    }

    let app = routes::build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

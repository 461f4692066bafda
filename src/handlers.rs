// src/handlers.rs

pub mod aparelhos;
pub mod auth;
pub mod chips;
pub mod dashboard;
pub mod movimentacao;
pub mod recargas;
pub mod relacionamentos;

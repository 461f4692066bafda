pub mod aparelho;
pub mod auth;
pub mod chip;
pub mod dashboard;
pub mod evento;
pub mod recarga;
pub mod relacionamento;

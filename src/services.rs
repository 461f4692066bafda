// src/services.rs

pub mod aparelho_service;
pub mod audit;
pub mod auth;
pub mod chip_service;
pub mod dashboard_service;
pub mod recarga_service;
pub mod relacionamento_service;
pub mod slots;

pub use aparelho_service::AparelhoService;
pub use auth::AuthService;
pub use chip_service::ChipService;
pub use dashboard_service::DashboardService;
pub use recarga_service::RecargaService;
pub use relacionamento_service::RelacionamentoService;

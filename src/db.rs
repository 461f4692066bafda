pub mod user_repo;
pub use user_repo::UserRepository;
pub mod chip_repo;
pub use chip_repo::ChipRepository;
pub mod aparelho_repo;
pub use aparelho_repo::AparelhoRepository;
pub mod evento_repo;
pub use evento_repo::EventoRepository;
pub mod recarga_repo;
pub use recarga_repo::RecargaRepository;

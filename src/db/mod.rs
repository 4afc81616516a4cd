pub mod connection;
pub mod job_repository;
pub mod migrations;
pub mod models;
pub mod stores;
pub mod target_repository;

pub use job_repository::JobRepository;
pub use target_repository::TargetRepository;

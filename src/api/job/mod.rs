pub mod dto;
pub mod handlers;
pub mod models;
pub mod service;
pub mod sheet;

// Re-export commonly used types
pub use handlers::job_config;
pub use service::MonitorJobService;

pub mod config;
pub mod contact_repository;
pub mod content_repository;
pub mod database;
pub mod image_repository;
pub mod user_repository;

pub use config::DatabaseConfig;
pub use contact_repository::ContactRepository;
pub use content_repository::ContentRepository;
pub use database::Database;
pub use image_repository::ImageRepository;
pub use user_repository::AdminUserRepository;

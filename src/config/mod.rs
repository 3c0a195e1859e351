/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Default identity resolution from the environment
pub mod users;

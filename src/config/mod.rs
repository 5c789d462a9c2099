/// Database configuration and connection management
pub mod database;

/// Location and schedule seeding from config.toml
pub mod locations;

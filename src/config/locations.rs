//! Location configuration loading from config.toml
//!
//! This module loads the locations, and the work schedules of each location,
//! that should exist when the service starts. Seeding is idempotent: a location
//! whose name is already taken by an active location is left untouched.

use crate::{
    core::location::{NewLocation, NewSchedule, create_location, create_schedule, get_location_by_name},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of locations to seed
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
}

/// Configuration for a single location
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Location attributes
    #[serde(flatten)]
    pub location: NewLocation,
    /// Work schedules created together with the location
    #[serde(default)]
    pub schedules: Vec<NewSchedule>,
}

/// Loads location configuration from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.as_ref().display()),
    })
}

/// Loads location configuration from `ATTENDO_CONFIG`, or ./config.toml when unset.
pub fn load_default_config() -> Result<Config> {
    let path =
        std::env::var("ATTENDO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

/// Creates every configured location that does not exist yet, with its schedules.
///
/// Returns the number of locations created.
#[instrument(skip_all, fields(configured = config.locations.len()))]
pub async fn seed_locations(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut created = 0;

    for entry in &config.locations {
        let name = entry.location.name.trim();
        if get_location_by_name(db, name).await?.is_some() {
            warn!(name, "location already exists. Skipping");
            continue;
        }

        let location = create_location(db, entry.location.clone()).await?;
        for schedule in &entry.schedules {
            let schedule = create_schedule(db, location.id, schedule.clone()).await?;
            debug!(location_id = location.id, schedule_id = schedule.id, "schedule seeded");
        }
        created += 1;
    }

    info!(created, "location seeding finished");
    Ok(created)
}

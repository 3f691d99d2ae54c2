//! Persistent appliance inventory in `appliances.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use tracker_core::appliances::Appliance;
use tracker_core::storage;
use tracker_core::{Result, TrackerError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ApplianceList {
    #[serde(default)]
    appliances: Vec<Appliance>,
}

#[derive(Debug, Clone)]
pub struct ApplianceStore {
    path: PathBuf,
}

impl ApplianceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("appliances.json"))
    }

    pub fn list(&self) -> Result<Vec<Appliance>> {
        Ok(self.load()?.appliances)
    }

    /// Validate and append an appliance. Names are unique ignoring case.
    pub fn add(&self, name: &str, power_watts: f64, hours_per_day: f64) -> Result<Appliance> {
        let appliance = Appliance::new(name, power_watts, hours_per_day)?;
        let mut list = self.load()?;

        let lower = appliance.name.to_lowercase();
        if list
            .appliances
            .iter()
            .any(|a| a.name.to_lowercase() == lower)
        {
            return Err(TrackerError::validation(format!(
                "an appliance named \"{}\" already exists",
                appliance.name
            )));
        }

        list.appliances.push(appliance.clone());
        storage::save_json_atomic(&self.path, &list)?;
        info!("added appliance {}", appliance.name);
        Ok(appliance)
    }

    /// Remove the appliance called exactly `name`.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut list = self.load()?;
        let before = list.appliances.len();
        list.appliances.retain(|a| a.name != name);
        if list.appliances.len() == before {
            return Err(TrackerError::validation(format!(
                "no appliance named \"{}\"",
                name
            )));
        }
        storage::save_json_atomic(&self.path, &list)?;
        info!("removed appliance {}", name);
        Ok(())
    }

    fn load(&self) -> Result<ApplianceList> {
        storage::load_json(&self.path)
    }
}

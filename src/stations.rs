use std::{collections::HashMap, io, path::Path, sync::Arc};

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub region: Option<String>,
}

/// Read-only station name/code table, built once at startup and handed to
/// whoever needs it.
#[derive(Debug, Default)]
pub struct StationDirectory {
    stations: Vec<Arc<Station>>,
    by_name: HashMap<String, Vec<Arc<Station>>>,
    by_code: HashMap<String, Arc<Station>>,
}

fn name_key(name: &str) -> String {
    name.split_whitespace().join(" ").to_lowercase()
}

impl StationDirectory {
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Processing stations from {}", path.display());
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        Self::from_csv(
            csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(reader),
        )
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let stations = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Station>, csv::Error>>()?;
        Ok(Self::from(stations))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn by_code(&self, code: &str) -> Option<&Station> {
        self.by_code
            .get(&code.trim().to_uppercase())
            .map(|station| station.as_ref())
    }

    /// All stations carrying `name`; several operators may share a name.
    pub fn by_name(&self, name: &str) -> Vec<&Station> {
        self.by_name
            .get(&name_key(name))
            .map(|stations| stations.iter().map(|station| station.as_ref()).collect())
            .unwrap_or_default()
    }

    /// Accepts either a station code or a station name.
    pub fn resolve(&self, name_or_code: &str) -> Vec<&Station> {
        match self.by_code(name_or_code) {
            Some(station) => vec![station],
            None => self.by_name(name_or_code),
        }
    }

    /// Stations whose name starts with `prefix`, alphabetically.
    pub fn search(&self, prefix: &str) -> Vec<&Station> {
        let prefix = name_key(prefix);
        self.stations
            .iter()
            .filter(|station| name_key(&station.name).starts_with(&prefix))
            .map(|station| station.as_ref())
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect()
    }
}

impl From<Vec<Station>> for StationDirectory {
    fn from(stations: Vec<Station>) -> Self {
        let stations: Vec<Arc<Station>> = stations
            .into_iter()
            .map(|station| {
                Arc::new(Station {
                    code: station.code.to_uppercase(),
                    ..station
                })
            })
            .collect();

        Self {
            by_name: stations
                .iter()
                .map(|station| (name_key(&station.name), Arc::clone(station)))
                .into_group_map(),
            by_code: stations
                .iter()
                .map(|station| (station.code.clone(), Arc::clone(station)))
                .collect(),
            stations,
        }
    }
}

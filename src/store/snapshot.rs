//! JSON seed files

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::{Store, Table};
use crate::domain::{
    DistanceMeasurement, FixedMarker, Id, MobileMarker, Motorcycle, Position, User, Yard,
};
use crate::error::{Result, YardError};

/// Serialized contents of a [`Store`]. Every table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub yards: Vec<Yard>,
    pub motorcycles: Vec<Motorcycle>,
    pub users: Vec<User>,
    pub fixed_markers: Vec<FixedMarker>,
    pub mobile_markers: Vec<MobileMarker>,
    pub positions: Vec<Position>,
    pub measurements: Vec<DistanceMeasurement>,
}

impl StoreSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            positions = snapshot.positions.len(),
            fixed_markers = snapshot.fixed_markers.len(),
            measurements = snapshot.measurements.len(),
            "Loaded store snapshot"
        );
        Ok(snapshot)
    }
}

fn keyed<T>(kind: &str, rows: Vec<T>, id_of: impl Fn(&T) -> Id) -> Result<BTreeMap<Id, T>> {
    let mut map = BTreeMap::new();
    for row in rows {
        let id = id_of(&row);
        if map.insert(id, row).is_some() {
            return Err(YardError::Validation(format!(
                "snapshot contains duplicate {} id {}",
                kind, id
            )));
        }
    }
    Ok(map)
}

impl Store {
    /// Builds a store from a snapshot. Sequences continue after the largest
    /// id in each table. References are taken as-is; rows pointing at
    /// missing entities are tolerated and skipped by training.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        Ok(Self {
            yards: Table::from_rows(keyed("yard", snapshot.yards, |r| r.id)?),
            motorcycles: Table::from_rows(keyed("motorcycle", snapshot.motorcycles, |r| r.id)?),
            users: Table::from_rows(keyed("user", snapshot.users, |r| r.id)?),
            fixed_markers: Table::from_rows(keyed("fixed marker", snapshot.fixed_markers, |r| r.id)?),
            mobile_markers: Table::from_rows(keyed("mobile marker", snapshot.mobile_markers, |r| r.id)?),
            positions: Table::from_rows(keyed("position", snapshot.positions, |r| r.id)?),
            measurements: Table::from_rows(keyed("measurement", snapshot.measurements, |r| r.id)?),
        })
    }
}

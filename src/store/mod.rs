//! In-process persistence
//!
//! Every entity lives in its own [`Table`]: a `BTreeMap` keyed by id behind a
//! `tokio::sync::RwLock`, plus an atomic id sequence. `BTreeMap` keeps listings
//! in id order without a separate sort.
//!
//! Operations that touch several tables acquire their locks in this order:
//! yards, motorcycles, users, fixed markers, mobile markers, positions,
//! measurements.

mod fleet;
mod paging;
mod snapshot;
mod tracking;

pub use paging::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use snapshot::StoreSnapshot;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::{
    DistanceMeasurement, FixedMarker, Id, MobileMarker, Motorcycle, Position, User, Yard,
};

pub(crate) struct Table<T> {
    rows: RwLock<BTreeMap<Id, T>>,
    seq: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self::from_rows(BTreeMap::new())
    }

    /// Sequence resumes after the largest id present.
    fn from_rows(rows: BTreeMap<Id, T>) -> Self {
        let last = rows.keys().next_back().copied().unwrap_or(0);
        Self {
            rows: RwLock::new(rows),
            seq: AtomicI64::new(last),
        }
    }

    fn next_id(&self) -> Id {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn get(&self, id: Id) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn page(&self, request: PageRequest) -> Page<T> {
        let rows = self.rows.read().await;
        Page::from_ordered(rows.values().cloned(), request)
    }

    async fn page_where<F>(&self, request: PageRequest, mut keep: F) -> Page<T>
    where
        F: FnMut(&T) -> bool,
    {
        let rows = self.rows.read().await;
        Page::from_ordered(rows.values().filter(|row| keep(row)).cloned(), request)
    }

    async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

/// The yard database.
pub struct Store {
    pub(crate) yards: Table<Yard>,
    pub(crate) motorcycles: Table<Motorcycle>,
    pub(crate) users: Table<User>,
    pub(crate) fixed_markers: Table<FixedMarker>,
    pub(crate) mobile_markers: Table<MobileMarker>,
    pub(crate) positions: Table<Position>,
    pub(crate) measurements: Table<DistanceMeasurement>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            yards: Table::new(),
            motorcycles: Table::new(),
            users: Table::new(),
            fixed_markers: Table::new(),
            mobile_markers: Table::new(),
            positions: Table::new(),
            measurements: Table::new(),
        }
    }

    /// Row counts per table, for the health endpoint and startup logs.
    pub async fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "yards": self.yards.count().await,
            "motorcycles": self.motorcycles.count().await,
            "users": self.users.count().await,
            "fixed_markers": self.fixed_markers.count().await,
            "mobile_markers": self.mobile_markers.count().await,
            "positions": self.positions.count().await,
            "measurements": self.measurements.count().await,
        })
    }
}

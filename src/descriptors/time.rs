use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::attributes::get_value;
use crate::error::AttributeError;
use crate::inventory::Inventory;
use crate::utils::{join_path, parse_odim_timestamp, TimestampError};

#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// The time axis: the file's nominal (origin) time and the distinct valid
/// times of its datasets, in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeDescriptor {
    origin: NaiveDateTime,
    times: Vec<NaiveDateTime>,
}

impl TimeDescriptor {
    pub fn new(origin: NaiveDateTime, times: Vec<NaiveDateTime>) -> Self {
        Self { origin, times }
    }

    pub fn origin(&self) -> NaiveDateTime {
        self.origin
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn index_of(&self, time: NaiveDateTime) -> Option<usize> {
        self.times.iter().position(|&t| t == time)
    }
}

/// The nominal time of the file, from `/what.date` and `/what.time`
pub fn origin_time(inventory: &Inventory) -> Result<NaiveDateTime, TimeError> {
    let store = inventory.store();
    let date: String = get_value(store, "/what", "date")?;
    let time: String = get_value(store, "/what", "time")?;
    Ok(parse_odim_timestamp(&date, &time)?)
}

/// The valid time of dataset `index`.
///
/// The dataset's `what.enddate` and `what.endtime` are used where present,
/// each falling back independently to the top level `date`/`time`.
pub fn valid_time(inventory: &Inventory, index: usize) -> Result<NaiveDateTime, TimeError> {
    let store = inventory.store();
    let what = join_path(&inventory.dataset_path(index), "what");

    let pick = |local: &str, global: &str| -> Result<String, AttributeError> {
        if store.probe_attribute(&what, local) {
            get_value(store, &what, local)
        } else {
            get_value(store, "/what", global)
        }
    };

    let date = pick("enddate", "date")?;
    let time = pick("endtime", "time")?;
    Ok(parse_odim_timestamp(&date, &time)?)
}

pub fn build(inventory: &Inventory) -> Result<TimeDescriptor, TimeError> {
    let origin = origin_time(inventory)?;

    let mut times = BTreeSet::new();
    for i in inventory.datasets() {
        times.insert(valid_time(inventory, i)?);
    }
    if times.is_empty() {
        times.insert(origin);
    }

    Ok(TimeDescriptor::new(origin, times.into_iter().collect()))
}

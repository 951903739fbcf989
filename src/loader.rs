use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{DashboardError, Result};
use crate::models::{RawDayRecord, RawHourRecord};

pub fn load_day_table(path: &Path) -> Result<Vec<RawDayRecord>> {
    read_rows(path)
}

pub fn load_hour_table(path: &Path) -> Result<Vec<RawHourRecord>> {
    read_rows(path)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data_access = |source| DashboardError::DataAccess {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(data_access)?;
    let rows = reader
        .deserialize::<T>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(data_access)?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded table");
    Ok(rows)
}

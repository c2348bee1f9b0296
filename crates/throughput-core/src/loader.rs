use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use throughput_parser::{parse_orders, parse_picking, parse_staffing, TableKind};
use tracing::info;

use crate::error::{AnalysisError, Result};

/// Locations of the three operational logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub staffing: PathBuf,
    pub picking: PathBuf,
    pub orders: PathBuf,
}

impl InputPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            staffing: dir.join(TableKind::Staffing.file_name()),
            picking: dir.join(TableKind::Picking.file_name()),
            orders: dir.join(TableKind::Orders.file_name()),
        }
    }
}

/// The loaded input tables. They are never modified after loading.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub staffing: DataFrame,
    pub picking: DataFrame,
    pub orders: DataFrame,
}

pub fn load_dataset(paths: &InputPaths) -> Result<Dataset> {
    let staffing = parse_staffing(&read_source(&paths.staffing)?)?;
    info!(rows = staffing.height(), path = %paths.staffing.display(), "loaded staffing levels");

    let picking = load_picking(&paths.picking)?;

    let orders = parse_orders(&read_source(&paths.orders)?)?;
    info!(rows = orders.height(), path = %paths.orders.display(), "loaded order flow");

    Ok(Dataset {
        staffing,
        picking,
        orders,
    })
}

pub fn load_picking(path: &Path) -> Result<DataFrame> {
    let picking = parse_picking(&read_source(path)?)?;
    info!(rows = picking.height(), path = %path.display(), "loaded picking activity");
    Ok(picking)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    })
}

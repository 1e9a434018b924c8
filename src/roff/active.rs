//! Active-cell flags.
//!
//! `active!data` is optional in a ROFF grid: when it is absent every cell
//! takes part in the grid.

use log::debug;
use ndarray::Array3;

use super::error::{Result, RoffError};
use super::format::geometry::common::cell_order;
use super::types::models::GridDimensions;

pub const ACTIVE_KEY: &str = "active!data";

/// Flat flags, index `(k*nrow + j)*ncol + i` with `k` counted from the top.
pub fn flat(raw: Option<Vec<u8>>, dims: &GridDimensions) -> Result<Vec<i32>> {
    let mut actnum = vec![0i32; dims.num_cells()];
    match raw {
        Some(raw) => {
            check_len(&raw, dims)?;
            for (n, (i, j, k)) in cell_order(dims).enumerate() {
                actnum[(k * dims.nrow + j) * dims.ncol + i] = i32::from(raw[n] != 0);
            }
        }
        None => {
            debug!("{} absent, all {} cells active", ACTIVE_KEY, dims.num_cells());
            actnum.fill(1);
        }
    }
    Ok(actnum)
}

/// Structured flags, shape `(ncol, nrow, nlay)`.
pub fn structured(raw: Option<Vec<u8>>, dims: &GridDimensions) -> Result<Array3<i32>> {
    let shape = (dims.ncol, dims.nrow, dims.nlay);
    match raw {
        Some(raw) => {
            check_len(&raw, dims)?;
            let mut actnum = Array3::<i32>::zeros(shape);
            for (n, (i, j, k)) in cell_order(dims).enumerate() {
                actnum[[i, j, k]] = i32::from(raw[n] != 0);
            }
            Ok(actnum)
        }
        None => {
            debug!("{} absent, all {} cells active", ACTIVE_KEY, dims.num_cells());
            Ok(Array3::<i32>::ones(shape))
        }
    }
}

fn check_len(raw: &[u8], dims: &GridDimensions) -> Result<()> {
    if raw.len() != dims.num_cells() {
        return Err(RoffError::SizeMismatch {
            key: ACTIVE_KEY.to_string(),
            expected: dims.num_cells() as u64,
            found: raw.len() as u64,
        });
    }
    Ok(())
}

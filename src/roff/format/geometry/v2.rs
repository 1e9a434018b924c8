//! Reconstruction into the structured layout.
//!
//! Depths are stored per node as the four corners of the surrounding cells.
//! Slots of cells outside the grid get no value from the split encoding;
//! [`process_edges`] fills them once the main pass is done.

use std::io::{Read, Seek};

use log::{debug, info};
use ndarray::{Array3, Array4};

use crate::roff::active::{self, ACTIVE_KEY};
use crate::roff::error::Result;
use crate::roff::format::query::{KeywordQuery, Requirement};
use crate::roff::types::geometry::GeometryV2;
use crate::roff::types::models::{AffineParams, GridDimensions};

use super::common::{self, GridHeader};

pub fn reconstruct<R: Read + Seek>(
    query: &mut KeywordQuery<'_, R>,
    header: &GridHeader,
) -> Result<GeometryV2> {
    info!("Importing using layout v2");
    let dims = &header.dims;

    let lines = common::read_corner_lines(query, dims)?;
    let (splits, zvalues) = common::read_split_depths(query, dims)?;

    let mut coord = Array3::<f64>::zeros((dims.ncol + 1, dims.nrow + 1, 6));
    let mut zcorn = Array4::<f32>::zeros((dims.ncol + 1, dims.nrow + 1, dims.nlay + 1, 4));

    fill_coord(dims, &header.affine, &lines, &mut coord);
    fill_zcorn(dims, &header.affine, &splits, &zvalues, &mut zcorn)?;
    process_edges(dims, &mut zcorn);
    debug!("Pillars and node corners filled");

    let raw_active = query.byte_array(ACTIVE_KEY, Requirement::Optional)?;
    let actnum = active::structured(raw_active, dims)?;

    Ok(GeometryV2 { coord, zcorn, actnum })
}

/// Writes pillar `(i, j)` at `coord[[i, j, ..]]` as top xyz, bottom xyz.
pub fn fill_coord(dims: &GridDimensions, affine: &AffineParams, lines: &[f64], coord: &mut Array3<f64>) {
    for (p, (i, j)) in common::pillar_order(dims).enumerate() {
        let raw = &lines[p * 6..p * 6 + 6];
        let bottom = affine.apply_point(&raw[0..3]);
        let top = affine.apply_point(&raw[3..6]);
        for axis in 0..3 {
            coord[[i, j, axis]] = top[axis];
            coord[[i, j, axis + 3]] = bottom[axis];
        }
    }
}

/// Writes every inside-cell slot at `zcorn[[i, j, k, slot]]`.
pub fn fill_zcorn(
    dims: &GridDimensions,
    affine: &AffineParams,
    splits: &[u8],
    zvalues: &[f64],
    zcorn: &mut Array4<f32>,
) -> Result<()> {
    common::for_each_node_depth(dims, splits, zvalues, |node, z| {
        zcorn[[node.i, node.j, node.k, node.slot]] = affine.apply_z(z) as f32;
    })
}

/// Fills the boundary slots whose cell lies outside the grid.
///
/// Each such slot copies the slot of the nearest inside cell at the same
/// node. Inside slots are only read, so running this again changes nothing.
pub fn process_edges(dims: &GridDimensions, zcorn: &mut Array4<f32>) {
    let mut filled = 0usize;
    for i in 0..=dims.ncol {
        for j in 0..=dims.nrow {
            if i > 0 && i < dims.ncol && j > 0 && j < dims.nrow {
                continue;
            }
            for slot in 0..4 {
                if common::slot_cell(dims, i, j, slot).is_some() {
                    continue;
                }
                let source = common::nearest_inside_slot(dims, i, j, slot);
                for k in 0..=dims.nlay {
                    zcorn[[i, j, k, slot]] = zcorn[[i, j, k, source]];
                }
                filled += 1;
            }
        }
    }
    debug!("Edge processing filled {} boundary slot columns", filled);
}

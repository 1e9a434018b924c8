//! Reconstruction into the flat legacy layout.

use std::io::{Read, Seek};

use log::{debug, info};

use crate::roff::active::{self, ACTIVE_KEY};
use crate::roff::error::Result;
use crate::roff::format::query::{KeywordQuery, Requirement};
use crate::roff::types::geometry::GeometryV1;
use crate::roff::types::models::{AffineParams, GridDimensions};

use super::common::{self, GridHeader};

/// Builds COORD, ZCORN and ACTNUM vectors for an already-read header.
pub fn reconstruct<R: Read + Seek>(
    query: &mut KeywordQuery<'_, R>,
    header: &GridHeader,
) -> Result<GeometryV1> {
    info!("Importing using layout v1");
    let dims = &header.dims;

    // Input lengths are checked against the dimensions before any output
    // buffer is sized from them.
    let lines = common::read_corner_lines(query, dims)?;
    let (splits, zvalues) = common::read_split_depths(query, dims)?;

    let mut coord = vec![0f64; 6 * dims.num_pillars()];
    let mut zcorn = vec![0f64; 4 * dims.ncol * dims.nrow * (dims.nlay + 1)];

    fill_coord(dims, &header.affine, &lines, &mut coord);
    fill_zcorn(dims, &header.affine, &splits, &zvalues, &mut zcorn)?;
    debug!("COORD and ZCORN filled");

    let raw_active = query.byte_array(ACTIVE_KEY, Requirement::Optional)?;
    let actnum = active::flat(raw_active, dims)?;

    Ok(GeometryV1 { coord, zcorn, actnum })
}

/// Writes pillar `(i, j)` at `(j*(ncol+1)+i)*6` as top xyz, bottom xyz.
pub fn fill_coord(dims: &GridDimensions, affine: &AffineParams, lines: &[f64], coord: &mut [f64]) {
    for (p, (i, j)) in common::pillar_order(dims).enumerate() {
        let raw = &lines[p * 6..p * 6 + 6];
        let bottom = affine.apply_point(&raw[0..3]);
        let top = affine.apply_point(&raw[3..6]);
        let at = (j * (dims.ncol + 1) + i) * 6;
        coord[at..at + 3].copy_from_slice(&top);
        coord[at + 3..at + 6].copy_from_slice(&bottom);
    }
}

/// Writes each depth at `((k*nrow+j)*ncol+i)*4 + c` for cell corner `c`.
///
/// Node slot `s` is corner `3 - s` of the cell that owns it.
pub fn fill_zcorn(
    dims: &GridDimensions,
    affine: &AffineParams,
    splits: &[u8],
    zvalues: &[f64],
    zcorn: &mut [f64],
) -> Result<()> {
    common::for_each_node_depth(dims, splits, zvalues, |node, z| {
        let (ci, cj) = node.cell;
        let corner = 3 - node.slot;
        zcorn[((node.k * dims.nrow + cj) * dims.ncol + ci) * 4 + corner] = affine.apply_z(z);
    })
}

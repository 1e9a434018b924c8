//! Shared decoding for both geometry layouts.
//!
//! ROFF stores pillars, nodes and cells with `i` outermost and `k`
//! innermost, counting `k` from the base of the grid. Both output layouts
//! count layers from the top, so every walk here yields top-based `k`.

use std::io::{Read, Seek};

use log::info;

use crate::roff::error::{Result, RoffError};
use crate::roff::format::query::{KeywordQuery, Requirement};
use crate::roff::subgrids::{self, SUBGRID_KEY};
use crate::roff::types::geometry::SubgridMap;
use crate::roff::types::models::{AffineParams, GridDimensions};

pub const CORNER_LINES_KEY: &str = "cornerLines!data";
pub const SPLIT_KEY: &str = "zvalues!splitEnz";
pub const ZVALUES_KEY: &str = "zvalues!data";

/// Node slots, named after the cell they belong to relative to the node.
pub const SW: usize = 0;
pub const SE: usize = 1;
pub const NW: usize = 2;
pub const NE: usize = 3;

/// Grid parameters common to both layouts.
#[derive(Debug, Clone)]
pub struct GridHeader {
    pub dims: GridDimensions,
    pub affine: AffineParams,
    pub subgrids: Option<SubgridMap>,
}

/// Reads dimensions, shifts, scales and subgrids.
pub fn read_header<R: Read + Seek>(query: &mut KeywordQuery<'_, R>) -> Result<GridHeader> {
    let dims = GridDimensions::new(
        query.require_int("dimensions!nX")?,
        query.require_int("dimensions!nY")?,
        query.require_int("dimensions!nZ")?,
    )?;
    info!("Dimensions in ROFF file {}", dims);

    let shift = [
        query.require_float("translate!xoffset")?,
        query.require_float("translate!yoffset")?,
        query.require_float("translate!zoffset")?,
    ];
    info!("Shifts in ROFF file {:?}", shift);

    let scale = [
        query.require_float("scale!xscale")?,
        query.require_float("scale!yscale")?,
        query.require_float("scale!zscale")?,
    ];
    info!("Scaling in ROFF file {:?}", scale);

    let counts = query.int_array(SUBGRID_KEY, Requirement::Optional)?;
    let subgrids = subgrids::build(counts.as_deref(), dims.nlay)?;

    Ok(GridHeader {
        dims,
        affine: AffineParams { shift, scale },
        subgrids,
    })
}

/// Raw corner lines, six values per pillar: bottom xyz then top xyz.
pub fn read_corner_lines<R: Read + Seek>(
    query: &mut KeywordQuery<'_, R>,
    dims: &GridDimensions,
) -> Result<Vec<f64>> {
    let lines = query.require_float_array(CORNER_LINES_KEY)?;
    check_len(CORNER_LINES_KEY, 6 * dims.num_pillars(), lines.len())?;
    Ok(lines)
}

/// Raw split counts and depths, validated against each other.
pub fn read_split_depths<R: Read + Seek>(
    query: &mut KeywordQuery<'_, R>,
    dims: &GridDimensions,
) -> Result<(Vec<u8>, Vec<f64>)> {
    let splits = query.require_byte_array(SPLIT_KEY)?;
    check_len(SPLIT_KEY, dims.num_nodes(), splits.len())?;
    let zvalues = query.require_float_array(ZVALUES_KEY)?;
    let expected: usize = splits.iter().map(|&s| s as usize).sum();
    check_len(ZVALUES_KEY, expected, zvalues.len())?;
    Ok((splits, zvalues))
}

fn check_len(key: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(RoffError::SizeMismatch {
            key: key.to_string(),
            expected: expected as u64,
            found: found as u64,
        });
    }
    Ok(())
}

/// Pillars `(i, j)` in storage order.
pub fn pillar_order(dims: &GridDimensions) -> impl Iterator<Item = (usize, usize)> {
    let nrow = dims.nrow;
    (0..=dims.ncol).flat_map(move |i| (0..=nrow).map(move |j| (i, j)))
}

/// Nodes `(i, j, k)` in storage order, `k` counted from the top.
pub fn node_order(dims: &GridDimensions) -> impl Iterator<Item = (usize, usize, usize)> {
    let nlay = dims.nlay;
    pillar_order(dims).flat_map(move |(i, j)| (0..=nlay).map(move |kr| (i, j, nlay - kr)))
}

/// Cells `(i, j, k)` in storage order, `k` counted from the top.
pub fn cell_order(dims: &GridDimensions) -> impl Iterator<Item = (usize, usize, usize)> {
    let (nrow, nlay) = (dims.nrow, dims.nlay);
    (0..dims.ncol).flat_map(move |i| {
        (0..nrow).flat_map(move |j| (0..nlay).map(move |kr| (i, j, nlay - 1 - kr)))
    })
}

/// Cell owning `slot` of node `(i, j)`, `None` when it lies outside the grid.
pub fn slot_cell(dims: &GridDimensions, i: usize, j: usize, slot: usize) -> Option<(usize, usize)> {
    let ci = (i + (slot & 1)).checked_sub(1)?;
    let cj = (j + (slot >> 1)).checked_sub(1)?;
    (ci < dims.ncol && cj < dims.nrow).then_some((ci, cj))
}

/// Slot of node `(i, j)` belonging to the inside cell nearest to `slot`'s cell.
pub fn nearest_inside_slot(dims: &GridDimensions, i: usize, j: usize, slot: usize) -> usize {
    let clamp = |node: usize, offset: usize, n: usize| -> usize {
        let cell = (node + offset).saturating_sub(1).min(n - 1);
        cell + 1 - node
    };
    let di = clamp(i, slot & 1, dims.ncol);
    let dj = clamp(j, slot >> 1, dims.nrow);
    di + 2 * dj
}

/// One slot of node `(i, j, k)` together with the inside cell owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSlot {
    pub i: usize,
    pub j: usize,
    /// Layer boundary, counted from the top.
    pub k: usize,
    pub slot: usize,
    pub cell: (usize, usize),
}

/// Walks the split encoding and reports every node depth that belongs to a
/// cell inside the grid, as raw (untransformed) values.
///
/// Split counts: 0 stores no depth, 1 stores one depth shared by all four
/// slots, 4 stores one depth per slot in SW, SE, NW, NE order.
pub fn for_each_node_depth<F>(
    dims: &GridDimensions,
    splits: &[u8],
    zvalues: &[f64],
    mut emit: F,
) -> Result<()>
where
    F: FnMut(NodeSlot, f64),
{
    let mut cursor = 0usize;
    for ((i, j, k), &split) in node_order(dims).zip(splits) {
        let depths: [f64; 4] = match split {
            0 => continue,
            1 => [zvalues[cursor]; 4],
            4 => [
                zvalues[cursor],
                zvalues[cursor + 1],
                zvalues[cursor + 2],
                zvalues[cursor + 3],
            ],
            count => return Err(RoffError::UnsupportedSplit { count, i, j, k }),
        };
        cursor += split as usize;
        for (slot, &z) in depths.iter().enumerate() {
            if let Some(cell) = slot_cell(dims, i, j, slot) {
                emit(NodeSlot { i, j, k, slot, cell }, z);
            }
        }
    }
    Ok(())
}

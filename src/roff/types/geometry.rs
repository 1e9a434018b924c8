//! Result types produced by a grid import.
//!
//! A [`RoffGrid`] bundles the grid parameters with exactly one of the two
//! array layouts, chosen through [`GeometryLayout`] before the import starts.

use std::ops::RangeInclusive;

use ndarray::{Array3, Array4};

use super::models::{AffineParams, GridDimensions, RoffFileInfo};

/// Output array layout requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryLayout {
    /// Flat COORD / ZCORN / ACTNUM vectors.
    #[default]
    V1,
    /// Structured pillar, node-corner and cell arrays.
    V2,
}

impl GeometryLayout {
    pub fn version(&self) -> u8 {
        match self {
            GeometryLayout::V1 => 1,
            GeometryLayout::V2 => 2,
        }
    }
}

impl TryFrom<u8> for GeometryLayout {
    type Error = String;
    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(format!("Unknown geometry layout version: {}", other)),
        }
    }
}

/// One named zone of consecutive layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgrid {
    pub name: String,
    /// 1-based, inclusive layer numbers.
    pub layers: RangeInclusive<usize>,
}

/// Ordered zones partitioning the grid layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgridMap {
    entries: Vec<Subgrid>,
}

impl SubgridMap {
    pub(crate) fn new(entries: Vec<Subgrid>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&RangeInclusive<usize>> {
        self.entries
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.layers)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subgrid> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flat legacy layout.
///
/// - `coord`: `6 * (ncol+1) * (nrow+1)`, pillar `(i, j)` at `(j*(ncol+1)+i)*6`,
///   top xyz then bottom xyz.
/// - `zcorn`: `4 * ncol * nrow * (nlay+1)`, index `((k*nrow+j)*ncol+i)*4+c`
///   with cell corners SW, SE, NW, NE.
/// - `actnum`: `ncol * nrow * nlay`, index `(k*nrow+j)*ncol+i`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryV1 {
    pub coord: Vec<f64>,
    pub zcorn: Vec<f64>,
    pub actnum: Vec<i32>,
}

/// Structured layout.
///
/// - `coord`: `(ncol+1, nrow+1, 6)`, top xyz then bottom xyz.
/// - `zcorn`: `(ncol+1, nrow+1, nlay+1, 4)`, per node the depths of the
///   SW, SE, NW, NE neighbouring cells.
/// - `actnum`: `(ncol, nrow, nlay)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryV2 {
    pub coord: Array3<f64>,
    pub zcorn: Array4<f32>,
    pub actnum: Array3<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridGeometry {
    V1(GeometryV1),
    V2(GeometryV2),
}

impl GridGeometry {
    /// Layout tag of the produced arrays, 1 or 2.
    pub fn format_version(&self) -> u8 {
        self.layout().version()
    }

    pub fn layout(&self) -> GeometryLayout {
        match self {
            GridGeometry::V1(_) => GeometryLayout::V1,
            GridGeometry::V2(_) => GeometryLayout::V2,
        }
    }

    /// Number of cells flagged active.
    pub fn active_count(&self) -> usize {
        match self {
            GridGeometry::V1(g) => g.actnum.iter().filter(|&&a| a != 0).count(),
            GridGeometry::V2(g) => g.actnum.iter().filter(|&&a| a != 0).count(),
        }
    }

    pub fn as_v1(&self) -> Option<&GeometryV1> {
        match self {
            GridGeometry::V1(g) => Some(g),
            GridGeometry::V2(_) => None,
        }
    }

    pub fn as_v2(&self) -> Option<&GeometryV2> {
        match self {
            GridGeometry::V1(_) => None,
            GridGeometry::V2(g) => Some(g),
        }
    }
}

/// Complete result of a successful grid import.
#[derive(Debug, Clone, PartialEq)]
pub struct RoffGrid {
    pub dimensions: GridDimensions,
    pub affine: AffineParams,
    pub subgrids: Option<SubgridMap>,
    pub info: RoffFileInfo,
    pub geometry: GridGeometry,
}

impl RoffGrid {
    pub fn format_version(&self) -> u8 {
        self.geometry.format_version()
    }
}

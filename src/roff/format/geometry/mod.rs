//! # Geometry Reconstruction Dispatcher
//!
//! Entry point for turning scanned records into grid arrays. The layout is
//! decided once by the caller and dispatched here to the matching builder.

use std::io::{Read, Seek};

use crate::roff::error::Result;
use crate::roff::format::query::KeywordQuery;
use crate::roff::types::geometry::{GeometryLayout, GridGeometry};

pub mod common;
pub mod v1;
pub mod v2;

pub use common::GridHeader;

/// Builds the arrays of `layout` for a grid whose header is already read.
pub fn reconstruct<R: Read + Seek>(
    query: &mut KeywordQuery<'_, R>,
    header: &GridHeader,
    layout: GeometryLayout,
) -> Result<GridGeometry> {
    match layout {
        GeometryLayout::V1 => v1::reconstruct(query, header).map(GridGeometry::V1),
        GeometryLayout::V2 => v2::reconstruct(query, header).map(GridGeometry::V2),
    }
}

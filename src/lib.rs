//! # roff-grid-reader
//!
//! A reader for corner-point grid geometry stored in binary ROFF files.
//! Produces either the flat legacy layout (COORD / ZCORN / ACTNUM vectors)
//! or the structured layout (pillar, node-corner and cell arrays).
//!
//! **Note:** ASCII ROFF and grid properties other than the active flags are
//! not read.
pub mod roff;

// Re-export the main types for convenience
pub use roff::{
    import_roff,
    RoffGridReader,
    RoffError,
    Result,
    options::ImportOptions,
    types::{
        geometry::{
            GeometryLayout,
            GeometryV1,
            GeometryV2,
            GridGeometry,
            RoffGrid,
            Subgrid,
            SubgridMap,
        },
        models::{
            AffineParams,
            Endian,
            GridDimensions,
            KeywordRecord,
            RoffFileInfo,
            ValueKind,
        },
    },
};

//! Core ROFF grid reader module

pub mod active;
pub mod error;
pub mod format;
pub mod options;
pub mod subgrids;
pub mod types;
mod utils;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, info};

pub use error::{Result, RoffError};
use format::geometry;
use format::query::{self, KeywordQuery, Requirement};
use format::scanner::{self, KeywordIndex};
use options::ImportOptions;
use types::geometry::RoffGrid;
use types::models::{Endian, RoffFileInfo};

const GRID_FILETYPE: &str = "grid";

/// Reader for binary ROFF grid files.
///
/// Opening scans the whole stream once and resolves its byte order; values
/// are only decoded when [`import`](Self::import) asks for them.
pub struct RoffGridReader<R> {
    source: R,
    index: KeywordIndex,
    order: Endian,
}

impl RoffGridReader<File> {
    /// Open a ROFF file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - The stream is not binary ROFF or is truncated
    /// - The byte-order sentinel is missing or invalid
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening ROFF file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> RoffGridReader<R> {
    /// Scan a stream positioned at its `roff-bin` header.
    pub fn from_reader(mut source: R) -> Result<Self> {
        let index = scanner::scan(&mut source)?;
        let order = query::resolve_byte_order(&mut source, &index)?;
        Ok(Self { source, index, order })
    }

    /// Records found by the scan, in stream order.
    pub fn keywords(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn byte_order(&self) -> Endian {
        self.order
    }

    /// Typed access to any scanned keyword.
    pub fn query(&mut self) -> KeywordQuery<'_, R> {
        KeywordQuery::new(&mut self.source, &self.index, self.order)
    }

    /// Descriptive metadata; every field is optional in the format.
    pub fn file_info(&mut self) -> Result<RoffFileInfo> {
        let creator = self
            .index
            .comments()
            .iter()
            .find_map(|c| c.strip_prefix("Creator:"))
            .map(|c| c.trim().to_string());

        let mut query = self.query();
        let filetype = query.string("filedata!filetype", Requirement::Optional)?;
        let creation_date = query.string("filedata!creationDate", Requirement::Optional)?;
        let major = query.int("version!major", Requirement::Optional)?;
        let minor = query.int("version!minor", Requirement::Optional)?;

        Ok(RoffFileInfo {
            creator,
            filetype,
            creation_date,
            version: major.map(|major| (major, minor.unwrap_or(0))),
        })
    }

    /// Reconstruct the grid geometry in the requested layout.
    ///
    /// Consumes the reader; the source is dropped whether or not the import
    /// succeeds, and nothing is returned on failure.
    pub fn import(mut self, options: &ImportOptions) -> Result<RoffGrid> {
        let info = self.file_info()?;
        debug!("File info: {:?}", info);
        if options.require_grid_filetype
            && let Some(filetype) = info.filetype.as_deref().filter(|t| *t != GRID_FILETYPE)
        {
            return Err(RoffError::InvalidFormat(format!(
                "Expected filetype {:?}, found {:?}",
                GRID_FILETYPE, filetype
            )));
        }

        let mut query = self.query();
        let header = geometry::common::read_header(&mut query)?;
        let geometry = geometry::reconstruct(&mut query, &header, options.layout)?;

        info!(
            "ROFF grid imported: {} cells ({} active), layout v{}",
            header.dims.num_cells(),
            geometry.active_count(),
            geometry.format_version()
        );

        Ok(RoffGrid {
            dimensions: header.dims,
            affine: header.affine,
            subgrids: header.subgrids,
            info,
            geometry,
        })
    }
}

/// Open, scan and import a ROFF grid file in one call.
pub fn import_roff(path: impl AsRef<Path>, options: &ImportOptions) -> Result<RoffGrid> {
    RoffGridReader::open(path)?.import(options)
}

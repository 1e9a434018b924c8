//! Import configuration.

use super::types::geometry::GeometryLayout;

/// Settings for one grid import.
///
/// ```
/// use roff_grid_reader::{GeometryLayout, ImportOptions};
///
/// let options = ImportOptions::default().with_layout(GeometryLayout::V2);
/// assert_eq!(options.layout, GeometryLayout::V2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Output array layout.
    pub layout: GeometryLayout,
    /// Reject files whose `filedata!filetype` is present and is not `grid`.
    pub require_grid_filetype: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            layout: GeometryLayout::V1,
            require_grid_filetype: true,
        }
    }
}

impl ImportOptions {
    pub fn with_layout(mut self, layout: GeometryLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_require_grid_filetype(mut self, require: bool) -> Self {
        self.require_grid_filetype = require;
        self
    }
}

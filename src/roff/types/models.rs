//! Core data structures for ROFF keyword records and grid parameters.
//!
//! This module defines the fundamental types used throughout the library:
//! - Keyword records and their value kinds
//! - Byte order handling
//! - Grid dimensions, affine parameters and file metadata

use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::roff::error::{Result, RoffError};

/// Value kinds a ROFF record can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Char,
    Bool,
    Byte,
    Int,
    Float,
    Double,
}

impl ValueKind {
    /// Size in bytes of one element, `None` for NUL-terminated strings.
    pub fn element_size(&self) -> Option<u64> {
        match self {
            ValueKind::Char => None,
            ValueKind::Bool | ValueKind::Byte => Some(1),
            ValueKind::Int | ValueKind::Float => Some(4),
            ValueKind::Double => Some(8),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Char => "char",
            ValueKind::Bool => "bool",
            ValueKind::Byte => "byte",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
        }
    }
}

impl TryFrom<&str> for ValueKind {
    type Error = String;
    fn try_from(tag: &str) -> std::result::Result<Self, String> {
        match tag {
            "char" => Ok(Self::Char),
            "bool" => Ok(Self::Bool),
            "byte" => Ok(Self::Byte),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a record holds one value or a counted array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Scalar,
    Array(usize),
}

/// A single record located by the keyword scanner.
///
/// The payload is not interpreted here: `offset` and `len` point at the raw
/// value bytes in the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecord {
    pub tag: String,
    pub name: String,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    /// Absolute byte offset of the payload.
    pub offset: u64,
    /// Payload length in bytes.
    pub len: u64,
}

impl KeywordRecord {
    /// Composite lookup key, `tag!name`.
    pub fn key(&self) -> String {
        format!("{}!{}", self.tag, self.name)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.cardinality, Cardinality::Array(_))
    }

    /// Number of values; 1 for scalars.
    pub fn count(&self) -> usize {
        match self.cardinality {
            Cardinality::Scalar => 1,
            Cardinality::Array(n) => n,
        }
    }
}

impl fmt::Display for KeywordRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.cardinality {
            Cardinality::Scalar => write!(
                f,
                "{} ({}) @ {} [{} bytes]",
                self.key(),
                self.kind,
                self.offset,
                self.len
            ),
            Cardinality::Array(n) => write!(
                f,
                "{} (array {} x{}) @ {} [{} bytes]",
                self.key(),
                self.kind,
                n,
                self.offset,
                self.len
            ),
        }
    }
}

/// Byte order of the numeric payloads in a ROFF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Value the producer writes into `filedata!byteswaptest`.
    pub const SENTINEL: i32 = 1;

    /// Picks the order under which `raw` decodes to [`Self::SENTINEL`].
    pub fn from_sentinel(key: &str, raw: [u8; 4]) -> Result<Self> {
        let little = LittleEndian::read_i32(&raw);
        let big = BigEndian::read_i32(&raw);
        if little == Self::SENTINEL {
            Ok(Endian::Little)
        } else if big == Self::SENTINEL {
            Ok(Endian::Big)
        } else {
            Err(RoffError::ByteOrderSentinel {
                key: key.to_string(),
                little,
                big,
            })
        }
    }

    pub fn read_i32(&self, buf: &[u8]) -> i32 {
        match self {
            Endian::Little => LittleEndian::read_i32(buf),
            Endian::Big => BigEndian::read_i32(buf),
        }
    }

    pub fn read_f32(&self, buf: &[u8]) -> f32 {
        match self {
            Endian::Little => LittleEndian::read_f32(buf),
            Endian::Big => BigEndian::read_f32(buf),
        }
    }

    pub fn read_f64(&self, buf: &[u8]) -> f64 {
        match self {
            Endian::Little => LittleEndian::read_f64(buf),
            Endian::Big => BigEndian::read_f64(buf),
        }
    }

    /// Decodes a whole payload of i32 values into `dst`.
    pub fn read_i32_into(&self, src: &[u8], dst: &mut [i32]) {
        match self {
            Endian::Little => LittleEndian::read_i32_into(src, dst),
            Endian::Big => BigEndian::read_i32_into(src, dst),
        }
    }

    pub fn read_f32_into(&self, src: &[u8], dst: &mut [f32]) {
        match self {
            Endian::Little => LittleEndian::read_f32_into(src, dst),
            Endian::Big => BigEndian::read_f32_into(src, dst),
        }
    }

    pub fn read_f64_into(&self, src: &[u8], dst: &mut [f64]) {
        match self {
            Endian::Little => LittleEndian::read_f64_into(src, dst),
            Endian::Big => BigEndian::read_f64_into(src, dst),
        }
    }
}

/// Grid size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub ncol: usize,
    pub nrow: usize,
    pub nlay: usize,
}

impl GridDimensions {
    /// Validates raw dimension values, each must be at least 1.
    ///
    /// The largest array derived from the dimensions, four depths per
    /// node, must be addressable; the size helpers below rely on this.
    pub fn new(ncol: i32, nrow: i32, nlay: i32) -> Result<Self> {
        let check = |key: &str, value: i32| -> Result<usize> {
            if value < 1 {
                Err(RoffError::InvalidDimension { key: key.to_string(), value })
            } else {
                Ok(value as usize)
            }
        };
        let dims = Self {
            ncol: check("dimensions!nX", ncol)?,
            nrow: check("dimensions!nY", nrow)?,
            nlay: check("dimensions!nZ", nlay)?,
        };

        (dims.ncol + 1)
            .checked_mul(dims.nrow + 1)
            .and_then(|n| n.checked_mul(dims.nlay + 1))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                RoffError::InvalidFormat(format!("Grid of {} cells is too large to address", dims))
            })?;
        Ok(dims)
    }

    pub fn num_cells(&self) -> usize {
        self.ncol * self.nrow * self.nlay
    }

    pub fn num_pillars(&self) -> usize {
        (self.ncol + 1) * (self.nrow + 1)
    }

    /// Corner nodes, one per pillar per layer boundary.
    pub fn num_nodes(&self) -> usize {
        self.num_pillars() * (self.nlay + 1)
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} x {} x {}", self.ncol, self.nrow, self.nlay)
    }
}

/// Per-axis shift and scale applied to every decoded coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    pub shift: [f64; 3],
    pub scale: [f64; 3],
}

impl AffineParams {
    pub fn identity() -> Self {
        Self {
            shift: [0.0; 3],
            scale: [1.0; 3],
        }
    }

    /// Transforms a raw value on `axis` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn apply(&self, axis: usize, value: f64) -> f64 {
        value * self.scale[axis] + self.shift[axis]
    }

    #[inline]
    pub fn apply_point(&self, point: &[f64]) -> [f64; 3] {
        [
            self.apply(0, point[0]),
            self.apply(1, point[1]),
            self.apply(2, point[2]),
        ]
    }

    #[inline]
    pub fn apply_z(&self, z: f64) -> f64 {
        self.apply(2, z)
    }
}

impl Default for AffineParams {
    fn default() -> Self {
        Self::identity()
    }
}

/// Descriptive metadata carried by a ROFF file, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoffFileInfo {
    /// Text of the `#Creator: ...#` comment, without the delimiters.
    pub creator: Option<String>,
    pub filetype: Option<String>,
    pub creation_date: Option<String>,
    /// `version!major` and `version!minor`.
    pub version: Option<(i32, i32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_reject_non_positive_values() {
        let err = GridDimensions::new(3, -1, 2).unwrap_err();
        assert!(matches!(err, RoffError::InvalidDimension { ref key, value: -1 } if key == "dimensions!nY"));
    }

    #[test]
    fn dimensions_reject_unaddressable_grids() {
        let err = GridDimensions::new(i32::MAX, i32::MAX, i32::MAX).unwrap_err();
        assert!(matches!(err, RoffError::InvalidFormat(_)));

        let dims = GridDimensions::new(4, 3, 2).unwrap();
        assert_eq!(dims.num_cells(), 24);
        assert_eq!(dims.num_pillars(), 20);
        assert_eq!(dims.num_nodes(), 60);
    }
}

//! Binary ROFF parsing layer.
//!
//! This module bridges raw stream I/O and the high-level
//! [`RoffGridReader`](crate::roff::RoffGridReader).
//!
//! # Module Organization
//!
//! - [`scanner`]: One pass over the stream building the keyword index
//! - [`query`]: Byte-order resolution and on-demand value decoding
//! - [`geometry`]: Pillar, corner-depth and active-flag reconstruction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  roff-bin       │ ← scanner::scan()
//! │  tag ... endtag │   (records: tag, name, kind, offset, len)
//! │  ...            │
//! │  tag eof        │
//! └─────────────────┘
//!          │
//!          ▼
//!   query::resolve_byte_order()
//!   query::KeywordQuery          ← typed values per "tag!name"
//!          │
//!          ▼
//!   geometry::reconstruct()      ← v1 flat or v2 structured arrays
//! ```

pub mod geometry;
pub mod query;
pub mod scanner;

//! Keyword scanning for binary ROFF streams.
//!
//! One forward pass over the stream records where every value lives
//! without decoding any numeric payload.
//!
//! # Stream Structure
//! ```text
//! "roff-bin\0"
//! "#...#\0"                                   comments
//! "tag\0" <tag>"\0"
//!     <type>"\0" <name>"\0" <value>           scalar
//!     "array\0" <type>"\0" <name>"\0" <count:i32> <values>
//! "endtag\0"
//! "tag\0" "eof\0" "endtag\0"
//! ```

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, info, trace};

use crate::roff::error::{Result, RoffError};
use crate::roff::types::models::{Cardinality, Endian, KeywordRecord, ValueKind};
use crate::roff::utils;

/// Magic token opening every binary ROFF stream.
pub const BINARY_MAGIC: &str = "roff-bin";
const ASCII_MAGIC: &str = "roff-asc";
/// Tag name closing the stream.
pub const EOF_TAG: &str = "eof";
pub const BYTESWAP_KEY: &str = "filedata!byteswaptest";

/// Ordered records of one stream, addressable by `tag!name`.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    records: Vec<KeywordRecord>,
    lookup: HashMap<String, Vec<usize>>,
    comments: Vec<String>,
}

impl KeywordIndex {
    fn push(&mut self, record: KeywordRecord) {
        trace!("Keyword: {}", record);
        self.lookup
            .entry(record.key())
            .or_default()
            .push(self.records.len());
        self.records.push(record);
    }

    /// All records sharing `key`, in stream order.
    pub fn find(&self, key: &str) -> Vec<&KeywordRecord> {
        self.lookup
            .get(key)
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn records(&self) -> &[KeywordRecord] {
        &self.records
    }

    /// Text of the `#...#` comments, delimiters stripped.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scans the stream from its current position up to the `eof` tag.
///
/// Leaves the source positioned somewhere past the scanned data; the query
/// layer seeks to absolute offsets.
pub fn scan<R: Read + Seek>(source: &mut R) -> Result<KeywordIndex> {
    let start = source.stream_position()?;
    let stream_end = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(start))?;
    info!("Scanning ROFF keywords ({} bytes)", stream_end - start);

    let mut reader = BufReader::new(source);
    match utils::read_cstring(&mut reader)?.as_deref() {
        Some(BINARY_MAGIC) => {}
        Some(ASCII_MAGIC) => {
            return Err(RoffError::InvalidFormat(
                "ASCII ROFF streams are not supported".to_string(),
            ));
        }
        other => {
            return Err(RoffError::InvalidFormat(format!(
                "Missing {} header, found {:?}",
                BINARY_MAGIC, other
            )));
        }
    }

    let mut scanner = Scanner {
        reader,
        stream_end,
        order: None,
        index: KeywordIndex::default(),
    };
    scanner.run()?;

    info!("Scanned {} keywords", scanner.index.len());
    Ok(scanner.index)
}

struct Scanner<R> {
    reader: BufReader<R>,
    stream_end: u64,
    /// Known once the byte-order sentinel has been passed.
    order: Option<Endian>,
    index: KeywordIndex,
}

impl<R: Read + Seek> Scanner<R> {
    fn run(&mut self) -> Result<()> {
        let mut current_tag: Option<String> = None;

        loop {
            let token_offset = self.position()?;
            let token = utils::read_cstring(&mut self.reader)?.ok_or_else(|| {
                RoffError::InvalidFormat(format!(
                    "Stream ended at byte {} before the {} tag",
                    token_offset, EOF_TAG
                ))
            })?;

            match token.as_str() {
                t if t.starts_with('#') => {
                    let text = t.trim_matches('#').trim().to_string();
                    trace!("Comment: {}", text);
                    self.index.comments.push(text);
                }
                "tag" => {
                    if let Some(open) = &current_tag {
                        return Err(RoffError::InvalidFormat(format!(
                            "Tag {} opened at byte {} while {} is still open",
                            open, token_offset, open
                        )));
                    }
                    let name = utils::expect_cstring(&mut self.reader, "tag name")?;
                    if name == EOF_TAG {
                        // Trailing endtag is optional for the terminal tag.
                        match utils::read_cstring(&mut self.reader) {
                            Ok(None) => {}
                            Ok(Some(t)) if t == "endtag" => {}
                            Ok(Some(other)) => {
                                debug!("Ignoring {:?} after the {} tag", other, EOF_TAG)
                            }
                            Err(e) => debug!("Ignoring unreadable data after the {} tag: {}", EOF_TAG, e),
                        }
                        debug!("Reached {} tag at byte {}", EOF_TAG, token_offset);
                        return Ok(());
                    }
                    current_tag = Some(name);
                }
                "endtag" => {
                    if current_tag.take().is_none() {
                        return Err(RoffError::InvalidFormat(format!(
                            "endtag without open tag at byte {}",
                            token_offset
                        )));
                    }
                }
                _ => {
                    let tag = current_tag.clone().ok_or_else(|| {
                        RoffError::InvalidFormat(format!(
                            "Record {:?} outside any tag at byte {}",
                            token, token_offset
                        ))
                    })?;
                    let record = if token == "array" {
                        let type_offset = self.position()?;
                        let type_tag = utils::expect_cstring(&mut self.reader, "array type")?;
                        let kind = parse_kind(&type_tag, type_offset)?;
                        self.scan_array(tag, kind)?
                    } else {
                        let kind = parse_kind(&token, token_offset)?;
                        self.scan_scalar(tag, kind)?
                    };
                    self.index.push(record);
                }
            }
        }
    }

    fn scan_scalar(&mut self, tag: String, kind: ValueKind) -> Result<KeywordRecord> {
        let name = utils::expect_cstring(&mut self.reader, "record name")?;
        let offset = self.position()?;

        let len = match kind.element_size() {
            Some(size) => {
                self.check_fits(&tag, &name, offset, size)?;
                if kind == ValueKind::Int && format!("{}!{}", tag, name) == BYTESWAP_KEY {
                    let raw = utils::read_raw4(&mut self.reader)?;
                    self.order = Endian::from_sentinel(BYTESWAP_KEY, raw).ok();
                    debug!("Scanner byte order from sentinel: {:?}", self.order);
                } else {
                    self.reader.seek_relative(size as i64)?;
                }
                size
            }
            None => {
                utils::expect_cstring(&mut self.reader, "char value")?;
                self.position()? - offset
            }
        };

        Ok(KeywordRecord {
            tag,
            name,
            kind,
            cardinality: Cardinality::Scalar,
            offset,
            len,
        })
    }

    fn scan_array(&mut self, tag: String, kind: ValueKind) -> Result<KeywordRecord> {
        let name = utils::expect_cstring(&mut self.reader, "array name")?;
        let count_offset = self.position()?;
        self.check_fits(&tag, &name, count_offset, 4)?;
        let raw = utils::read_raw4(&mut self.reader)?;
        let offset = count_offset + 4;
        let count = self.decode_count(raw, kind, offset);
        if count < 0 {
            return Err(RoffError::InvalidFormat(format!(
                "Negative element count {} for {}!{} at byte {}",
                count, tag, name, count_offset
            )));
        }
        let count = count as usize;

        let len = match kind.element_size() {
            Some(size) => {
                let len = size * count as u64;
                self.check_fits(&tag, &name, offset, len)?;
                self.reader.seek_relative(len as i64)?;
                len
            }
            None => {
                for _ in 0..count {
                    utils::expect_cstring(&mut self.reader, "char array element")?;
                }
                self.position()? - offset
            }
        };

        Ok(KeywordRecord {
            tag,
            name,
            kind,
            cardinality: Cardinality::Array(count),
            offset,
            len,
        })
    }

    /// Element count of an array. Before the sentinel is seen, takes the
    /// interpretation whose payload fits the stream, little-endian first.
    fn decode_count(&self, raw: [u8; 4], kind: ValueKind, offset: u64) -> i32 {
        if let Some(order) = self.order {
            return order.read_i32(&raw);
        }
        let little = LittleEndian::read_i32(&raw);
        let big = BigEndian::read_i32(&raw);
        let remaining = self.stream_end.saturating_sub(offset);
        let fits = |n: i32| {
            n >= 0 && kind.element_size().unwrap_or(1) * n as u64 <= remaining
        };
        if !fits(little) && fits(big) {
            big
        } else {
            little
        }
    }

    fn check_fits(&self, tag: &str, name: &str, offset: u64, needed: u64) -> Result<()> {
        let available = self.stream_end.saturating_sub(offset);
        if needed > available {
            return Err(RoffError::Truncated {
                key: format!("{}!{}", tag, name),
                offset,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.reader.stream_position()?)
    }
}

fn parse_kind(type_tag: &str, offset: u64) -> Result<ValueKind> {
    ValueKind::try_from(type_tag)
        .map_err(|tag| RoffError::UnknownType { tag, offset })
}

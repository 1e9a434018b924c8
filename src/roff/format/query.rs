//! On-demand decoding of scanned keyword records.
//!
//! The scanner only records where values live. This module seeks to a
//! record's payload, reads it, and decodes it with the stream's byte order.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace};

use crate::roff::error::{Result, RoffError};
use crate::roff::types::models::{Endian, KeywordRecord, ValueKind};
use crate::roff::utils;

use super::scanner::{KeywordIndex, BYTESWAP_KEY};

/// Whether an absent keyword is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Mandatory,
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Char(String),
    Bool(bool),
    Byte(u8),
    Int(i32),
    Float(f32),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    Char(Vec<String>),
    Bool(Vec<u8>),
    Byte(Vec<u8>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Char(v) => v.len(),
            ArrayValue::Bool(v) | ArrayValue::Byte(v) => v.len(),
            ArrayValue::Int(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Determines the byte order from the `filedata!byteswaptest` sentinel.
///
/// The sentinel is read under both orders; the one decoding to 1 wins.
pub fn resolve_byte_order<R: Read + Seek>(source: &mut R, index: &KeywordIndex) -> Result<Endian> {
    let record = single(index, BYTESWAP_KEY, Requirement::Mandatory)?
        .ok_or_else(|| RoffError::MissingKeyword(BYTESWAP_KEY.to_string()))?;
    if record.kind != ValueKind::Int || record.is_array() {
        return Err(RoffError::KindMismatch {
            key: BYTESWAP_KEY.to_string(),
            expected: "int scalar",
            found: record.kind,
        });
    }
    source.seek(SeekFrom::Start(record.offset))?;
    let raw = utils::read_raw4(source)?;
    let order = Endian::from_sentinel(BYTESWAP_KEY, raw)?;
    debug!("Resolved byte order: {:?}", order);
    Ok(order)
}

/// Looks up exactly one record for `key`.
fn single<'i>(
    index: &'i KeywordIndex,
    key: &str,
    requirement: Requirement,
) -> Result<Option<&'i KeywordRecord>> {
    let found = index.find(key);
    match found.len() {
        0 => match requirement {
            Requirement::Mandatory => Err(RoffError::MissingKeyword(key.to_string())),
            Requirement::Optional => {
                trace!("Optional keyword {} not present", key);
                Ok(None)
            }
        },
        1 => Ok(Some(found[0])),
        count => Err(RoffError::DuplicateKeyword {
            key: key.to_string(),
            count,
        }),
    }
}

/// Typed, order-aware access to the values of one scanned stream.
pub struct KeywordQuery<'a, R> {
    source: &'a mut R,
    index: &'a KeywordIndex,
    order: Endian,
}

impl<'a, R: Read + Seek> KeywordQuery<'a, R> {
    pub fn new(source: &'a mut R, index: &'a KeywordIndex, order: Endian) -> Self {
        Self { source, index, order }
    }

    pub fn order(&self) -> Endian {
        self.order
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Decodes a scalar record.
    pub fn scalar(&mut self, key: &str, requirement: Requirement) -> Result<Option<ScalarValue>> {
        let Some(record) = single(self.index, key, requirement)? else {
            return Ok(None);
        };
        if record.is_array() {
            return Err(RoffError::KindMismatch {
                key: key.to_string(),
                expected: "scalar",
                found: record.kind,
            });
        }
        let payload = self.payload(record)?;
        let value = match record.kind {
            ValueKind::Char => {
                let text = utils::split_cstrings(&payload).into_iter().next().unwrap_or_default();
                ScalarValue::Char(text)
            }
            ValueKind::Bool => ScalarValue::Bool(payload[0] != 0),
            ValueKind::Byte => ScalarValue::Byte(payload[0]),
            ValueKind::Int => ScalarValue::Int(self.order.read_i32(&payload)),
            ValueKind::Float => ScalarValue::Float(self.order.read_f32(&payload)),
            ValueKind::Double => ScalarValue::Double(self.order.read_f64(&payload)),
        };
        Ok(Some(value))
    }

    /// Decodes an array record into a newly owned vector.
    pub fn array(&mut self, key: &str, requirement: Requirement) -> Result<Option<ArrayValue>> {
        let Some(record) = single(self.index, key, requirement)? else {
            return Ok(None);
        };
        if !record.is_array() {
            return Err(RoffError::KindMismatch {
                key: key.to_string(),
                expected: "array",
                found: record.kind,
            });
        }
        let count = record.count();
        let payload = self.payload(record)?;
        let value = match record.kind {
            ValueKind::Char => ArrayValue::Char(utils::split_cstrings(&payload)),
            ValueKind::Bool => ArrayValue::Bool(payload),
            ValueKind::Byte => ArrayValue::Byte(payload),
            ValueKind::Int => {
                let mut values = vec![0i32; count];
                self.order.read_i32_into(&payload, &mut values);
                ArrayValue::Int(values)
            }
            ValueKind::Float => {
                let mut values = vec![0f32; count];
                self.order.read_f32_into(&payload, &mut values);
                ArrayValue::Float(values)
            }
            ValueKind::Double => {
                let mut values = vec![0f64; count];
                self.order.read_f64_into(&payload, &mut values);
                ArrayValue::Double(values)
            }
        };
        trace!("Decoded {} ({} values)", key, value.len());
        Ok(Some(value))
    }

    pub fn int(&mut self, key: &str, requirement: Requirement) -> Result<Option<i32>> {
        match self.scalar(key, requirement)? {
            None => Ok(None),
            Some(ScalarValue::Int(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "int")),
        }
    }

    /// A float or double scalar, widened to `f64`.
    pub fn float(&mut self, key: &str, requirement: Requirement) -> Result<Option<f64>> {
        match self.scalar(key, requirement)? {
            None => Ok(None),
            Some(ScalarValue::Float(v)) => Ok(Some(v as f64)),
            Some(ScalarValue::Double(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "float")),
        }
    }

    pub fn string(&mut self, key: &str, requirement: Requirement) -> Result<Option<String>> {
        match self.scalar(key, requirement)? {
            None => Ok(None),
            Some(ScalarValue::Char(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "char")),
        }
    }

    pub fn int_array(&mut self, key: &str, requirement: Requirement) -> Result<Option<Vec<i32>>> {
        match self.array(key, requirement)? {
            None => Ok(None),
            Some(ArrayValue::Int(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "int array")),
        }
    }

    /// A float or double array, widened to `f64`.
    pub fn float_array(&mut self, key: &str, requirement: Requirement) -> Result<Option<Vec<f64>>> {
        match self.array(key, requirement)? {
            None => Ok(None),
            Some(ArrayValue::Float(v)) => Ok(Some(v.into_iter().map(f64::from).collect())),
            Some(ArrayValue::Double(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "float array")),
        }
    }

    /// A byte or bool array.
    pub fn byte_array(&mut self, key: &str, requirement: Requirement) -> Result<Option<Vec<u8>>> {
        match self.array(key, requirement)? {
            None => Ok(None),
            Some(ArrayValue::Byte(v)) | Some(ArrayValue::Bool(v)) => Ok(Some(v)),
            Some(_) => Err(self.mismatch(key, "byte array")),
        }
    }

    /// Mandatory int scalar.
    pub fn require_int(&mut self, key: &str) -> Result<i32> {
        self.int(key, Requirement::Mandatory)?
            .ok_or_else(|| RoffError::MissingKeyword(key.to_string()))
    }

    /// Mandatory float scalar.
    pub fn require_float(&mut self, key: &str) -> Result<f64> {
        self.float(key, Requirement::Mandatory)?
            .ok_or_else(|| RoffError::MissingKeyword(key.to_string()))
    }

    pub fn require_float_array(&mut self, key: &str) -> Result<Vec<f64>> {
        self.float_array(key, Requirement::Mandatory)?
            .ok_or_else(|| RoffError::MissingKeyword(key.to_string()))
    }

    pub fn require_byte_array(&mut self, key: &str) -> Result<Vec<u8>> {
        self.byte_array(key, Requirement::Mandatory)?
            .ok_or_else(|| RoffError::MissingKeyword(key.to_string()))
    }

    fn payload(&mut self, record: &KeywordRecord) -> Result<Vec<u8>> {
        self.source.seek(SeekFrom::Start(record.offset))?;
        let mut payload = vec![0u8; record.len as usize];
        self.source.read_exact(&mut payload)?;
        Ok(payload)
    }

    fn mismatch(&self, key: &str, expected: &'static str) -> RoffError {
        let found = self
            .index
            .find(key)
            .first()
            .map(|r| r.kind)
            .unwrap_or(ValueKind::Char);
        RoffError::KindMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }
}

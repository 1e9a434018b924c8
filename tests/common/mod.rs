//! Synthetic binary ROFF streams for the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use roff_grid_reader::Endian;

/// Low-level writer for the tag / record layout.
pub struct RoffWriter {
    buf: Vec<u8>,
    order: Endian,
}

impl RoffWriter {
    pub fn new(order: Endian) -> Self {
        let mut w = Self {
            buf: Vec::new(),
            order,
        };
        w.token("roff-bin");
        w.token("#ROFF file#");
        w.token("#Creator: synthetic test grid#");
        w
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn token(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        self
    }

    pub fn tag(&mut self, name: &str) -> &mut Self {
        self.token("tag").token(name)
    }

    pub fn endtag(&mut self) -> &mut Self {
        self.token("endtag")
    }

    fn put_i32(&mut self, v: i32) {
        match self.order {
            Endian::Little => self.buf.write_i32::<LittleEndian>(v).unwrap(),
            Endian::Big => self.buf.write_i32::<BigEndian>(v).unwrap(),
        }
    }

    fn put_f32(&mut self, v: f32) {
        match self.order {
            Endian::Little => self.buf.write_f32::<LittleEndian>(v).unwrap(),
            Endian::Big => self.buf.write_f32::<BigEndian>(v).unwrap(),
        }
    }

    pub fn int(&mut self, name: &str, v: i32) -> &mut Self {
        self.token("int").token(name);
        self.put_i32(v);
        self
    }

    pub fn float(&mut self, name: &str, v: f32) -> &mut Self {
        self.token("float").token(name);
        self.put_f32(v);
        self
    }

    pub fn char(&mut self, name: &str, v: &str) -> &mut Self {
        self.token("char").token(name).token(v)
    }

    pub fn int_array(&mut self, name: &str, values: &[i32]) -> &mut Self {
        self.token("array").token("int").token(name);
        self.put_i32(values.len() as i32);
        for &v in values {
            self.put_i32(v);
        }
        self
    }

    pub fn float_array(&mut self, name: &str, values: &[f32]) -> &mut Self {
        self.token("array").token("float").token(name);
        self.put_i32(values.len() as i32);
        for &v in values {
            self.put_f32(v);
        }
        self
    }

    pub fn byte_array(&mut self, kind: &str, name: &str, values: &[u8]) -> &mut Self {
        self.token("array").token(kind).token(name);
        self.put_i32(values.len() as i32);
        self.buf.extend_from_slice(values);
        self
    }

    pub fn char_array(&mut self, name: &str, values: &[&str]) -> &mut Self {
        self.token("array").token("char").token(name);
        self.put_i32(values.len() as i32);
        for v in values {
            self.token(v);
        }
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.tag("eof").endtag();
        self.buf
    }

    pub fn finish_without_eof(self) -> Vec<u8> {
        self.buf
    }
}

/// A complete synthetic grid with analytically known raw values.
#[derive(Debug, Clone)]
pub struct GridFixture {
    pub ncol: usize,
    pub nrow: usize,
    pub nlay: usize,
    pub shift: [f32; 3],
    pub scale: [f32; 3],
    pub subgrids: Option<Vec<i32>>,
    pub active: Option<Vec<u8>>,
    pub byteswap: i32,
    pub filetype: &'static str,
    /// Nodes `(i, j, kr)` written with split count 0, `kr` counted from the base.
    pub empty_nodes: Vec<(usize, usize, usize)>,
    /// Composite keys left out of the stream.
    pub omit: Vec<&'static str>,
}

impl GridFixture {
    pub fn new(ncol: usize, nrow: usize, nlay: usize) -> Self {
        Self {
            ncol,
            nrow,
            nlay,
            shift: [1000.0, 2000.0, 0.0],
            scale: [1.0, 1.0, -1.0],
            subgrids: None,
            active: None,
            byteswap: 1,
            filetype: "grid",
            empty_nodes: Vec::new(),
            omit: Vec::new(),
        }
    }

    pub fn omit(mut self, key: &'static str) -> Self {
        self.omit.push(key);
        self
    }

    fn keep(&self, key: &str) -> bool {
        !self.omit.contains(&key)
    }

    /// Raw corner-line point of pillar `(i, j)`, `top` or bottom.
    pub fn raw_pillar(&self, i: usize, j: usize, top: bool) -> [f32; 3] {
        let x = 10.0 * i as f32 + 0.5 * j as f32;
        let y = 20.0 * j as f32 - 0.25 * i as f32;
        let z = if top { 1.0 + 0.1 * i as f32 } else { -150.0 - 0.2 * j as f32 };
        [x, y, z]
    }

    /// Nodes at odd `i + j` carry four distinct depths.
    pub fn is_split(&self, i: usize, j: usize) -> bool {
        (i + j) % 2 == 1
    }

    /// Raw depth of node `(i, j)` at base-counted boundary `kr`, for `slot`.
    pub fn raw_depth(&self, i: usize, j: usize, kr: usize, slot: usize) -> f32 {
        let base = -100.0 + 5.0 * kr as f32 + 0.25 * i as f32 + 0.5 * j as f32;
        if self.is_split(i, j) {
            base + 0.125 * slot as f32
        } else {
            base
        }
    }

    pub fn corner_lines(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for i in 0..=self.ncol {
            for j in 0..=self.nrow {
                out.extend_from_slice(&self.raw_pillar(i, j, false));
                out.extend_from_slice(&self.raw_pillar(i, j, true));
            }
        }
        out
    }

    pub fn split_data(&self) -> (Vec<u8>, Vec<f32>) {
        let mut splits = Vec::new();
        let mut zvalues = Vec::new();
        for i in 0..=self.ncol {
            for j in 0..=self.nrow {
                for kr in 0..=self.nlay {
                    if self.empty_nodes.contains(&(i, j, kr)) {
                        splits.push(0);
                    } else if self.is_split(i, j) {
                        splits.push(4);
                        for slot in 0..4 {
                            zvalues.push(self.raw_depth(i, j, kr, slot));
                        }
                    } else {
                        splits.push(1);
                        zvalues.push(self.raw_depth(i, j, kr, 0));
                    }
                }
            }
        }
        (splits, zvalues)
    }

    /// Expected transformed depth of corner `c` of cell `(i, j)` at top-counted boundary `k`.
    ///
    /// Empty nodes keep the zero the output arrays start from.
    pub fn expected_corner(&self, i: usize, j: usize, k: usize, c: usize) -> f64 {
        let ni = i + (c & 1);
        let nj = j + (c >> 1);
        let slot = 3 - c;
        if self.empty_nodes.contains(&(ni, nj, self.nlay - k)) {
            return 0.0;
        }
        let raw = self.raw_depth(ni, nj, self.nlay - k, slot) as f64;
        raw * self.scale[2] as f64 + self.shift[2] as f64
    }

    /// Expected transformed point of pillar `(i, j)`.
    pub fn expected_pillar(&self, i: usize, j: usize, top: bool) -> [f64; 3] {
        let raw = self.raw_pillar(i, j, top);
        [0, 1, 2].map(|a| raw[a] as f64 * self.scale[a] as f64 + self.shift[a] as f64)
    }

    pub fn to_bytes(&self, order: Endian) -> Vec<u8> {
        let mut w = RoffWriter::new(order);

        w.tag("filedata");
        if self.keep("filedata!byteswaptest") {
            w.int("byteswaptest", self.byteswap);
        }
        w.char("filetype", self.filetype)
            .char("creationDate", "01/01/2020 12:00:00")
            .endtag();

        w.tag("version").int("major", 2).int("minor", 0).endtag();

        w.tag("dimensions");
        for (key, name, v) in [
            ("dimensions!nX", "nX", self.ncol),
            ("dimensions!nY", "nY", self.nrow),
            ("dimensions!nZ", "nZ", self.nlay),
        ] {
            if self.keep(key) {
                w.int(name, v as i32);
            }
        }
        w.endtag();

        w.tag("translate");
        for (axis, name) in ["xoffset", "yoffset", "zoffset"].iter().enumerate() {
            if self.keep(&format!("translate!{}", name)) {
                w.float(name, self.shift[axis]);
            }
        }
        w.endtag();

        w.tag("scale");
        for (axis, name) in ["xscale", "yscale", "zscale"].iter().enumerate() {
            if self.keep(&format!("scale!{}", name)) {
                w.float(name, self.scale[axis]);
            }
        }
        w.endtag();

        if let Some(counts) = &self.subgrids {
            w.tag("subgrids").int_array("nLayers", counts).endtag();
        }

        if self.keep("cornerLines!data") {
            w.tag("cornerLines")
                .float_array("data", &self.corner_lines())
                .endtag();
        }

        let (splits, zvalues) = self.split_data();
        w.tag("zvalues");
        if self.keep("zvalues!splitEnz") {
            w.byte_array("byte", "splitEnz", &splits);
        }
        if self.keep("zvalues!data") {
            w.float_array("data", &zvalues);
        }
        w.endtag();

        if let Some(active) = &self.active {
            w.tag("active").byte_array("bool", "data", active).endtag();
        }

        w.finish()
    }
}

/// In-memory source that counts how often it is dropped.
pub struct TrackedSource {
    inner: Cursor<Vec<u8>>,
    drops: Rc<Cell<usize>>,
}

impl TrackedSource {
    pub fn new(bytes: Vec<u8>) -> (Self, Rc<Cell<usize>>) {
        let drops = Rc::new(Cell::new(0));
        (
            Self {
                inner: Cursor::new(bytes),
                drops: Rc::clone(&drops),
            },
            drops,
        )
    }
}

impl Read for TrackedSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedSource {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

//! Symbolic bit commands for sub-byte and byte-spanning header fields.
//!
//! A command is written in a compact text form and stored verbatim in the
//! descriptor tables, e.g. `x_rdo3+5` (bits 3..=5 of byte 0) or
//! `x_id7=0e1500_id7=1erd6d7ct10` (1500 when bit 7 is clear, otherwise the
//! 15 low bits of the window divided by 10).
//!
//! | token       | meaning                                            |
//! |-------------|----------------------------------------------------|
//! | `x`         | command prefix, actions follow separated by `_`    |
//! | `r`         | extraction, one `d` selector per byte              |
//! | `dN`        | bits `0..=N` of the byte                           |
//! | `doN`       | bit `N` of the byte                                |
//! | `doN+M`     | bits `N..=M` of the byte                           |
//! | `cOV`       | post-transform, `O` in `a s m t`, literal `V`      |
//! | `idN=VeR`   | if bit `N` equals `V` the result is `R`            |
//!
//! Extracted bits are concatenated most significant first, byte 0 first, and
//! read as an unsigned integer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

const FORMAT: &str = "bits";

/// Which end of a byte bit index 0 refers to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// Index 0 is the least significant bit. Every vendor table uses this.
    #[default]
    Lsb0,
    /// Index 0 is the most significant bit.
    Msb0,
}

/// Value (0 or 1) of bit `index` of `byte`, `index` in `0..=7`.
#[inline]
pub(crate) fn bit(byte: u8, index: u8, order: BitOrder) -> u8 {
    debug_assert!(index <= 7, "bit index {}", index);
    match order {
        BitOrder::Lsb0 => (byte >> index) & 1,
        BitOrder::Msb0 => (byte >> (7 - index)) & 1,
    }
}

/// Bits `start..=end` of `byte` as an unsigned value of width `end - start + 1`.
/// Requires `start <= end <= 7`, which [`BitCommand::parse`] checks.
#[inline]
pub(crate) fn bit_range(byte: u8, start: u8, end: u8, order: BitOrder) -> u64 {
    debug_assert!(start <= end && end <= 7, "bit range {}..={}", start, end);
    let width = end - start + 1;
    let mask = ((1u16 << width) - 1) as u8;
    let shifted = match order {
        BitOrder::Lsb0 => byte >> start,
        BitOrder::Msb0 => byte >> (7 - end),
    };
    (shifted & mask) as u64
}

/// One byte-scoped operation of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Bit(u8),
    Range { start: u8, end: u8 },
}

impl Selector {
    fn width(&self) -> u32 {
        match *self {
            Selector::Bit(_) => 1,
            Selector::Range { start, end } => (end - start + 1) as u32,
        }
    }

    fn read(&self, byte: u8, order: BitOrder) -> u64 {
        match *self {
            Selector::Bit(index) => bit(byte, index, order) as u64,
            Selector::Range { start, end } => bit_range(byte, start, end, order),
        }
    }
}

/// Arithmetic applied to a decoded integer and a literal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOp {
    Add(i64),
    Subtract(i64),
    Multiply(i64),
    Divide(i64),
}

impl PostOp {
    fn apply(&self, value: i64) -> Result<i64> {
        let out = match *self {
            PostOp::Add(v) => value.checked_add(v),
            PostOp::Subtract(v) => value.checked_sub(v),
            PostOp::Multiply(v) => value.checked_mul(v),
            // floor division, operands are non-negative literals
            PostOp::Divide(0) => None,
            PostOp::Divide(v) => Some(value.div_euclid(v)),
        };
        out.ok_or_else(|| {
            TraceError::unsupported(FORMAT, format!("arithmetic fails for {} {:?}", value, self))
        })
    }
}

/// A multi-byte bit extraction followed by optional post-transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    pub selectors: Vec<Selector>,
    pub post: Vec<PostOp>,
}

impl Extract {
    pub fn eval(&self, window: &[u8], order: BitOrder) -> Result<i64> {
        if window.len() < self.selectors.len() {
            return Err(TraceError::out_of_bounds(
                FORMAT,
                "extract",
                0,
                self.selectors.len(),
                window.len(),
            ));
        }
        let mut acc = 0u64;
        for (sel, byte) in self.selectors.iter().zip(window) {
            acc = (acc << sel.width()) | sel.read(*byte, order);
        }
        let mut value = acc as i64;
        for op in &self.post {
            value = op.apply(value)?;
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Literal(i64),
    Extract(Extract),
}

/// `if bit(test_bit) == expect then outcome`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub test_bit: u8,
    pub expect: u8,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitCommand {
    Extract(Extract),
    /// Tested in declaration order, first match wins.
    Select(Vec<Branch>),
}

impl BitCommand {
    pub fn parse(src: &str) -> Result<Self> {
        let mut actions = src.split('_');
        if actions.next() != Some("x") {
            return Err(syntax(src, "missing `x` prefix"));
        }
        let actions: Vec<&str> = actions.collect();
        match actions.as_slice() {
            [] => Err(syntax(src, "no action")),
            [single] if single.starts_with('r') => {
                let mut cur = Cursor::new(src, single);
                cur.bump();
                let extract = cur.extract()?;
                cur.finish()?;
                Ok(BitCommand::Extract(extract))
            }
            branches => {
                let mut out = Vec::with_capacity(branches.len());
                for action in branches {
                    let mut cur = Cursor::new(src, action);
                    cur.expect(b'i')?;
                    cur.expect(b'd')?;
                    let test_bit = cur.digit()?;
                    cur.expect(b'=')?;
                    let expect = cur.digit()?;
                    if expect > 1 {
                        return Err(syntax(src, "test value must be 0 or 1"));
                    }
                    cur.expect(b'e')?;
                    let outcome = if cur.peek() == Some(b'r') {
                        cur.bump();
                        Outcome::Extract(cur.extract()?)
                    } else {
                        Outcome::Literal(cur.number()?)
                    };
                    cur.finish()?;
                    out.push(Branch {
                        test_bit,
                        expect,
                        outcome,
                    });
                }
                Ok(BitCommand::Select(out))
            }
        }
    }

    pub fn eval(&self, window: &[u8], order: BitOrder) -> Result<i64> {
        match self {
            BitCommand::Extract(extract) => extract.eval(window, order),
            BitCommand::Select(branches) => {
                for branch in branches {
                    let byte_idx = (branch.test_bit / 8) as usize;
                    let byte = *window.get(byte_idx).ok_or_else(|| {
                        TraceError::out_of_bounds(FORMAT, "test bit", byte_idx, 1, window.len())
                    })?;
                    if bit(byte, branch.test_bit % 8, order) != branch.expect {
                        continue;
                    }
                    return match &branch.outcome {
                        Outcome::Literal(v) => Ok(*v),
                        Outcome::Extract(extract) => extract.eval(window, order),
                    };
                }
                Err(TraceError::unsupported(
                    FORMAT,
                    format!("no branch matches window {:02x?}", window),
                ))
            }
        }
    }
}

/// Parse and evaluate `command` over `window` using [`BitOrder::Lsb0`].
pub fn decode(command: &str, window: &[u8]) -> Result<i64> {
    let cmd = BitCommand::parse(command)?;
    let value = cmd.eval(window, BitOrder::Lsb0)?;
    log::trace!("{} over {:02x?} -> {}", command, window, value);
    Ok(value)
}

fn syntax(src: &str, why: &str) -> TraceError {
    TraceError::unsupported(FORMAT, format!("bad bit command {:?}: {}", src, why))
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, action: &'a str) -> Self {
        Self {
            src,
            bytes: action.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, c: u8) -> Result<()> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(syntax(self.src, &format!("expected `{}`", c as char)))
        }
    }

    fn digit(&mut self) -> Result<u8> {
        match self.peek() {
            Some(c @ b'0'..=b'9') => {
                self.bump();
                Ok(c - b'0')
            }
            _ => Err(syntax(self.src, "expected a digit")),
        }
    }

    fn bit_index(&mut self) -> Result<u8> {
        let d = self.digit()?;
        if d > 7 {
            return Err(syntax(self.src, "bit index above 7"));
        }
        Ok(d)
    }

    fn number(&mut self) -> Result<i64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        if start == self.pos {
            return Err(syntax(self.src, "expected a number"));
        }
        // only ascii digits were consumed
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("0");
        text.parse()
            .map_err(|_| syntax(self.src, "literal out of range"))
    }

    fn extract(&mut self) -> Result<Extract> {
        let mut selectors = Vec::new();
        while self.peek() == Some(b'd') {
            self.bump();
            let sel = if self.peek() == Some(b'o') {
                self.bump();
                let start = self.bit_index()?;
                if self.peek() == Some(b'+') {
                    self.bump();
                    let end = self.bit_index()?;
                    if end < start {
                        return Err(syntax(self.src, "range end before start"));
                    }
                    Selector::Range { start, end }
                } else {
                    Selector::Bit(start)
                }
            } else {
                Selector::Range {
                    start: 0,
                    end: self.bit_index()?,
                }
            };
            selectors.push(sel);
        }
        if selectors.is_empty() {
            return Err(syntax(self.src, "extraction selects no byte"));
        }
        if selectors.iter().map(Selector::width).sum::<u32>() > 63 {
            return Err(syntax(self.src, "extraction wider than 63 bits"));
        }
        let mut post = Vec::new();
        while self.peek() == Some(b'c') {
            self.bump();
            let op = self.peek();
            self.bump();
            let operand = self.number()?;
            post.push(match op {
                Some(b'a') => PostOp::Add(operand),
                Some(b's') => PostOp::Subtract(operand),
                Some(b'm') => PostOp::Multiply(operand),
                Some(b't') => PostOp::Divide(operand),
                _ => return Err(syntax(self.src, "unknown arithmetic operator")),
            });
        }
        Ok(Extract { selectors, post })
    }

    fn finish(&self) -> Result<()> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(syntax(self.src, "trailing characters"))
        }
    }
}

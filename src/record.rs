//! Traces, trace streams and the header mutation utilities.

use serde::Serialize;

use crate::error::{Result, TraceError};
use crate::header::TraceHeader;
use crate::Format;

/// One canonical header and its samples.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Trace {
    pub header: TraceHeader,
    pub samples: Vec<f32>,
}

impl Trace {
    /// Pair a header with its samples; `ns` must match the sample count.
    pub fn new(header: TraceHeader, samples: Vec<f32>) -> Result<Self> {
        if header.ns() != samples.len() {
            return Err(TraceError::InvalidArgument(format!(
                "header declares {} samples, got {}",
                header.ns(),
                samples.len()
            )));
        }
        Ok(Self { header, samples })
    }

    pub fn tracl(&self) -> i64 {
        self.header.tracl()
    }
}

/// Ordered traces of one acquisition, in the canonical vocabulary.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TraceStream {
    format: Format,
    traces: Vec<Trace>,
    /// Free text carried next to the traces, in source order.
    text: Vec<(String, String)>,
}

impl TraceStream {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            traces: Vec::new(),
            text: Vec::new(),
        }
    }

    /// Build a stream from existing traces, renumbering `tracl` from 1.
    pub fn from_parts(
        format: Format,
        traces: impl IntoIterator<Item = Trace>,
        text: Vec<(String, String)>,
    ) -> Result<Self> {
        let mut stream = Self::new(format);
        for t in traces {
            stream.push(t.header, t.samples)?;
        }
        stream.text = text;
        Ok(stream)
    }

    /// Append a trace. `tracl` is assigned as the 1-based position.
    pub fn push(&mut self, mut header: TraceHeader, samples: Vec<f32>) -> Result<()> {
        let tracl = self.traces.len() as i64 + 1;
        if header.tracl() != 0 && header.tracl() != tracl {
            log::warn!(
                "{}: trace {} carried tracl {}, renumbered",
                self.format,
                tracl,
                header.tracl()
            );
        }
        header.set("tracl", tracl)?;
        self.traces.push(Trace::new(header, samples)?);
        Ok(())
    }

    /// Attach a free-text annotation.
    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.text.push((key.into(), value.into()));
    }

    /// First annotation stored under `key`.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.text
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> &[(String, String)] {
        &self.text
    }

    /// Format the stream was read from.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    pub fn into_traces(self) -> Vec<Trace> {
        self.traces
    }

    /// Values of one canonical field across all traces, empty when the name
    /// is not canonical.
    pub fn header(&self, name: &str) -> Vec<i64> {
        match TraceHeader::index_of(name) {
            Some(_) => self
                .traces
                .iter()
                .filter_map(|t| t.header.get(name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Update one canonical field, see [`HeaderValues`] for the accepted shapes.
    pub fn set_header(&mut self, name: &str, values: impl Into<HeaderValues>) -> Result<()> {
        if !TraceHeader::contains(name) {
            return Err(TraceError::InvalidArgument(format!(
                "unknown header field `{}`",
                name
            )));
        }
        let updates = self.resolve(values.into())?;

        if name == "ns" {
            if let Some(&(i, v)) = updates
                .iter()
                .find(|&&(i, v)| v != self.traces[i].samples.len() as i64)
            {
                return Err(TraceError::InvalidArgument(format!(
                    "ns of trace {} cannot become {}, it holds {} samples",
                    i + 1,
                    v,
                    self.traces[i].samples.len()
                )));
            }
        }
        if name == "tracl" {
            let mut next = self.header("tracl");
            for &(i, v) in &updates {
                next[i] = v;
            }
            if next.windows(2).any(|w| w[0] >= w[1]) {
                return Err(TraceError::InvalidArgument(
                    "tracl must stay strictly increasing".into(),
                ));
            }
        }

        for (i, v) in updates {
            self.traces[i].header.set(name, v)?;
        }
        log::debug!("{}: set {}", self.format, name);
        Ok(())
    }

    fn resolve(&self, values: HeaderValues) -> Result<Vec<(usize, i64)>> {
        let n = self.traces.len();
        match values {
            HeaderValues::Scalar(v) => Ok((0..n).map(|i| (i, v)).collect()),
            HeaderValues::Sequence(vs) if vs.len() == n => Ok(vs.into_iter().enumerate().collect()),
            HeaderValues::Sequence(vs) if vs.len() == 2 => self.resolve(HeaderValues::Pair {
                tracl: vs[0],
                value: vs[1],
            }),
            HeaderValues::Sequence(vs) => Err(TraceError::InvalidArgument(format!(
                "{} values for {} traces",
                vs.len(),
                n
            ))),
            HeaderValues::Pair { tracl, value } => self
                .traces
                .iter()
                .position(|t| t.tracl() == tracl)
                .map(|i| vec![(i, value)])
                .ok_or_else(|| TraceError::InvalidArgument(format!("no trace with tracl {}", tracl))),
        }
    }

    /// Replace the samples of the selected traces with zeros, headers are
    /// left alone. Returns how many traces were zeroed.
    pub fn zero_traces(&mut self, selector: impl Into<TraceSelector>) -> usize {
        let selector = selector.into();
        let mut zeroed = 0;
        for trace in self.traces.iter_mut().filter(|t| selector.matches(t.tracl())) {
            trace.samples.iter_mut().for_each(|s| *s = 0.0);
            zeroed += 1;
        }
        zeroed
    }

    /// Trace count, sample count, interval, start time and source format.
    pub fn summary(&self) -> serde_json::Value {
        let first = self.traces.first();
        let start = first
            .map(|t| t.header.time())
            .filter(|t| !t.is_zero())
            .map(|t| t.to_string());
        serde_json::json!({
            "format": self.format.to_string(),
            "traces": self.traces.len(),
            "samples": self.traces.iter().map(|t| t.samples.len()).sum::<usize>(),
            "dt": first.and_then(|t| t.header.get("dt")),
            "start": start,
            "annotations": self.text.len(),
        })
    }
}

impl<'a> IntoIterator for &'a TraceStream {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

/// New values for [`TraceStream::set_header`].
///
/// A sequence as long as the stream is positional; otherwise a two-element
/// sequence is a `(tracl, value)` pair. Any other length is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    Scalar(i64),
    Sequence(Vec<i64>),
    Pair { tracl: i64, value: i64 },
}

impl From<i64> for HeaderValues {
    fn from(v: i64) -> Self {
        HeaderValues::Scalar(v)
    }
}

impl From<Vec<i64>> for HeaderValues {
    fn from(v: Vec<i64>) -> Self {
        HeaderValues::Sequence(v)
    }
}

impl From<&[i64]> for HeaderValues {
    fn from(v: &[i64]) -> Self {
        HeaderValues::Sequence(v.to_vec())
    }
}

impl From<(i64, i64)> for HeaderValues {
    fn from((tracl, value): (i64, i64)) -> Self {
        HeaderValues::Pair { tracl, value }
    }
}

/// Traces picked by `tracl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceSelector {
    One(i64),
    Many(Vec<i64>),
}

impl TraceSelector {
    fn matches(&self, tracl: i64) -> bool {
        match self {
            TraceSelector::One(t) => *t == tracl,
            TraceSelector::Many(ts) => ts.contains(&tracl),
        }
    }
}

impl From<i64> for TraceSelector {
    fn from(v: i64) -> Self {
        TraceSelector::One(v)
    }
}

impl From<Vec<i64>> for TraceSelector {
    fn from(v: Vec<i64>) -> Self {
        TraceSelector::Many(v)
    }
}

impl From<&[i64]> for TraceSelector {
    fn from(v: &[i64]) -> Self {
        TraceSelector::Many(v.to_vec())
    }
}

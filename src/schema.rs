//! Static byte-layout tables for every supported format.
//! Tables are read-only schema: readers and writers never mutate them.

use bitflags::bitflags;

use crate::data::Encoding::{self, *};
use crate::data::{field, ByteOrder, FieldDescriptor, Pad, Value};
use crate::error::Result;

/// A descriptor table plus the context needed to apply it.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Format tag used in error messages.
    pub format: &'static str,
    pub order: ByteOrder,
    /// Size of the framed block the offsets are relative to.
    pub size: usize,
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    pub fn with_order(self, order: ByteOrder) -> Self {
        Self { order, ..self }
    }

    /// Last descriptor named `name`, duplicates resolve to the later entry.
    pub fn get(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().rev().find(|f| f.name == name)
    }

    pub fn decode_field(&self, desc: &FieldDescriptor, frame: &[u8], base: usize) -> Result<Value> {
        desc.decode(frame, base, self.order, self.format)
    }

    /// Decode every field of the table, in table order. Blobs are skipped.
    pub fn decode(&self, frame: &[u8], base: usize) -> Result<Vec<(&'static str, Value)>> {
        let mut out = Vec::with_capacity(self.fields.len());
        for desc in self.fields.iter().filter(|f| f.encoding != Blob) {
            out.push((desc.name, self.decode_field(desc, frame, base)?));
        }
        Ok(out)
    }

    /// Build the `size`-byte block, asking `lookup` for each field's value.
    pub fn encode_with(&self, mut lookup: impl FnMut(&FieldDescriptor) -> Value) -> Result<Vec<u8>> {
        let mut block = vec![0u8; self.size];
        for desc in self.fields {
            let bytes = desc.encode(&lookup(desc), self.order, self.format)?;
            block[desc.offset..desc.offset + desc.len].copy_from_slice(&bytes);
        }
        Ok(block)
    }
}

/// Look up `name` in decoded `(name, value)` pairs, later entries win.
pub fn lookup<'a>(fields: &'a [(&'static str, Value)], name: &str) -> Option<&'a Value> {
    fields.iter().rev().find(|(n, _)| *n == name).map(|(_, v)| v)
}

/// Seismic Unix 240-byte trace header. Its names are the canonical vocabulary.
pub const SU_TRACE_HEADER: Schema = Schema {
    format: "su",
    order: ByteOrder::Little,
    size: 240,
    fields: &[
        field(4, 0, "tracl", I32),
        field(4, 4, "tracr", I32),
        field(4, 8, "fldr", I32),
        field(4, 12, "tracf", I32),
        field(4, 16, "ep", I32),
        field(4, 20, "cdp", I32),
        field(4, 24, "cdpt", I32),
        field(2, 28, "trid", I16),
        field(2, 30, "nvs", I16),
        field(2, 32, "nhs", I16),
        field(2, 34, "duse", I16),
        field(4, 36, "offset", I32),
        field(4, 40, "gelev", I32),
        field(4, 44, "selev", I32),
        field(4, 48, "sdepth", I32),
        field(4, 52, "gdel", I32),
        field(4, 56, "sdel", I32),
        field(4, 60, "swdep", I32),
        field(4, 64, "gwdep", I32),
        field(2, 68, "scalel", I16),
        field(2, 70, "scalco", I16),
        field(4, 72, "sx", I32),
        field(4, 76, "sy", I32),
        field(4, 80, "gx", I32),
        field(4, 84, "gy", I32),
        field(2, 88, "counits", I16),
        field(2, 90, "wevel", I16),
        field(2, 92, "swevel", I16),
        field(2, 94, "sut", I16),
        field(2, 96, "gut", I16),
        field(2, 98, "sstat", I16),
        field(2, 100, "gstat", I16),
        field(2, 102, "tstat", I16),
        field(2, 104, "laga", I16),
        field(2, 106, "lagb", I16),
        field(2, 108, "delrt", I16),
        field(2, 110, "muts", I16),
        field(2, 112, "mute", I16),
        field(2, 114, "ns", U16),
        field(2, 116, "dt", U16),
        field(2, 118, "gain", I16),
        field(2, 120, "igc", I16),
        field(2, 122, "igi", I16),
        field(2, 124, "corr", I16),
        field(2, 126, "sfs", I16),
        field(2, 128, "sfe", I16),
        field(2, 130, "slen", I16),
        field(2, 132, "styp", I16),
        field(2, 134, "stas", I16),
        field(2, 136, "stae", I16),
        field(2, 138, "ttype", I16),
        field(2, 140, "aff", I16),
        field(2, 142, "afs", I16),
        field(2, 144, "nff", I16),
        field(2, 146, "nfs", I16),
        field(2, 148, "lcutf", I16),
        field(2, 150, "hcutf", I16),
        field(2, 152, "lcuts", I16),
        field(2, 154, "hcuts", I16),
        field(2, 156, "year", I16),
        field(2, 158, "day", I16),
        field(2, 160, "hour", I16),
        field(2, 162, "minute", I16),
        field(2, 164, "second", I16),
        field(2, 166, "time_basis_code", I16),
        field(2, 168, "trace_weighting_factor", I16),
        field(2, 170, "geognofroll", I16),
        field(2, 172, "geognoftrstart", I16),
        field(2, 174, "geogrnoftrlast", I16),
        field(2, 176, "gap_size", I16),
        field(2, 178, "otataper", I16),
        field(4, 180, "gxtr", I32),
        field(4, 184, "gytr", I32),
        field(4, 188, "stacktr", I32),
        field(4, 192, "stackcrossid", I32),
        field(4, 196, "shotn", I32),
        field(2, 200, "scalartoshotpoint", I16),
        field(2, 202, "trunit", I16),
        field(4, 204, "transmant", I32),
        field(2, 208, "transexp", I16),
        field(2, 210, "transunits", I16),
        field(2, 212, "devtrid", I16),
        field(2, 214, "scalet", I16),
        field(2, 216, "sxorient", I16),
        field(4, 218, "epdirmant", I32),
        field(2, 222, "epdirex", I16),
        field(4, 224, "smant", I32),
        field(2, 228, "sexp", I16),
        field(2, 230, "sunit", I16),
        field(8, 232, "unassigned", I64),
    ],
};

/// SEG-Y textual (blob) plus 400-byte binary file header.
pub const SEGY_FILE_HEADER: Schema = Schema {
    format: "sgy",
    order: ByteOrder::Little,
    size: 3600,
    fields: &[
        field(3200, 0, "unassigned_0", Blob),
        field(4, 3200, "job_id", I32),
        field(4, 3204, "line_nr", I32),
        field(4, 3208, "reel_nr", I32),
        field(2, 3212, "nr_tr_in_ensemble", U16),
        field(2, 3214, "nr_of_auxiliary_traces_per_ensemble", U16),
        field(2, 3216, "dt", U16),
        field(2, 3218, "dt_field_recording", U16),
        field(2, 3220, "ns", U16),
        field(2, 3222, "ns_field_recording", U16),
        field(2, 3224, "data_sample_format_code", U16),
        field(2, 3226, "ensemble_fold", U16),
        field(2, 3228, "trace_sorting_code", U16),
        field(2, 3230, "vertical_sum_code", U16),
        field(2, 3232, "sfs", U16),
        field(2, 3234, "sfe", U16),
        field(2, 3236, "slen", U16),
        field(2, 3238, "styp", U16),
        field(2, 3240, "trace_number_of_sweep_channel", U16),
        field(2, 3242, "stas", U16),
        field(2, 3244, "stae", U16),
        field(2, 3246, "ttype", U16),
        field(2, 3248, "correlated_data_traces", U16),
        field(2, 3250, "binary_gain_recovered", U16),
        field(2, 3252, "amplitude_recovery_method", U16),
        field(2, 3254, "measurement_system", U16),
        field(2, 3256, "impulse_signal_polarity", U16),
        field(2, 3258, "vibratory_polarity_code", U16),
        field(240, 3260, "unassigned_1", Blob),
        field(2, 3500, "seg_y_format_revision_number", U16),
        field(2, 3502, "fixed_length_trace_flag", U16),
        field(2, 3504, "nr_of_hdr_records_2follow", U16),
        field(94, 3506, "unassigned_2", Blob),
    ],
};

/// Values written regardless of canonical content when the field is absent
/// (or zero) in the source header.
pub const SEGY_MANDATORY: &[(&str, i64)] = &[
    ("trid", 1),
    ("data_sample_format_code", 5),
    ("trace_sorting_code", 1),
    ("measurement_system", 1),
    ("fixed_length_trace_flag", 1),
    ("seg_y_format_revision_number", 0),
    ("nr_of_hdr_records_2follow", 0),
    ("nr_tr_in_ensemble", 1),
];

pub fn segy_mandatory(name: &str) -> Option<i64> {
    SEGY_MANDATORY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

/// GSSI radar file header.
pub const DZT_HEADER: Schema = Schema {
    format: "dzt",
    order: ByteOrder::Little,
    size: 128,
    fields: &[
        field(2, 0, "channel_on", U16),
        field(2, 2, "data_offset", U16),
        field(2, 4, "ns", U16),
        field(2, 6, "data_bits", U16),
        field(2, 8, "bin_offset", U16),
        field(4, 10, "scans_sec", F32),
        field(4, 14, "scans_meter", F32),
        field(4, 18, "m_mark", F32),
        field(4, 22, "pos_ns", F32),
        field(4, 26, "range_ns", F32),
        field(2, 30, "scan_pass", U16),
        field(4, 32, "date_c", Blob),
        field(4, 36, "date_m", Blob),
        field(2, 40, "gain_offset", U16),
        field(2, 42, "gain_size", U16),
        field(2, 44, "text_offset", U16),
        field(2, 46, "text_size", U16),
        field(2, 48, "hist_offset", U16),
        field(2, 50, "hist_size", U16),
        field(2, 52, "channel_num", U16),
        field(4, 54, "dia_const", F32),
        field(4, 58, "pos_top", F32),
        field(4, 62, "range", F32),
        field(1, 97, "data_type", Text(Pad::Nul)),
        field(14, 98, "antenna", Text(Pad::Nul)),
        field(2, 112, "ch_mask", U16),
        field(12, 114, "file_name", Text(Pad::Nul)),
        field(2, 126, "checksum", U16),
    ],
};

/// Packed creation date of a DZT header. The window is the 4-byte date word
/// most significant byte first.
///
/// | bits  | 31-25        | 24-21 | 20-16 | 15-11 | 10-5   | 4-0    |
/// |-------|--------------|-------|-------|-------|--------|--------|
/// | field | year - 1980  | month | day   | hour  | minute | second |
pub const DZT_DATE: Schema = Schema {
    format: "dzt",
    order: ByteOrder::Big,
    size: 4,
    fields: &[
        field(1, 0, "year", Bits("x_rdo1+7ca1980")),
        field(2, 0, "month", Bits("x_rdo0do5+7")),
        field(1, 1, "day", Bits("x_rdo0+4")),
        field(1, 2, "hour", Bits("x_rdo3+7")),
        field(2, 2, "minute", Bits("x_rdo0+2do5+7")),
        field(1, 3, "second", Bits("x_rdo0+4")),
    ],
};

const TEXT: Encoding = Text(Pad::Nul);

/// Imagenix 881 sonar record header, tag `81e`.
pub const IM81E_HEADER: Schema = Schema {
    format: "81e",
    order: ByteOrder::Big,
    size: 112,
    fields: &[
        field(3, 0, "type", TEXT),
        field(1, 3, "ntoreadindex", U8),
        field(11, 8, "date", TEXT),
        field(1, 19, "reserved", Blob),
        field(8, 20, "time", TEXT),
        field(9, 28, "reserved", Blob),
        field(1, 37, "head_id", TEXT),
        field(1, 38, "mode", U8),
        field(1, 39, "gain", U8),
        field(3, 40, "reserved", Blob),
        field(1, 43, "absorption", Bits("x_rd7ca10")),
        field(1, 44, "data_bits", Bits("x_rdo3+5")),
        field(1, 44, "logF", Bits("x_rdo0+2")),
        field(1, 45, "pulse_length", U8),
        field(1, 46, "profile", U8),
        field(24, 47, "header_text", TEXT),
        field(29, 71, "reserved", Blob),
        field(3, 100, "device_designation", TEXT),
        field(1, 103, "head_id", TEXT),
        field(1, 104, "serial_status", U8),
        field(2, 105, "reserved", Blob),
        field(1, 107, "range", U8),
        field(1, 108, "profile_low_range", Bits("x_rd6")),
        field(1, 109, "profile_high_range", Bits("x_rdo1+6")),
        field(2, 110, "reserved", Blob),
    ],
};

/// Imagenix 881 multi-frequency record header, tag `851`.
pub const IM851_HEADER: Schema = Schema {
    format: "851",
    order: ByteOrder::Big,
    size: 112,
    fields: &[
        field(3, 0, "type", TEXT),
        field(1, 3, "ntoreadindex", U8),
        field(2, 4, "total_bytes", Bits("x_rd7d7")),
        field(2, 6, "ntoread", Bits("x_rd7d7")),
        field(11, 8, "date", TEXT),
        field(8, 20, "time", TEXT),
        field(1, 28, "reserved", Blob),
        field(3, 29, "hun_s", TEXT),
        field(5, 32, "reserved", Blob),
        field(1, 37, "dirxdcrmodstep", U8),
        field(1, 38, "gain", U8),
        field(4, 39, "reserved", Blob),
        field(1, 43, "absorption", U8),
        field(1, 44, "pulse_length", U8),
        field(1, 45, "profile", U8),
        field(2, 46, "water_velocity", Bits("x_id7=0e1500_id7=1erd6d7ct10")),
        field(32, 48, "header_text", TEXT),
        field(2, 80, "ROV_depth", Bits("x_id7=0e0_id7=1erd6d7ct10")),
        field(1, 82, "ROV_units", TEXT),
        field(2, 83, "ROV_heading", Bits("x_id7=0e0_id7=1erd6d7ct10")),
        field(2, 85, "ROV_counter", Bits("x_id7=0e0_id7=1erd6d7cs100")),
        field(1, 87, "operating_freq", U8),
        field(12, 88, "reserved", Blob),
        field(3, 100, "device_designation", TEXT),
        field(1, 103, "head_id", TEXT),
        field(1, 104, "serial_status", U8),
        field(1, 105, "head_low", Bits("x_rd6")),
        field(1, 106, "head_high", Bits("x_rdo1+5")),
        field(1, 106, "step_direction", Bits("x_rdo6")),
        field(1, 107, "range", U8),
        field(2, 108, "reserved", Blob),
    ],
};

/// Imagenix sector-scan record header, tag `852`.
pub const IM852_HEADER: Schema = Schema {
    format: "852",
    order: ByteOrder::Big,
    size: 112,
    fields: &[
        field(3, 0, "type", TEXT),
        field(1, 3, "ntoreadindex", U8),
        field(2, 4, "total_bytes", Bits("x_rd7d7")),
        field(2, 6, "ntoread", Bits("x_rd7d7")),
        field(11, 8, "date", TEXT),
        field(8, 20, "time", TEXT),
        field(1, 28, "reserved", Blob),
        field(3, 29, "hun_s", TEXT),
        field(5, 32, "reserved", Blob),
        field(1, 37, "dirxdcrmodstep", U8),
        field(1, 38, "gain", U8),
        field(1, 39, "sector_size", Bits("x_rd7ct3")),
        field(1, 40, "train_angle", Bits("x_rd7ct3")),
        field(3, 41, "reserved", Blob),
        field(1, 44, "pulse_length", U8),
        field(1, 45, "profile", U8),
        field(2, 46, "water_velocity", Bits("x_id7=0e1500_id7=1erd6d7ct10")),
        field(32, 48, "header_text", TEXT),
        field(2, 80, "ROV_depth", Bits("x_id7=0e0_id7=1erd6d7ct10")),
        field(1, 82, "ROV_units", TEXT),
        field(2, 83, "ROV_heading", Bits("x_id7=0e0_id7=1erd6d7ct10")),
        field(2, 85, "ROV_counter", Bits("x_id7=0e0_id7=1erd6d7cs100")),
        field(1, 87, "operating_freq", U8),
        field(1, 88, "head_id", TEXT),
        field(11, 89, "reserved", Blob),
        field(3, 100, "device_designation", TEXT),
        field(1, 103, "head_id", TEXT),
        field(1, 104, "serial_status", U8),
        field(1, 105, "head_low", Bits("x_rd6")),
        field(1, 106, "head_high", Bits("x_rdo1+5")),
        field(1, 106, "step_direction", Bits("x_rdo6")),
        field(1, 107, "range", U8),
        field(2, 108, "reserved", Blob),
    ],
};

/// SEG-2 file descriptor block, followed by the trace pointer table.
pub const SEG2_FILE_DESCRIPTOR: Schema = Schema {
    format: "sg2",
    order: ByteOrder::Little,
    size: 32,
    fields: &[
        field(2, 0, "file_id", U16),
        field(2, 2, "revision", U16),
        field(2, 4, "pointer_block_size", U16),
        field(2, 6, "traces", U16),
        field(6, 8, "terminators", Blob),
        field(18, 14, "reserved", Blob),
    ],
};

/// Fixed part of a SEG-2 trace descriptor block, trace strings follow.
pub const SEG2_TRACE_DESCRIPTOR: Schema = Schema {
    format: "sg2",
    order: ByteOrder::Little,
    size: 32,
    fields: &[
        field(2, 0, "block_id", U16),
        field(2, 2, "block_size", U16),
        field(4, 4, "data_size", I32),
        field(4, 8, "ns", I32),
        field(1, 12, "sample_code", U8),
        field(19, 13, "reserved", Blob),
    ],
};

bitflags! {
    /// Where a SEG-2 keyword lives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Placement: u8 {
        /// Per-trace string, otherwise a file header string.
        const TRACE = 0b01;
        /// A string of its own, otherwise a line of the NOTE block.
        const STRUCTURED = 0b10;
    }
}

/// One row of the SEG-2 keyword mapping.
#[derive(Debug, Clone, Copy)]
pub struct Seg2Keyword {
    pub keyword: &'static str,
    pub placement: Placement,
    /// Text written when the stream carries nothing better.
    pub default: &'static str,
    /// canonical = text value x scale; 0 means the keyword is not carried.
    pub scale: i64,
    /// Canonical fields fed by the whitespace separated value tokens.
    pub targets: &'static [&'static str],
    /// Number of value tokens.
    pub arity: usize,
}

const TRACE_STRING: Placement = Placement::TRACE.union(Placement::STRUCTURED);
const TRACE_NOTE: Placement = Placement::TRACE;
const FILE_STRING: Placement = Placement::STRUCTURED;
const FILE_NOTE: Placement = Placement::empty();

const fn kw(
    keyword: &'static str,
    placement: Placement,
    default: &'static str,
    scale: i64,
    targets: &'static [&'static str],
    arity: usize,
) -> Seg2Keyword {
    Seg2Keyword {
        keyword,
        placement,
        default,
        scale,
        targets,
        arity,
    }
}

/// SEG-2 keywords in write order. When two rows feed the same canonical field
/// the later row wins on read.
pub const SEG2_KEYWORDS: &[Seg2Keyword] = &[
    kw("ALIAS_FILTER", TRACE_STRING, "3333.33 0", 1, &["aff", "afs"], 2),
    kw("AMPLITUDE_RECOVERY", TRACE_STRING, "NONE", 1, &["stackcrossid"], 1),
    kw("CHANNEL_NUMBER", TRACE_STRING, "0", 1, &["tracl"], 1),
    kw("DELAY", TRACE_STRING, "0.000", 1000, &["tstat"], 1),
    kw("DESCALING_FACTOR", TRACE_STRING, "4.270400E-005", 1, &["igc"], 1),
    kw("DIGITAL_HIGH_CUT_FILTER", TRACE_STRING, "0 0", 1, &["hcutf", "hcuts"], 2),
    kw("DIGITAL_LOW_CUT_FILTER", TRACE_STRING, "0 0", 1, &["lcutf", "lcuts"], 2),
    kw("FIXED_GAIN", TRACE_STRING, "36 DB", 1, &["igc"], 1),
    kw("LINE_ID", TRACE_STRING, "0", 1, &["tracr"], 1),
    kw("LOW_CUT_FILTER", TRACE_STRING, "0 0", 1, &["lcutf", "lcuts"], 2),
    kw("NOTCH_FREQUENCY", TRACE_STRING, "0", 1, &["nff"], 1),
    kw("RAW_RECORD", TRACE_STRING, "NONE", 0, &["stacktr"], 1),
    kw("RECEIVER_LOCATION", TRACE_STRING, "0.00", 100, &["gx"], 1),
    kw("SAMPLE_INTERVAL", TRACE_STRING, "0.000125", 1_000_000, &["dt"], 1),
    kw("SHOT_SEQUENCE_NUMBER", TRACE_STRING, "NONE", 1, &["fldr"], 1),
    kw("SKEW", TRACE_STRING, "0.00", 0, &["transmant"], 1),
    kw("SOURCE_LOCATION", TRACE_STRING, "-85.00", 100, &["sx"], 1),
    kw("COMPANY", FILE_STRING, "Geometrics", 0, &[], 1),
    kw("INSTRUMENT", FILE_STRING, "GEOMETRICS SEISMODULES CONTROLLER 0000", 0, &[], 1),
    kw("JOB_ID", FILE_STRING, "0000", 0, &[], 1),
    kw("OBSERVER", FILE_STRING, "Observer", 0, &[], 1),
    kw("TRACE_SORT", FILE_STRING, "AS_ACQUIRED", 0, &[], 1),
    kw("UNITS", FILE_STRING, "METERS", 0, &[], 1),
    kw("DISPLAY_SCALE", TRACE_NOTE, "87", 1, &["scalet"], 1),
    kw("BASE_INTERVAL", FILE_NOTE, "5.00", 100, &[], 1),
    kw("SHOT_INCREMENT", FILE_NOTE, "0.00", 100, &[], 1),
    kw("PHONE_INCREMENT", FILE_NOTE, "0.00", 100, &[], 1),
    kw("AGC_WINDOW", FILE_NOTE, "0", 1, &[], 1),
    kw("DISPLAY_FILTERS", FILE_NOTE, "0 0", 1, &[], 2),
];

pub fn seg2_keyword(keyword: &str) -> Option<&'static Seg2Keyword> {
    SEG2_KEYWORDS.iter().find(|k| k.keyword == keyword)
}

/// Leading columns of a SICK laser swath line.
pub const SICK_COLUMNS: [&str; 8] = [
    "pseudo_angle",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "microseconds",
];

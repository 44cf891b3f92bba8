//! Snapshot-table field parsing.
//!
//! Keys arrive as display labels ("Forward P/E", "Oper. Margin") and values as
//! display strings ("12.50%", "1.23B"). A value of `-` means the source has
//! nothing for that field.

use indexmap::IndexMap;
use thiserror::Error;

use super::Fundamentals;

/// A field value that is present but cannot be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed value {raw:?} for field `{field}`")]
pub struct MalformedField {
    pub field: &'static str,
    pub raw: String,
}

type Parser = fn(&'static str, &str) -> Result<Option<f64>, MalformedField>;

/// Lookup keys of every field [`Fundamentals`] reads.
const FIELD_KEYS: [&str; 19] = [
    "forward_pe",
    "pe",
    "peg",
    "ps",
    "pb",
    "pfcf",
    "insider_own",
    "inst_own",
    "inst_trans",
    "shs_float",
    "short_float",
    "roa",
    "roe",
    "roi",
    "gross_margin",
    "oper_margin",
    "profit_margin",
    "sales_surprise",
    "eps_surprise",
];

/// Normalises a table label into a lookup key: drops `( ) / .`, turns spaces
/// into underscores and lowercases.
pub fn normalize_key(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '/' | '.'))
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

fn missing(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "-"
}

/// `"12.5%"` becomes `0.125`.
pub fn parse_pct(field: &'static str, raw: &str) -> Result<Option<f64>, MalformedField> {
    if missing(raw) {
        return Ok(None);
    }
    let digits = raw.trim().trim_end_matches('%');
    parse_number(field, raw, digits).map(|v| Some(v / 100.0))
}

pub fn parse_float(field: &'static str, raw: &str) -> Result<Option<f64>, MalformedField> {
    if missing(raw) {
        return Ok(None);
    }
    parse_number(field, raw, raw.trim()).map(Some)
}

/// Share counts in millions: `"850.2M"`, `"1.5B"` (= 1500), `"900K"` (= 0.9).
pub fn parse_shares_float(field: &'static str, raw: &str) -> Result<Option<f64>, MalformedField> {
    if missing(raw) {
        return Ok(None);
    }
    let value = raw.trim();
    let (digits, scale) = if let Some(d) = value.strip_suffix('M') {
        (d, 1.0)
    } else if let Some(d) = value.strip_suffix('B') {
        (d, 1_000.0)
    } else if let Some(d) = value.strip_suffix('K') {
        (d, 0.001)
    } else {
        return Err(MalformedField {
            field,
            raw: raw.to_string(),
        });
    };
    parse_number(field, raw, digits).map(|v| Some(v * scale))
}

fn parse_number(field: &'static str, raw: &str, digits: &str) -> Result<f64, MalformedField> {
    digits
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedField {
            field,
            raw: raw.to_string(),
        })
}

impl Fundamentals {
    /// Builds the record from a raw label/value snapshot table.
    ///
    /// Missing labels and `-` values become `None`. Malformed values are
    /// logged and also become `None`; they never fail the whole record.
    /// Returns `None` when the table carries none of the known labels, e.g.
    /// an empty table scraped from a block page.
    pub fn from_table(ticker: &str, raw: &IndexMap<String, String>) -> Option<Self> {
        let table: IndexMap<String, &str> = raw
            .iter()
            .map(|(label, value)| (normalize_key(label), value.as_str()))
            .collect();
        if !FIELD_KEYS.iter().any(|key| table.contains_key(*key)) {
            return None;
        }

        let read = |key: &'static str, parse: Parser| -> Option<f64> {
            let value = table.get(key)?;
            match parse(key, value) {
                Ok(parsed) => parsed,
                Err(err) => {
                    log::warn!("{ticker}: {err}");
                    None
                }
            }
        };

        Some(Self {
            ticker: ticker.to_string(),
            forward_pe: read("forward_pe", parse_float),
            pe: read("pe", parse_float),
            peg: read("peg", parse_float),
            ps: read("ps", parse_float),
            pb: read("pb", parse_float),
            pfcf: read("pfcf", parse_float),
            insider_own: read("insider_own", parse_pct),
            inst_own: read("inst_own", parse_pct),
            inst_trans: read("inst_trans", parse_pct),
            shares_float: read("shs_float", parse_shares_float),
            short_float: read("short_float", parse_pct),
            roa: read("roa", parse_pct),
            roe: read("roe", parse_pct),
            roi: read("roi", parse_pct),
            gross_margin: read("gross_margin", parse_pct),
            oper_margin: read("oper_margin", parse_pct),
            profit_margin: read("profit_margin", parse_pct),
            sales_surprise: read("sales_surprise", parse_pct),
            eps_surprise: read("eps_surprise", parse_pct),
        })
    }
}

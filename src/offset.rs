use once_cell::sync;
use regex::Regex;
use strum_macros::Display;

static ADDRESS_RE: sync::Lazy<Regex> =
    sync::Lazy::new(|| Regex::new(r"(?i)^0x[a-f0-9]+$").expect("must compile"));
static DECIMAL_RE: sync::Lazy<Regex> =
    sync::Lazy::new(|| Regex::new(r"^[0-9]+$").expect("must compile"));

/// Where an offset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OffsetOrigin {
    #[strum(serialize = "address")]
    AddressLiteral,
    #[strum(serialize = "decimal")]
    DecimalLiteral,
    #[strum(serialize = "variable")]
    VariableReference,
}

/// Offset picked during one navigation interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSelection {
    pub offset: u64,
    pub origin: OffsetOrigin,
}

impl OffsetSelection {
    /// Resolve the memory reference of a variable.
    /// Return [`None`] if the reference is not a number.
    pub fn from_reference(reference: &str) -> Option<Self> {
        parse_offset(reference).map(|sel| OffsetSelection {
            offset: sel.offset,
            origin: OffsetOrigin::VariableReference,
        })
    }
}

/// Parse an offset written as `0x`-prefixed hex (any case) or as a plain decimal.
///
/// Everything else, including values that overflow 64 bits, gives [`None`].
pub fn parse_offset(text: &str) -> Option<OffsetSelection> {
    if ADDRESS_RE.is_match(text) {
        let offset = u64::from_str_radix(&text[2..], 16).ok()?;
        return Some(OffsetSelection {
            offset,
            origin: OffsetOrigin::AddressLiteral,
        });
    }
    if DECIMAL_RE.is_match(text) {
        let offset = text.parse::<u64>().ok()?;
        return Some(OffsetSelection {
            offset,
            origin: OffsetOrigin::DecimalLiteral,
        });
    }
    None
}

/// Hint for the offset prompt, [`None`] means the input is acceptable.
pub fn validate_offset_input(text: &str) -> Option<&'static str> {
    if text.is_empty() || parse_offset(text).is_some() {
        None
    } else {
        Some("Invalid offset, use 0x-prefixed hex or a decimal number")
    }
}

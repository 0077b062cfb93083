//! Simple TOML parser for workstation configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the workstation file. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - Hex integers (`0x3C`)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays and inline tables
//! - Dotted keys

use super::types::{
    CounterConfig, DisplayConfig, IndexerConfig, OverflowPolicy, WorkstationConfig,
    MAX_GREETING_LEN,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognized in its section
    UnknownKey,
    /// Line is not a `key = value` pair
    InvalidLine,
    /// Value has the wrong type or format
    InvalidValue,
    /// Value is outside the accepted range
    OutOfRange,
    /// String value too long
    ValueTooLong,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Indexer,
    Counter,
    Display,
}

/// Parse TOML configuration into a WorkstationConfig
///
/// Keys that are absent keep their default value.
pub fn parse_config(input: &str) -> Result<WorkstationConfig, ParseError> {
    let mut config = WorkstationConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Indexer => apply_indexer(&mut config.indexer, key, value)?,
            Section::Counter => apply_counter(&mut config.counter, key, value)?,
            Section::Display => apply_display(&mut config.display, key, value)?,
        }
    }

    Ok(config)
}

fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let line = strip_comment(line);
    let name = line
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match name.trim() {
        "indexer" => Ok(Section::Indexer),
        "counter" => Ok(Section::Counter),
        "display" => Ok(Section::Display),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_indexer(indexer: &mut IndexerConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "steps_per_rev" => indexer.steps_per_rev = parse_nonzero(value)?,
        "rpm" => indexer.rpm = parse_nonzero(value)?,
        "settle_ms" => indexer.settle_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_counter(counter: &mut CounterConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "address" => counter.address = parse_int(value)?,
        "debounce_ms" => counter.debounce_ms = parse_int(value)?,
        "overflow" => counter.overflow = parse_overflow(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_display(display: &mut DisplayConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "i2c_address" => {
            let address: u8 = parse_int(value)?;
            // 7-bit addresses only
            if address > 0x7F {
                return Err(ParseError::OutOfRange);
            }
            display.i2c_address = address;
        }
        "greeting" => {
            let text = parse_string(value)?;
            if text.len() > MAX_GREETING_LEN {
                return Err(ParseError::ValueTooLong);
            }
            display.greeting.clear();
            display
                .greeting
                .push_str(text)
                .map_err(|_| ParseError::ValueTooLong)?;
        }
        "greeting_hold_ms" => display.greeting_hold_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse a key = value line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove an inline comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim(),
            _ => {}
        }
    }
    value
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    // Integer literals may use `_` as a digit separator
    let mut digits: heapless::String<24> = heapless::String::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::OutOfRange)?;
    }

    let raw = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    }
    .map_err(|_| ParseError::InvalidValue)?;

    T::try_from(raw).map_err(|_| ParseError::OutOfRange)
}

fn parse_nonzero<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let raw: u64 = parse_int(value)?;
    if raw == 0 {
        return Err(ParseError::OutOfRange);
    }
    T::try_from(raw).map_err(|_| ParseError::OutOfRange)
}

fn parse_overflow(value: &str) -> Result<OverflowPolicy, ParseError> {
    match parse_string(value)? {
        "wrap" => Ok(OverflowPolicy::Wrap),
        "saturate" => Ok(OverflowPolicy::Saturate),
        _ => Err(ParseError::InvalidValue),
    }
}

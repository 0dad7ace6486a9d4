//! Menu text and local validation of user choices.
//!
//! Nothing here touches the network; bad input is rejected before a request
//! is built.

use std::io::{self, Write};

use crate::timezone::ZoneEntry;

/// Top-level menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    GetTime,
    SetTimezone,
}

/// Input rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid choice.")]
    InvalidChoice,

    #[error("Invalid input.")]
    InvalidInput,

    #[error("Invalid timezone choice.")]
    InvalidZoneChoice,
}

pub const MAIN_PROMPT: &str = "Enter your choice: ";
pub const ZONE_PROMPT: &str = "Enter the number corresponding to your desired time zone: ";

pub fn parse_main_choice(input: &str) -> Result<MainChoice, InputError> {
    match input.trim() {
        "1" => Ok(MainChoice::GetTime),
        "2" => Ok(MainChoice::SetTimezone),
        _ => Err(InputError::InvalidChoice),
    }
}

/// Resolve a 1-based zone number.
pub fn parse_zone_choice<'a>(
    input: &str,
    zones: &'a [ZoneEntry],
) -> Result<&'a ZoneEntry, InputError> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidInput);
    }
    // All digits but too large for usize is still just out of range.
    let number: usize = input.parse().map_err(|_| InputError::InvalidZoneChoice)?;
    number
        .checked_sub(1)
        .and_then(|index| zones.get(index))
        .ok_or(InputError::InvalidZoneChoice)
}

pub fn write_main_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "1. Get current time")?;
    writeln!(out, "2. Set timezone")?;
    write!(out, "{MAIN_PROMPT}")?;
    out.flush()
}

pub fn write_zone_menu(out: &mut impl Write, zones: &[ZoneEntry]) -> io::Result<()> {
    writeln!(out, "Available Time Zones:")?;
    for (i, zone) in zones.iter().enumerate() {
        writeln!(out, "{}. {} ({})", i + 1, zone.code, zone.name)?;
    }
    write!(out, "{ZONE_PROMPT}")?;
    out.flush()
}

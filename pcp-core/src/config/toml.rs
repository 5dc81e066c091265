//! Minimal TOML reader for `device.toml`
//!
//! Handles only the subset the board description needs. It does NOT support
//! all of TOML.
//!
//! Supported:
//! - `key = value` pairs (string, integer incl. `0x` hex, boolean)
//! - `[section]` and `[section.name]` headers
//! - Quoted keys (`"C#/Db" = "#ff0000"`)
//! - Comments (`# ...`), also after a value
//!
//! ```toml
//! [input]
//! divisor = 4
//! active_low = true
//!
//! [encoder.red]
//! slot = 0
//! inverted = false
//! label = "Red"
//!
//! [button.upper]
//! slot = 0
//!
//! [palette]
//! "C" = "#ff0000"
//! ```
//!
//! The first `[encoder.*]` section replaces the default encoder list, the
//! first `[button.*]` section the default button list.

use super::{
    ButtonConfig, ButtonRole, ConfigError, DeviceConfig, EncoderConfig, EncoderRole, Label,
    NOTE_NAMES,
};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Input,
    Encoder,
    Button,
    Palette,
}

/// Parse and validate a board description
pub fn parse_device(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;
    let mut seen_encoder = false;
    let mut seen_button = false;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = open_section(
                &line[1..line.len() - 1],
                &mut config,
                &mut seen_encoder,
                &mut seen_button,
            )?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

/// Start a section, creating the channel it describes
fn open_section(
    header: &str,
    config: &mut DeviceConfig,
    seen_encoder: &mut bool,
    seen_button: &mut bool,
) -> Result<Section, ConfigError> {
    let header = header.trim();
    let (kind, name) = match header.split_once('.') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (header, None),
    };

    match (kind, name) {
        ("input", None) => Ok(Section::Input),
        ("palette", None) => Ok(Section::Palette),
        ("encoder", Some(name)) => {
            let role = EncoderRole::from_name(name).ok_or(ConfigError::InvalidSection)?;
            if !*seen_encoder {
                config.encoders.clear();
                *seen_encoder = true;
            }
            if config.encoder(role).is_some() {
                return Err(ConfigError::DuplicateRole);
            }
            let slot = config.encoders.len() as u8;
            config
                .encoders
                .push(EncoderConfig {
                    role,
                    slot,
                    inverted: false,
                    label: role.default_label(),
                })
                .map_err(|_| ConfigError::DuplicateRole)?;
            Ok(Section::Encoder)
        }
        ("button", Some(name)) => {
            let role = ButtonRole::from_name(name).ok_or(ConfigError::InvalidSection)?;
            if !*seen_button {
                config.buttons.clear();
                *seen_button = true;
            }
            if config.button(role).is_some() {
                return Err(ConfigError::DuplicateRole);
            }
            let slot = config.buttons.len() as u8;
            config
                .buttons
                .push(ButtonConfig { role, slot })
                .map_err(|_| ConfigError::DuplicateRole)?;
            Ok(Section::Button)
        }
        _ => Err(ConfigError::InvalidSection),
    }
}

/// Apply one key to the section being parsed
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => Err(ConfigError::UnknownKey),
        Section::Input => {
            match key {
                "divisor" => config.input.divisor = parse_int(value)?,
                "active_low" => config.input.active_low = parse_bool(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
            Ok(())
        }
        Section::Encoder => {
            let Some(encoder) = config.encoders.last_mut() else {
                return Err(ConfigError::InvalidSection);
            };
            match key {
                "slot" => encoder.slot = parse_int(value)?,
                "inverted" => encoder.inverted = parse_bool(value)?,
                "label" => {
                    encoder.label = Label::try_from(parse_string(value)?)
                        .map_err(|_| ConfigError::LabelTooLong)?;
                }
                _ => return Err(ConfigError::UnknownKey),
            }
            Ok(())
        }
        Section::Button => {
            let Some(button) = config.buttons.last_mut() else {
                return Err(ConfigError::InvalidSection);
            };
            match key {
                "slot" => button.slot = parse_int(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
            Ok(())
        }
        Section::Palette => {
            let note = parse_string(key)?;
            let index = NOTE_NAMES
                .iter()
                .position(|n| *n == note)
                .ok_or(ConfigError::UnknownKey)?;
            config.palette[index] = Some(parse_color(value)?);
            Ok(())
        }
    }
}

/// Split `key = value`, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    // Quoted keys may contain '='
    let eq_pos = if let Some(rest) = line.strip_prefix('"') {
        let close = rest.find('"')? + 1;
        close + line[close..].find('=')?
    } else {
        line.find('=')?
    };
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = match value.find('#') {
        // '#' inside a string is not a comment
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ConfigError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// `"#rrggbb"` or `0xRRGGBB`
fn parse_color(value: &str) -> Result<u32, ConfigError> {
    let digits = if let Some(hex) = value.strip_prefix("0x") {
        hex
    } else {
        let s = parse_string(value)?;
        s.strip_prefix('#').ok_or(ConfigError::InvalidValue)?
    };
    if digits.is_empty() || digits.len() > 6 {
        return Err(ConfigError::InvalidValue);
    }
    u32::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidValue)
}

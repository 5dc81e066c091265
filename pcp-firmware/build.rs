//! Build script for pcp-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const ENCODER_ROLES: [&str; 3] = ["red", "green", "blue"];
const BUTTON_ROLES: [&str; 5] = ["upper", "lower", "red", "green", "blue"];
const NOTE_NAMES: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// Encoder slots in one sample word (2 pins each)
const ENCODER_SLOTS: i64 = 4;
/// Button slots in one sample word
const BUTTON_SLOTS: i64 = 8;
const MAX_LABEL_LEN: usize = 8;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml board description.          ║\n\
            ║  Please create one in the pcp-firmware directory.                ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_sections(&config);
    validate_input(&config);
    validate_encoders(&config);
    validate_buttons(&config);
    validate_palette(&config);

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a boxed list of errors
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Only known top-level sections
fn validate_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    if let Some(table) = config.as_table() {
        for (name, value) in table {
            if !["input", "encoder", "button", "palette"].contains(&name.as_str()) {
                errors.push(format!("Unknown section [{}]", name));
            } else if !value.is_table() {
                errors.push(format!("'{}' must be a table", name));
            }
        }
    }

    report("Invalid sections in device.toml", &errors);
}

fn validate_input(config: &toml::Value) {
    let input = match config.get("input") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut errors = Vec::new();

    for (key, value) in input {
        match (key.as_str(), value) {
            ("divisor", toml::Value::Integer(d)) => {
                if !(1..=16).contains(d) {
                    errors.push("[input] divisor must be 1-16".to_string());
                }
            }
            ("active_low", toml::Value::Boolean(_)) => {}
            ("divisor", _) | ("active_low", _) => {
                errors.push(format!("[input] '{}' has the wrong type", key));
            }
            _ => errors.push(format!("[input] unknown key '{}'", key)),
        }
    }

    report("Invalid input configuration", &errors);
}

/// Check the `slot` of every channel in a section and collect duplicates
fn check_slots(
    kind: &str,
    table: &toml::map::Map<String, toml::Value>,
    slots: i64,
    errors: &mut Vec<String>,
) {
    let mut used = Vec::new();
    for (name, channel) in table {
        match channel.get("slot") {
            Some(toml::Value::Integer(slot)) => {
                if *slot < 0 || *slot >= slots {
                    errors.push(format!("[{}.{}] slot must be 0-{}", kind, name, slots - 1));
                } else if used.contains(slot) {
                    errors.push(format!("[{}.{}] slot {} is already used", kind, name, slot));
                } else {
                    used.push(*slot);
                }
            }
            Some(_) => errors.push(format!("[{}.{}] slot must be an integer", kind, name)),
            None => {}
        }
    }
}

fn validate_encoders(config: &toml::Value) {
    let encoders = match config.get("encoder") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut errors = Vec::new();

    for role in ENCODER_ROLES {
        if !encoders.contains_key(role) {
            errors.push(format!("Missing [encoder.{}] section", role));
        }
    }

    for (name, encoder) in encoders {
        if !ENCODER_ROLES.contains(&name.as_str()) {
            errors.push(format!("[encoder.{}] must be red, green or blue", name));
        }
        let encoder = match encoder {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[encoder.{}] must be a table", name));
                continue;
            }
        };

        for (key, value) in encoder {
            match (key.as_str(), value) {
                ("slot", _) => {}
                ("inverted", toml::Value::Boolean(_)) => {}
                ("label", toml::Value::String(label)) => {
                    if label.chars().count() > MAX_LABEL_LEN {
                        errors.push(format!(
                            "[encoder.{}] label longer than {} characters",
                            name, MAX_LABEL_LEN
                        ));
                    }
                }
                ("inverted", _) | ("label", _) => {
                    errors.push(format!("[encoder.{}] '{}' has the wrong type", name, key));
                }
                _ => errors.push(format!("[encoder.{}] unknown key '{}'", name, key)),
            }
        }
    }

    check_slots("encoder", encoders, ENCODER_SLOTS, &mut errors);
    report("Invalid encoder configuration", &errors);
}

fn validate_buttons(config: &toml::Value) {
    let buttons = match config.get("button") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut errors = Vec::new();

    for role in BUTTON_ROLES {
        if !buttons.contains_key(role) {
            errors.push(format!("Missing [button.{}] section", role));
        }
    }

    for (name, button) in buttons {
        if !BUTTON_ROLES.contains(&name.as_str()) {
            errors.push(format!("[button.{}] is not a known button", name));
        }
        if let Some(t) = button.as_table() {
            for key in t.keys().filter(|k| k.as_str() != "slot") {
                errors.push(format!("[button.{}] unknown key '{}'", name, key));
            }
        }
    }

    check_slots("button", buttons, BUTTON_SLOTS, &mut errors);
    report("Invalid button configuration", &errors);
}

fn validate_palette(config: &toml::Value) {
    let palette = match config.get("palette") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut errors = Vec::new();

    for (note, color) in palette {
        if !NOTE_NAMES.contains(&note.as_str()) {
            errors.push(format!("[palette] unknown note '{}'", note));
        }
        let valid = match color {
            toml::Value::String(s) => s
                .strip_prefix('#')
                .is_some_and(|hex| hex.len() == 6 && u32::from_str_radix(hex, 16).is_ok()),
            toml::Value::Integer(c) => (0..=0xFF_FFFF).contains(c),
            _ => false,
        };
        if !valid {
            errors.push(format!("[palette] '{}' must be \"#rrggbb\" or 0xRRGGBB", note));
        }
    }

    report("Invalid palette configuration", &errors);
}

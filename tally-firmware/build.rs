//! Build script for tally-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates workstation.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Counter cells live in a 64K flash partition of one-byte cells
const MAX_CELL_ADDRESS: i64 = 0xFFFF;

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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate workstation.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=workstation.toml");

    let config_path = Path::new("workstation.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: workstation.toml not found!                              ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a workstation.toml configuration file.      ║\n\
            ║  Please create one in the tally-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read workstation.toml                          ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in workstation.toml                  ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_indexer(&config, &mut errors);
    validate_counter(&config, &mut errors);
    validate_display(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid workstation configuration                        ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=workstation.toml validated successfully");
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

/// Only the three known sections, each a table of known keys
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let known: &[(&str, &[&str])] = &[
        ("indexer", &["steps_per_rev", "rpm", "settle_ms"]),
        ("counter", &["address", "debounce_ms", "overflow"]),
        ("display", &["i2c_address", "greeting", "greeting_hold_ms"]),
    ];

    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (name, value) in root {
        let Some((_, keys)) = known.iter().find(|(section, _)| section == name) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

/// Check an optional integer key against an inclusive range
fn check_int(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match config.get(section).and_then(|s| s.get(key)) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn validate_indexer(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "indexer", "steps_per_rev", 1, i64::from(u16::MAX), errors);
    check_int(config, "indexer", "rpm", 1, i64::from(u16::MAX), errors);
    check_int(config, "indexer", "settle_ms", 0, i64::from(u32::MAX), errors);
}

fn validate_counter(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "counter", "address", 0, MAX_CELL_ADDRESS, errors);
    check_int(config, "counter", "debounce_ms", 0, i64::from(u32::MAX), errors);

    match config.get("counter").and_then(|c| c.get("overflow")) {
        None => {}
        Some(toml::Value::String(policy)) if ["wrap", "saturate"].contains(&policy.as_str()) => {}
        Some(_) => errors.push("[counter] overflow must be 'wrap' or 'saturate'".to_string()),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "display", "i2c_address", 0, 0x7F, errors);
    check_int(config, "display", "greeting_hold_ms", 0, i64::from(u32::MAX), errors);

    match config.get("display").and_then(|d| d.get("greeting")) {
        None => {}
        // One row of the 128 px panel
        Some(toml::Value::String(text)) if text.len() <= 21 => {}
        Some(toml::Value::String(_)) => {
            errors.push("[display] greeting must be at most 21 characters".to_string())
        }
        Some(_) => errors.push("[display] greeting must be a string".to_string()),
    }
}

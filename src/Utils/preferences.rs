//! User preferences read by the reducer, the layout builder and the editing field.
//!
//! Defaults cover every field; a TOML document only needs the keys it changes:
//!
//! ```toml
//! [display]
//! mode = "scientific"          # decimal | scientific | engineering
//! significant_digits = 8       # 1..=14
//! complex_format = "cartesian" # real | cartesian
//!
//! [computation]
//! angle_unit = "degree"        # degree | radian
//! matrix_exact_reducing = true
//!
//! [editor]
//! max_layouts = 220
//!
//! [logging]
//! level = "info"
//! file = "auto"                # timestamped file name
//!
//! [triggers]
//! division = "/"
//! matrix = "["
//! ```

use crate::Utils::logger::level_from_name;
use crate::editor::triggers::{TriggerAction, TriggerTable};
use crate::errors::{CalcError, Result};
use crate::symbolic::print_float::{
    DEFAULT_SIGNIFICANT_DIGITS, DisplayMode, MAX_SIGNIFICANT_DIGITS, MIN_SIGNIFICANT_DIGITS,
};
use crate::symbolic::symbolic_approximate::ComplexFormat;
use crate::symbolic::symbolic_reduce::{AngleUnit, Context, Reducer};
use log::info;
use simplelog::LevelFilter;
use std::path::Path;
use toml::{Table, Value};

pub const DEFAULT_MAX_LAYOUTS: usize = 220;

#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    pub display_mode: DisplayMode,
    pub significant_digits: usize,
    pub angle_unit: AngleUnit,
    pub complex_format: ComplexFormat,
    pub matrix_exact_reducing: bool,
    pub max_layouts: usize,
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
    pub triggers: TriggerTable,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            display_mode: DisplayMode::Decimal,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            angle_unit: AngleUnit::Radian,
            complex_format: ComplexFormat::Real,
            matrix_exact_reducing: true,
            max_layouts: DEFAULT_MAX_LAYOUTS,
            log_level: LevelFilter::Info,
            log_file: None,
            triggers: TriggerTable::default(),
        }
    }
}

fn section<'a>(document: &'a Table, name: &str) -> Result<Option<&'a Table>> {
    match document.get(name) {
        None => Ok(None),
        Some(Value::Table(table)) => Ok(Some(table)),
        Some(_) => Err(CalcError::Config(format!("[{}] must be a table", name))),
    }
}

fn string_value<'a>(table: &'a Table, section: &str, key: &str) -> Result<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(CalcError::Config(format!("{}.{} must be a string", section, key))),
    }
}

fn integer_value(table: &Table, section: &str, key: &str) -> Result<Option<i64>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) => Ok(Some(*i)),
        Some(_) => Err(CalcError::Config(format!("{}.{} must be an integer", section, key))),
    }
}

fn bool_value(table: &Table, section: &str, key: &str) -> Result<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(_) => Err(CalcError::Config(format!("{}.{} must be a boolean", section, key))),
    }
}

impl Preferences {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: Table = text.parse()?;
        let mut preferences = Preferences::default();

        if let Some(display) = section(&document, "display")? {
            if let Some(mode) = string_value(display, "display", "mode")? {
                preferences.display_mode = DisplayMode::from_name(mode)
                    .ok_or_else(|| CalcError::Config(format!("unknown display mode '{}'", mode)))?;
            }
            if let Some(digits) = integer_value(display, "display", "significant_digits")? {
                let range = MIN_SIGNIFICANT_DIGITS as i64..=MAX_SIGNIFICANT_DIGITS as i64;
                if !range.contains(&digits) {
                    return Err(CalcError::Config(format!(
                        "significant_digits must be in {}..={}, got {}",
                        MIN_SIGNIFICANT_DIGITS, MAX_SIGNIFICANT_DIGITS, digits
                    )));
                }
                preferences.significant_digits = digits as usize;
            }
            if let Some(format) = string_value(display, "display", "complex_format")? {
                preferences.complex_format = match format.to_ascii_lowercase().as_str() {
                    "real" => ComplexFormat::Real,
                    "cartesian" => ComplexFormat::Cartesian,
                    other => {
                        return Err(CalcError::Config(format!(
                            "unknown complex format '{}'",
                            other
                        )));
                    }
                };
            }
        }

        if let Some(computation) = section(&document, "computation")? {
            if let Some(unit) = string_value(computation, "computation", "angle_unit")? {
                preferences.angle_unit = match unit.to_ascii_lowercase().as_str() {
                    "degree" | "degrees" | "deg" => AngleUnit::Degree,
                    "radian" | "radians" | "rad" => AngleUnit::Radian,
                    other => {
                        return Err(CalcError::Config(format!("unknown angle unit '{}'", other)));
                    }
                };
            }
            if let Some(flag) = bool_value(computation, "computation", "matrix_exact_reducing")? {
                preferences.matrix_exact_reducing = flag;
            }
        }

        if let Some(editor) = section(&document, "editor")? {
            if let Some(max) = integer_value(editor, "editor", "max_layouts")? {
                // the text-insertion margin keeps 6 layouts free
                if max <= 6 {
                    return Err(CalcError::Config(format!(
                        "max_layouts must be greater than 6, got {}",
                        max
                    )));
                }
                preferences.max_layouts = max as usize;
            }
        }

        if let Some(logging) = section(&document, "logging")? {
            if let Some(level) = string_value(logging, "logging", "level")? {
                preferences.log_level = level_from_name(level)?;
            }
            if let Some(file) = string_value(logging, "logging", "file")? {
                preferences.log_file = Some(file.to_string());
            }
        }

        if let Some(triggers) = section(&document, "triggers")? {
            for (name, value) in triggers {
                let action = TriggerTable::action_from_name(name)
                    .ok_or_else(|| CalcError::Config(format!("unknown trigger '{}'", name)))?;
                let Value::String(text) = value else {
                    return Err(CalcError::Config(format!("triggers.{} must be a string", name)));
                };
                preferences.triggers.remove_action(action);
                preferences.triggers.set_trigger(text, action);
            }
        }
        Ok(preferences)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let preferences = Self::from_toml_str(&text)?;
        info!("preferences loaded from {}", path.as_ref().display());
        Ok(preferences)
    }

    /// Reducer configured with these preferences.
    pub fn reducer<'a>(&self, context: &'a dyn Context) -> Reducer<'a> {
        Reducer::new(context)
            .with_angle_unit(self.angle_unit)
            .with_matrix_exact_reducing(self.matrix_exact_reducing)
    }

    pub fn trigger_for(&self, text: &str) -> Option<TriggerAction> {
        self.triggers.action_for(text)
    }
}

//! User configuration (`config.toml`).

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tabula_core::SheetSize;
use tabula_engine::engine::{DEFAULT_COLUMN_WIDTH, MAX_COLS};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;
const MAX_ROWS: usize = 999;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    rows: Option<usize>,
    cols: Option<usize>,
    column_width: Option<usize>,
}

/// Settings resolved from the config file and defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub size: SheetSize,
    pub column_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            size: SheetSize::default(),
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

/// Load the config from `config_file`, or the user config dir when not given.
/// Problems are returned as warnings and the affected settings keep their defaults.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);

    let Some(path) = config_path else {
        return (Config::default(), warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let Some(file) = read_config_file(&path, &mut warnings) else {
        return (Config::default(), warnings);
    };
    let config = resolve(file, &mut warnings);
    (config, warnings)
}

fn read_config_file(path: &Path, warnings: &mut Vec<String>) -> Option<ConfigFile> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(path) {
            Ok(content) => parse_config(&content, path, warnings),
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            None
        }
    }
}

fn parse_config(content: &str, path: &Path, warnings: &mut Vec<String>) -> Option<ConfigFile> {
    match toml::from_str::<ConfigFile>(content) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            None
        }
    }
}

fn resolve(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let defaults = Config::default();
    let rows = checked("rows", file.rows, 1, MAX_ROWS, warnings).unwrap_or(defaults.size.rows);
    let cols = checked("cols", file.cols, 1, MAX_COLS, warnings).unwrap_or(defaults.size.cols);
    let column_width = checked("column_width", file.column_width, 1, usize::MAX, warnings)
        .unwrap_or(defaults.column_width);
    Config {
        size: SheetSize::new(rows, cols),
        column_width,
    }
}

fn checked(
    key: &str,
    value: Option<usize>,
    min: usize,
    max: usize,
    warnings: &mut Vec<String>,
) -> Option<usize> {
    let value = value?;
    if (min..=max).contains(&value) {
        Some(value)
    } else {
        warnings.push(format!(
            "Ignoring {} = {}: must be between {} and {}",
            key, value, min, max
        ));
        None
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tabula")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

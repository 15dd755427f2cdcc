use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use landed_core::config::{AppConfig, LoadOptions};
use rust_decimal::Decimal;
use toml::Value;

use crate::commands::CommandResult;

const COMMAND: &str = "config";

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, error),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let calculator = &config.calculator;

    let fields: [(&str, String, &[&str]); 7] = [
        ("calculator.cpa_rate", calculator.cpa_rate.normalize().to_string(), &["LANDED_CPA_RATE"]),
        ("calculator.strict_mode", calculator.strict_mode.to_string(), &["LANDED_STRICT_MODE"]),
        (
            "calculator.default_country",
            calculator.default_country.clone(),
            &["LANDED_DEFAULT_COUNTRY"],
        ),
        (
            "calculator.margin_presets",
            render_decimals(&calculator.margin_presets),
            &["LANDED_MARGIN_PRESETS"],
        ),
        (
            "calculator.default_ineffectivity_pct",
            calculator.default_ineffectivity_pct.normalize().to_string(),
            &["LANDED_DEFAULT_INEFFECTIVITY_PCT"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["LANDED_LOGGING_LEVEL", "LANDED_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["LANDED_LOGGING_FORMAT", "LANDED_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in &fields {
        lines.push(render_line(
            key_path,
            value,
            field_source(
                key_path,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }

    let countries = config.countries.codes().join(", ");
    let source = match config_file_doc.as_ref() {
        Some(doc) if contains_path(doc, "countries") => config_file_path
            .as_deref()
            .map(|path| format!("builtin + file ({})", path.display()))
            .unwrap_or_else(|| "builtin + file".to_string()),
        _ => "builtin".to_string(),
    };
    lines.push(render_line("countries", &countries, source));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("landed.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/landed.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_value(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

/// Blank variables are skipped when the config loads, so they are not a source.
fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_decimals(values: &[Decimal]) -> String {
    let rendered: Vec<String> = values.iter().map(|value| value.normalize().to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use toml::Value;

    use super::{contains_path, render_decimals};

    #[test]
    fn nested_paths_resolve_through_tables() {
        let doc = "[calculator]\ncpa_rate = \"0.2\"\n".parse::<Value>().expect("valid toml");

        assert!(contains_path(&doc, "calculator.cpa_rate"));
        assert!(!contains_path(&doc, "calculator.strict_mode"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn decimal_lists_render_normalized() {
        let rendered = render_decimals(&[Decimal::new(200, 1), Decimal::new(275, 1)]);

        assert_eq!(rendered, "[20, 27.5]");
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculator::solver;
use crate::calculator::CalculatorSettings;
use crate::domain::country::{CountryCatalog, CountryProfile};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub calculator: CalculatorConfig,
    pub logging: LoggingConfig,
    pub countries: CountryCatalog,
}

#[derive(Clone, Debug)]
pub struct CalculatorConfig {
    pub cpa_rate: Decimal,
    pub strict_mode: bool,
    pub default_country: String,
    pub margin_presets: Vec<Decimal>,
    pub default_ineffectivity_pct: Decimal,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub cpa_rate: Option<Decimal>,
    pub strict_mode: Option<bool>,
    pub default_country: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            calculator: CalculatorConfig {
                cpa_rate: CalculatorSettings::DEFAULT_CPA_RATE,
                strict_mode: false,
                default_country: "CO".to_string(),
                margin_presets: vec![Decimal::from(20), Decimal::from(30), Decimal::from(40)],
                default_ineffectivity_pct: Decimal::from(20),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            countries: CountryCatalog::builtin(),
        }
    }
}

impl CalculatorConfig {
    pub fn settings(&self) -> CalculatorSettings {
        CalculatorSettings { cpa_rate: self.cpa_rate, strict: self.strict_mode }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("landed.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The profile named by `calculator.default_country`.
    pub fn default_country(&self) -> Option<&CountryProfile> {
        self.countries.get(&self.calculator.default_country)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(calculator) = patch.calculator {
            if let Some(cpa_rate) = calculator.cpa_rate {
                self.calculator.cpa_rate = cpa_rate;
            }
            if let Some(strict_mode) = calculator.strict_mode {
                self.calculator.strict_mode = strict_mode;
            }
            if let Some(default_country) = calculator.default_country {
                self.calculator.default_country = default_country;
            }
            if let Some(margin_presets) = calculator.margin_presets {
                self.calculator.margin_presets = margin_presets;
            }
            if let Some(default_ineffectivity_pct) = calculator.default_ineffectivity_pct {
                self.calculator.default_ineffectivity_pct = default_ineffectivity_pct;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        for country in patch.countries.unwrap_or_default() {
            self.countries.upsert(CountryProfile::new(
                &country.code,
                &country.name,
                &country.currency_code,
                &country.symbol,
                &country.locale,
                country.default_freight,
                country.default_cpa_base,
            ));
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LANDED_CPA_RATE") {
            self.calculator.cpa_rate = parse_decimal("LANDED_CPA_RATE", &value)?;
        }
        if let Some(value) = read_env("LANDED_STRICT_MODE") {
            self.calculator.strict_mode = parse_bool("LANDED_STRICT_MODE", &value)?;
        }
        if let Some(value) = read_env("LANDED_DEFAULT_COUNTRY") {
            self.calculator.default_country = value;
        }
        if let Some(value) = read_env("LANDED_MARGIN_PRESETS") {
            self.calculator.margin_presets = parse_decimal_list("LANDED_MARGIN_PRESETS", &value)?;
        }
        if let Some(value) = read_env("LANDED_DEFAULT_INEFFECTIVITY_PCT") {
            self.calculator.default_ineffectivity_pct =
                parse_decimal("LANDED_DEFAULT_INEFFECTIVITY_PCT", &value)?;
        }

        let log_level = read_env("LANDED_LOGGING_LEVEL").or_else(|| read_env("LANDED_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LANDED_LOGGING_FORMAT").or_else(|| read_env("LANDED_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(cpa_rate) = overrides.cpa_rate {
            self.calculator.cpa_rate = cpa_rate;
        }
        if let Some(strict_mode) = overrides.strict_mode {
            self.calculator.strict_mode = strict_mode;
        }
        if let Some(default_country) = overrides.default_country {
            self.calculator.default_country = default_country;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_countries(&self.countries)?;
        validate_calculator(&self.calculator, &self.countries)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("landed.toml"), PathBuf::from("config/landed.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_calculator(
    calculator: &CalculatorConfig,
    countries: &CountryCatalog,
) -> Result<(), ConfigError> {
    if calculator.cpa_rate <= Decimal::ZERO || calculator.cpa_rate >= Decimal::ONE {
        return Err(ConfigError::Validation(
            "calculator.cpa_rate must be a fraction in range (0, 1)".to_string(),
        ));
    }

    if countries.get(&calculator.default_country).is_none() {
        return Err(ConfigError::Validation(format!(
            "calculator.default_country `{}` is not a known country (known: {})",
            calculator.default_country,
            countries.codes().join(", ")
        )));
    }

    if calculator.margin_presets.is_empty() {
        return Err(ConfigError::Validation(
            "calculator.margin_presets must contain at least one margin".to_string(),
        ));
    }
    for &preset in &calculator.margin_presets {
        let solvable = solver::proportional_denominator(calculator.cpa_rate, preset)
            .is_some_and(|denominator| denominator > solver::SOLVER_EPSILON);
        if preset < Decimal::ZERO || !solvable {
            return Err(ConfigError::Validation(format!(
                "calculator.margin_presets entry {preset} must be >= 0 and leave room for the \
                 cpa rate below 100%"
            )));
        }
    }

    let ineffectivity = calculator.default_ineffectivity_pct;
    if ineffectivity < Decimal::ZERO || ineffectivity >= Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "calculator.default_ineffectivity_pct must be in range 0..100".to_string(),
        ));
    }

    Ok(())
}

fn validate_countries(countries: &CountryCatalog) -> Result<(), ConfigError> {
    for country in countries.profiles() {
        if country.code.len() != 2 || !country.code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "countries.code `{}` must be a two-letter ISO country code",
                country.code
            )));
        }
        if country.currency_code.len() != 3
            || !country.currency_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::Validation(format!(
                "countries.currency_code `{}` for {} must be a three-letter ISO currency code",
                country.currency_code, country.code
            )));
        }
        if country.default_freight < Decimal::ZERO || country.default_cpa_base < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "countries defaults for {} must not be negative",
                country.code
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal_list(key: &str, value: &str) -> Result<Vec<Decimal>, ConfigError> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| parse_decimal(key, entry))
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    calculator: Option<CalculatorPatch>,
    logging: Option<LoggingPatch>,
    countries: Option<Vec<CountryPatch>>,
}

#[derive(Debug, Default, Deserialize)]
struct CalculatorPatch {
    cpa_rate: Option<Decimal>,
    strict_mode: Option<bool>,
    default_country: Option<String>,
    margin_presets: Option<Vec<Decimal>>,
    default_ineffectivity_pct: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Deserialize)]
struct CountryPatch {
    code: String,
    name: String,
    currency_code: String,
    symbol: String,
    locale: String,
    default_freight: Decimal,
    default_cpa_base: Decimal,
}

use landed_core::config::{AppConfig, LoadOptions};
use landed_core::format::format_currency;
use landed_core::CountryProfile;
use serde::Serialize;

use crate::commands::CommandResult;

const COMMAND: &str = "countries";

#[derive(Debug, Serialize)]
struct CountriesReport<'a> {
    command: &'static str,
    status: &'static str,
    default_country: &'a str,
    countries: &'a [CountryProfile],
}

pub fn run(json: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, error),
    };
    let profiles = config.countries.profiles();

    if json {
        let report = CountriesReport {
            command: COMMAND,
            status: "ok",
            default_country: &config.calculator.default_country,
            countries: profiles,
        };
        return match serde_json::to_string_pretty(&report) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 4),
        };
    }

    let default_code = config.default_country().map(|profile| profile.code.as_str());
    let mut lines = vec![format!(
        "{} countries (default: {}):",
        profiles.len(),
        default_code.unwrap_or("<none>")
    )];
    for profile in profiles {
        lines.push(format!(
            "- {} {} [{} {}] flete {} / cpa base {}",
            profile.code,
            profile.name,
            profile.currency_code,
            profile.locale,
            format_currency(profile.default_freight, profile),
            format_currency(profile.default_cpa_base, profile),
        ));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

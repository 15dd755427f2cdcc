use anyhow::{bail, Context};
use clap::Args;
use landed_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use landed_core::format::{format_currency, format_percentage};
use landed_core::{
    requested_margin_set, ApplicationError, CalculationSnapshot, CountryProfile,
    DeterministicPriceCalculator, EvaluationInput, LineItems, MarginSelection, PriceCalculator,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::commands::CommandResult;

const COMMAND: &str = "evaluate";

#[derive(Clone, Debug, Default, Args)]
pub struct EvaluateArgs {
    #[arg(long, help = "Supplier cost of one unit, in the country's currency")]
    pub cost: Decimal,
    #[arg(long, help = "ISO country code (defaults to calculator.default_country)")]
    pub country: Option<String>,
    #[arg(long, help = "Preset margin the totals and chart are built for")]
    pub margin: Option<Decimal>,
    #[arg(
        long,
        conflicts_with = "margin",
        help = "Custom margin merged into the presets and selected"
    )]
    pub custom_margin: Option<Decimal>,
    #[arg(long, value_delimiter = ',', help = "Margin presets, e.g. 20,30,40")]
    pub margins: Option<Vec<Decimal>>,
    #[arg(
        long = "item",
        value_name = "NAME=VALUE",
        value_parser = parse_item,
        help = "Set a cost line item, e.g. \"Inefectividad=25\" or \"Empaque=1500\""
    )]
    pub items: Vec<(String, Decimal)>,
    #[arg(long, help = "Reject degenerate inputs instead of degrading silently")]
    pub strict: bool,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct EvaluateReport<'a> {
    command: &'static str,
    status: &'static str,
    country: &'a CountryProfile,
    selection: MarginSelection,
    line_items: &'a LineItems,
    snapshot: &'a CalculationSnapshot,
}

pub fn parse_item(raw: &str) -> anyhow::Result<(String, Decimal)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE, got `{raw}`");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("line item name must not be empty");
    }
    let value = value
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("line item `{name}` needs a numeric value"))?;

    Ok((name.to_string(), value))
}

pub fn run(args: &EvaluateArgs) -> CommandResult {
    let overrides = ConfigOverrides {
        strict_mode: args.strict.then_some(true),
        ..ConfigOverrides::default()
    };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, error),
    };

    let country_code = args.country.as_deref().unwrap_or(&config.calculator.default_country);
    let country = match config.countries.require(country_code) {
        Ok(country) => country,
        Err(error) => {
            return CommandResult::failure(COMMAND, "invalid_input", error.to_string(), 3);
        }
    };

    let line_items = args.items.iter().fold(
        LineItems::defaults_for(country, config.calculator.default_ineffectivity_pct),
        |items, (name, value)| items.with_value(name, *value),
    );

    let presets = args.margins.as_deref().unwrap_or(&config.calculator.margin_presets);
    let selection = match (args.custom_margin, args.margin, presets.first()) {
        (Some(custom), _, _) => MarginSelection::Custom(custom),
        (None, Some(preset), _) => MarginSelection::Preset(preset),
        (None, None, Some(first)) => MarginSelection::Preset(*first),
        (None, None, None) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_input",
                "no margin presets configured and no margin selected",
                3,
            );
        }
    };
    let requested_margins = requested_margin_set(presets, selection);

    let calculator = DeterministicPriceCalculator::new(config.calculator.settings());
    let input = EvaluationInput {
        supplier_cost: args.cost,
        line_items: &line_items,
        country,
        requested_margins: &requested_margins,
        selected_margin: selection.percentage(),
    };
    let snapshot = match calculator.evaluate(&input) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            let interface = ApplicationError::from(error)
                .into_interface(format!("{COMMAND}-{}", country.code.to_ascii_lowercase()));
            let message = format!("{} ({interface})", interface.user_message());
            return CommandResult::failure(COMMAND, "invalid_input", message, 3);
        }
    };

    info!(
        event_name = "cli.evaluate.completed",
        correlation_id = COMMAND,
        country = %country.code,
        selected_margin = %selection.percentage(),
        margins = snapshot.profit_margins.len(),
        strict = calculator.settings().strict,
        "pricing evaluation completed"
    );

    if args.json {
        let report = EvaluateReport {
            command: COMMAND,
            status: "ok",
            country,
            selection,
            line_items: &line_items,
            snapshot: &snapshot,
        };
        return match serde_json::to_string_pretty(&report) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 4),
        };
    }

    CommandResult { exit_code: 0, output: render_human(country, selection, &snapshot) }
}

fn render_human(
    country: &CountryProfile,
    selection: MarginSelection,
    snapshot: &CalculationSnapshot,
) -> String {
    let money = |amount: Decimal| format_currency(amount, country);

    if snapshot.is_empty() {
        return format!(
            "{} ({}): nothing to price, these inputs leave no finite price (see log warnings)",
            country.name, country.currency_code
        );
    }

    let mut lines = vec![
        format!("{} ({})", country.name, country.currency_code),
        format!("- flete total = {}", money(snapshot.total_freight)),
        String::new(),
        format!("{:>8}  {:>16}  {:>16}  {:>16}", "margen", "precio", "precio landing", "ganancia"),
    ];

    for result in &snapshot.profit_margins {
        let marker = if result.percentage == selection.percentage() { "*" } else { " " };
        let floor = if result.cpa_floor_applied { " (cpa base)" } else { "" };
        lines.push(format!(
            "{marker}{:>7}  {:>16}  {:>16}  {:>16}{floor}",
            format_percentage(result.percentage),
            money(result.selling_price),
            money(result.landing_price),
            money(result.profit),
        ));
    }

    if snapshot.chart_series.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "selected margin {} was not evaluated",
            format_percentage(selection.percentage())
        ));
        return lines.join("\n");
    }

    lines.push(String::new());
    let kind = if selection.is_custom() { "personalizado" } else { "preset" };
    lines.push(format!("desglose @ {} ({kind}):", format_percentage(selection.percentage())));
    for slice in &snapshot.chart_series {
        lines.push(format!("- {} = {}", slice.name, money(slice.value)));
    }
    lines.push(format!("- costo total = {}", money(snapshot.total_cost)));
    lines.push(format!("- cpa real = {}", money(snapshot.real_cpa)));
    lines.push(format!("- punto de equilibrio = {}", money(snapshot.breakeven)));
    if let Some(metrics) = &snapshot.metrics {
        lines.push(format!("- cpa maximo = {}", money(metrics.max_cpa)));
        if let Some(roas) = metrics.roas {
            lines.push(format!("- roas = {}", roas.round_dp(2)));
        }
        if let Some(break_even_roas) = metrics.break_even_roas {
            lines.push(format!("- roas de equilibrio = {}", break_even_roas.round_dp(2)));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::parse_item;

    #[test]
    fn item_parser_accepts_name_value_pairs() {
        let (name, value) = parse_item(" CPA base = 80000 ").expect("valid item");

        assert_eq!(name, "CPA base");
        assert_eq!(value, Decimal::from(80_000));
    }

    #[test]
    fn item_parser_rejects_malformed_input() {
        assert!(parse_item("Flete").is_err());
        assert!(parse_item("=10").is_err());
        assert!(parse_item("Flete=mucho").is_err());
    }
}

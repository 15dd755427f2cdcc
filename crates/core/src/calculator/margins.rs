use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which margin the aggregate outputs (total cost, chart, breakeven) are built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percentage", rename_all = "snake_case")]
pub enum MarginSelection {
    Preset(Decimal),
    Custom(Decimal),
}

impl MarginSelection {
    pub fn percentage(&self) -> Decimal {
        match self {
            Self::Preset(percentage) | Self::Custom(percentage) => *percentage,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// The presets as given for a preset selection. A custom margin is merged
/// in, and the merged set is sorted ascending without repeats.
pub fn requested_margin_set(presets: &[Decimal], selection: MarginSelection) -> Vec<Decimal> {
    let mut margins = presets.to_vec();
    if let MarginSelection::Custom(percentage) = selection {
        margins.push(percentage);
        margins.sort();
        margins.dedup();
    }
    margins
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{requested_margin_set, MarginSelection};

    fn presets() -> Vec<Decimal> {
        vec![Decimal::from(40), Decimal::from(20), Decimal::from(30)]
    }

    #[test]
    fn preset_selection_keeps_presets_as_given() {
        let margins = requested_margin_set(&presets(), MarginSelection::Preset(Decimal::from(30)));

        assert_eq!(margins, presets());
    }

    #[test]
    fn custom_selection_is_merged_in_order() {
        let margins = requested_margin_set(&presets(), MarginSelection::Custom(Decimal::from(25)));

        assert_eq!(
            margins,
            vec![Decimal::from(20), Decimal::from(25), Decimal::from(30), Decimal::from(40)]
        );
    }

    #[test]
    fn custom_selection_matching_a_preset_is_not_duplicated() {
        let margins =
            requested_margin_set(&presets(), MarginSelection::Custom(Decimal::new(300, 1)));

        assert_eq!(margins.len(), 3);
    }

    #[test]
    fn selection_reports_its_percentage() {
        assert_eq!(MarginSelection::Custom(Decimal::from(35)).percentage(), Decimal::from(35));
        assert!(!MarginSelection::Preset(Decimal::from(20)).is_custom());
    }
}

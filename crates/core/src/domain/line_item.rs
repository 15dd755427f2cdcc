use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::checked_sum;
use crate::domain::country::CountryProfile;

pub const INEFFECTIVITY: &str = "Inefectividad";
pub const FREIGHT: &str = "Flete";
pub const CPA_BASE: &str = "CPA base";
pub const ADMIN_COST: &str = "Costo Administrativo";
pub const OTHER_COSTS: &str = "Otros Gastos";

const RESERVED: [&str; 4] = [INEFFECTIVITY, FREIGHT, CPA_BASE, ADMIN_COST];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub name: String,
    pub value: Decimal,
}

impl CostLineItem {
    pub fn new(name: impl Into<String>, value: Decimal) -> Self {
        Self { name: name.into(), value }
    }
}

/// Ordered set of named cost inputs. Names are the lookup key; when a name
/// repeats, the first entry wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(Vec<CostLineItem>);

impl LineItems {
    pub fn new(items: Vec<CostLineItem>) -> Self {
        Self(items)
    }

    /// The canonical set a fresh calculation starts from.
    pub fn defaults_for(country: &CountryProfile, ineffectivity_pct: Decimal) -> Self {
        Self(vec![
            CostLineItem::new(INEFFECTIVITY, ineffectivity_pct),
            CostLineItem::new(FREIGHT, country.default_freight),
            CostLineItem::new(CPA_BASE, country.default_cpa_base),
            CostLineItem::new(ADMIN_COST, Decimal::ZERO),
            CostLineItem::new(OTHER_COSTS, Decimal::ZERO),
        ])
    }

    pub fn items(&self) -> &[CostLineItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value_of(&self, name: &str) -> Option<Decimal> {
        self.0.iter().find(|item| item.name == name).map(|item| item.value)
    }

    pub fn ineffectivity_pct(&self) -> Decimal {
        self.value_of(INEFFECTIVITY).unwrap_or(Decimal::ZERO)
    }

    pub fn base_freight(&self) -> Decimal {
        self.value_of(FREIGHT).unwrap_or(Decimal::ZERO)
    }

    pub fn cpa_base(&self, country: &CountryProfile) -> Decimal {
        self.value_of(CPA_BASE).unwrap_or(country.default_cpa_base)
    }

    pub fn admin_cost(&self) -> Decimal {
        self.value_of(ADMIN_COST).unwrap_or(Decimal::ZERO)
    }

    /// `Otros Gastos` plus every item whose name is not one of the reserved
    /// inputs above. `None` when the sum overflows.
    pub fn other_costs(&self) -> Option<Decimal> {
        checked_sum(
            self.0
                .iter()
                .filter(|item| !RESERVED.contains(&item.name.as_str()))
                .map(|item| item.value),
        )
    }

    /// Returns a copy with `name` set to `value`: the first matching entry is
    /// updated and later duplicates dropped, or the item is appended.
    pub fn with_value(&self, name: &str, value: Decimal) -> Self {
        let mut replaced = false;
        let mut items = Vec::with_capacity(self.0.len() + 1);

        for item in &self.0 {
            if item.name != name {
                items.push(item.clone());
            } else if !replaced {
                items.push(CostLineItem::new(name, value));
                replaced = true;
            }
        }

        if !replaced {
            items.push(CostLineItem::new(name, value));
        }

        Self(items)
    }

    /// Country switch: `Flete` and `CPA base` take the new country's defaults,
    /// everything else is carried over untouched.
    pub fn with_country_defaults(&self, country: &CountryProfile) -> Self {
        self.with_value(FREIGHT, country.default_freight)
            .with_value(CPA_BASE, country.default_cpa_base)
    }
}

impl From<Vec<CostLineItem>> for LineItems {
    fn from(items: Vec<CostLineItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<CostLineItem> for LineItems {
    fn from_iter<T: IntoIterator<Item = CostLineItem>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::country::CountryCatalog;

    use super::{
        CostLineItem, LineItems, ADMIN_COST, CPA_BASE, FREIGHT, INEFFECTIVITY, OTHER_COSTS,
    };

    fn names(items: &LineItems) -> Vec<&str> {
        items.items().iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn missing_names_fall_back_to_zero_or_country_cpa() {
        let catalog = CountryCatalog::builtin();
        let colombia = catalog.get("CO").expect("builtin country");
        let items = LineItems::default();

        assert_eq!(items.ineffectivity_pct(), Decimal::ZERO);
        assert_eq!(items.base_freight(), Decimal::ZERO);
        assert_eq!(items.admin_cost(), Decimal::ZERO);
        assert_eq!(items.other_costs(), Some(Decimal::ZERO));
        assert_eq!(items.cpa_base(colombia), Decimal::from(15_000));
    }

    #[test]
    fn first_entry_wins_on_duplicate_names() {
        let items = LineItems::new(vec![
            CostLineItem::new(FREIGHT, Decimal::from(10)),
            CostLineItem::new(FREIGHT, Decimal::from(99)),
        ]);

        assert_eq!(items.base_freight(), Decimal::from(10));
    }

    #[test]
    fn other_costs_include_unreserved_items() {
        let items = LineItems::new(vec![
            CostLineItem::new(INEFFECTIVITY, Decimal::from(25)),
            CostLineItem::new(FREIGHT, Decimal::from(20_000)),
            CostLineItem::new(CPA_BASE, Decimal::from(15_000)),
            CostLineItem::new(ADMIN_COST, Decimal::from(2_000)),
            CostLineItem::new(OTHER_COSTS, Decimal::from(1_000)),
            CostLineItem::new("Empaque", Decimal::from(500)),
        ]);

        assert_eq!(items.admin_cost(), Decimal::from(2_000));
        assert_eq!(items.other_costs(), Some(Decimal::from(1_500)));
    }

    #[test]
    fn country_switch_resets_freight_and_cpa_only() {
        let catalog = CountryCatalog::builtin();
        let colombia = catalog.get("CO").expect("builtin country");
        let chile = catalog.get("CL").expect("builtin country");

        let original = LineItems::defaults_for(colombia, Decimal::from(25))
            .with_value(ADMIN_COST, Decimal::from(3_000));
        let switched = original.with_country_defaults(chile);

        assert_eq!(switched.base_freight(), chile.default_freight);
        assert_eq!(switched.cpa_base(colombia), chile.default_cpa_base);
        assert_eq!(switched.ineffectivity_pct(), Decimal::from(25));
        assert_eq!(switched.admin_cost(), Decimal::from(3_000));
        assert_eq!(names(&switched), names(&original));

        assert_eq!(original.base_freight(), colombia.default_freight);
    }

    #[test]
    fn country_switch_collapses_colliding_names() {
        let catalog = CountryCatalog::builtin();
        let mexico = catalog.get("MX").expect("builtin country");
        let items = LineItems::new(vec![
            CostLineItem::new("Empaque", Decimal::from(5)),
            CostLineItem::new(CPA_BASE, Decimal::from(1)),
            CostLineItem::new(CPA_BASE, Decimal::from(2)),
        ]);

        let switched = items.with_country_defaults(mexico);

        assert_eq!(names(&switched), vec!["Empaque", CPA_BASE, FREIGHT]);
        assert_eq!(switched.value_of(CPA_BASE), Some(mexico.default_cpa_base));
        assert_eq!(switched.value_of(FREIGHT), Some(mexico.default_freight));
    }

    #[test]
    fn line_items_deserialize_from_a_plain_array() {
        let items: LineItems = serde_json::from_str(
            r#"[{"name":"Inefectividad","value":"30"},{"name":"Empaque","value":"1500.5"}]"#,
        )
        .expect("valid line items");

        assert_eq!(items.ineffectivity_pct(), Decimal::from(30));
        assert_eq!(items.other_costs(), Some(Decimal::new(15_005, 1)));

        let encoded = serde_json::to_value(&items).expect("serializable");
        assert_eq!(encoded[1]["name"], "Empaque");
    }

    #[test]
    fn other_costs_overflow_is_reported_as_none() {
        let items = LineItems::new(vec![
            CostLineItem::new("Empaque", Decimal::MAX),
            CostLineItem::new("Seguro", Decimal::ONE),
        ]);

        assert_eq!(items.other_costs(), None);
    }
}

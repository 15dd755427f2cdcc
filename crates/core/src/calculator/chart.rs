use rust_decimal::Decimal;

use crate::domain::snapshot::{ChartSlice, CostBreakdown};

pub const SUPPLIER_COST: &str = "Costo Proveedor";
pub const TOTAL_FREIGHT: &str = "Flete Total";
pub const REAL_CPA: &str = "CPA Real";
pub const ADMIN_COST: &str = "Costo Administrativo";
pub const OTHER_COSTS: &str = "Otros Gastos";
pub const PROFIT: &str = "Ganancia";

/// Stacked breakdown of a selling price. The order is fixed; admin and other
/// costs only appear when positive, profit always closes the series.
pub fn chart_series(breakdown: &CostBreakdown, profit: Decimal) -> Vec<ChartSlice> {
    let mut series = vec![
        slice(SUPPLIER_COST, breakdown.supplier_cost),
        slice(TOTAL_FREIGHT, breakdown.freight),
        slice(REAL_CPA, breakdown.acquisition),
    ];

    if breakdown.admin > Decimal::ZERO {
        series.push(slice(ADMIN_COST, breakdown.admin));
    }
    if breakdown.other > Decimal::ZERO {
        series.push(slice(OTHER_COSTS, breakdown.other));
    }

    series.push(slice(PROFIT, profit));
    series
}

fn slice(name: &str, value: Decimal) -> ChartSlice {
    ChartSlice { name: name.to_string(), value }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::snapshot::CostBreakdown;

    use super::chart_series;

    fn names(breakdown: &CostBreakdown) -> Vec<String> {
        chart_series(breakdown, Decimal::from(10)).into_iter().map(|slice| slice.name).collect()
    }

    #[test]
    fn optional_slices_are_skipped_when_zero() {
        let breakdown = CostBreakdown {
            supplier_cost: Decimal::from(100),
            freight: Decimal::from(20),
            acquisition: Decimal::from(30),
            ..CostBreakdown::default()
        };

        assert_eq!(
            names(&breakdown),
            vec!["Costo Proveedor", "Flete Total", "CPA Real", "Ganancia"]
        );
    }

    #[test]
    fn full_series_keeps_fixed_order() {
        let breakdown = CostBreakdown {
            supplier_cost: Decimal::from(100),
            freight: Decimal::from(20),
            acquisition: Decimal::from(30),
            admin: Decimal::from(5),
            other: Decimal::from(2),
        };

        let series = chart_series(&breakdown, Decimal::from(43));

        let names: Vec<&str> = series.iter().map(|slice| slice.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Costo Proveedor",
                "Flete Total",
                "CPA Real",
                "Costo Administrativo",
                "Otros Gastos",
                "Ganancia"
            ]
        );
        let sum: Decimal = series.iter().map(|slice| slice.value).sum();
        assert_eq!(sum, Decimal::from(200));
    }
}

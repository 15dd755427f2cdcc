pub mod calculator;
pub mod config;
pub mod domain;
pub mod errors;
pub mod format;

pub use calculator::margins::{requested_margin_set, MarginSelection};
pub use calculator::{
    evaluate, CalculatorSettings, DeterministicPriceCalculator, EvaluationInput, PriceCalculator,
};
pub use domain::country::{CountryCatalog, CountryProfile};
pub use domain::line_item::{CostLineItem, LineItems};
pub use domain::snapshot::{
    AcquisitionMetrics, CalculationSnapshot, CalculationTrace, ChartSlice, CostBreakdown,
    MarginResult, TraceStep,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};

mod dates;
mod defaults;
mod engine;
mod types;

pub use dates::{current_month_index, month_label, month_start};
pub use defaults::{DEFAULT_DURATION_MONTHS, PARTNER_COUNT};
pub use engine::{calculate, calculate_as_of};
pub use types::{
    ActualsByMonth, MonthlyActuals, MonthlyResult, SimulationInput, SimulationResult,
    SimulationSummary, SimulationTotals,
};

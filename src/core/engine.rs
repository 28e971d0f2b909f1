use chrono::{Local, NaiveDate};
use tracing::debug;

use super::dates::{current_month_index, month_label};
use super::defaults::PARTNER_COUNT;
use super::types::{
    ActualsByMonth, MonthlyActuals, MonthlyResult, SimulationInput, SimulationResult,
    SimulationSummary, SimulationTotals,
};

const BUFFER_TARGET_RATIO: f64 = 0.10;

/// Projected figure paired with the recorded actual that supersedes it.
#[derive(Debug, Clone, Copy)]
struct Figure {
    projected: f64,
    actual: Option<f64>,
}

impl Figure {
    fn new(projected: f64, actual: Option<f64>) -> Self {
        Self { projected, actual }
    }

    fn value(self) -> f64 {
        self.actual.unwrap_or(self.projected)
    }
}

/// State carried from one month into the next.
#[derive(Debug, Clone, Copy)]
struct CarriedState {
    accumulated_cash_flow: f64,
    accumulated_rental_contracts: f64,
}

#[derive(Debug, Clone, Copy)]
struct SalesSplit {
    total: f64,
    partners: f64,
    brokers: f64,
}

pub fn calculate(
    inputs: &SimulationInput,
    duration_months: u32,
    actuals: &ActualsByMonth,
) -> SimulationResult {
    calculate_as_of(inputs, duration_months, actuals, Local::now().date_naive())
}

/// Runs the projection with an explicit "today", which decides which months
/// count as past and therefore accept recorded actuals.
pub fn calculate_as_of(
    inputs: &SimulationInput,
    duration_months: u32,
    actuals: &ActualsByMonth,
    today: NaiveDate,
) -> SimulationResult {
    let current_month_index = current_month_index(inputs.start_date, today);

    let mut state = CarriedState {
        accumulated_cash_flow: inputs.initial_cash,
        accumulated_rental_contracts: 0.0,
    };
    let mut months = Vec::with_capacity(duration_months as usize);
    for month in 1..=duration_months {
        let is_past = month < current_month_index;
        let recorded = if is_past {
            actuals.get(&month).copied().unwrap_or_default()
        } else {
            MonthlyActuals::default()
        };
        months.push(simulate_month(inputs, month, is_past, &recorded, &mut state));
    }

    let totals = build_totals(&months);
    let summary = build_summary(inputs, &months);
    debug!(
        duration_months,
        current_month_index,
        final_cash = summary.final_accumulated_cash_flow,
        is_viable = summary.is_viable,
        buffer_met = summary.buffer_met,
        "simulation complete"
    );

    SimulationResult {
        current_month_index,
        months,
        totals,
        summary,
    }
}

fn simulate_month(
    inputs: &SimulationInput,
    month: u32,
    is_past: bool,
    recorded: &MonthlyActuals,
    state: &mut CarriedState,
) -> MonthlyResult {
    let in_slow_start = month <= inputs.slow_start_months;
    let expanded = month >= inputs.expansion_start_month;

    let sales = resolve_sales(
        projected_partner_sales(inputs, in_slow_start),
        projected_broker_sales(inputs, month),
        recorded.sales_count,
    );
    let projected_rentals = if in_slow_start {
        inputs.rentals_target_team_slow
    } else {
        inputs.rentals_target_team_full
    };
    let rentals_count = Figure::new(projected_rentals, recorded.rentals_count).value();
    let vgv = sales.total * inputs.avg_sale_value;

    let current_fixed_costs =
        Figure::new(projected_fixed_costs(inputs, month), recorded.current_fixed_costs).value();
    let current_property_payment = Figure::new(
        projected_property_payment(inputs, month),
        recorded.current_property_payment,
    )
    .value();

    let commission_per_sale = inputs.commission_per_sale();
    let gross_revenue_sales =
        sales.partners * commission_per_sale + sales.brokers * commission_per_sale;
    let gross_revenue_first_rental = rentals_count * inputs.avg_rental_value;
    let gross_revenue_rental_admin = state.accumulated_rental_contracts
        * inputs.avg_rental_value
        * inputs.rental_admin_rate
        / 100.0;
    let gross_revenue_regularization =
        inputs.avg_regularizations_per_month * inputs.avg_regularization_value;
    let calculated_gross_revenue_total = gross_revenue_sales
        + gross_revenue_first_rental
        + gross_revenue_rental_admin
        + gross_revenue_regularization;
    let gross_revenue_total =
        Figure::new(calculated_gross_revenue_total, recorded.gross_revenue_total).value();

    let commission_var_sales_brokers_paid = broker_paid_commission(inputs, sales.brokers);
    let taxable_base = gross_revenue_total - commission_var_sales_brokers_paid;
    let tax_amount = taxable_base * inputs.tax_rate / 100.0;
    let other_variable_costs = gross_revenue_total * inputs.other_variable_costs_rate / 100.0;
    let commission_var_sales_partners =
        gross_revenue_sales * inputs.partner_sale_commission_share / 100.0;
    let commission_var_rental_partners =
        gross_revenue_first_rental * inputs.partner_rental_commission_share / 100.0;

    let (commission_rental_brokers, commission_rental_admin_brokers, commission_rental_interns) =
        if expanded {
            (
                gross_revenue_first_rental * inputs.broker_first_rental_share / 100.0,
                gross_revenue_rental_admin * inputs.broker_rental_admin_share / 100.0,
                gross_revenue_first_rental * inputs.intern_rental_commission_rate / 100.0
                    * inputs.intern_rental_ratio
                    / 100.0,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

    let net_revenue_for_fixed_costs = taxable_base
        - tax_amount
        - commission_var_sales_partners
        - commission_var_rental_partners
        - other_variable_costs
        - commission_rental_brokers
        - commission_rental_admin_brokers
        - commission_rental_interns;

    let calculated_monthly_cash_flow =
        net_revenue_for_fixed_costs - current_fixed_costs - current_property_payment;
    let monthly_cash_flow =
        Figure::new(calculated_monthly_cash_flow, recorded.monthly_cash_flow).value();

    state.accumulated_cash_flow += monthly_cash_flow;
    state.accumulated_rental_contracts += rentals_count;

    let contribution_margin_percent = ratio_percent(net_revenue_for_fixed_costs, taxable_base);
    let operating_profitability_percent =
        ratio_percent(monthly_cash_flow, net_revenue_for_fixed_costs);
    let break_even_point = if contribution_margin_percent > 0.0 {
        current_fixed_costs / (contribution_margin_percent / 100.0)
    } else {
        0.0
    };

    MonthlyResult {
        month,
        label: month_label(inputs.start_date, month),
        is_past,
        sales_count: sales.total,
        sales_count_partners: sales.partners,
        sales_count_brokers: sales.brokers,
        rentals_count,
        vgv,
        gross_revenue_sales,
        gross_revenue_first_rental,
        gross_revenue_rental_admin,
        gross_revenue_regularization,
        calculated_gross_revenue_total,
        gross_revenue_total,
        commission_var_sales_brokers_paid,
        taxable_base,
        tax_amount,
        commission_var_sales_partners,
        commission_var_rental_partners,
        other_variable_costs,
        commission_rental_brokers,
        commission_rental_admin_brokers,
        commission_rental_interns,
        net_revenue_for_fixed_costs,
        current_fixed_costs,
        current_property_payment,
        calculated_monthly_cash_flow,
        monthly_cash_flow,
        accumulated_cash_flow: state.accumulated_cash_flow,
        accumulated_rental_contracts: state.accumulated_rental_contracts,
        contribution_margin_percent,
        operating_profitability_percent,
        break_even_point,
        actual_sales_count: recorded.sales_count,
        actual_rentals_count: recorded.rentals_count,
        actual_gross_revenue_total: recorded.gross_revenue_total,
        actual_current_fixed_costs: recorded.current_fixed_costs,
        actual_current_property_payment: recorded.current_property_payment,
        actual_monthly_cash_flow: recorded.monthly_cash_flow,
    }
}

fn projected_partner_sales(inputs: &SimulationInput, in_slow_start: bool) -> f64 {
    let per_partner = if in_slow_start {
        inputs.sales_target_partners_slow
    } else {
        inputs.sales_target_partners_full
    };
    per_partner * PARTNER_COUNT
}

fn projected_broker_sales(inputs: &SimulationInput, month: u32) -> f64 {
    if month < inputs.expansion_start_month {
        return 0.0;
    }
    let full_team_target = inputs.number_of_brokers * inputs.sales_target_brokers_full;
    let ramp_percent = match month - inputs.expansion_start_month {
        0 => inputs.ramp_month1_percent,
        1 => inputs.ramp_month2_percent,
        _ => inputs.ramp_month3_percent,
    };
    (full_team_target * ramp_percent / 100.0).ceil()
}

/// A recorded sales total keeps the projected partner share; brokers absorb
/// the rounding remainder so the split always adds up to the recorded total.
fn resolve_sales(
    projected_partners: f64,
    projected_brokers: f64,
    actual: Option<f64>,
) -> SalesSplit {
    let projected_total = projected_partners + projected_brokers;
    match actual {
        Some(total) => {
            let partner_ratio = if projected_total > 0.0 {
                projected_partners / projected_total
            } else {
                1.0
            };
            let partners = (total * partner_ratio).round();
            SalesSplit {
                total,
                partners,
                brokers: total - partners,
            }
        }
        None => SalesSplit {
            total: projected_total,
            partners: projected_partners,
            brokers: projected_brokers,
        },
    }
}

fn projected_fixed_costs(inputs: &SimulationInput, month: u32) -> f64 {
    let expanded = month >= inputs.expansion_start_month;
    let marketing = if expanded {
        inputs.marketing_expanded
    } else {
        inputs.marketing_base
    };
    let interns = if expanded {
        inputs.number_of_interns * inputs.intern_cost
    } else {
        0.0
    };
    let (pro_labore, pro_labore_tax) = if month >= inputs.pro_labore_start_month {
        (inputs.pro_labore_total(), inputs.pro_labore_tax)
    } else {
        (0.0, 0.0)
    };
    inputs.base_fixed_costs() + pro_labore + pro_labore_tax + marketing + interns
}

fn projected_property_payment(inputs: &SimulationInput, month: u32) -> f64 {
    let mut payment = 0.0;
    if month == 1 {
        payment += inputs.setup_cost;
    }
    if month == inputs.property_payment1_month {
        payment += inputs.property_payment1_value;
    }
    if month == inputs.property_payment2_month {
        payment += inputs.corrected_payment2();
    }
    if month == inputs.property_payment3_month {
        payment += inputs.property_payment3_value;
    }
    payment
}

/// Commission paid out to external brokers. Internally listed sales earn the
/// sale rate only; the rest also earn the listing rate.
fn broker_paid_commission(inputs: &SimulationInput, broker_sales: f64) -> f64 {
    let internally_listed = (broker_sales * inputs.broker_internal_listing_ratio / 100.0).round();
    let externally_listed = broker_sales - internally_listed;
    let per_sale = inputs.commission_per_sale();
    internally_listed * per_sale * inputs.broker_sale_commission_rate / 100.0
        + externally_listed
            * per_sale
            * (inputs.broker_sale_commission_rate + inputs.broker_listing_commission_rate)
            / 100.0
}

fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

fn build_totals(months: &[MonthlyResult]) -> SimulationTotals {
    let (mut totals, break_even_sum) = months.iter().fold(
        (SimulationTotals::default(), 0.0),
        |(mut acc, break_even_sum), row| {
            acc.sales_count += row.sales_count;
            acc.sales_count_partners += row.sales_count_partners;
            acc.sales_count_brokers += row.sales_count_brokers;
            acc.rentals_count += row.rentals_count;
            acc.vgv += row.vgv;
            acc.gross_revenue_sales += row.gross_revenue_sales;
            acc.gross_revenue_first_rental += row.gross_revenue_first_rental;
            acc.gross_revenue_rental_admin += row.gross_revenue_rental_admin;
            acc.gross_revenue_regularization += row.gross_revenue_regularization;
            acc.gross_revenue_total += row.gross_revenue_total;
            acc.commission_var_sales_brokers_paid += row.commission_var_sales_brokers_paid;
            acc.tax_amount += row.tax_amount;
            acc.commission_var_sales_partners += row.commission_var_sales_partners;
            acc.commission_var_rental_partners += row.commission_var_rental_partners;
            acc.other_variable_costs += row.other_variable_costs;
            acc.commission_rental_brokers += row.commission_rental_brokers;
            acc.commission_rental_admin_brokers += row.commission_rental_admin_brokers;
            acc.commission_rental_interns += row.commission_rental_interns;
            acc.net_revenue_for_fixed_costs += row.net_revenue_for_fixed_costs;
            acc.current_fixed_costs += row.current_fixed_costs;
            acc.current_property_payment += row.current_property_payment;
            acc.monthly_cash_flow += row.monthly_cash_flow;
            (acc, break_even_sum + row.break_even_point)
        },
    );

    totals.taxable_base = totals.gross_revenue_total - totals.commission_var_sales_brokers_paid;
    totals.avg_contribution_margin =
        ratio_percent(totals.net_revenue_for_fixed_costs, totals.taxable_base);
    totals.avg_operating_profitability =
        ratio_percent(totals.monthly_cash_flow, totals.net_revenue_for_fixed_costs);
    totals.avg_break_even_point = if months.is_empty() {
        0.0
    } else {
        break_even_sum / months.len() as f64
    };
    totals
}

fn build_summary(inputs: &SimulationInput, months: &[MonthlyResult]) -> SimulationSummary {
    let corrected_property_cost = inputs.property_payment1_value
        + inputs.corrected_payment2()
        + inputs.property_payment3_value;
    let buffer_target = corrected_property_cost * BUFFER_TARGET_RATIO;
    let final_accumulated_cash_flow = months
        .last()
        .map_or(inputs.initial_cash, |row| row.accumulated_cash_flow);
    let is_viable = final_accumulated_cash_flow >= 0.0;

    let lowest = months
        .iter()
        .min_by(|a, b| a.accumulated_cash_flow.total_cmp(&b.accumulated_cash_flow));
    let first_positive_month = months
        .iter()
        .find(|row| row.monthly_cash_flow > 0.0)
        .map(|row| row.month);

    SimulationSummary {
        corrected_property_cost,
        buffer_target,
        final_accumulated_cash_flow,
        is_viable,
        buffer_met: is_viable && final_accumulated_cash_flow >= buffer_target,
        lowest_accumulated_cash_flow: lowest
            .map_or(inputs.initial_cash, |row| row.accumulated_cash_flow),
        lowest_accumulated_month: lowest.map(|row| row.month),
        first_positive_month,
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Full parameter set of a brokerage viability simulation.
///
/// Rates are percentages (6.0 means 6%). Nothing here is validated: negative
/// or out-of-range values flow through the projection unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationInput {
    pub avg_sale_value: f64,
    pub avg_rental_value: f64,
    pub avg_regularization_value: f64,
    pub avg_regularizations_per_month: f64,

    pub tax_rate: f64,
    pub other_variable_costs_rate: f64,

    pub property_payment1_month: u32,
    pub property_payment1_value: f64,
    pub property_payment2_month: u32,
    pub property_payment2_value: f64,
    pub property_payment2_interest_rate: f64,
    pub property_payment3_month: u32,
    pub property_payment3_value: f64,

    pub initial_cash: f64,
    #[serde(alias = "custoSetupInicial")]
    pub setup_cost: f64,
    pub start_date: NaiveDate,

    pub accounting_cost: f64,
    pub crm_software_cost: f64,
    pub electricity_cost: f64,
    pub internet_phone_cost: f64,
    pub rent_condo_cost: f64,
    pub admin_salary_cost: f64,
    pub miscellaneous_cost: f64,

    pub pro_labore_start_month: u32,
    pub pro_labore_partner1: f64,
    pub pro_labore_partner2: f64,
    pub pro_labore_partner3: f64,
    pub pro_labore_tax: f64,

    pub marketing_base: f64,
    pub marketing_expanded: f64,
    pub expansion_start_month: u32,
    pub number_of_interns: f64,
    pub intern_cost: f64,
    pub number_of_brokers: f64,

    pub slow_start_months: u32,
    pub sales_target_partners_slow: f64,
    pub sales_target_partners_full: f64,
    pub rentals_target_team_slow: f64,
    pub rentals_target_team_full: f64,
    pub sales_target_brokers_full: f64,
    #[serde(rename = "percRampaMes1")]
    pub ramp_month1_percent: f64,
    #[serde(rename = "percRampaMes2")]
    pub ramp_month2_percent: f64,
    #[serde(rename = "percRampaMes3")]
    pub ramp_month3_percent: f64,

    pub company_sale_commission_rate: f64,
    pub partner_sale_commission_share: f64,
    pub broker_sale_commission_rate: f64,
    pub broker_listing_commission_rate: f64,
    pub broker_internal_listing_ratio: f64,
    pub partner_rental_commission_share: f64,
    pub broker_first_rental_share: f64,
    pub broker_rental_admin_share: f64,
    pub rental_admin_rate: f64,
    pub intern_rental_commission_rate: f64,
    pub intern_rental_ratio: f64,
}

impl SimulationInput {
    pub fn base_fixed_costs(&self) -> f64 {
        self.accounting_cost
            + self.crm_software_cost
            + self.electricity_cost
            + self.internet_phone_cost
            + self.rent_condo_cost
            + self.admin_salary_cost
            + self.miscellaneous_cost
    }

    pub fn pro_labore_total(&self) -> f64 {
        self.pro_labore_partner1 + self.pro_labore_partner2 + self.pro_labore_partner3
    }

    /// Second property payment after its one-off interest correction.
    pub fn corrected_payment2(&self) -> f64 {
        self.property_payment2_value * (1.0 + self.property_payment2_interest_rate / 100.0)
    }

    /// Company commission earned on one average sale.
    pub fn commission_per_sale(&self) -> f64 {
        self.avg_sale_value * self.company_sale_commission_rate / 100.0
    }
}

/// Recorded figures for one month. `None` means "use the projection"; zero
/// is a real recorded value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthlyActuals {
    #[serde(alias = "actualSalesCount")]
    pub sales_count: Option<f64>,
    #[serde(alias = "actualRentalsCount")]
    pub rentals_count: Option<f64>,
    #[serde(alias = "actualGrossRevenueTotal")]
    pub gross_revenue_total: Option<f64>,
    #[serde(alias = "actualCurrentFixedCosts")]
    pub current_fixed_costs: Option<f64>,
    #[serde(alias = "actualCurrentPropertyPayment")]
    pub current_property_payment: Option<f64>,
    #[serde(alias = "actualMonthlyCashFlow")]
    pub monthly_cash_flow: Option<f64>,
}

/// Recorded actuals keyed by 1-based month number.
pub type ActualsByMonth = BTreeMap<u32, MonthlyActuals>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResult {
    pub month: u32,
    pub label: String,
    pub is_past: bool,

    pub sales_count: f64,
    pub sales_count_partners: f64,
    pub sales_count_brokers: f64,
    pub rentals_count: f64,
    pub vgv: f64,

    pub gross_revenue_sales: f64,
    pub gross_revenue_first_rental: f64,
    pub gross_revenue_rental_admin: f64,
    pub gross_revenue_regularization: f64,
    pub calculated_gross_revenue_total: f64,
    pub gross_revenue_total: f64,

    pub commission_var_sales_brokers_paid: f64,
    pub taxable_base: f64,
    pub tax_amount: f64,
    pub commission_var_sales_partners: f64,
    pub commission_var_rental_partners: f64,
    pub other_variable_costs: f64,
    pub commission_rental_brokers: f64,
    pub commission_rental_admin_brokers: f64,
    pub commission_rental_interns: f64,
    pub net_revenue_for_fixed_costs: f64,

    pub current_fixed_costs: f64,
    pub current_property_payment: f64,
    pub calculated_monthly_cash_flow: f64,
    pub monthly_cash_flow: f64,
    pub accumulated_cash_flow: f64,
    pub accumulated_rental_contracts: f64,

    pub contribution_margin_percent: f64,
    pub operating_profitability_percent: f64,
    pub break_even_point: f64,

    pub actual_sales_count: Option<f64>,
    pub actual_rentals_count: Option<f64>,
    pub actual_gross_revenue_total: Option<f64>,
    pub actual_current_fixed_costs: Option<f64>,
    pub actual_current_property_payment: Option<f64>,
    pub actual_monthly_cash_flow: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationTotals {
    pub sales_count: f64,
    pub sales_count_partners: f64,
    pub sales_count_brokers: f64,
    pub rentals_count: f64,
    pub vgv: f64,
    pub gross_revenue_sales: f64,
    pub gross_revenue_first_rental: f64,
    pub gross_revenue_rental_admin: f64,
    pub gross_revenue_regularization: f64,
    pub gross_revenue_total: f64,
    pub commission_var_sales_brokers_paid: f64,
    pub taxable_base: f64,
    pub tax_amount: f64,
    pub commission_var_sales_partners: f64,
    pub commission_var_rental_partners: f64,
    pub other_variable_costs: f64,
    pub commission_rental_brokers: f64,
    pub commission_rental_admin_brokers: f64,
    pub commission_rental_interns: f64,
    pub net_revenue_for_fixed_costs: f64,
    pub current_fixed_costs: f64,
    pub current_property_payment: f64,
    pub monthly_cash_flow: f64,
    pub avg_contribution_margin: f64,
    pub avg_operating_profitability: f64,
    pub avg_break_even_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub corrected_property_cost: f64,
    pub buffer_target: f64,
    pub final_accumulated_cash_flow: f64,
    pub is_viable: bool,
    pub buffer_met: bool,
    pub lowest_accumulated_cash_flow: f64,
    pub lowest_accumulated_month: Option<u32>,
    pub first_positive_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub current_month_index: u32,
    pub months: Vec<MonthlyResult>,
    pub totals: SimulationTotals,
    pub summary: SimulationSummary,
}

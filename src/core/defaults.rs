use chrono::{Local, NaiveDate};

use super::types::SimulationInput;

pub const PARTNER_COUNT: f64 = 3.0;
pub const DEFAULT_DURATION_MONTHS: u32 = 12;

impl SimulationInput {
    /// Default parameter set with the simulation starting on `today`.
    pub fn defaults_as_of(today: NaiveDate) -> Self {
        Self {
            avg_sale_value: 300_000.0,
            avg_rental_value: 2_500.0,
            avg_regularization_value: 2_000.0,
            avg_regularizations_per_month: 1.0,

            tax_rate: 6.0,
            other_variable_costs_rate: 2.0,

            property_payment1_month: 2,
            property_payment1_value: 50_000.0,
            property_payment2_month: 6,
            property_payment2_value: 50_000.0,
            property_payment2_interest_rate: 12.0,
            property_payment3_month: 12,
            property_payment3_value: 50_000.0,

            initial_cash: 0.0,
            setup_cost: 5_000.0,
            start_date: today,

            accounting_cost: 800.0,
            crm_software_cost: 300.0,
            electricity_cost: 250.0,
            internet_phone_cost: 200.0,
            rent_condo_cost: 0.0,
            admin_salary_cost: 2_500.0,
            miscellaneous_cost: 500.0,

            pro_labore_start_month: 4,
            pro_labore_partner1: 3_000.0,
            pro_labore_partner2: 3_000.0,
            pro_labore_partner3: 3_000.0,
            pro_labore_tax: 990.0,

            marketing_base: 1_500.0,
            marketing_expanded: 4_000.0,
            expansion_start_month: 7,
            number_of_interns: 2.0,
            intern_cost: 1_500.0,
            number_of_brokers: 4.0,

            slow_start_months: 3,
            sales_target_partners_slow: 1.0,
            sales_target_partners_full: 2.0,
            rentals_target_team_slow: 2.0,
            rentals_target_team_full: 5.0,
            sales_target_brokers_full: 1.0,
            ramp_month1_percent: 50.0,
            ramp_month2_percent: 75.0,
            ramp_month3_percent: 100.0,

            company_sale_commission_rate: 6.0,
            partner_sale_commission_share: 10.0,
            broker_sale_commission_rate: 30.0,
            broker_listing_commission_rate: 10.0,
            broker_internal_listing_ratio: 50.0,
            partner_rental_commission_share: 10.0,
            broker_first_rental_share: 10.0,
            broker_rental_admin_share: 0.0,
            rental_admin_rate: 10.0,
            intern_rental_commission_rate: 5.0,
            intern_rental_ratio: 50.0,
        }
    }
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self::defaults_as_of(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
    }

    #[test]
    fn defaults_start_on_the_given_day() {
        let inputs = SimulationInput::defaults_as_of(today());
        assert_eq!(inputs.start_date, today());
    }

    #[test]
    fn defaults_carry_known_reference_values() {
        let inputs = SimulationInput::defaults_as_of(today());
        assert_eq!(inputs.avg_sale_value, 300_000.0);
        assert_eq!(inputs.tax_rate, 6.0);
        assert_eq!(inputs.initial_cash, 0.0);
        assert_eq!(inputs.slow_start_months, 3);
        assert_eq!(inputs.sales_target_partners_slow, 1.0);
        assert_eq!(inputs.setup_cost, 5_000.0);
        assert!(inputs.expansion_start_month > 1);
    }

    #[test]
    fn base_fixed_costs_sum_the_seven_line_items() {
        let inputs = SimulationInput::defaults_as_of(today());
        assert_eq!(inputs.base_fixed_costs(), 4_550.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let inputs: SimulationInput =
            serde_json::from_str(r#"{ "avgSaleValue": 450000, "percRampaMes1": 40 }"#)
                .expect("partial input should parse");
        assert_eq!(inputs.avg_sale_value, 450_000.0);
        assert_eq!(inputs.ramp_month1_percent, 40.0);
        assert_eq!(inputs.tax_rate, 6.0);
    }

    #[test]
    fn legacy_setup_cost_key_is_accepted() {
        let inputs: SimulationInput = serde_json::from_str(r#"{ "custoSetupInicial": 7500 }"#)
            .expect("legacy key should parse");
        assert_eq!(inputs.setup_cost, 7_500.0);
    }
}

//! Discounting state manager.
//!
//! Two complementary passes over a period's capacity-bearing components:
//! [`discount_fixed_costs`] populates the present-value rates, and
//! [`undo_discount_fixed_costs`] derives the cash-flow rates from them.
//! Both recompute from the component's base attributes, so repeating a
//! pass with unchanged inputs yields identical values.

use cep_core::{Case, CaseSettings, CepError, CepResult, Period, SolutionAlgorithm};

use crate::economics::{
    applicable_horizon, capital_recovery_factor, present_value_annuity_factor, years_remaining,
};

/// Populate the present-value cost rates of every capacity-bearing
/// component in the period.
///
/// Investment is annuitized over `min(capital_recovery_period,
/// applicable_horizon)`, where the applicable horizon is the period's own
/// length under Myopic and the full remaining horizon otherwise. O&M
/// rates are annuitized over the period length.
pub fn discount_fixed_costs(period: &mut Period, settings: &CaseSettings) -> CepResult<()> {
    let rate = settings.discount_rate;
    let length = settings.period_length(period.index)? as f64;
    let horizon = applicable_horizon(
        settings.solution_algorithm,
        period.index,
        &settings.period_lengths,
    );
    let opex_annuity = present_value_annuity_factor(rate, length);

    for asset in period.capacity_assets_mut() {
        let payment_years = (asset.capital_recovery_period() as f64).min(horizon);
        let pv_investment =
            asset.annualized_investment_cost() * present_value_annuity_factor(rate, payment_years);
        let pv_fixed_om = asset.fixed_om_rate() * opex_annuity;
        let pv_variable_om = asset.variable_om_rate() * opex_annuity;
        asset
            .ledger_mut()
            .record_discounted(pv_investment, pv_fixed_om, pv_variable_om);
    }
    Ok(())
}

/// Populate the undiscounted cash-flow rates of every capacity-bearing
/// component in the period.
///
/// Always amortizes over the full remaining model horizon, independent of
/// the solution algorithm: cash-flow reporting is not subject to the
/// myopic horizon restriction. Requires a prior [`discount_fixed_costs`].
pub fn undo_discount_fixed_costs(period: &mut Period, settings: &CaseSettings) -> CepResult<()> {
    let rate = settings.discount_rate;
    let length = settings.period_length(period.index)? as f64;
    let remaining = years_remaining(period.index, &settings.period_lengths);

    for asset in period.capacity_assets_mut() {
        let payment_years = (asset.capital_recovery_period() as f64).min(remaining);
        let name = asset.name().to_string();
        let pv_investment = asset.ledger().pv_investment(&name)?;
        let cf_investment =
            payment_years * pv_investment * capital_recovery_factor(rate, payment_years);
        let cf_fixed_om = length * asset.fixed_om_rate();
        let cf_variable_om = length * asset.variable_om_rate();
        asset
            .ledger_mut()
            .record_undiscounted(&name, cf_investment, cf_fixed_om, cf_variable_om)?;
    }
    Ok(())
}

/// Add back the investment value a myopic solve could not see.
///
/// Myopic discounting amortizes only within each period's own horizon;
/// for comparison against full-foresight algorithms the difference
/// between the full-horizon and myopic-horizon annuities is added to the
/// investment present value. One-shot per discounting pass: a second
/// application is an error.
pub fn add_costs_not_seen_by_myopic(period: &mut Period, settings: &CaseSettings) -> CepResult<()> {
    if settings.solution_algorithm != SolutionAlgorithm::Myopic {
        return Err(CepError::Config(format!(
            "myopic horizon correction requested under {} algorithm",
            settings.solution_algorithm
        )));
    }
    let rate = settings.discount_rate;
    let myopic_horizon = applicable_horizon(
        SolutionAlgorithm::Myopic,
        period.index,
        &settings.period_lengths,
    );
    let full_horizon = years_remaining(period.index, &settings.period_lengths);

    for asset in period.capacity_assets_mut() {
        let recovery = asset.capital_recovery_period() as f64;
        let full_annuity = present_value_annuity_factor(rate, recovery.min(full_horizon));
        let myopic_annuity = present_value_annuity_factor(rate, recovery.min(myopic_horizon));
        let delta = asset.annualized_investment_cost() * (full_annuity - myopic_annuity);
        let name = asset.name().to_string();
        asset.ledger_mut().apply_myopic_correction(&name, delta)?;
    }
    Ok(())
}

/// Apply the myopic correction across every period of a finished case
pub fn finalize_myopic_costs(case: &mut Case) -> CepResult<()> {
    let settings = case.settings.clone();
    for period in &mut case.periods {
        add_costs_not_seen_by_myopic(period, &settings)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cep_core::{CaseSettings, Edge, SolutionAlgorithm};

    fn one_edge_period(annualized_cost: f64, recovery: u32) -> Period {
        let mut period = Period::new(1);
        period
            .edges
            .push(Edge::new("ccgt", "z", "NaturalGasCC", "gas", "elec")
                .with_investment(annualized_cost, recovery));
        period
    }

    #[test]
    fn test_discount_undiscount_round_trip() {
        // full recovery period fits in the horizon: the cash-flow total
        // recovers the simple undiscounted annuity sum K * C
        let settings =
            CaseSettings::new(0.07, vec![10, 10, 10], SolutionAlgorithm::Monolithic).unwrap();
        let annualized = 85.0;
        let recovery = 20;
        let mut period = one_edge_period(annualized, recovery);

        discount_fixed_costs(&mut period, &settings).unwrap();
        undo_discount_fixed_costs(&mut period, &settings).unwrap();

        let cf = period.edges[0].ledger.cf_investment("ccgt").unwrap();
        let expected = recovery as f64 * annualized;
        assert!(
            (cf - expected).abs() < 1e-9 * expected,
            "cf {} != {}",
            cf,
            expected
        );
    }

    #[test]
    fn test_undiscount_before_discount_fails() {
        let settings = CaseSettings::new(0.07, vec![10], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = one_edge_period(85.0, 20);
        let err = undo_discount_fixed_costs(&mut period, &settings).unwrap_err();
        assert!(err.to_string().contains("ccgt"));
    }

    #[test]
    fn test_discount_is_idempotent() {
        let settings = CaseSettings::new(0.05, vec![5, 5], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = one_edge_period(10.0, 30);

        discount_fixed_costs(&mut period, &settings).unwrap();
        let first = period.edges[0].ledger.pv_investment("ccgt").unwrap();
        discount_fixed_costs(&mut period, &settings).unwrap();
        let second = period.edges[0].ledger.pv_investment("ccgt").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_myopic_horizon_restriction_and_correction() {
        let lengths = vec![5, 5];
        let myopic =
            CaseSettings::new(0.05, lengths.clone(), SolutionAlgorithm::Myopic).unwrap();
        let monolithic =
            CaseSettings::new(0.05, lengths, SolutionAlgorithm::Monolithic).unwrap();

        let mut myopic_period = one_edge_period(1.0, 30);
        let mut monolithic_period = one_edge_period(1.0, 30);

        discount_fixed_costs(&mut myopic_period, &myopic).unwrap();
        discount_fixed_costs(&mut monolithic_period, &monolithic).unwrap();

        let myopic_pv = myopic_period.edges[0].ledger.pv_investment("ccgt").unwrap();
        let monolithic_pv = monolithic_period.edges[0]
            .ledger
            .pv_investment("ccgt")
            .unwrap();
        assert!(myopic_pv < monolithic_pv);

        // the corrective pass closes the gap exactly
        add_costs_not_seen_by_myopic(&mut myopic_period, &myopic).unwrap();
        let corrected = myopic_period.edges[0].ledger.pv_investment("ccgt").unwrap();
        assert!((corrected - monolithic_pv).abs() < 1e-12);

        // and refuses to run twice
        assert!(add_costs_not_seen_by_myopic(&mut myopic_period, &myopic).is_err());
    }

    #[test]
    fn test_correction_rejected_outside_myopic() {
        let settings = CaseSettings::new(0.05, vec![5], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = one_edge_period(1.0, 30);
        discount_fixed_costs(&mut period, &settings).unwrap();
        assert!(add_costs_not_seen_by_myopic(&mut period, &settings).is_err());
    }

    #[test]
    fn test_finalize_myopic_costs_all_periods() {
        let settings = CaseSettings::new(0.05, vec![5, 5], SolutionAlgorithm::Myopic).unwrap();
        let mut case = cep_core::Case::new(settings.clone());
        for period in &mut case.periods {
            period
                .edges
                .push(Edge::new("ccgt", "z", "NaturalGasCC", "gas", "elec").with_investment(1.0, 30));
            discount_fixed_costs(period, &settings).unwrap();
        }

        finalize_myopic_costs(&mut case).unwrap();
        // second finalize trips the one-shot guard on period 1
        assert!(finalize_myopic_costs(&mut case).is_err());
    }
}

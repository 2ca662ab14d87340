use super::types::{PayoffStatus, Schedule, SchedulePoint};

/// Hard cap on simulated months. A safety valve against payments that never
/// amortize the balance, not a realistic loan-term limit.
pub const MAX_SCHEDULE_MONTHS: usize = 500;

/// Month-by-month balance projection under a fixed payment.
///
/// Each month accrues interest, applies the payment, and clamps the final
/// principal so the last payment never overpays. When the payment does not
/// cover the interest the balance grows; the series then runs to the cap and
/// is reported as `Truncated` instead of `PaidOff`.
pub fn simulate(loan_amount: f64, monthly_payment: f64, annual_rate_pct: f64) -> Schedule {
    let monthly_rate = if annual_rate_pct > 0.0 {
        annual_rate_pct / 100.0 / 12.0
    } else {
        0.0
    };

    let mut remaining_balance = loan_amount;
    let mut points = Vec::new();
    while remaining_balance > 0.0 && points.len() < MAX_SCHEDULE_MONTHS {
        let interest = remaining_balance * monthly_rate;
        let mut principal = monthly_payment - interest;
        if principal > remaining_balance {
            principal = remaining_balance;
        }
        remaining_balance -= principal;
        points.push(SchedulePoint {
            month: points.len() as u32 + 1,
            remaining_balance,
        });
    }

    let status = if remaining_balance > 0.0 {
        PayoffStatus::Truncated
    } else {
        PayoffStatus::PaidOff
    };
    Schedule { points, status }
}

#[cfg(test)]
mod tests {
    use super::super::estimator::estimate;
    use super::super::types::LoanInputs;
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, prop_assume, proptest};

    #[test]
    fn zero_rate_loan_pays_off_month_by_month() {
        let schedule = simulate(12_000.0, 1_000.0, 0.0);
        assert_eq!(schedule.status, PayoffStatus::PaidOff);
        assert_eq!(schedule.points.len(), 12);
        for (index, point) in schedule.points.iter().enumerate() {
            assert_eq!(point.month, index as u32 + 1);
        }
        assert_eq!(schedule.points[0].remaining_balance, 11_000.0);
        assert_eq!(schedule.points[11].remaining_balance, 0.0);
    }

    #[test]
    fn final_payment_is_clamped_to_the_balance() {
        let schedule = simulate(12_500.0, 1_000.0, 0.0);
        assert_eq!(schedule.status, PayoffStatus::PaidOff);
        assert_eq!(schedule.points.len(), 13);
        assert_eq!(schedule.points[11].remaining_balance, 500.0);
        assert_eq!(schedule.points[12].remaining_balance, 0.0);
    }

    #[test]
    fn zero_loan_yields_an_empty_paid_off_schedule() {
        let schedule = simulate(0.0, 1_000.0, 3.0);
        assert_eq!(schedule.status, PayoffStatus::PaidOff);
        assert!(schedule.points.is_empty());
    }

    #[test]
    fn payment_below_interest_truncates_at_the_cap_with_growing_balance() {
        let schedule = simulate(500_000.0, 100.0, 5.0);
        assert_eq!(schedule.status, PayoffStatus::Truncated);
        assert_eq!(schedule.points.len(), MAX_SCHEDULE_MONTHS);
        for pair in schedule.points.windows(2) {
            assert!(pair[1].remaining_balance > pair[0].remaining_balance);
        }
    }

    #[test]
    fn zero_payment_zero_rate_never_amortizes() {
        let schedule = simulate(10_000.0, 0.0, 0.0);
        assert_eq!(schedule.status, PayoffStatus::Truncated);
        assert_eq!(schedule.points.len(), MAX_SCHEDULE_MONTHS);
        assert!(
            schedule
                .points
                .iter()
                .all(|point| point.remaining_balance == 10_000.0)
        );
    }

    #[test]
    fn simulate_is_idempotent() {
        let first = simulate(250_000.0, 1_800.0, 4.0);
        let second = simulate(250_000.0, 1_800.0, 4.0);
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_schedule_never_exceeds_the_cap(
            loan in 0u32..2_000_000,
            payment in 0u32..50_000,
            rate_bp in 0u32..2_000,
        ) {
            let schedule = simulate(loan as f64, payment as f64, rate_bp as f64 / 100.0);
            prop_assert!(schedule.points.len() <= MAX_SCHEDULE_MONTHS);
            for point in &schedule.points {
                prop_assert!(point.remaining_balance.is_finite());
            }
            if let Some(last) = schedule.points.last() {
                if schedule.status == PayoffStatus::PaidOff {
                    prop_assert!(last.remaining_balance <= 0.0);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_balance_decreases_while_payment_covers_interest(
            loan in 1_000u32..400_000,
            rate_bp in 0u32..1_200,
            margin in 50u32..5_000,
        ) {
            let loan = loan as f64;
            let rate_pct = rate_bp as f64 / 100.0;
            // Payment strictly above the first month's interest keeps the
            // balance falling every month; later months accrue less interest.
            let payment = loan * rate_pct / 100.0 / 12.0 + margin as f64;
            let schedule = simulate(loan, payment, rate_pct);
            let mut previous = loan;
            for point in &schedule.points {
                prop_assert!(point.remaining_balance < previous);
                previous = point.remaining_balance;
            }
        }
    }

    proptest! {
        #[test]
        fn prop_simulation_length_agrees_with_the_estimator(
            loan in 1_000u32..500_000,
            payment in 200u32..20_000,
            rate_bp in 0u32..1_200,
        ) {
            let inputs = LoanInputs {
                loan_amount: loan as f64,
                annual_income: 50_000.0,
                monthly_payment: payment as f64,
                annual_rate_pct: rate_bp as f64 / 100.0,
            };
            let term = estimate(&inputs).expect("valid inputs").term;
            // Infeasible terms are covered by the truncation tests.
            prop_assume!(term.months().is_some());
            let months = term.months().unwrap();
            prop_assume!((months as usize) < MAX_SCHEDULE_MONTHS);

            let schedule = simulate(inputs.loan_amount, inputs.monthly_payment, inputs.annual_rate_pct);
            prop_assert_eq!(schedule.status, PayoffStatus::PaidOff);
            // The closed form and the iterative balance agree to the month,
            // give or take one month of floating-point slack at the boundary.
            let simulated = schedule.points.len() as i64;
            prop_assert!((simulated - months as i64).abs() <= 1);
        }
    }
}

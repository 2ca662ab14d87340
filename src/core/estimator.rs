use crate::error::CoreError;

use super::types::{Estimate, LoanInputs, Recommendation, RepaymentTerm};

/// Monthly payment above this share of monthly income triggers the
/// extend-term advisory.
pub const DTI_THRESHOLD: f64 = 0.4;
/// Principal above this multiple of annual income triggers the
/// reduce-loan advisory.
pub const LTI_THRESHOLD: f64 = 0.6;
/// Annual rates above this percentage trigger the refinancing advisory.
pub const REFINANCE_RATE_THRESHOLD_PCT: f64 = 5.0;

/// Closed-form months-to-repay plus affordability ratios and advisories.
///
/// Fails with `InvalidInput` on negative or non-finite parameters and with
/// `DivisionByZero` when the annual income is zero, since both ratios are
/// undefined without an income.
pub fn estimate(inputs: &LoanInputs) -> Result<Estimate, CoreError> {
    validate(inputs)?;
    if inputs.annual_income == 0.0 {
        return Err(CoreError::DivisionByZero {
            context: "affordability ratios (annual income is zero)",
        });
    }

    let monthly_income = inputs.annual_income / 12.0;
    let dti_ratio = inputs.monthly_payment / monthly_income;
    let loan_to_income_ratio = inputs.loan_amount / inputs.annual_income;

    Ok(Estimate {
        term: repayment_term(inputs),
        dti_ratio,
        loan_to_income_ratio,
        recommendations: recommendations(dti_ratio, loan_to_income_ratio, inputs.annual_rate_pct),
    })
}

fn repayment_term(inputs: &LoanInputs) -> RepaymentTerm {
    // Zero debt repays in zero months. Handled up front: the positive-rate
    // closed form would only report 0 here by floating-point coincidence.
    if inputs.loan_amount == 0.0 {
        return RepaymentTerm::Months(0);
    }

    if inputs.annual_rate_pct > 0.0 {
        let monthly_rate = inputs.annual_rate_pct / 100.0 / 12.0;
        let denominator = inputs.monthly_payment - inputs.loan_amount * monthly_rate;
        if denominator <= 0.0 {
            // The payment never covers the accruing interest.
            return RepaymentTerm::Infeasible;
        }
        // Standard amortization formula inverted for the term length. Partial
        // months always round up: there is no fractional final payment.
        let exact = (inputs.monthly_payment / denominator).ln() / (1.0 + monthly_rate).ln();
        RepaymentTerm::Months(exact.ceil() as u32)
    } else if inputs.monthly_payment == 0.0 {
        RepaymentTerm::Infeasible
    } else {
        RepaymentTerm::Months((inputs.loan_amount / inputs.monthly_payment).ceil() as u32)
    }
}

fn recommendations(
    dti_ratio: f64,
    loan_to_income_ratio: f64,
    annual_rate_pct: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if dti_ratio > DTI_THRESHOLD {
        recommendations.push(Recommendation::ExtendTerm);
    }
    if loan_to_income_ratio > LTI_THRESHOLD {
        recommendations.push(Recommendation::ReduceLoanOrRaiseIncome);
    }
    if annual_rate_pct > REFINANCE_RATE_THRESHOLD_PCT {
        recommendations.push(Recommendation::Refinance);
    }
    recommendations
}

fn validate(inputs: &LoanInputs) -> Result<(), CoreError> {
    for (field, value) in [
        ("loan_amount", inputs.loan_amount),
        ("annual_income", inputs.annual_income),
        ("monthly_payment", inputs.monthly_payment),
        ("annual_rate_pct", inputs.annual_rate_pct),
    ] {
        if !value.is_finite() {
            return Err(CoreError::InvalidInput {
                field,
                reason: "must be a finite number",
            });
        }
        if value < 0.0 {
            return Err(CoreError::InvalidInput {
                field,
                reason: "must be non-negative",
            });
        }
    }
    Ok(())
}

use serde::Serialize;

/// The four user-supplied loan parameters. Amounts are USD, the rate is an
/// annual percentage (3.0 means 3%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInputs {
    pub loan_amount: f64,
    pub annual_income: f64,
    pub monthly_payment: f64,
    pub annual_rate_pct: f64,
}

/// Months until the loan is repaid, or `Infeasible` when no finite term exists
/// (the payment never covers the accruing interest, or a zero payment is set
/// against a zero rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaymentTerm {
    Months(u32),
    Infeasible,
}

impl RepaymentTerm {
    pub fn months(self) -> Option<u32> {
        match self {
            RepaymentTerm::Months(months) => Some(months),
            RepaymentTerm::Infeasible => None,
        }
    }

    pub fn is_infeasible(self) -> bool {
        self == RepaymentTerm::Infeasible
    }
}

/// Rule-based advisories, in the fixed order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    ExtendTerm,
    ReduceLoanOrRaiseIncome,
    Refinance,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::ExtendTerm => {
                "Consider lowering monthly payments by extending the loan term."
            }
            Recommendation::ReduceLoanOrRaiseIncome => {
                "Evaluate ways to increase income or reduce loan amount."
            }
            Recommendation::Refinance => {
                "Explore refinancing options for a lower interest rate."
            }
        }
    }
}

/// Output of the amortization estimator: repayment term, both affordability
/// ratios, and any advisories that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub term: RepaymentTerm,
    pub dti_ratio: f64,
    pub loan_to_income_ratio: f64,
    pub recommendations: Vec<Recommendation>,
}

/// Remaining balance at the end of one simulated month. Months start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePoint {
    pub month: u32,
    pub remaining_balance: f64,
}

/// Whether the simulated schedule reached a zero balance or was cut off at the
/// iteration cap with debt still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PayoffStatus {
    PaidOff,
    Truncated,
}

/// Month-by-month balance projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub points: Vec<SchedulePoint>,
    pub status: PayoffStatus,
}

mod engine;
mod format;
mod types;

pub use engine::{
    ANNUAL_GROWTH_RATE, SAFE_WITHDRAWAL_RATE, SOCIAL_SECURITY_REPLACEMENT_RATE,
    SOCIAL_SECURITY_WAGE_BASE, build_trajectory, compute_annual_contribution,
    compute_employer_match, compute_projection, compute_social_security_monthly_benefit,
};
pub use format::{ParseAmountError, format_currency, format_input_number, parse_input_number};
pub use types::{ContributionBreakdown, ProjectionResult, RetirementInputs, TrajectoryPoint};

use super::types::{ContributionBreakdown, ProjectionResult, RetirementInputs, TrajectoryPoint};

pub const ANNUAL_GROWTH_RATE: f64 = 0.07;
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;
pub const SOCIAL_SECURITY_WAGE_BASE: f64 = 160_200.0;
pub const SOCIAL_SECURITY_REPLACEMENT_RATE: f64 = 0.4;

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn compute_annual_contribution(income: f64, contribution_percent: f64) -> f64 {
    income * contribution_percent / 100.0
}

// The cap is a share of salary, not of the employee contribution.
pub fn compute_employer_match(
    income: f64,
    annual_contribution: f64,
    has_match: bool,
    match_percentage: f64,
    match_limit_percent: f64,
) -> f64 {
    if !has_match {
        return 0.0;
    }
    let matchable = annual_contribution.min(income * match_limit_percent / 100.0);
    matchable * match_percentage / 100.0
}

// Rough placeholder, not the SSA benefit formula.
pub fn compute_social_security_monthly_benefit(annual_income: f64) -> f64 {
    annual_income.min(SOCIAL_SECURITY_WAGE_BASE) * SOCIAL_SECURITY_REPLACEMENT_RATE
        / MONTHS_PER_YEAR
}

pub fn build_trajectory(inputs: &RetirementInputs) -> Vec<TrajectoryPoint> {
    let contributions = contribution_breakdown(inputs);
    grow_savings(inputs, contributions.total)
}

pub fn compute_projection(inputs: &RetirementInputs) -> ProjectionResult {
    let contributions = contribution_breakdown(inputs);
    let trajectory = grow_savings(inputs, contributions.total);
    let final_savings = trajectory.last().map(|point| point.savings).unwrap_or(0.0);

    let investment_monthly_income = final_savings * SAFE_WITHDRAWAL_RATE / MONTHS_PER_YEAR;
    let social_security_monthly_benefit = if inputs.include_social_security {
        compute_social_security_monthly_benefit(inputs.annual_income)
    } else {
        0.0
    };

    ProjectionResult {
        trajectory,
        contributions,
        final_savings,
        investment_monthly_income,
        social_security_monthly_benefit,
        total_monthly_income: investment_monthly_income + social_security_monthly_benefit,
    }
}

fn contribution_breakdown(inputs: &RetirementInputs) -> ContributionBreakdown {
    let employee = compute_annual_contribution(inputs.annual_income, inputs.contribution_percent);
    let employer_match = compute_employer_match(
        inputs.annual_income,
        employee,
        inputs.has_employer_match,
        inputs.match_percentage,
        inputs.match_limit_percent,
    );
    ContributionBreakdown {
        employee,
        employer_match,
        total: employee + employer_match,
    }
}

// Only the recorded point is rounded; the running balance keeps full precision.
fn grow_savings(inputs: &RetirementInputs, yearly_contribution: f64) -> Vec<TrajectoryPoint> {
    let years = inputs
        .retirement_age
        .saturating_sub(inputs.current_age)
        .saturating_add(1);
    let mut trajectory = Vec::with_capacity(years as usize);
    let mut balance = inputs.current_savings;

    for age in inputs.current_age..=inputs.retirement_age {
        balance = balance * (1.0 + ANNUAL_GROWTH_RATE) + yearly_contribution;
        trajectory.push(TrajectoryPoint {
            age,
            savings: balance.round(),
        });
    }
    trajectory
}

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub annual_income: f64,
    pub current_savings: f64,
    pub contribution_percent: f64,
    pub has_employer_match: bool,
    pub match_percentage: f64,
    pub match_limit_percent: f64,
    pub include_social_security: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub age: u32,
    pub savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBreakdown {
    pub employee: f64,
    pub employer_match: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub trajectory: Vec<TrajectoryPoint>,
    pub contributions: ContributionBreakdown,
    pub final_savings: f64,
    pub investment_monthly_income: f64,
    pub social_security_monthly_benefit: f64,
    pub total_monthly_income: f64,
}

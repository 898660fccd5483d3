use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    ProjectionResult, RetirementInputs, SAFE_WITHDRAWAL_RATE, compute_projection,
    format_currency, parse_input_number,
};

pub const MIN_CURRENT_AGE: u32 = 18;
pub const MAX_RETIREMENT_AGE: u32 = 90;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("--current-age must be >= 18")]
    CurrentAgeTooLow,
    #[error("--retirement-age must be > --current-age")]
    RetirementNotAfterCurrentAge,
    #[error("--retirement-age must be <= 90")]
    RetirementAgeTooHigh,
    #[error("{0} must be a finite amount >= 0")]
    InvalidAmount(&'static str),
    #[error("{0} must be between 0 and 100")]
    PercentOutOfRange(&'static str),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to encode projection: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Retirement savings projection (compound growth, employer match, Social Security estimate)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON projection API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a projection for the given parameters.
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retirement_age: u32,
    #[arg(
        long,
        default_value_t = 100_000.0,
        value_parser = parse_input_number,
        help = "Annual income before tax; accepts grouped amounts such as 100,000"
    )]
    annual_income: f64,
    #[arg(
        long,
        default_value_t = 50_000.0,
        value_parser = parse_input_number,
        help = "Total currently saved across retirement accounts"
    )]
    current_savings: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Percent of salary contributed each year"
    )]
    contribution_percent: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    has_employer_match: bool,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Employer contribution per dollar contributed, in percent"
    )]
    match_percentage: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Share of salary the employer matches up to, in percent"
    )]
    match_limit_percent: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    include_social_security: bool,
    #[arg(long, help = "Print the projection as JSON")]
    json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    #[serde(deserialize_with = "deserialize_amount")]
    annual_income: Option<f64>,
    #[serde(deserialize_with = "deserialize_amount")]
    current_savings: Option<f64>,
    contribution_percent: Option<f64>,
    has_employer_match: Option<bool>,
    match_percentage: Option<f64>,
    match_limit_percent: Option<f64>,
    include_social_security: Option<bool>,
}

// Amounts arrive as JSON numbers or as grouped text such as "100,000".
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an amount as a number or text like \"100,000\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_input_number(v).map(Some).map_err(E::custom)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(AmountVisitor)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse<'a> {
    inputs: &'a RetirementInputs,
    #[serde(flatten)]
    projection: &'a ProjectionResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_inputs(args: &ProjectArgs) -> Result<RetirementInputs, InputError> {
    if args.current_age < MIN_CURRENT_AGE {
        return Err(InputError::CurrentAgeTooLow);
    }

    if args.retirement_age <= args.current_age {
        return Err(InputError::RetirementNotAfterCurrentAge);
    }

    if args.retirement_age > MAX_RETIREMENT_AGE {
        return Err(InputError::RetirementAgeTooHigh);
    }

    for (name, amount) in [
        ("--annual-income", args.annual_income),
        ("--current-savings", args.current_savings),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InputError::InvalidAmount(name));
        }
    }

    if !(0.0..=100.0).contains(&args.contribution_percent) {
        return Err(InputError::PercentOutOfRange("--contribution-percent"));
    }

    // Match terms are ignored without a match, so they are not validated either.
    if args.has_employer_match {
        for (name, percent) in [
            ("--match-percentage", args.match_percentage),
            ("--match-limit-percent", args.match_limit_percent),
        ] {
            if !(0.0..=100.0).contains(&percent) {
                return Err(InputError::PercentOutOfRange(name));
            }
        }
    }

    Ok(RetirementInputs {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        annual_income: args.annual_income,
        current_savings: args.current_savings,
        contribution_percent: args.contribution_percent,
        has_employer_match: args.has_employer_match,
        match_percentage: args.match_percentage,
        match_limit_percent: args.match_limit_percent,
        include_social_security: args.include_social_security,
    })
}

pub fn run_projection_command(args: &ProjectArgs) -> Result<String, ApiError> {
    let inputs = build_inputs(args)?;
    let projection = compute_projection(&inputs);
    log::debug!(
        "projected ages {}..={} to final savings {}",
        inputs.current_age,
        inputs.retirement_age,
        projection.final_savings
    );

    if args.json {
        let response = ProjectionResponse {
            inputs: &inputs,
            projection: &projection,
        };
        return Ok(serde_json::to_string_pretty(&response)?);
    }
    Ok(render_report(&inputs, &projection))
}

fn render_report(inputs: &RetirementInputs, projection: &ProjectionResult) -> String {
    let contributions = &projection.contributions;
    let mut lines = vec![
        format!(
            "Retirement projection: age {} to {}",
            inputs.current_age, inputs.retirement_age
        ),
        format!(
            "  Your contribution:          {} per year",
            format_currency(contributions.employee)
        ),
    ];
    if inputs.has_employer_match {
        lines.push(format!(
            "  Employer match:             {} per year",
            format_currency(contributions.employer_match)
        ));
        lines.push(format!(
            "  Total annual contribution:  {}",
            format_currency(contributions.total)
        ));
    }
    lines.push(format!(
        "  Savings at {}:              {}",
        inputs.retirement_age,
        format_currency(projection.final_savings)
    ));

    lines.push("Projected monthly income".to_string());
    lines.push(format!(
        "  Investments ({:.0}% rule):      {}",
        SAFE_WITHDRAWAL_RATE * 100.0,
        format_currency(projection.investment_monthly_income)
    ));
    if inputs.include_social_security {
        lines.push(format!(
            "  Social Security (estimate): {}",
            format_currency(projection.social_security_monthly_benefit)
        ));
    }
    lines.push(format!(
        "  Total:                      {}",
        format_currency(projection.total_monthly_income)
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn app() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("projection API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/api/projection");

    axum::serve(listener, app()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(
    payload: Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => projection_handler_impl(payload).await,
        Err(rejection) => rejection_response(rejection.status(), rejection.body_text()),
    }
}

async fn projection_post_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => projection_handler_impl(payload).await,
        Err(rejection) => rejection_response(rejection.status(), rejection.body_text()),
    }
}

fn rejection_response(status: StatusCode, msg: String) -> Response {
    log::warn!("rejected malformed projection request: {msg}");
    error_response(status, &msg)
}

async fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => {
            log::warn!("rejected projection request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let projection = compute_projection(&inputs);
    log::debug!(
        "projected ages {}..={} to final savings {}",
        inputs.current_age,
        inputs.retirement_age,
        projection.final_savings
    );
    json_response(
        StatusCode::OK,
        ProjectionResponse {
            inputs: &inputs,
            projection: &projection,
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<RetirementInputs, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload).map_err(|e| e.to_string())
}

fn inputs_from_payload(payload: ProjectionPayload) -> Result<RetirementInputs, InputError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.annual_income {
        args.annual_income = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.contribution_percent {
        args.contribution_percent = v;
    }
    if let Some(v) = payload.has_employer_match {
        args.has_employer_match = v;
    }
    if let Some(v) = payload.match_percentage {
        args.match_percentage = v;
    }
    if let Some(v) = payload.match_limit_percent {
        args.match_limit_percent = v;
    }
    if let Some(v) = payload.include_social_security {
        args.include_social_security = v;
    }

    build_inputs(&args)
}

fn default_args_for_api() -> ProjectArgs {
    ProjectArgs {
        current_age: 30,
        retirement_age: 65,
        annual_income: 100_000.0,
        current_savings: 50_000.0,
        contribution_percent: 10.0,
        has_employer_match: true,
        match_percentage: 50.0,
        match_limit_percent: 6.0,
        include_social_security: true,
        json: false,
    }
}

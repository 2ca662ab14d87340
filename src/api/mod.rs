use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::advisory::{AdvisoryGenerator, DisabledAdvisor, HttpAdvisor, build_prompt};
use crate::core::{Estimate, LoanInputs, PayoffStatus, Schedule, SchedulePoint, estimate, simulate};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

type AdvisorState = Arc<dyn AdvisoryGenerator>;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzePayload {
    loan_amount: Option<f64>,
    annual_income: Option<f64>,
    monthly_payment: Option<f64>,
    interest_rate: Option<f64>,
    include_advisory: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "loanplan",
    about = "Loan repayment timeline, affordability ratios, and recommendations"
)]
struct Cli {
    #[arg(long, default_value_t = 500_000.0, help = "Loan principal in USD")]
    loan_amount: f64,
    #[arg(long, default_value_t = 60_000.0, help = "Annual gross income in USD")]
    annual_income: f64,
    #[arg(long, default_value_t = 8_000.0, help = "Fixed monthly payment in USD")]
    monthly_payment: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Annual interest rate in percent, e.g. 3 means 3%"
    )]
    interest_rate: f64,
}

#[derive(Debug)]
struct AnalyzeRequest {
    inputs: LoanInputs,
    include_advisory: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    feasible: bool,
    months_to_repay: Option<u32>,
    years_to_repay: Option<f64>,
    dti_ratio: f64,
    loan_to_income_ratio: f64,
    annual_rate_pct: f64,
    recommendations: Vec<&'static str>,
    payoff_status: PayoffStatus,
    schedule: Vec<SchedulePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<LoanInputs, String> {
    for (name, value) in [
        ("--loan-amount", cli.loan_amount),
        ("--annual-income", cli.annual_income),
        ("--monthly-payment", cli.monthly_payment),
        ("--interest-rate", cli.interest_rate),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
        if value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if cli.annual_income == 0.0 {
        return Err("--annual-income must be > 0".to_string());
    }

    if cli.interest_rate > 100.0 {
        return Err("--interest-rate must be between 0 and 100".to_string());
    }

    Ok(LoanInputs {
        loan_amount: cli.loan_amount,
        annual_income: cli.annual_income,
        monthly_payment: cli.monthly_payment,
        annual_rate_pct: cli.interest_rate,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let advisor: AdvisorState = match HttpAdvisor::from_env() {
        Some(advisor) => Arc::new(advisor),
        None => {
            info!("no advisory endpoint configured, advisory text disabled");
            Arc::new(DisabledAdvisor)
        }
    };
    run_http_server_with(port, advisor).await
}

pub async fn run_http_server_with(port: u16, advisor: AdvisorState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/analyze",
            get(analyze_get_handler).post(analyze_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(advisor);

    let listener = TcpListener::bind(addr).await?;
    info!("loan planner HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

/// Parses CLI flags, runs the analysis once, and prints it as JSON.
pub fn run_analyze(args: &[String]) -> Result<(), String> {
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let inputs = build_inputs(cli)?;
    let analysis = estimate(&inputs).map_err(|e| e.to_string())?;
    let schedule = simulate(inputs.loan_amount, inputs.monthly_payment, inputs.annual_rate_pct);
    let response = build_analyze_response(&inputs, &analysis, &schedule, None);
    let json = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn analyze_get_handler(
    State(advisor): State<AdvisorState>,
    Query(payload): Query<AnalyzePayload>,
) -> Response {
    analyze_handler_impl(advisor, payload).await
}

async fn analyze_post_handler(
    State(advisor): State<AdvisorState>,
    Json(payload): Json<AnalyzePayload>,
) -> Response {
    analyze_handler_impl(advisor, payload).await
}

async fn analyze_handler_impl(advisor: AdvisorState, payload: AnalyzePayload) -> Response {
    let request = match analyze_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    // Inputs passed build_inputs, but the core revalidates its own contract.
    let analysis = match estimate(&request.inputs) {
        Ok(analysis) => analysis,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let schedule = simulate(
        request.inputs.loan_amount,
        request.inputs.monthly_payment,
        request.inputs.annual_rate_pct,
    );

    let advisory = if request.include_advisory {
        Some(advisory_text(advisor.as_ref(), &analysis, request.inputs.annual_rate_pct).await)
    } else {
        None
    };

    json_response(
        StatusCode::OK,
        build_analyze_response(&request.inputs, &analysis, &schedule, advisory),
    )
}

/// Advisory text, or an inline error message when generation fails. Advisory
/// failures are never propagated as request failures.
async fn advisory_text(
    advisor: &dyn AdvisoryGenerator,
    analysis: &Estimate,
    annual_rate_pct: f64,
) -> String {
    let prompt = build_prompt(analysis, annual_rate_pct);
    match advisor.generate(&prompt).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "advisory generation failed");
            format!("Advisory text unavailable: {err}")
        }
    }
}

fn build_analyze_response(
    inputs: &LoanInputs,
    analysis: &Estimate,
    schedule: &Schedule,
    advisory: Option<String>,
) -> AnalyzeResponse {
    let months_to_repay = analysis.term.months();
    AnalyzeResponse {
        feasible: !analysis.term.is_infeasible(),
        months_to_repay,
        years_to_repay: months_to_repay.map(|months| months as f64 / 12.0),
        dti_ratio: analysis.dti_ratio,
        loan_to_income_ratio: analysis.loan_to_income_ratio,
        annual_rate_pct: inputs.annual_rate_pct,
        recommendations: analysis
            .recommendations
            .iter()
            .map(|recommendation| recommendation.message())
            .collect(),
        payoff_status: schedule.status,
        schedule: schedule.points.clone(),
        advisory,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
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
fn analyze_request_from_json(json: &str) -> Result<AnalyzeRequest, String> {
    let payload = serde_json::from_str::<AnalyzePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    analyze_request_from_payload(payload)
}

fn analyze_request_from_payload(payload: AnalyzePayload) -> Result<AnalyzeRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.loan_amount {
        cli.loan_amount = v;
    }
    if let Some(v) = payload.annual_income {
        cli.annual_income = v;
    }
    if let Some(v) = payload.monthly_payment {
        cli.monthly_payment = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }

    let include_advisory = payload.include_advisory.unwrap_or(false);
    let inputs = build_inputs(cli)?;
    Ok(AnalyzeRequest {
        inputs,
        include_advisory,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        loan_amount: 500_000.0,
        annual_income: 60_000.0,
        monthly_payment: 8_000.0,
        interest_rate: 3.0,
    }
}

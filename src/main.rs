use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use loan_eligibility::config::{AppConfig, DecisionStrategyKind};
use loan_eligibility::error::AppError;
use loan_eligibility::telemetry;
use loan_eligibility::workflows::eligibility::{
    eligibility_router, DecisionStrategy, EligibilityService, HttpPredictionClient,
    LocalRuleStrategy, ModelMetricsSource, NoRemoteMetrics, RemotePredictionStrategy,
    SubmissionOutcome, SubmissionPhase, VerdictView,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Loan Eligibility Service",
    about = "Run the loan eligibility service or check an application from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate an application and run the local eligibility rules
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Number of dependents
    #[arg(long, default_value = "")]
    no_of_dependents: String,
    /// Education level (Graduate or Non-Graduate)
    #[arg(long, default_value = "")]
    education: String,
    /// Self employed (Yes or No)
    #[arg(long, default_value = "")]
    self_employed: String,
    /// Annual income
    #[arg(long, default_value = "")]
    income_annum: String,
    /// Requested loan amount
    #[arg(long, default_value = "")]
    loan_amount: String,
    /// Loan term in years (2-20)
    #[arg(long, default_value = "")]
    loan_term: String,
    /// CIBIL score (300-900)
    #[arg(long, default_value = "")]
    cibil_score: String,
    /// Residential assets value
    #[arg(long, default_value = "")]
    residential_assets_value: String,
    /// Commercial assets value
    #[arg(long, default_value = "")]
    commercial_assets_value: String,
    /// Luxury assets value
    #[arg(long, default_value = "")]
    luxury_assets_value: String,
    /// Bank asset value
    #[arg(long, default_value = "")]
    bank_asset_value: String,
}

impl CheckArgs {
    fn entries(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("no_of_dependents".to_string(), self.no_of_dependents),
            ("education".to_string(), self.education),
            ("self_employed".to_string(), self.self_employed),
            ("income_annum".to_string(), self.income_annum),
            ("loan_amount".to_string(), self.loan_amount),
            ("loan_term".to_string(), self.loan_term),
            ("cibil_score".to_string(), self.cibil_score),
            (
                "residential_assets_value".to_string(),
                self.residential_assets_value,
            ),
            (
                "commercial_assets_value".to_string(),
                self.commercial_assets_value,
            ),
            (
                "luxury_assets_value".to_string(),
                self.luxury_assets_value,
            ),
            ("bank_asset_value".to_string(), self.bank_asset_value),
        ])
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Check(args) => run_check(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_service(&config));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(eligibility_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan eligibility service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_service(config: &AppConfig) -> EligibilityService {
    match config.prediction.strategy {
        DecisionStrategyKind::Local => EligibilityService::new(
            Arc::new(LocalRuleStrategy),
            Arc::new(NoRemoteMetrics),
        ),
        DecisionStrategyKind::Remote => {
            let client = Arc::new(HttpPredictionClient::new(
                config.prediction.base_url.clone(),
            ));
            let strategy: Arc<dyn DecisionStrategy> = Arc::new(RemotePredictionStrategy::new(
                client.clone(),
                config.prediction.model.clone(),
            ));
            let metrics: Arc<dyn ModelMetricsSource> = client;
            EligibilityService::new(strategy, metrics)
        }
    }
}

async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let service =
        EligibilityService::new(Arc::new(LocalRuleStrategy), Arc::new(NoRemoteMetrics));
    let entries = args.entries();

    // The flag names are derived from the schema, so this only fails if the
    // two fall out of sync.
    let form = match service.submit(&entries).await {
        Ok(form) => form,
        Err(unknown) => {
            eprintln!("internal error: {unknown}");
            std::process::exit(1);
        }
    };

    match form.phase() {
        SubmissionPhase::Settled(SubmissionOutcome::Verdict(verdict)) => {
            let view = VerdictView::for_verdict(verdict);
            println!("{}", view.headline);
            if let Some(detail) = &view.detail {
                println!("{detail}");
            }
        }
        SubmissionPhase::Settled(SubmissionOutcome::ValidationFailed) => {
            println!("Application is not valid:");
            for field in form.view().fields {
                if let Some(error) = field.error {
                    println!("  {}: {}", field.name, error);
                }
            }
        }
        SubmissionPhase::Settled(SubmissionOutcome::DecisionFailed(error)) => {
            println!("Decision failed: {error}");
        }
        other => println!("Submission did not settle: {other:?}"),
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

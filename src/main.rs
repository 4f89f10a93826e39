use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use footprint_engine::config::AppConfig;
use footprint_engine::engine::pipeline::{FootprintEngine, FootprintReport};
use footprint_engine::engine::programs_csv;
use footprint_engine::engine::reference::InMemoryReferenceStore;
use footprint_engine::engine::{EngineConfig, Profile};
use footprint_engine::error::AppError;
use footprint_engine::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    store: Arc<InMemoryReferenceStore>,
    engine: Arc<FootprintEngine>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Footprint Engine",
    about = "Calculate household carbon footprints and match reduction incentives",
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
    /// Run one footprint calculation from the command line
    Footprint {
        #[command(subcommand)]
        command: FootprintCommand,
    },
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

#[derive(Subcommand, Debug)]
enum FootprintCommand {
    /// Compute a breakdown and recommendation report for one profile
    Report(FootprintReportArgs),
}

#[derive(Args, Debug)]
struct FootprintReportArgs {
    /// Household profile as a JSON file
    #[arg(long)]
    profile: PathBuf,
    /// Optional incentive-program CSV layered over the built-in defaults
    #[arg(long)]
    programs_csv: Option<PathBuf>,
    /// Emit the raw JSON report instead of the text rendering
    #[arg(long)]
    json: bool,
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
        Command::Footprint {
            command: FootprintCommand::Report(args),
        } => run_footprint_report(args),
    }
}

fn build_store(programs_csv: Option<&PathBuf>) -> Result<InMemoryReferenceStore, AppError> {
    let store = InMemoryReferenceStore::with_national_defaults();
    match programs_csv {
        Some(path) => Ok(programs_csv::hydrate_from_path(store, path)?),
        None => Ok(store),
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

    let store = build_store(config.reference.programs_csv.as_ref())?;
    info!(programs = store.program_count(), "reference store loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        store: Arc::new(store),
        engine: Arc::new(FootprintEngine::new(EngineConfig::default())),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/footprint/report", post(footprint_report_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "footprint engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_footprint_report(args: FootprintReportArgs) -> Result<(), AppError> {
    let FootprintReportArgs {
        profile,
        programs_csv,
        json,
    } = args;

    let raw = std::fs::read_to_string(&profile)?;
    let profile: Profile = serde_json::from_str(&raw).map_err(|err| {
        AppError::Engine(footprint_engine::engine::EngineError::InvalidProfile {
            field: "profile",
            reason: err.to_string(),
        })
    })?;

    let store = build_store(programs_csv.as_ref())?;
    let engine = FootprintEngine::new(EngineConfig::default());
    let report = engine.run(&profile, &store)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        render_footprint_report(&report);
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

async fn footprint_report_endpoint(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<FootprintReport>, AppError> {
    let report = state.engine.run(&profile, state.store.as_ref())?;
    Ok(Json(report))
}

fn render_footprint_report(report: &FootprintReport) {
    let context = &report.context;
    println!("Household carbon footprint");
    println!(
        "Total: {:.1} tons CO2/year ({:.0}% of the {:.0}-ton US average)",
        context.total_tons, context.percent_of_us_average, context.us_average_tons
    );
    println!(
        "Home {:.0}% | Transport {:.0}% | Consumption {:.0}%",
        context.home_percent, context.transport_percent, context.consumption_percent
    );

    println!("\nEmission sources");
    for item in &report.breakdown.line_items {
        let estimate_note = if item.estimated { " (estimated)" } else { "" };
        println!(
            "- {}: {:.0} kg CO2 [{}]{}",
            item.source, item.co2_kg, item.method, estimate_note
        );
    }

    if report.recommendations.is_empty() {
        println!("\nRecommendations: none, this household is at or below baseline");
        return;
    }

    println!("\nRecommendations");
    for recommendation in &report.recommendations {
        let opportunity = &recommendation.opportunity;
        println!(
            "\n[{}] {} (priority {})",
            opportunity.kind.label(),
            opportunity.description,
            opportunity.priority
        );
        println!(
            "  Saves about {:.0} kg CO2 and ${:.0} per year",
            opportunity.co2_savings_kg, opportunity.cost_savings_usd
        );

        if recommendation.financial.has_data() {
            println!("  Incentives: {}", recommendation.financial.display());
        }
        for program in &recommendation.programs {
            let level = if program.is_federal() { "federal" } else { "state" };
            println!("  - {} ({}, {})", program.name, level, program.last_updated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_engine::engine::domain::{DietTier, HousingType, ShoppingTier};

    // The prometheus recorder is process-global and can only be installed
    // once, so every test shares one handle.
    fn metrics_handle() -> PrometheusHandle {
        static HANDLE: std::sync::OnceLock<PrometheusHandle> = std::sync::OnceLock::new();
        HANDLE
            .get_or_init(|| PrometheusMetricLayer::pair().1)
            .clone()
    }

    fn test_state() -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: metrics_handle(),
            store: Arc::new(InMemoryReferenceStore::with_national_defaults()),
            engine: Arc::new(FootprintEngine::default()),
        }
    }

    fn sample_profile() -> Profile {
        Profile {
            state: "CA".to_string(),
            city: None,
            household_size: 2,
            housing_type: HousingType::House,
            square_footage: 1_700.0,
            monthly_electricity_usd: 180.0,
            heating_type: None,
            monthly_heating_usd: None,
            has_solar: false,
            primary_vehicle: None,
            secondary_vehicles: Vec::new(),
            domestic_flights: 1,
            international_flights: 0,
            diet: DietTier::ModerateMeat,
            shopping: ShoppingTier::Moderate,
        }
    }

    #[tokio::test]
    async fn footprint_report_endpoint_returns_breakdown() {
        let Json(report) = footprint_report_endpoint(State(test_state()), Json(sample_profile()))
            .await
            .expect("report builds");

        assert!(report.breakdown.total_kg > 0.0);
        let sum = report.breakdown.home_kg
            + report.breakdown.transport_kg
            + report.breakdown.consumption_kg;
        assert!((report.breakdown.total_kg - sum).abs() < 1e-9);
    }

    #[tokio::test]
    async fn router_serves_health_and_report() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let state = test_state();
        let app = Router::new()
            .route("/health", get(healthcheck))
            .route("/api/v1/footprint/report", post(footprint_report_endpoint))
            .with_state(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = serde_json::to_string(&sample_profile()).expect("profile serializes");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/footprint/report")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn footprint_report_endpoint_rejects_invalid_profiles() {
        let mut profile = sample_profile();
        profile.household_size = 0;

        let err = footprint_report_endpoint(State(test_state()), Json(profile))
            .await
            .expect_err("zero-person household rejected");
        assert!(matches!(err, AppError::Engine(_)));
    }
}

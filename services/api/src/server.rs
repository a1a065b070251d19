use crate::cli::ServeArgs;
use crate::infra::{
    AppState, Gateways, InMemoryAssessmentRepository, InMemoryBookingRepository,
    InMemorySessionStore, InMemoryUserRepository,
};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mindmetric::accounts::AccountService;
use mindmetric::assessment::{
    ArtifactCache, AssessmentPipeline, AssessmentService, CsvAssessmentLog, RecommendationResolver,
};
use mindmetric::booking::BookingService;
use mindmetric::config::AppConfig;
use mindmetric::error::AppError;
use mindmetric::notifications::BookingNotifier;
use mindmetric::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let artifacts = Arc::new(ArtifactCache::new(config.artifacts.clone()));
    let preload = artifacts.clone();
    if !tokio::task::spawn_blocking(move || preload.preload()).await? {
        warn!("serving with score-bucket recommendations only");
    }

    let gateway_config = config.clone();
    let gateways = tokio::task::spawn_blocking(move || Gateways::connect(&gateway_config)).await??;

    let accounts = Arc::new(AccountService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemorySessionStore::default()),
    ));

    let pipeline = Arc::new(AssessmentPipeline::new(
        RecommendationResolver::new(artifacts),
        gateways.summaries,
    ));
    let assessments = Arc::new(AssessmentService::new(
        pipeline,
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(CsvAssessmentLog::new(config.assessment_log_path.clone())),
    ));

    let notifier = Arc::new(BookingNotifier::new(
        gateways.messaging,
        gateways.email,
        config.notifications.counselor.clone(),
        config.notifications.from_email.clone(),
    ));
    let bookings = Arc::new(BookingService::new(
        Arc::new(InMemoryBookingRepository::default()),
        notifier,
    ));

    let app = with_service_routes(accounts, assessments, bookings)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mindmetric service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

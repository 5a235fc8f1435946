use crate::cli::ServeArgs;
use crate::infra::{apply_scoring_overrides, AppState, InMemoryRecommendationRepository};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dept_advisor::advisor::{Advisor, RecommendationService};
use dept_advisor::config::AppConfig;
use dept_advisor::error::AppError;
use dept_advisor::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    apply_scoring_overrides(&mut config.advisor, args.scoring);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let advisor = Arc::new(Advisor::from_config(&config.advisor)?);
    let strategy = advisor.strategy();
    let repository = Arc::new(InMemoryRecommendationRepository::default());
    let recommendation_service = Arc::new(RecommendationService::new(advisor, repository));

    let app = with_recommendation_routes(recommendation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        strategy = strategy.label(),
        "department advisor ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

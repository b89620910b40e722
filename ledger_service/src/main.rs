use dotenvy::dotenv;
use ledger_service::{
    api::http_routes::{routes, AppState},
    config::AppConfig,
    infrastructure::persistence::{read_repository::PostgresLedgerReader, store::Store},
    jobs::purge_idempotency::PurgeIdempotencyJob,
    use_cases::{
        get_balances::GetBalancesUseCase, get_history::GetHistoryUseCase,
        process_transfer::ProcessTransferUseCase,
    },
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Intervalo del barrido de registros de idempotencia expirados.
const PURGE_INTERVAL_SECS: u64 = 3_600;

#[derive(OpenApi)]
#[openapi(
    paths(
        ledger_service::api::http_routes::top_up,
        ledger_service::api::http_routes::issue_bonus,
        ledger_service::api::http_routes::purchase,
        ledger_service::api::http_routes::get_balances,
        ledger_service::api::http_routes::get_transaction_history
    ),
    components(schemas(
        ledger_service::api::http_routes::TransferRequestBody,
        ledger_service::api::response::ApiResponse<serde_json::Value>
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Ledger Service...");

    // 3. Cargar configuración y conectar el store
    let config = AppConfig::from_env()?;
    let store = Store::connect(&config.database_url, &config.store).await?;

    info!("Connected to Database");

    // 4. Instanciar Casos de Uso
    let process_transfer_use_case =
        ProcessTransferUseCase::new(store.clone(), config.idempotency.ttl());
    let reader = Arc::new(PostgresLedgerReader::new(store.pool().clone()));
    let get_balances_use_case = GetBalancesUseCase::new(reader.clone());
    let get_history_use_case = GetHistoryUseCase::new(
        reader,
        config.transactions.history_default_limit,
        config.transactions.history_max_limit,
    );

    // 5. Configurar Estado de la App Axum
    let app_state = Arc::new(AppState {
        process_transfer_use_case,
        get_balances_use_case,
        get_history_use_case,
    });

    // 6. Configurar Rutas y Servidor
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = format!("{}:{}", config.host, config.port);

    // 7. Iniciar el sweeper de idempotencia en segundo plano
    let job_store = store.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(PURGE_INTERVAL_SECS));
        let job = PurgeIdempotencyJob::new(job_store);

        info!("Idempotency sweeper started");

        loop {
            interval.tick().await;
            job.run().await;
        }
    });

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

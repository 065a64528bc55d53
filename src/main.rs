use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wallet_ledger::domains::wallet::models::*;
use wallet_ledger::routes::create_router;
use wallet_ledger::shared::config::AppConfig;
use wallet_ledger::shared::logging::setup_logging;
use wallet_ledger::shared::services::AppState;

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        wallet_ledger::domains::wallet::handlers::wallet_handler::get_wallet,
        wallet_ledger::domains::wallet::handlers::wallet_handler::get_transactions,
        wallet_ledger::domains::wallet::handlers::request_handler::create_deposit_request,
        wallet_ledger::domains::wallet::handlers::request_handler::create_withdrawal_request,
        wallet_ledger::domains::wallet::handlers::request_handler::list_my_requests,
        wallet_ledger::domains::wallet::handlers::request_handler::get_my_request,
        wallet_ledger::domains::wallet::handlers::admin_handler::list_requests,
        wallet_ledger::domains::wallet::handlers::admin_handler::get_owner_wallet,
        wallet_ledger::domains::wallet::handlers::admin_handler::approve_deposit,
        wallet_ledger::domains::wallet::handlers::admin_handler::approve_withdrawal,
        wallet_ledger::domains::wallet::handlers::admin_handler::reject_request
    ),
    components(schemas(
        Wallet,
        WalletResponse,
        EntryKind,
        TransactionEntry,
        TransactionPage,
        RequestType,
        RequestStatus,
        WalletRequest,
        WalletRequestPage,
        CreateDepositRequest,
        CreateWithdrawalRequest,
        ApproveWithdrawalRequest,
        RejectWalletRequest,
        RequestDecisionResponse
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Wallet", description = "Wallet balance and ledger history"),
        (name = "Wallet Requests", description = "Deposit / withdrawal requests (owner side)"),
        (name = "Admin", description = "Request approval workflow (administrator only)")
    ),
    info(
        title = "Wallet Ledger API",
        description = "Wallet ledger and deposit/withdrawal approval service",
        version = "1.0.0"
    )
)]
struct ApiDoc;

// Security scheme 정의: Swagger UI에서 "Authorize" 버튼 추가
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = AppConfig::from_env()?;

    // AppState 생성 (저장소 연결 + 마이그레이션 + 서비스 초기화)
    let app_state = AppState::from_config(&config).await?;

    // CORS 설정
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("CORS_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    // Router 생성
    let app = Router::new()
        .merge(create_router())
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "server running");
    tracing::info!("Swagger UI available at http://{}/api", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

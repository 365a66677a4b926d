//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountOpenedData, AccountSummaryData, CardData, CardViewData, HistoryEntryData,
    HistoryPageData, OpenAccountRequest, TransferData, TransferRequest,
};

/// Caller identity forwarded by the session layer
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "wallet_account",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-Wallet-Account",
                    "Account identity of the already-authenticated caller, set by the upstream session layer.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Loyalty Wallet API",
        version = "1.0.0",
        description = "Loyalty-card wallet: tiered commissions, loyalty points and atomic peer transfers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::open_account,
        crate::gateway::handlers::resolve_card,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::get_history,
        crate::gateway::handlers::issue_card,
    ),
    components(
        schemas(
            HealthResponse,
            OpenAccountRequest,
            TransferRequest,
            AccountOpenedData,
            AccountSummaryData,
            CardData,
            CardViewData,
            TransferData,
            HistoryEntryData,
            HistoryPageData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Account", description = "Account opening and summary"),
        (name = "Card", description = "Card issue and public lookup"),
        (name = "Transfer", description = "Peer transfers and history (caller identity required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

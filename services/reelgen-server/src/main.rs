//! Reelgen Server - the HTTP surface over the orchestration core
//!
//! Routes mirror the original service API:
//!
//! - `GET  /api/agent-payment`   — shared wallet snapshot
//! - `POST /api/agent-payment`   — paid flow: select agent, execute payment,
//!   start generation; polling continues server-side
//! - `POST /api/generate-video`  — direct (unpaid) submission pass-through
//! - `POST /api/poll-operation`  — one status query + artifact extraction
//! - `GET  /api/download-video`  — authenticated proxy stream of an artifact
//!
//! # Quick Start
//!
//! ```bash
//! GEMINI_API_KEY=... reelgen-server --port 8080
//! ```

mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json as AxumJson},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelgen_agents::Catalog;
use reelgen_chain::{HttpChainClient, Vault};
use reelgen_engine::{Orchestrator, OrchestratorConfig};
use reelgen_types::{Amount, OperationName};
use reelgen_veo::{extract_artifact_url, GenerationClient, VeoClient};
use reelgen_wallet::WalletGateway;

use error::{ApiError, ApiResult};

/// Reelgen Server - Autonomous agent video generation
#[derive(Parser, Debug)]
#[command(
    name = "reelgen-server",
    about = "Agents pick your prompt, pay from a shared wallet, and track the video job",
    version
)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "REELGEN_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "REELGEN_PORT")]
    port: u16,

    /// Quoted cost per generation, in USDC
    #[arg(long, default_value = "0.10", env = "REELGEN_JOB_COST")]
    cost: f64,
}

/// Shared application state
struct AppState {
    orchestrator: Orchestrator,
    wallet: Arc<WalletGateway>,
    generation: Arc<dyn GenerationClient>,
    /// Forwarded on artifact downloads; the artifact store wants the same key
    api_key: String,
    quoted_cost: Amount,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let vault = match Vault::from_env() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to load wallet key: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(address = %vault.address(), "shared custodial wallet ready");

    let chain = Arc::new(HttpChainClient::from_env());
    let wallet = Arc::new(WalletGateway::new(chain, vault.address().as_str()));

    let veo = match VeoClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to configure generation client: {e}");
            std::process::exit(1);
        }
    };
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let generation: Arc<dyn GenerationClient> = Arc::new(veo);

    let quoted_cost = Amount::from_usdc(args.cost);
    let orchestrator = Orchestrator::new(
        Catalog::builtin(),
        wallet.clone(),
        generation.clone(),
        OrchestratorConfig {
            cost: quoted_cost,
            ..OrchestratorConfig::default()
        },
    );

    let state = Arc::new(AppState {
        orchestrator,
        wallet,
        generation,
        api_key,
        quoted_cost,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/api/agent-payment",
            get(get_wallet_info).post(agent_payment),
        )
        .route("/api/generate-video", post(generate_video))
        .route("/api/poll-operation", post(poll_operation))
        .route("/api/download-video", get(download_video))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("reelgen-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    AxumJson(json!({ "status": "ok", "service": "reelgen-server" }))
}

/// GET /api/agent-payment — fresh wallet snapshot
async fn get_wallet_info(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let info = state
        .wallet
        .wallet_info()
        .await
        .map_err(|e| ApiError::from_core(e, state.wallet.address(), &state.wallet.explorer_url()))?;

    Ok(AxumJson(json!({
        "success": true,
        "walletInfo": {
            "address": info.address,
            "balance": info.balance.to_usdc(),
            "network": info.network,
            "currency": "USDC",
            "explorerUrl": info.explorer_url,
            "lastUpdated": info.last_updated,
        },
        "walletBalance": info.balance.to_usdc(),
        "timestamp": Utc::now(),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentPaymentRequest {
    prompt: String,
    #[serde(default)]
    cost: Option<String>,
}

/// POST /api/agent-payment — the paid orchestration flow
async fn agent_payment(
    State(state): State<Arc<AppState>>,
    AxumJson(request): AxumJson<AgentPaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".into()));
    }

    // the client may echo the quote back; it must match exactly
    if let Some(cost) = &request.cost {
        let parsed = parse_cost(cost)?;
        if parsed != state.quoted_cost {
            return Err(ApiError::BadRequest(format!(
                "Cost mismatch: quoted {}, requested {}",
                state.quoted_cost, parsed
            )));
        }
    }

    let context = state
        .orchestrator
        .start(&request.prompt)
        .await
        .map_err(|e| ApiError::from_core(e, state.wallet.address(), &state.wallet.explorer_url()))?;

    // drive the job to terminal in the background; the client may also
    // follow along via /api/poll-operation
    let handle = state.orchestrator.spawn_poller(&context);
    tokio::spawn(async move {
        if let Some(outcome) = handle.join().await {
            tracing::info!(?outcome, "background polling finished");
        }
    });

    // balance display after the transfer; the chain needs a moment to
    // reflect it, and a failed re-read must not fail the payment response
    tokio::time::sleep(Duration::from_secs(1)).await;
    let balance_after = state.wallet.balance().await.ok();

    let job = context.job().await;
    let tx_explorer = format!("https://sepolia.basescan.org/tx/{}", context.payment.tx_hash);

    Ok(AxumJson(json!({
        "success": true,
        "operationName": job.operation.as_str(),
        "agentId": context.agent.id.as_str(),
        "agentName": context.agent.name,
        "selectionScore": context.selection_score,
        "prompt": job.prompt,
        "model": job.model,
        "cost": job.cost.to_usdc(),
        "paymentMethod": "autonomous_agent_real_blockchain",
        "walletBalanceAfter": balance_after.map(|b| b.to_usdc()),
        "walletAddress": state.wallet.address(),
        "explorerUrl": state.wallet.explorer_url(),
        "realPayment": {
            "txHash": context.payment.tx_hash,
            "blockNumber": context.payment.block_number,
            "gasUsed": context.payment.gas_used,
            "recipient": context.payment.recipient,
            "txExplorerUrl": tx_explorer,
        },
        "timestamp": Utc::now(),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoRequest {
    prompt: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_aspect_ratio")]
    aspect_ratio: String,
}

fn default_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

/// POST /api/generate-video — unpaid direct submission
async fn generate_video(
    State(state): State<Arc<AppState>>,
    AxumJson(request): AxumJson<GenerateVideoRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".into()));
    }

    let params = reelgen_veo::GenerationParams {
        aspect_ratio: request.aspect_ratio,
    };
    let operation = state
        .generation
        .start_job(&request.prompt, &request.model, &params)
        .await
        .map_err(|e| ApiError::SubmissionFailed {
            details: e.to_string(),
        })?;

    Ok(AxumJson(json!({
        "success": true,
        "prompt": request.prompt,
        "model": request.model,
        "operationName": operation.as_str(),
        "status": "generating",
        "timestamp": Utc::now(),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollOperationRequest {
    operation_name: String,
}

/// POST /api/poll-operation — one status query, stateless
async fn poll_operation(
    State(state): State<Arc<AppState>>,
    AxumJson(request): AxumJson<PollOperationRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.operation_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Operation name is required".into()));
    }

    let operation = OperationName::new(request.operation_name);
    let status = state
        .generation
        .job_status(&operation)
        .await
        .map_err(|e| ApiError::PollFailed {
            details: e.to_string(),
        })?;

    let video_url = if status.done && status.error.is_none() {
        status
            .response
            .as_ref()
            .and_then(extract_artifact_url)
            .map(|a| a.url)
    } else {
        None
    };

    Ok(AxumJson(json!({
        "success": true,
        "operationName": operation.as_str(),
        "done": status.done,
        "error": status.error,
        "videoUrl": video_url,
        "timestamp": Utc::now(),
    })))
}

#[derive(Deserialize)]
struct DownloadVideoQuery {
    uri: String,
}

/// GET /api/download-video — proxy the artifact with the API key attached
async fn download_video(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadVideoQuery>,
) -> ApiResult<impl IntoResponse> {
    let response = reqwest::Client::new()
        .get(&query.uri)
        .header("x-goog-api-key", &state.api_key)
        .send()
        .await
        .map_err(|e| ApiError::DownloadFailed {
            details: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(ApiError::DownloadFailed {
            details: format!("artifact store returned {}", response.status()),
        });
    }

    let stream = response.bytes_stream();
    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reelgen-video.mp4\"",
            ),
        ],
        Body::from_stream(stream),
    ))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Parse a client-supplied cost string ("0.10" or "$0.10") into an Amount.
fn parse_cost(cost: &str) -> ApiResult<Amount> {
    let trimmed = cost.trim().trim_start_matches('$');
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unparseable cost: {cost}")))?;
    if value <= 0.0 {
        return Err(ApiError::BadRequest(format!("Cost must be positive: {cost}")));
    }
    Ok(Amount::from_usdc(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cost_accepts_dollar_prefix() {
        assert_eq!(parse_cost("$0.10").expect("parses"), Amount::from_usdc(0.10));
        assert_eq!(parse_cost("0.10").expect("parses"), Amount::from_usdc(0.10));
    }

    #[test]
    fn parse_cost_rejects_garbage_and_non_positive() {
        assert!(parse_cost("ten cents").is_err());
        assert!(parse_cost("$0").is_err());
        assert!(parse_cost("-1").is_err());
    }
}

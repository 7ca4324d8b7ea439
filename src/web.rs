//! HTTP endpoints called by the CRM dashboard. Every JSON endpoint answers
//! with a JSON-RPC 2.0 shaped envelope `{jsonrpc, id: 0, result}`; errors use
//! the same envelope with an `error` member (see `BridgeError`).
use crate::client::ProspectorClient;
use crate::converter::{self, RawFilterEntry};
use crate::describe::DescriptionGenerator;
use crate::errors::BridgeError;
use crate::prospect::Prospect;
use crate::quality::QualityAssessor;
use crate::settings::Settings;
use crate::storage::{CrmStore, Credentials};
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn CrmStore>,
    pub prospector: ProspectorClient,
    pub describer: Arc<dyn DescriptionGenerator>,
    pub quality: Arc<dyn QualityAssessor>,
}

#[derive(Debug, Serialize)]
pub struct RpcEnvelope<T> {
    pub jsonrpc: &'static str,
    pub id: u32,
    pub result: T,
}

fn rpc<T: Serialize>(result: T) -> Json<RpcEnvelope<T>> {
    Json(RpcEnvelope {
        jsonrpc: "2.0",
        id: 0,
        result,
    })
}

#[derive(Debug, Deserialize)]
struct Params<T> {
    params: T,
}

/// Decode a JSON request body regardless of content type. An empty body
/// reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, BridgeError> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}")
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|e| BridgeError::BadRequest(format!("invalid request body: {e}")))
}

fn parse_filters(body: &Bytes) -> Result<Vec<converter::FilterEntry>, BridgeError> {
    let Params { params } = parse_body::<Params<Vec<RawFilterEntry>>>(body)?;
    converter::parse_entries(params)
}

async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/prospector_login", any(login))
        .route("/prospector_logout", any(logout))
        .route("/prospector_post_login", any(post_login))
        .route("/prospector_validate_token", any(validate_token))
        .route("/prospector_get_search_filters", any(search_filters))
        .route("/get_landing_page_information", any(landing_page_information))
        .route("/get_ai_search_information", any(ai_search_information))
        .route(
            "/prospector_preview_filter_results",
            post(preview_filter_results),
        )
        .route("/prospector_filter_results", post(filter_results))
        .route("/prospector_ai_prompt_filters", post(ai_prompt_filters))
        .route("/prospector_create_leads", post(create_leads))
        .route("/prospector_create_customers", post(create_customers))
        .route("/prospector_customer_exists", post(customer_exists))
        .route(
            "/prospector_get_all_organisation_numbers",
            post(all_organisation_numbers),
        )
        .route(
            "/prospector_get_all_lead_organisation_numbers",
            post(all_lead_organisation_numbers),
        )
        .route("/prospector_my_account", any(my_account))
        .route("/prospector_search_description", post(search_description))
        .route("/prospector_quality_filter", post(quality_filter))
        .route("/healthz", get(health))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub async fn serve(state: AppState) -> miette::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let app = router(state);

    tracing::info!(%addr, "Prospector bridge listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// ============================================================================
// Sign-on
// ============================================================================

async fn login(State(state): State<AppState>) -> Result<impl IntoResponse, BridgeError> {
    let redirect_url = format!("{}/prospector_post_login", state.settings.public_base_url());
    let result = state
        .prospector
        .begin_sign_on(
            &redirect_url,
            &state.settings.prospector.sign_on_db,
            &state.settings.prospector.sign_on_username,
        )
        .await?;
    Ok(rpc(result))
}

async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, BridgeError> {
    let removed = state.store.clear_credentials().await?;
    tracing::info!(removed, "Signed out of Prospector");
    Ok(rpc(json!({ "redirect": state.settings.server.dashboard_path })))
}

#[derive(Debug, Default, Deserialize)]
struct PostLoginParams {
    #[serde(rename = "ClientId")]
    client_id: Option<String>,
    #[serde(rename = "ClientSecret")]
    client_secret: Option<String>,
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Prospector calls back with the pair in the query string on any method,
/// or as a urlencoded form body. Query values win.
async fn post_login(
    State(state): State<AppState>,
    Query(query): Query<PostLoginParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, BridgeError> {
    let form = if is_form(&headers) {
        serde_urlencoded::from_bytes::<PostLoginParams>(&body)
            .map_err(|e| BridgeError::BadRequest(format!("invalid form body: {e}")))?
    } else {
        PostLoginParams::default()
    };
    let client_id = query.client_id.or(form.client_id);
    let client_secret = query.client_secret.or(form.client_secret);

    let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
        return Err(BridgeError::BadRequest(
            "ClientId and ClientSecret are required".to_string(),
        ));
    };

    state
        .store
        .save_credentials(&Credentials {
            client_id,
            client_secret,
        })
        .await?;
    tracing::info!("Stored Prospector credentials from sign-on callback");

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.settings.server.dashboard_path.clone())],
    )
        .into_response())
}

async fn validate_token(State(state): State<AppState>) -> Result<impl IntoResponse, BridgeError> {
    let client = state.prospector.connect().await?;
    let valid = client.validate_access_token().await?;
    if !valid {
        let removed = state.store.clear_credentials().await?;
        if removed > 0 {
            tracing::warn!("Prospector rejected the stored credentials; removed them");
        }
    }
    Ok(rpc(valid))
}

// ============================================================================
// Prospector passthrough
// ============================================================================

async fn search_filters(State(state): State<AppState>) -> Result<impl IntoResponse, BridgeError> {
    let client = state.prospector.connect().await?;
    Ok(rpc(client.get_search_filters().await?))
}

async fn landing_page_information(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BridgeError> {
    Ok(rpc(state.prospector.get_landing_page_info().await?))
}

async fn ai_search_information(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BridgeError> {
    Ok(rpc(state.prospector.get_ai_search_info().await?))
}

async fn my_account(State(state): State<AppState>) -> Result<impl IntoResponse, BridgeError> {
    let client = state.prospector.connect().await?;
    Ok(rpc(client.my_account_details().await?))
}

async fn preview_filter_results(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let filters = converter::to_param_list(&parse_filters(&body)?);
    let client = state.prospector.connect().await?;
    Ok(rpc(client.preview_filter_results(&filters).await?))
}

async fn filter_results(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let filters = converter::to_param_list(&parse_filters(&body)?);
    let client = state.prospector.connect().await?;
    let result = client.get_filter_results(&filters).await?;
    tracing::info!(
        filters = filters.len(),
        results = ?result.as_array().map(Vec::len),
        "Target results"
    );
    Ok(rpc(result))
}

#[derive(Debug, Deserialize)]
struct PromptParams {
    prompt: String,
}

async fn ai_prompt_filters(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let Params { params } = parse_body::<Params<PromptParams>>(&body)?;
    let client = state.prospector.connect().await?;
    Ok(rpc(client.get_ai_prompt_filters(&params.prompt).await?))
}

// ============================================================================
// CRM records
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProspectBatch {
    #[serde(default)]
    params: Vec<Prospect>,
}

async fn create_leads(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let batch = parse_body::<ProspectBatch>(&body)?;
    let client = state.prospector.connect().await?;
    let created = client
        .create_leads(&batch.params, state.settings.crm.company_id)
        .await?;
    Ok(rpc(created))
}

async fn create_customers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let batch = parse_body::<ProspectBatch>(&body)?;
    let created = state
        .prospector
        .create_customers(&batch.params, state.settings.crm.company_id)
        .await?;
    Ok(rpc(created))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VatParams {
    vat_number: String,
}

async fn customer_exists(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let Params { params } = parse_body::<Params<VatParams>>(&body)?;
    Ok(rpc(state.prospector.customer_exists(&params.vat_number).await?))
}

async fn all_organisation_numbers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BridgeError> {
    Ok(rpc(state.prospector.get_all_organisation_numbers().await?))
}

async fn all_lead_organisation_numbers(State(state): State<AppState>) -> impl IntoResponse {
    rpc(state
        .prospector
        .get_all_lead_organisation_numbers()
        .await
        .into_values())
}

// ============================================================================
// Collaborators
// ============================================================================

async fn search_description(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let prompt = converter::to_prompt(&parse_filters(&body)?);
    Ok(rpc(state.describer.generate(&prompt).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QualityParams {
    detailed_results: Vec<Value>,
    filters: Vec<RawFilterEntry>,
}

async fn quality_filter(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BridgeError> {
    let Params { params } = parse_body::<Params<QualityParams>>(&body)?;
    let filters = converter::parse_entries(params.filters)?;
    let quality_data = state.quality.assess(&params.detailed_results, &filters);
    tracing::info!(%quality_data, "Quality results");
    Ok(rpc(quality_data))
}

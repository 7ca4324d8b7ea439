use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Basic auth header for the `cid` / `secret` pair.
pub const VALID_AUTHORIZATION: &str = "Basic Y2lkOnNlY3JldA==";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("recorded body is JSON")
    }
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    prospect_count: usize,
}

/// In-process stand-in for the Prospector API that records every request.
pub struct MockProspector {
    base_url: String,
    state: MockState,
}

impl MockProspector {
    pub async fn start() -> Self {
        Self::with_prospects(3).await
    }

    /// `prospect_count` records are returned from the prospects endpoint.
    pub async fn with_prospects(prospect_count: usize) -> Self {
        let state = MockState {
            calls: Arc::default(),
            prospect_count,
        };
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock listener");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

pub fn prospect(i: usize) -> Value {
    json!({
        "name": format!("Prospect {} AB", i),
        "phone": format!("+46 40 {:03}", i),
        "vatNumber": format!("SE55600000{:02}01", i),
        "address": "Storgatan 1",
        "postCode": "211 34",
        "city": "Malmö",
        "organisationNumber": format!("556000-{:04}", i),
        "employees": 10 + i,
        "turnOver": "1000000",
        "legalEntity": "Aktiebolag",
        "description": "Konsultverksamhet"
    })
}

fn unauthorized_redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/login")]).into_response()
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = authorization.as_deref() == Some(VALID_AUTHORIZATION);

    state.calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    match (method, uri.path()) {
        (Method::POST, "/mox/odooauth/auth/beginsignon") => {
            Json(json!({ "signInUrl": "https://prospector.test/signin" })).into_response()
        }
        (Method::GET, "/api/information/landingpage") => {
            Json(json!({ "welcomeText": "Välkommen" })).into_response()
        }
        (Method::GET, "/api/information/aiSearch") => {
            Json(json!({ "examples": ["IT-bolag i Malmö"] })).into_response()
        }
        (Method::GET, "/login") => (StatusCode::OK, "login page").into_response(),
        (_, path) if path.starts_with("/api/insight/") && !authorized => unauthorized_redirect(),
        (Method::GET, "/api/insight/filters") => {
            Json(json!([{ "filterCategory": "city", "type": 0 }])).into_response()
        }
        (Method::POST, "/api/insight/filters") => Json(json!({ "count": 42 })).into_response(),
        (Method::POST, "/api/insight/prospects") => {
            let records: Vec<Value> = (0..state.prospect_count).map(prospect).collect();
            Json(Value::Array(records)).into_response()
        }
        (Method::GET, "/api/insight/AIFilters") => {
            Json(json!([{ "filterCategory": "city", "SelectOption": [1] }])).into_response()
        }
        (Method::GET, "/api/insight/validatelogin") => (StatusCode::OK, "").into_response(),
        (Method::GET, "/api/insight/account") => {
            Json(json!({ "company": "Acme AB", "credits": 100 })).into_response()
        }
        (Method::POST, "/api/insight/leads") => Json(json!({ "ok": true })).into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

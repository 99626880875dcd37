use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// One request received by the stub.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub authorization: Option<String>,
    pub body: Value,
}

/// How the stub answers.
#[derive(Clone, Default)]
pub struct StubBehavior {
    /// Completion text per prompt; unknown prompts get `" echo: <prompt> "`.
    pub completions: HashMap<String, String>,
    /// Prompt for which the completion endpoint answers 429.
    pub failing_prompt: Option<String>,
    /// Reply token for which the reply endpoint answers 400.
    pub expired_token: Option<String>,
    /// Completion endpoint answers 200 with `"choices": []`.
    pub empty_choices: bool,
    /// Reply endpoint answers 200 with an empty body.
    pub empty_reply_body: bool,
}

/// Stands in for both the OpenAI Completions API (`/v1/completions`) and the
/// LINE reply endpoint (`/v2/bot/message/reply`) on one ephemeral port.
pub struct UpstreamStub {
    base_url: String,
    completions: Arc<Mutex<Vec<RecordedCall>>>,
    replies: Arc<Mutex<Vec<RecordedCall>>>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

struct StubState {
    behavior: StubBehavior,
    completions: Arc<Mutex<Vec<RecordedCall>>>,
    replies: Arc<Mutex<Vec<RecordedCall>>>,
}

impl UpstreamStub {
    pub async fn start(behavior: StubBehavior) -> Self {
        let completions = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(StubState {
            behavior,
            completions: completions.clone(),
            replies: replies.clone(),
        });

        let router = Router::new()
            .route("/v1/completions", post(completion_handler))
            .route("/v2/bot/message/reply", post(reply_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind upstream stub");
        let addr = listener.local_addr().expect("upstream stub local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, router.into_make_service());
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Upstream stub server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        UpstreamStub {
            base_url: format!("http://{}", addr),
            completions,
            replies,
            shutdown: Mutex::new(Some(tx)),
        }
    }

    /// Value for `OPENAI_BASE_URL`.
    pub fn openai_base_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    /// Value for `LINE_API_BASE_URL`.
    pub fn line_base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn completion_calls(&self) -> Vec<RecordedCall> {
        self.completions.lock().expect("lock completions").clone()
    }

    pub fn reply_calls(&self) -> Vec<RecordedCall> {
        self.replies.lock().expect("lock replies").clone()
    }
}

impl Drop for UpstreamStub {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn completion_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Ok(mut guard) = state.completions.lock() {
        guard.push(RecordedCall {
            authorization: authorization(&headers),
            body: body.clone(),
        });
    }

    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    if state.behavior.failing_prompt.as_deref() == Some(prompt.as_str()) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "Rate limit reached", "type": "requests" } })),
        )
            .into_response();
    }
    if state.behavior.empty_choices {
        return Json(json!({ "id": "cmpl-stub", "object": "text_completion", "choices": [] }))
            .into_response();
    }

    let text = state
        .behavior
        .completions
        .get(&prompt)
        .cloned()
        .unwrap_or_else(|| format!(" echo: {prompt} "));
    (
        StatusCode::OK,
        Json(json!({
            "id": "cmpl-stub",
            "object": "text_completion",
            "model": body["model"],
            "choices": [{ "text": text, "index": 0, "finish_reason": "stop" }]
        })),
    )
        .into_response()
}

async fn reply_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Ok(mut guard) = state.replies.lock() {
        guard.push(RecordedCall {
            authorization: authorization(&headers),
            body: body.clone(),
        });
    }

    let token = body["replyToken"].as_str().unwrap_or_default().to_string();
    if state.behavior.expired_token.as_deref() == Some(token.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid reply token" })),
        )
            .into_response();
    }
    if state.behavior.empty_reply_body {
        return StatusCode::OK.into_response();
    }

    (
        StatusCode::OK,
        Json(json!({ "sentMessages": [{ "id": format!("sent-{token}"), "quoteToken": "q" }] })),
    )
        .into_response()
}

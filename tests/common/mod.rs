//! In-process mock of the Azure OpenAI image and video endpoints.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Binds an ephemeral port, serves `app` in the background and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answers one request with `status_line` and a body cut short of its
/// declared `Content-Length`, then closes the connection.
pub async fn serve_truncated(status_line: &'static str, partial_body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + body_len {
                    break;
                }
            }
        }

        let reply = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{partial_body}",
            partial_body.len() + 64
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });
    format!("http://{addr}")
}

pub fn b64(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// -- image edits --

#[derive(Debug, Clone)]
pub struct CapturedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ImageCalls {
    pub requests: usize,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub api_key: Option<String>,
    pub fields: Vec<CapturedField>,
}

#[derive(Clone)]
pub struct ImageMock {
    reply: Arc<(StatusCode, String)>,
    pub calls: Arc<Mutex<ImageCalls>>,
}

impl ImageMock {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            reply: Arc::new((status, body.into())),
            calls: Arc::new(Mutex::new(ImageCalls::default())),
        }
    }

    /// A 200 reply carrying `payload` as the first `b64_json` entry.
    pub fn returning(payload: &[u8]) -> Self {
        Self::new(
            StatusCode::OK,
            json!({ "created": 1, "data": [{ "b64_json": b64(payload) }] }).to_string(),
        )
    }

    pub async fn start(&self) -> String {
        let app = Router::new()
            .route(
                "/openai/deployments/:deployment/images/edits",
                post(image_edits),
            )
            .with_state(self.clone());
        serve(app).await
    }

    pub fn field_names(&self) -> Vec<String> {
        let calls = self.calls.lock().unwrap();
        calls.fields.iter().map(|f| f.name.clone()).collect()
    }
}

async fn image_edits(
    State(mock): State<ImageMock>,
    Path(deployment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(CapturedField {
            name,
            file_name,
            content_type,
            data,
        });
    }

    {
        let mut calls = mock.calls.lock().unwrap();
        calls.requests += 1;
        calls.deployment = Some(deployment);
        calls.api_version = query.get("api-version").cloned();
        calls.api_key = headers
            .get("api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        calls.fields = fields;
    }

    let (status, body) = mock.reply.as_ref();
    json_response(*status, body.clone())
}

// -- video jobs --

pub const JOB_ID: &str = "task_01";
pub const GENERATION_ID: &str = "gen_01";
pub const VIDEO_BYTES: &[u8] = b"MP4BYTES-0123456789";

#[derive(Debug, Default)]
pub struct VideoCalls {
    pub submitted_at: Option<Instant>,
    pub submissions: Vec<Value>,
    pub authorization: Option<String>,
    pub api_versions: Vec<String>,
    pub polls: Vec<Instant>,
    pub polled_ids: Vec<String>,
    pub downloads: Vec<String>,
}

#[derive(Clone)]
pub struct VideoMock {
    submit_reply: Arc<(StatusCode, String)>,
    poll_script: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    download_status: StatusCode,
    pub calls: Arc<Mutex<VideoCalls>>,
}

impl VideoMock {
    /// A mock whose polls answer with `statuses` in order. The final status
    /// carries one generation when it is `succeeded`.
    pub fn scripted(statuses: &[&str]) -> Self {
        let script = statuses
            .iter()
            .map(|status| {
                let body = if *status == "succeeded" {
                    json!({
                        "id": JOB_ID,
                        "status": status,
                        "generations": [{ "object": "video.generation", "id": GENERATION_ID }]
                    })
                } else {
                    json!({ "id": JOB_ID, "status": status, "generations": [] })
                };
                (StatusCode::OK, body)
            })
            .collect();
        Self::with_script(script)
    }

    pub fn with_script(script: VecDeque<(StatusCode, Value)>) -> Self {
        Self {
            submit_reply: Arc::new((
                StatusCode::CREATED,
                json!({ "object": "video.generation.job", "id": JOB_ID, "status": "queued" })
                    .to_string(),
            )),
            poll_script: Arc::new(Mutex::new(script)),
            download_status: StatusCode::OK,
            calls: Arc::new(Mutex::new(VideoCalls::default())),
        }
    }

    pub fn with_submit_reply(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.submit_reply = Arc::new((status, body.into()));
        self
    }

    pub fn with_download_status(mut self, status: StatusCode) -> Self {
        self.download_status = status;
        self
    }

    pub async fn start(&self) -> String {
        let app = Router::new()
            .route(
                "/openai/v1/video/generations/*rest",
                get(video_get).post(video_post),
            )
            .with_state(self.clone());
        serve(app).await
    }

    pub fn poll_count(&self) -> usize {
        self.calls.lock().unwrap().polls.len()
    }

    pub fn download_count(&self) -> usize {
        self.calls.lock().unwrap().downloads.len()
    }
}

async fn video_post(
    State(mock): State<VideoMock>,
    Path(rest): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if rest.trim_start_matches('/') != "jobs" {
        return StatusCode::NOT_FOUND.into_response();
    }

    {
        let mut calls = mock.calls.lock().unwrap();
        calls.submitted_at = Some(Instant::now());
        calls.submissions.push(body);
        calls.authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        calls
            .api_versions
            .extend(query.get("api-version").cloned());
    }

    let (status, body) = mock.submit_reply.as_ref();
    json_response(*status, body.clone())
}

async fn video_get(
    State(mock): State<VideoMock>,
    Path(rest): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let segments: Vec<String> = rest
        .trim_start_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    let mut calls = mock.calls.lock().unwrap();
    calls
        .api_versions
        .extend(query.get("api-version").cloned());

    match segments.as_slice() {
        ["jobs", id] => {
            calls.polls.push(Instant::now());
            calls.polled_ids.push(id.to_string());
            drop(calls);

            let next = mock.poll_script.lock().unwrap().pop_front();
            match next {
                Some((status, body)) => json_response(status, body.to_string()),
                None => json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "poll script exhausted" }).to_string(),
                ),
            }
        }
        [generation_id, "content", "video"] => {
            calls.downloads.push(generation_id.to_string());
            drop(calls);

            if mock.download_status.is_success() {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "video/mp4")],
                    VIDEO_BYTES.to_vec(),
                )
                    .into_response()
            } else {
                json_response(
                    mock.download_status,
                    json!({ "error": "content unavailable" }).to_string(),
                )
            }
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Request, Response};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::api_result::ApiResult;
use crate::dashboard;
use crate::store::RecordStore;

/// Largest accepted request body. Fits a base64 encoded curriculum file at
/// the file store's 10 MiB limit.
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

pub async fn handle_request<B>(
    req: Request<B>,
    store: Arc<RecordStore>,
) -> Result<Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    log::info!("{} {}", method, path);

    let body = match Limited::new(req.into_body(), MAX_BODY_SIZE).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            log::debug!("{} {} exceeded {} bytes", method, path, MAX_BODY_SIZE);
            return ApiResult::error(
                413,
                format!("Request body exceeds {} bytes", MAX_BODY_SIZE),
            )
            .into_hyper_response();
        }
        Err(e) => return Err(anyhow::anyhow!("Unable to read request body: {}", e)),
    };
    if !body.is_empty() {
        log::debug!("Request body: {}", String::from_utf8_lossy(&body));
    }

    let result = route(&method, &path, body, &store).await;
    if !result.is_success() {
        log::debug!("{} {} answered {}", method, path, result.status);
    }
    result.into_hyper_response()
}

/// Dispatches one request to the record store.
pub async fn route(method: &str, path: &str, body: Bytes, store: &RecordStore) -> ApiResult {
    let segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    match (method, segments.as_slice()) {
        ("GET", ["health"]) => ApiResult::ok(json!({ "status": "ok" })),

        ("GET", ["courses"]) => ApiResult::ok(store.courses()),
        ("POST", ["courses"]) => match parse(&body) {
            Ok(form) => created(store.create_course(form).await),
            Err(e) => e,
        },
        ("GET", ["courses", id]) => store.course(id).into(),
        ("PUT", ["courses", id]) => match parse(&body) {
            Ok(form) => store.update_course(id, form).await.into(),
            Err(e) => e,
        },
        ("DELETE", ["courses", id]) => store.delete_course(id).await.into(),

        ("GET", ["schedules"]) => store.schedules().into(),
        ("POST", ["schedules"]) => match parse(&body) {
            Ok(form) => created(store.create_schedule(form).await),
            Err(e) => e,
        },
        ("POST", ["schedules", "preview"]) => match parse(&body) {
            Ok(form) => store.preview(form).into(),
            Err(e) => e,
        },
        ("GET", ["schedules", id]) => store.schedule(id).into(),
        ("PUT", ["schedules", id]) => match parse(&body) {
            Ok(form) => store.update_schedule(id, form).await.into(),
            Err(e) => e,
        },
        ("DELETE", ["schedules", id]) => store.delete_schedule(id).await.into(),

        ("GET", ["trainers"]) => ApiResult::ok(store.trainers()),
        ("POST", ["trainers"]) => match parse(&body) {
            Ok(form) => created(store.create_trainer(form).await),
            Err(e) => e,
        },
        ("GET", ["trainers", id]) => store.trainer(id).into(),
        ("PUT", ["trainers", id]) => match parse(&body) {
            Ok(form) => store.update_trainer(id, form).await.into(),
            Err(e) => e,
        },
        ("DELETE", ["trainers", id]) => store.delete_trainer(id).await.into(),

        ("GET", ["students"]) => ApiResult::ok(store.students()),
        ("POST", ["students"]) => match parse(&body) {
            Ok(form) => created(store.create_student(form).await),
            Err(e) => e,
        },
        ("GET", ["students", id]) => store.student(id).into(),
        ("PUT", ["students", id]) => match parse(&body) {
            Ok(form) => store.update_student(id, form).await.into(),
            Err(e) => e,
        },
        ("DELETE", ["students", id]) => store.delete_student(id).await.into(),

        ("GET", ["holidays"]) => ApiResult::ok(store.holidays()),
        ("POST", ["holidays"]) => match parse(&body) {
            Ok(form) => created(store.create_holiday(form).await),
            Err(e) => e,
        },
        ("DELETE", ["holidays", date]) => store.delete_holiday(date).await.into(),

        ("POST", ["curriculum"]) => match parse(&body) {
            Ok(upload) => created(store.upload_curriculum(upload).await),
            Err(e) => e,
        },
        ("GET", ["curriculum", id]) => store.curriculum(id).await.into(),
        ("GET", ["curriculum", id, "content"]) => store.curriculum_content(id).await.into(),

        ("GET", ["dashboard", "admin"]) => dashboard::admin(store).into(),
        ("GET", ["dashboard", "trainer", id]) => dashboard::trainer(store, id).into(),
        ("GET", ["dashboard", "student", id]) => dashboard::student(store, id).into(),

        (_, segments) if is_known(segments) => {
            ApiResult::error(405, format!("Method {} not allowed on {}", method, path))
        }
        _ => not_found(path),
    }
}

fn created<T: serde::Serialize>(result: crate::store::StoreResult<T>) -> ApiResult {
    match result {
        Ok(data) => ApiResult::created(data),
        Err(e) => e.into(),
    }
}

fn parse<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiResult> {
    serde_json::from_slice(body)
        .map_err(|e| ApiResult::error(400, format!("Malformed request body: {}", e)))
}

fn is_known(segments: &[&str]) -> bool {
    matches!(
        segments,
        ["health"]
            | ["courses" | "schedules" | "trainers" | "students" | "holidays"]
            | ["courses" | "schedules" | "trainers" | "students" | "holidays", _]
            | ["curriculum"]
            | ["curriculum", _]
            | ["curriculum", _, "content"]
            | ["dashboard", "admin"]
            | ["dashboard", "trainer" | "student", _]
    )
}

lazy_static! {
    static ref AVAILABLE_ROUTES: serde_json::Value = json!({
        "health": "GET /health",
        "courses": "GET, POST /courses; GET, PUT, DELETE /courses/{id}",
        "schedules": "GET, POST /schedules; POST /schedules/preview; GET, PUT, DELETE /schedules/{id}",
        "trainers": "GET, POST /trainers; GET, PUT, DELETE /trainers/{id}",
        "students": "GET, POST /students; GET, PUT, DELETE /students/{id}",
        "holidays": "GET, POST /holidays; DELETE /holidays/{date}",
        "curriculum": "POST /curriculum; GET /curriculum/{id}; GET /curriculum/{id}/content",
        "dashboard": "GET /dashboard/admin; GET /dashboard/trainer/{id}; GET /dashboard/student/{id}",
    });
}

fn not_found(path: &str) -> ApiResult {
    ApiResult {
        status: 404,
        error: Some(format!("No route for {}", path)),
        data: Some(json!({ "available_routes": AVAILABLE_ROUTES.clone() })),
        ..Default::default()
    }
}

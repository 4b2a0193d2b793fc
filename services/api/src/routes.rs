use crate::infra::{AppState, BookingStack, Directory, Inbox};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use ceremony_booking::error::AppError;
use ceremony_booking::workflows::ceremony::appointments::ApplicantId;
use ceremony_booking::workflows::ceremony::{
    appointment_router, calendar_router, report_router, ApplicantProfile, NotificationSink,
    ProfileUpdate,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct ApplicantState {
    pub(crate) directory: Arc<Directory>,
    pub(crate) inbox: Arc<Inbox>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegistrationRequest {
    pub(crate) id: u64,
    pub(crate) phone_number: String,
    #[serde(default)]
    pub(crate) is_admin: bool,
}

pub(crate) fn with_booking_routes<N>(stack: &BookingStack<N>, inbox: Arc<Inbox>) -> Router
where
    N: NotificationSink + 'static,
{
    let applicants = ApplicantState {
        directory: stack.directory.clone(),
        inbox,
    };

    calendar_router(stack.calendar.clone())
        .merge(appointment_router(stack.lifecycle.clone()))
        .merge(report_router(stack.reports.clone()))
        .merge(applicant_router(applicants))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

/// Profile and inbox endpoints backed by the in-memory directory.
pub(crate) fn applicant_router(state: ApplicantState) -> Router {
    Router::new()
        .route("/api/v1/admin/applicants", post(register_endpoint))
        .route(
            "/api/v1/applicants/:applicant_id/profile",
            put(update_profile_endpoint),
        )
        .route(
            "/api/v1/applicants/:applicant_id/notifications",
            get(notifications_endpoint),
        )
        .route(
            "/api/v1/applicants/:applicant_id/notifications/read",
            post(mark_read_endpoint),
        )
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn register_endpoint(
    State(state): State<ApplicantState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Response, AppError> {
    let mut profile = ApplicantProfile::new(ApplicantId(request.id), request.phone_number.trim());
    profile.is_admin = request.is_admin;
    state.directory.register(profile.clone())?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

pub(crate) async fn update_profile_endpoint(
    State(state): State<ApplicantState>,
    Path(applicant_id): Path<u64>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Response, AppError> {
    let profile = state
        .directory
        .update_profile(ApplicantId(applicant_id), update)?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

pub(crate) async fn notifications_endpoint(
    State(state): State<ApplicantState>,
    Path(applicant_id): Path<u64>,
) -> Result<Response, AppError> {
    let entries = state.inbox.list(ApplicantId(applicant_id))?;
    Ok((StatusCode::OK, Json(entries)).into_response())
}

pub(crate) async fn mark_read_endpoint(
    State(state): State<ApplicantState>,
    Path(applicant_id): Path<u64>,
) -> Result<Response, AppError> {
    let marked = state.inbox.mark_all_read(ApplicantId(applicant_id))?;
    Ok((StatusCode::OK, Json(json!({ "marked": marked }))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use ceremony_booking::config::BookingConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app() -> Router {
        let directory = Arc::new(Directory::default());
        let inbox = Arc::new(Inbox::new(directory.clone()));
        let stack = BookingStack::assemble(&BookingConfig::default(), directory, inbox.clone());
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_booking_routes(&stack, inbox).layer(Extension(state))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn health_and_readiness_report_state() {
        let app = app();

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(health.status(), StatusCode::OK);

        let ready = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            read_json(ready).await.get("status").and_then(Value::as_str),
            Some("initializing")
        );
    }

    #[tokio::test]
    async fn registered_applicant_can_book_and_read_notifications() {
        let app = app();

        let registered = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/applicants",
                json!({ "id": 5, "phone_number": "+77015550005" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(registered.status(), StatusCode::CREATED);

        let profile = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/v1/applicants/5/profile",
                json!({ "first_name": "aigerim", "last_name": "ospanova", "gender": "FEMALE" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(profile.status(), StatusCode::OK);
        assert_eq!(
            read_json(profile).await.get("first_name").and_then(Value::as_str),
            Some("Aigerim")
        );

        let generated = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/time-slots/generate",
                json!({ "year": 2099, "month": 3 }),
            ))
            .await
            .expect("route executes");
        assert_eq!(generated.status(), StatusCode::CREATED);

        let slots = app
            .clone()
            .oneshot(
                Request::get("/api/v1/appointments/available-slots?year=2099&month=3")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let slots = read_json(slots).await;
        let slot_id = slots[0].get("id").and_then(Value::as_u64).expect("slot id");

        let booked = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/applicants/5/appointments",
                json!({
                    "slot_id": slot_id,
                    "spouse_first_name": "Timur",
                    "spouse_last_name": "Akhmetov",
                    "witnesses": [
                        { "first_name": "Erlan", "last_name": "Ospanov", "gender": "MALE" },
                        { "first_name": "Daniyar", "last_name": "Ospanov", "gender": "MALE" }
                    ]
                }),
            ))
            .await
            .expect("route executes");
        assert_eq!(booked.status(), StatusCode::CREATED);

        let inbox = app
            .clone()
            .oneshot(
                Request::get("/api/v1/applicants/5/notifications")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(inbox.status(), StatusCode::OK);
        let entries = read_json(inbox).await;
        assert_eq!(entries.as_array().map(Vec::len), Some(1));
        assert_eq!(entries[0].get("read").and_then(Value::as_bool), Some(false));

        let marked = app
            .oneshot(json_request(
                "POST",
                "/api/v1/applicants/5/notifications/read",
                json!({}),
            ))
            .await
            .expect("route executes");
        assert_eq!(
            read_json(marked).await.get("marked").and_then(Value::as_u64),
            Some(1)
        );
    }

    #[tokio::test]
    async fn registering_a_known_applicant_again_is_a_conflict() {
        let app = app();
        let register = || {
            json_request(
                "POST",
                "/api/v1/admin/applicants",
                json!({ "id": 9, "phone_number": "+77015550009" }),
            )
        };

        let first = app.clone().oneshot(register()).await.expect("route executes");
        assert_eq!(first.status(), StatusCode::CREATED);

        let again = app.oneshot(register()).await.expect("route executes");
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn profile_update_for_unknown_applicant_is_not_found() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/v1/applicants/77/profile",
                json!({ "first_name": "Aigerim", "last_name": "Ospanova", "gender": "FEMALE" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

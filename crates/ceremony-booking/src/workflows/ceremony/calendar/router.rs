use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::service::{CalendarError, SlotCalendarService};
use crate::error::error_response;
use crate::workflows::ceremony::repository::SlotStore;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

/// Slot generation for admins plus the public availability listing.
pub fn calendar_router<S>(service: Arc<SlotCalendarService<S>>) -> Router
where
    S: SlotStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/time-slots/generate",
            post(generate_handler::<S>),
        )
        .route(
            "/api/v1/appointments/available-slots",
            get(available_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn generate_handler<S>(
    State(service): State<Arc<SlotCalendarService<S>>>,
    Json(request): Json<MonthQuery>,
) -> Result<Response, CalendarError>
where
    S: SlotStore + 'static,
{
    let now = Local::now().naive_local();
    let summary = service.generate(request.year, request.month, now)?;
    let payload = json!({
        "message": summary.message(),
        "created": summary.created,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn available_handler<S>(
    State(service): State<Arc<SlotCalendarService<S>>>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, CalendarError>
where
    S: SlotStore + 'static,
{
    let slots = service.available_slots(query.year, query.month)?;
    Ok((StatusCode::OK, Json(slots)).into_response())
}

impl IntoResponse for CalendarError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantId, AppointmentId, AppointmentRequest, AppointmentStatus};
use super::service::{AppointmentLifecycleService, LifecycleError};
use super::views::AppointmentCreatedView;
use crate::error::error_response;
use crate::workflows::ceremony::directory::ApplicantDirectory;
use crate::workflows::ceremony::notifications::NotificationSink;
use crate::workflows::ceremony::repository::{AppointmentStore, ScheduledAppointment};

type SharedService<S, D, N> = Arc<AppointmentLifecycleService<S, D, N>>;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct RejectionRequest {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancellationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Applicant booking endpoints and the admin review queue.
pub fn appointment_router<S, D, N>(service: SharedService<S, D, N>) -> Router
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/applicants/:applicant_id/appointments",
            post(create_handler::<S, D, N>).get(applicant_list_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/appointments/:appointment_id/cancel",
            post(applicant_cancel_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments",
            get(status_list_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments/:appointment_id/approve",
            post(approve_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments/:appointment_id/reject",
            post(reject_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments/:appointment_id/complete",
            post(complete_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments/:appointment_id/cancel",
            post(admin_cancel_handler::<S, D, N>),
        )
        .route(
            "/api/v1/admin/appointments/:appointment_id/document",
            get(document_handler::<S, D, N>),
        )
        .with_state(service)
}

fn decision(scheduled: &ScheduledAppointment, message: &str) -> Response {
    let payload = json!({
        "id": scheduled.appointment.id,
        "status": scheduled.appointment.status,
        "message": message,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn create_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(applicant_id): Path<u64>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let booked = service.create(ApplicantId(applicant_id), request)?;
    let view = AppointmentCreatedView::from(&booked);
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub(crate) async fn applicant_list_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(applicant_id): Path<u64>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let appointments = service.appointments_for_applicant(ApplicantId(applicant_id))?;
    let views = service.present(appointments)?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

pub(crate) async fn applicant_cancel_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path((applicant_id, appointment_id)): Path<(u64, u64)>,
    Json(request): Json<CancellationRequest>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let cancelled = service.cancel_for_applicant(
        ApplicantId(applicant_id),
        AppointmentId(appointment_id),
        request.reason.as_deref(),
    )?;
    Ok(decision(
        &cancelled,
        "Your appointment has been successfully cancelled.",
    ))
}

pub(crate) async fn status_list_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let appointments = service.appointments_by_status(query.status)?;
    let views = service.present(appointments)?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

pub(crate) async fn approve_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(appointment_id): Path<u64>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let approved = service.approve(AppointmentId(appointment_id))?;
    Ok(decision(&approved, "Appointment approved."))
}

pub(crate) async fn reject_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(appointment_id): Path<u64>,
    Json(request): Json<RejectionRequest>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let rejected = service.reject(AppointmentId(appointment_id), &request.reason)?;
    Ok(decision(&rejected, "Appointment rejected."))
}

pub(crate) async fn complete_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(appointment_id): Path<u64>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let completed = service.complete(AppointmentId(appointment_id))?;
    Ok(decision(&completed, "Appointment marked as completed."))
}

pub(crate) async fn admin_cancel_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(appointment_id): Path<u64>,
    Json(request): Json<CancellationRequest>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let cancelled = service.cancel(AppointmentId(appointment_id), request.reason.as_deref())?;
    Ok(decision(&cancelled, "Appointment cancelled."))
}

pub(crate) async fn document_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    Path(appointment_id): Path<u64>,
) -> Result<Response, LifecycleError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    let id = AppointmentId(appointment_id);
    let document_path = service.document_path(id)?;
    let payload = json!({
        "appointment_id": id,
        "document_path": document_path,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

//! Admin appointment report over a date range, rendered as CSV.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;

use super::appointments::DISPLAY_FORMAT;
use super::directory::{ApplicantDirectory, DirectoryError};
use super::repository::{AppointmentStore, RepositoryError, ScheduledAppointment};
use crate::error::{error_response, ErrorKind};

const COLUMNS: [&str; 11] = [
    "ID",
    "Applicant Phone",
    "Ceremony Time",
    "Groom",
    "Bride",
    "Status",
    "Witness 1",
    "Witness 2",
    "Witness 3",
    "Notes",
    "Rejection Reason",
];

/// One report row with the applicant's phone resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub scheduled: ScheduledAppointment,
    pub applicant_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl AppointmentReport {
    pub const CONTENT_TYPE: &'static str = "text/csv";

    pub fn file_name(&self) -> String {
        format!("appointments-report_{}_to_{}.csv", self.start, self.end)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUMNS)?;

        for row in &self.rows {
            let appointment = &row.scheduled.appointment;
            let witness = |index: usize| {
                appointment
                    .witnesses
                    .get(index)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            };
            writer.write_record([
                appointment.id.to_string(),
                row.applicant_phone.clone().unwrap_or_default(),
                row.scheduled
                    .slot
                    .start_time
                    .format(DISPLAY_FORMAT)
                    .to_string(),
                appointment.groom.to_string(),
                appointment.bride.to_string(),
                appointment.status.to_string(),
                witness(0),
                witness(1),
                witness(2),
                appointment.notes.clone().unwrap_or_default(),
                appointment.rejection_reason.clone().unwrap_or_default(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|err| ReportError::Io(err.into_error()))
    }
}

/// Resolves report ranges and gathers every appointment whose slot falls inside them.
pub struct AppointmentReportService<S, D> {
    store: Arc<S>,
    directory: Arc<D>,
    epoch: NaiveDate,
}

impl<S, D> AppointmentReportService<S, D>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, epoch: NaiveDate) -> Self {
        Self {
            store,
            directory,
            epoch,
        }
    }

    /// Missing bounds default to the configured epoch and `today`; both ends are inclusive.
    pub fn appointments_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<AppointmentReport, ReportError> {
        let start = start.unwrap_or(self.epoch);
        let end = end.unwrap_or(today);
        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }

        let rows = self
            .store
            .with_slot_between(start, end)?
            .into_iter()
            .map(|scheduled| -> Result<ReportRow, ReportError> {
                let applicant_phone = self
                    .directory
                    .lookup(scheduled.appointment.applicant_id)?
                    .map(|profile| profile.phone_number);
                Ok(ReportRow {
                    scheduled,
                    applicant_phone,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(%start, %end, rows = rows.len(), "appointment report generated");
        Ok(AppointmentReport { start, end, rows })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("failed to render report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush report: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::InvalidRange { .. } => ErrorKind::InvalidInput,
            ReportError::Repository(err) => err.kind(),
            ReportError::Directory(err) => err.kind(),
            ReportError::Csv(_) | ReportError::Io(_) => ErrorKind::Unavailable,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

pub fn report_router<S, D>(service: Arc<AppointmentReportService<S, D>>) -> Router
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/reports/appointments",
            get(report_handler::<S, D>),
        )
        .with_state(service)
}

pub(crate) async fn report_handler<S, D>(
    State(service): State<Arc<AppointmentReportService<S, D>>>,
    Query(range): Query<RangeQuery>,
) -> Result<Response, ReportError>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
{
    let today = Local::now().date_naive();
    let report = service.appointments_in_range(range.start, range.end, today)?;
    let body = report.to_csv()?;
    let disposition = format!("attachment; filename=\"{}\"", report.file_name());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, AppointmentReport::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

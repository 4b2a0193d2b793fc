use ceremony_booking::config::BookingConfig;
use ceremony_booking::workflows::ceremony::{
    AppointmentLifecycleService, AppointmentReportService, InMemoryApplicantDirectory,
    InMemoryBookingStore, NotificationInbox, NotificationSink, ReminderSweep, SlotCalendarService,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Store = InMemoryBookingStore;
pub(crate) type Directory = InMemoryApplicantDirectory;
pub(crate) type Inbox = NotificationInbox<Directory>;

/// The booking services wired over one shared store and applicant directory.
pub(crate) struct BookingStack<N> {
    pub(crate) directory: Arc<Directory>,
    pub(crate) calendar: Arc<SlotCalendarService<Store>>,
    pub(crate) lifecycle: Arc<AppointmentLifecycleService<Store, Directory, N>>,
    pub(crate) reports: Arc<AppointmentReportService<Store, Directory>>,
    pub(crate) reminders: Arc<ReminderSweep<Store, N>>,
}

impl<N> BookingStack<N>
where
    N: NotificationSink + 'static,
{
    pub(crate) fn assemble(
        config: &BookingConfig,
        directory: Arc<Directory>,
        notifications: Arc<N>,
    ) -> Self {
        let store = Arc::new(Store::default());
        Self {
            calendar: Arc::new(SlotCalendarService::new(store.clone())),
            lifecycle: Arc::new(AppointmentLifecycleService::new(
                store.clone(),
                directory.clone(),
                notifications.clone(),
            )),
            reports: Arc::new(AppointmentReportService::new(
                store.clone(),
                directory.clone(),
                config.report_epoch,
            )),
            reminders: Arc::new(ReminderSweep::new(
                store,
                notifications,
                config.facility_address.clone(),
            )),
            directory,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

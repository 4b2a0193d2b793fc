//! Ceremony booking: the slot calendar, the appointment lifecycle, and the collaborator
//! seams (applicant directory, notifications, reports) those two engines lean on.

pub mod appointments;
pub mod calendar;
pub mod directory;
pub mod memory;
pub mod notifications;
pub mod report;
pub mod repository;

pub use appointments::{
    appointment_router, AppointmentLifecycleService, LifecycleError, ReminderSweep,
};
pub use calendar::{calendar_router, CalendarError, SlotCalendarService};
pub use directory::{
    ApplicantDirectory, ApplicantProfile, DirectoryError, InMemoryApplicantDirectory,
    ProfileUpdate,
};
pub use memory::InMemoryBookingStore;
pub use notifications::{Notification, NotificationInbox, NotificationQueue, NotificationSink};
pub use report::{report_router, AppointmentReport, AppointmentReportService, ReportError};
pub use repository::{
    AppointmentStore, RepositoryError, ScheduledAppointment, SlotStore, StatusUpdate,
};

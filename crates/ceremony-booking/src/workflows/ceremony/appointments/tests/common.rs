use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::ceremony::appointments::domain::{
    ApplicantId, AppointmentRequest, Gender, WitnessInfo,
};
use crate::workflows::ceremony::appointments::AppointmentLifecycleService;
use crate::workflows::ceremony::calendar::{SlotCalendarService, SlotId, TimeSlot, YearMonth};
use crate::workflows::ceremony::directory::{ApplicantProfile, InMemoryApplicantDirectory};
use crate::workflows::ceremony::memory::InMemoryBookingStore;
use crate::workflows::ceremony::notifications::NotificationInbox;
use crate::workflows::ceremony::repository::SlotStore;

pub(super) type Inbox = NotificationInbox<InMemoryApplicantDirectory>;
pub(super) type Service =
    AppointmentLifecycleService<InMemoryBookingStore, InMemoryApplicantDirectory, Inbox>;

pub(super) const GROOM: ApplicantId = ApplicantId(1);
pub(super) const BRIDE: ApplicantId = ApplicantId(2);
pub(super) const INCOMPLETE: ApplicantId = ApplicantId(3);
pub(super) const ADMIN: ApplicantId = ApplicantId(99);

pub(super) struct Harness {
    pub(super) store: Arc<InMemoryBookingStore>,
    pub(super) directory: Arc<InMemoryApplicantDirectory>,
    pub(super) inbox: Arc<Inbox>,
    pub(super) service: Arc<Service>,
    pub(super) slots: Vec<TimeSlot>,
}

pub(super) fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

pub(super) fn complete_profile(
    id: ApplicantId,
    first_name: &str,
    last_name: &str,
    gender: Gender,
) -> ApplicantProfile {
    let mut profile = ApplicantProfile::new(id, format!("+7701000{:04}", id.0));
    profile.first_name = Some(first_name.to_string());
    profile.last_name = Some(last_name.to_string());
    profile.gender = Some(gender);
    profile
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryBookingStore::default());
    let directory = Arc::new(InMemoryApplicantDirectory::default());

    directory
        .register(complete_profile(GROOM, "Arman", "Bekov", Gender::Male))
        .expect("register groom");
    directory
        .register(complete_profile(BRIDE, "Dana", "Serikova", Gender::Female))
        .expect("register bride");
    directory
        .register(ApplicantProfile::new(INCOMPLETE, "+77010000003"))
        .expect("register incomplete");
    let mut admin = ApplicantProfile::new(ADMIN, "+77010000099");
    admin.is_admin = true;
    directory.register(admin).expect("register admin");

    let generated_at = NaiveDate::from_ymd_opt(2025, 8, 28)
        .and_then(|date| date.and_hms_opt(10, 0, 0))
        .expect("valid timestamp");
    SlotCalendarService::new(store.clone())
        .generate(2025, 9, generated_at)
        .expect("september generated");
    let slots = store
        .available_slots(YearMonth::new(2025, 9).expect("valid month"))
        .expect("slots listed");

    let inbox = Arc::new(NotificationInbox::new(directory.clone()));
    let service = Arc::new(AppointmentLifecycleService::new(
        store.clone(),
        directory.clone(),
        inbox.clone(),
    ));

    Harness {
        store,
        directory,
        inbox,
        service,
        slots,
    }
}

impl Harness {
    pub(super) fn slot_at(&self, start: NaiveDateTime) -> SlotId {
        self.slots
            .iter()
            .find(|slot| slot.start_time == start)
            .map(|slot| slot.id)
            .expect("slot generated for start time")
    }

    pub(super) fn slot_is_available(&self, id: SlotId) -> bool {
        self.store
            .fetch_slot(id)
            .expect("store reachable")
            .expect("slot exists")
            .available
    }
}

pub(super) fn witness(first_name: &str, last_name: &str, gender: Gender) -> WitnessInfo {
    WitnessInfo {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        gender,
    }
}

pub(super) fn two_male_witnesses() -> Vec<WitnessInfo> {
    vec![
        witness("erlan", "ospanov", Gender::Male),
        witness("TIMUR", "akhmetov", Gender::Male),
    ]
}

pub(super) fn request(slot_id: SlotId) -> AppointmentRequest {
    AppointmentRequest {
        slot_id,
        spouse_first_name: "ann".to_string(),
        spouse_last_name: " smith".to_string(),
        witnesses: two_male_witnesses(),
        notes: Some("Family only".to_string()),
        document_path: Some("documents/applicant-1/marriage-application.pdf".to_string()),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

//! End-to-end appointment scenarios: booking, review, reminders, notifications
//! delivered through the background queue, and the CSV report.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ceremony_booking::workflows::ceremony::appointments::{
    AppointmentRequest, AppointmentStatus, Gender, LifecycleError, WitnessInfo,
};
use ceremony_booking::workflows::ceremony::appointments::domain::ApplicantId;
use ceremony_booking::workflows::ceremony::{
    report_router, AppointmentLifecycleService, AppointmentReportService,
    InMemoryApplicantDirectory, InMemoryBookingStore, NotificationInbox, NotificationQueue,
    ProfileUpdate, ReminderSweep, ReportError, SlotCalendarService, SlotStore,
};
use ceremony_booking::workflows::ceremony::calendar::{SlotId, YearMonth};
use ceremony_booking::workflows::ceremony::directory::ApplicantProfile;
use chrono::{NaiveDate, NaiveDateTime};
use tower::ServiceExt;

const APPLICANT: ApplicantId = ApplicantId(7);
const ADMIN: ApplicantId = ApplicantId(1);
const FACILITY: &str = "Mangilik el STREET, 65";

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

fn directory() -> Arc<InMemoryApplicantDirectory> {
    let directory = InMemoryApplicantDirectory::default();
    let mut admin = ApplicantProfile::new(ADMIN, "+77000000001");
    admin.is_admin = true;
    directory.register(admin).expect("admin registered");
    directory
        .register(ApplicantProfile::new(APPLICANT, "+77000000007"))
        .expect("applicant registered");
    Arc::new(directory)
}

fn seeded_store() -> Arc<InMemoryBookingStore> {
    let store = Arc::new(InMemoryBookingStore::default());
    SlotCalendarService::new(store.clone())
        .generate(2025, 9, at(1, 0, 0))
        .expect("september generated");
    store
}

fn slot_at(store: &InMemoryBookingStore, start: NaiveDateTime) -> SlotId {
    store
        .available_slots(YearMonth::new(2025, 9).expect("valid month"))
        .expect("slots listed")
        .into_iter()
        .find(|slot| slot.start_time == start)
        .map(|slot| slot.id)
        .expect("slot exists")
}

fn booking(slot_id: SlotId) -> AppointmentRequest {
    AppointmentRequest {
        slot_id,
        spouse_first_name: "ann".to_string(),
        spouse_last_name: "smith".to_string(),
        witnesses: vec![
            WitnessInfo {
                first_name: "Erlan".to_string(),
                last_name: "Ospanov".to_string(),
                gender: Gender::Male,
            },
            WitnessInfo {
                first_name: "Aliya".to_string(),
                last_name: "Nurova".to_string(),
                gender: Gender::Female,
            },
            WitnessInfo {
                first_name: "Asel".to_string(),
                last_name: "Nurova".to_string(),
                gender: Gender::Female,
            },
        ],
        notes: None,
        document_path: Some("documents/7/application.pdf".to_string()),
    }
}

#[tokio::test]
async fn booking_review_and_reminder_flow_delivers_notifications_through_the_queue() {
    let store = seeded_store();
    let directory = directory();
    let inbox = Arc::new(NotificationInbox::new(directory.clone()));
    let (queue, worker) = NotificationQueue::spawn(inbox.clone());
    let queue = Arc::new(queue);
    let service = AppointmentLifecycleService::new(store.clone(), directory.clone(), queue.clone());
    let slot = slot_at(&store, at(2, 10, 0));

    match service.create(APPLICANT, booking(slot)) {
        Err(LifecycleError::IncompleteProfile) => {}
        other => panic!("expected incomplete profile, got {other:?}"),
    }
    directory
        .update_profile(
            APPLICANT,
            ProfileUpdate {
                first_name: "arman".to_string(),
                last_name: "BEKOV".to_string(),
                gender: Gender::Male,
            },
        )
        .expect("profile completed");

    let booked = service.create(APPLICANT, booking(slot)).expect("booking succeeds");
    assert_eq!(booked.appointment.groom.first_name, "Arman");
    assert_eq!(booked.appointment.bride.first_name, "Ann");
    assert!(!store.fetch_slot(slot).unwrap().expect("slot").available);

    let approved = service.approve(booked.appointment.id).expect("approved");
    assert_eq!(approved.appointment.status, AppointmentStatus::Approved);

    let reminders = ReminderSweep::new(store.clone(), queue.clone(), FACILITY);
    assert_eq!(reminders.run(at(2, 0, 0)).expect("sweep"), 1);
    assert_eq!(reminders.run(at(2, 0, 30)).expect("sweep"), 0);

    drop(reminders);
    drop(service);
    drop(queue);
    worker.await.expect("queue drained");

    let messages: Vec<String> = inbox
        .list(APPLICANT)
        .expect("inbox readable")
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("Reminder: Your engagement will take place on 02.09.2025 10:00"));
    assert!(messages[1].contains("approved"));
    assert!(messages[2].contains("pending review"));

    assert_eq!(inbox.list(ADMIN).expect("inbox readable").len(), 1);
}

#[tokio::test]
async fn report_covers_appointments_in_range_and_renders_csv() {
    let store = seeded_store();
    let directory = directory();
    directory
        .update_profile(
            APPLICANT,
            ProfileUpdate {
                first_name: "Dana".to_string(),
                last_name: "Serikova".to_string(),
                gender: Gender::Female,
            },
        )
        .expect("profile completed");
    let inbox = Arc::new(NotificationInbox::new(directory.clone()));
    let service = AppointmentLifecycleService::new(store.clone(), directory.clone(), inbox);

    let first = service
        .create(APPLICANT, booking(slot_at(&store, at(10, 9, 0))))
        .expect("booked");
    service.reject(first.appointment.id, "Wrong documents").expect("rejected");
    service
        .create(APPLICANT, booking(slot_at(&store, at(20, 11, 0))))
        .expect("booked again");

    let reports = Arc::new(AppointmentReportService::new(
        store.clone(),
        directory.clone(),
        date(9, 1),
    ));

    let everything = reports
        .appointments_in_range(None, None, date(9, 30))
        .expect("default range");
    assert_eq!((everything.start, everything.end), (date(9, 1), date(9, 30)));
    assert_eq!(everything.rows.len(), 2);
    assert!(everything.rows[0].scheduled.slot.start_time < everything.rows[1].scheduled.slot.start_time);

    let narrow = reports
        .appointments_in_range(Some(date(9, 15)), Some(date(9, 20)), date(9, 30))
        .expect("narrow range");
    assert_eq!(narrow.rows.len(), 1);

    match reports.appointments_in_range(Some(date(9, 20)), Some(date(9, 10)), date(9, 30)) {
        Err(ReportError::InvalidRange { start, end }) => {
            assert_eq!((start, end), (date(9, 20), date(9, 10)));
        }
        other => panic!("expected invalid range, got {other:?}"),
    }

    let response = report_router(reports)
        .oneshot(
            Request::get("/api/v1/admin/reports/appointments?start=2025-09-01&end=2025-09-30")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/csv")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"appointments-report_2025-09-01_to_2025-09-30.csv\"")
    );
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(body.to_vec()).expect("utf8 csv");
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("Wrong documents"));
    assert!(text.contains("+77000000007"));
}

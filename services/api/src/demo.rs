use crate::infra::{BookingStack, Directory, Inbox, Store};
use ceremony_booking::config::BookingConfig;
use ceremony_booking::error::AppError;
use ceremony_booking::workflows::ceremony::appointments::{
    ApplicantId, AppointmentRequest, Gender, LifecycleError, WitnessInfo, DISPLAY_FORMAT,
};
use ceremony_booking::workflows::ceremony::calendar::{SlotId, YearMonth};
use ceremony_booking::workflows::ceremony::{
    ApplicantProfile, ProfileUpdate, ScheduledAppointment, SlotCalendarService,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

const DEMO_ADMIN: ApplicantId = ApplicantId(1);
const DEMO_APPLICANT: ApplicantId = ApplicantId(2);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the walk-through (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the generated CSV report after the summary.
    #[arg(long)]
    pub(crate) print_csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SlotGenerateArgs {
    /// Calendar year to generate
    #[arg(long)]
    pub(crate) year: i32,
    /// Month number (1-12)
    #[arg(long)]
    pub(crate) month: u32,
}

pub(crate) fn run_slot_generation(args: SlotGenerateArgs) -> Result<(), AppError> {
    let SlotGenerateArgs { year, month } = args;

    let calendar = SlotCalendarService::new(Arc::new(Store::default()));
    let summary = calendar.generate(year, month, Local::now().naive_local())?;
    println!("{}", summary.message());

    let slots = calendar.available_slots(year, month)?;
    if let (Some(first), Some(last)) = (slots.first(), slots.last()) {
        println!(
            "- first slot {} | last slot {}",
            first.start_time.format(DISPLAY_FORMAT),
            last.start_time.format(DISPLAY_FORMAT)
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, print_csv } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_hms_opt(8, 0, 0).unwrap_or_default();
    let target = following_month(today);

    println!("Ceremony booking demo ({today})");

    let directory = Arc::new(Directory::default());
    seed_directory(&directory)?;
    let inbox = Arc::new(Inbox::new(directory.clone()));
    let stack = BookingStack::assemble(&BookingConfig::default(), directory, inbox.clone());

    let summary = stack
        .calendar
        .generate(target.year(), target.month(), now)?;
    println!("\n{}", summary.message());

    let slots = stack.calendar.available_slots(target.year(), target.month())?;
    let Some(slot) = slots.first() else {
        println!("No bookable slots in {target}; nothing to demonstrate.");
        return Ok(());
    };

    let booked = stack
        .lifecycle
        .create(DEMO_APPLICANT, demo_request(slot.id))?;
    render_step("Requested", &booked);

    let approved = stack.lifecycle.approve(booked.appointment.id)?;
    render_step("Approved", &approved);

    let reminder_time = slot.start_time - Duration::hours(2);
    let reminders = stack
        .reminders
        .run(reminder_time)
        .map_err(LifecycleError::from)?;
    println!(
        "- reminder sweep at {} sent {reminders} reminder(s)",
        reminder_time.format(DISPLAY_FORMAT)
    );

    let completed = stack.lifecycle.complete(booked.appointment.id)?;
    render_step("Completed", &completed);

    println!("\nApplicant inbox (newest first)");
    for entry in inbox.list(DEMO_APPLICANT)? {
        println!("  - {}", entry.message);
    }
    println!("Admin inbox (newest first)");
    for entry in inbox.list(DEMO_ADMIN)? {
        println!("  - {}", entry.message);
    }

    let day = slot.start_time.date();
    let report = stack
        .reports
        .appointments_in_range(Some(target.first_day()), Some(day), today.max(day))?;
    println!(
        "\nReport {} covers {} appointment(s)",
        report.file_name(),
        report.rows.len()
    );
    if print_csv {
        let csv = report.to_csv()?;
        println!("{}", String::from_utf8_lossy(&csv));
    }

    Ok(())
}

fn seed_directory(directory: &Directory) -> Result<(), AppError> {
    let mut admin = ApplicantProfile::new(DEMO_ADMIN, "+77000000001");
    admin.is_admin = true;
    directory.register(admin)?;
    directory.register(ApplicantProfile::new(DEMO_APPLICANT, "+77000000002"))?;
    directory.update_profile(
        DEMO_APPLICANT,
        ProfileUpdate {
            first_name: "arman".to_string(),
            last_name: "bekov".to_string(),
            gender: Gender::Male,
        },
    )?;
    Ok(())
}

fn demo_request(slot_id: SlotId) -> AppointmentRequest {
    let witness = |first_name: &str, last_name: &str, gender: Gender| WitnessInfo {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        gender,
    };
    AppointmentRequest {
        slot_id,
        spouse_first_name: "dana".to_string(),
        spouse_last_name: "serikova".to_string(),
        witnesses: vec![
            witness("Erlan", "Ospanov", Gender::Male),
            witness("Daniyar", "Ospanov", Gender::Male),
        ],
        notes: Some("Family only".to_string()),
        document_path: Some(format!("documents/{DEMO_APPLICANT}/application.pdf")),
    }
}

fn following_month(today: NaiveDate) -> YearMonth {
    let current = YearMonth::containing(today);
    let (year, month) = if current.month() == 12 {
        (current.year() + 1, 1)
    } else {
        (current.year(), current.month() + 1)
    };
    YearMonth::new(year, month).unwrap_or(current)
}

fn render_step(label: &str, scheduled: &ScheduledAppointment) {
    let appointment = &scheduled.appointment;
    println!(
        "- {label}: appointment #{} | {} & {} | {} | status {}",
        appointment.id,
        appointment.groom,
        appointment.bride,
        scheduled.slot.start_time.format(DISPLAY_FORMAT),
        appointment.status
    );
}

use super::common::*;
use crate::workflows::ceremony::appointments::domain::{ApplicantId, AppointmentStatus, Gender};
use crate::workflows::ceremony::appointments::LifecycleError;
use crate::workflows::ceremony::calendar::SlotId;

const CONTENDERS: u64 = 8;

#[test]
fn concurrent_bookings_of_one_slot_have_a_single_winner() {
    let h = harness();
    for n in 0..CONTENDERS {
        let id = ApplicantId(100 + n);
        h.directory
            .register(complete_profile(id, "Nurlan", "Sadykov", Gender::Male))
            .expect("register contender");
    }
    let slot = h.slot_at(at(19, 9, 0));

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|n| {
                let service = &h.service;
                scope.spawn(move || service.create(ApplicantId(100 + n), request(slot)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("booking thread finished"))
            .collect()
    });

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| matches!(err, LifecycleError::SlotUnavailable(id) if *id == slot)));
    assert!(!h.slot_is_available(slot));
}

#[test]
fn one_applicant_racing_for_several_slots_holds_a_single_booking() {
    let h = harness();
    let day = at(22, 0, 0).date();
    let slots: Vec<SlotId> = h
        .slots
        .iter()
        .filter(|slot| slot.start_time.date() == day)
        .take(CONTENDERS as usize)
        .map(|slot| slot.id)
        .collect();
    assert_eq!(slots.len(), CONTENDERS as usize);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = slots
            .iter()
            .map(|&slot| {
                let service = &h.service;
                scope.spawn(move || service.create(GROOM, request(slot)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("booking thread finished"))
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| matches!(err, LifecycleError::ExistingActiveAppointment)));

    let reserved = slots
        .iter()
        .filter(|&&slot| !h.slot_is_available(slot))
        .count();
    assert_eq!(reserved, 1);
    assert_eq!(h.service.appointments_for_applicant(GROOM).unwrap().len(), 1);
}

#[test]
fn concurrent_decisions_on_one_appointment_apply_once() {
    let h = harness();
    let id = h
        .service
        .create(GROOM, request(h.slot_at(at(19, 9, 30))))
        .unwrap()
        .appointment
        .id;

    let results: Vec<_> = std::thread::scope(|scope| {
        let approve = scope.spawn(|| h.service.approve(id));
        let reject = scope.spawn(|| h.service.reject(id, "Duplicate request"));
        vec![
            approve.join().expect("approve thread finished"),
            reject.join().expect("reject thread finished"),
        ]
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    let loser = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one decision loses");
    assert!(matches!(loser, LifecycleError::IllegalTransition(_)));

    let final_status = h
        .service
        .appointments_for_applicant(GROOM)
        .unwrap()
        .remove(0)
        .appointment
        .status;
    assert!(matches!(
        final_status,
        AppointmentStatus::Approved | AppointmentStatus::Rejected
    ));
}

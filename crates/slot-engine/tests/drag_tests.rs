//! Tests for drop evaluation and the drag session state machine.

use chrono::NaiveDateTime;
use slot_engine::drag::HoverTarget;
use slot_engine::{
    evaluate_drop, evaluate_drop_with, Appointment, AppointmentStatus, DragSession, DropOutcome,
    EngineConfig, MoveCommand, MoveNextPolicy, Provider, RejectReason, ResolutionStrategy,
    SlotError,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn dt(time: &str) -> NaiveDateTime {
    format!("2026-02-20T{time}:00").parse().unwrap()
}

fn appt(id: &str, patient: &str, provider: &str, start: &str, end: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_name: patient.to_string(),
        provider_id: provider.to_string(),
        visit_type: "checkup".to_string(),
        start: dt(start),
        end: dt(end),
        status: AppointmentStatus::Scheduled,
    }
}

fn providers() -> Vec<Provider> {
    vec![
        Provider {
            id: "dr-smith".to_string(),
            display_name: "Dr. Smith".to_string(),
            credentials: "MD".to_string(),
            kind: "clinician".to_string(),
        },
        Provider {
            id: "dr-jones".to_string(),
            display_name: "Dr. Jones".to_string(),
            credentials: "DO".to_string(),
            kind: "clinician".to_string(),
        },
    ]
}

/// dr-smith: a1 09:00-09:30, a2 10:00-11:00. dr-jones: a3 09:00-10:00.
fn appointments() -> Vec<Appointment> {
    vec![
        appt("a1", "Alice", "dr-smith", "09:00", "09:30"),
        appt("a2", "Bob", "dr-smith", "10:00", "11:00"),
        appt("a3", "Carol", "dr-jones", "09:00", "10:00"),
    ]
}

fn find(appointments: &[Appointment], id: &str) -> Appointment {
    appointments.iter().find(|a| a.id == id).cloned().unwrap()
}

fn expect_move(outcome: DropOutcome) -> MoveCommand {
    match outcome {
        DropOutcome::Move { command } => command,
        other => panic!("expected a move, got {other:?}"),
    }
}

// ── evaluate_drop: accepted moves ───────────────────────────────────────────

#[test]
fn drop_inside_free_zone_yields_one_command() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let command = expect_move(evaluate_drop(&appointments, &providers(), &a1, "dr-smith", 722));

    assert_eq!(
        command,
        MoveCommand {
            appointment_id: "a1".to_string(),
            new_provider_id: "dr-smith".to_string(),
            new_start: dt("12:00"),
            new_end: dt("12:30"),
        }
    );
}

#[test]
fn drop_on_another_provider_keeps_duration() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let command = expect_move(evaluate_drop(&appointments, &providers(), &a1, "dr-jones", 630));

    assert_eq!(command.new_provider_id, "dr-jones");
    assert_eq!(command.new_start, dt("10:30"));
    assert_eq!(command.new_end, dt("11:00"));
}

#[test]
fn dragged_appointment_does_not_block_itself() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    // 560 snaps to 555: 09:15-09:45 overlaps only a1's own slot.
    let command = expect_move(evaluate_drop(&appointments, &providers(), &a1, "dr-smith", 560));

    assert_eq!(command.new_start, dt("09:15"));
    assert_eq!(command.new_end, dt("09:45"));
}

#[test]
fn drop_ending_exactly_at_next_appointment_is_accepted() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let command = expect_move(evaluate_drop(&appointments, &providers(), &a1, "dr-smith", 570));

    assert_eq!(command.new_end, dt("10:00"));
}

// ── evaluate_drop: conflicts ────────────────────────────────────────────────

#[test]
fn overlapping_drop_returns_conflict_for_that_appointment() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let outcome = evaluate_drop(&appointments, &providers(), &a1, "dr-smith", 615);

    let DropOutcome::Conflict { conflict, pending } = outcome else {
        panic!("expected a conflict, got {outcome:?}");
    };
    assert_eq!(conflict.appointment_id, "a2");
    assert_eq!(conflict.patient_name, "Bob");
    assert_eq!(conflict.provider_id, "dr-smith");
    assert_eq!(conflict.provider_name, "Dr. Smith");
    assert_eq!((conflict.start, conflict.end), (dt("10:00"), dt("11:00")));
    assert_eq!(conflict.overlap_minutes, 30);

    assert_eq!(pending.appointment.id, "a1");
    assert_eq!(pending.proposed.provider_id, "dr-smith");
    assert_eq!(pending.proposed.minutes(), (615, 645));
    assert_eq!(pending.original.minutes(), (540, 570));
}

#[test]
fn conflict_names_the_earliest_overlapping_appointment() {
    let appointments = appointments();
    let a3 = find(&appointments, "a3");

    // 09:15-10:15 on dr-smith overlaps both a1 and a2.
    let outcome = evaluate_drop(&appointments, &providers(), &a3, "dr-smith", 555);

    match outcome {
        DropOutcome::Conflict { conflict, .. } => assert_eq!(conflict.appointment_id, "a1"),
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[test]
fn conflict_on_unrostered_column_uses_provider_id_as_name() {
    let mut appointments = appointments();
    appointments.push(appt("u1", "Dan", "unassigned", "13:00", "14:00"));
    let a1 = find(&appointments, "a1");

    let outcome = evaluate_drop(&appointments, &providers(), &a1, "unassigned", 780);

    match outcome {
        DropOutcome::Conflict { conflict, .. } => assert_eq!(conflict.provider_name, "unassigned"),
        other => panic!("expected a conflict, got {other:?}"),
    }
}

// ── evaluate_drop: rejected drops ───────────────────────────────────────────

#[test]
fn drop_running_past_midnight_is_rejected() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let outcome = evaluate_drop(&appointments, &providers(), &a1, "dr-smith", 1430);

    assert_eq!(
        outcome,
        DropOutcome::Rejected {
            reason: RejectReason::OutsideDay
        }
    );
}

#[test]
fn drop_across_midnight_onto_an_appointment_is_a_conflict() {
    let mut appointments = appointments();
    appointments.push(appt("late", "Dana", "dr-smith", "23:00", "23:59"));
    appointments.push(appt("long", "Evan", "dr-jones", "12:00", "13:30"));
    let long = find(&appointments, "long");

    let outcome = evaluate_drop(&appointments, &providers(), &long, "dr-smith", 1380);

    match outcome {
        DropOutcome::Conflict { conflict, pending } => {
            assert_eq!(conflict.appointment_id, "late");
            assert_eq!(conflict.overlap_minutes, 59);
            assert_eq!(pending.proposed.minutes(), (1380, 1470));
        }
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[test]
fn extreme_drop_positions_are_rejected() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    for raw in [i64::MAX, i64::MIN, i64::MAX - 7, i64::MIN + 1] {
        let outcome = evaluate_drop(&appointments, &providers(), &a1, "dr-smith", raw);
        assert_eq!(
            outcome,
            DropOutcome::Rejected {
                reason: RejectReason::OutsideDay
            },
            "raw position {raw}"
        );
    }
}

#[test]
fn drop_before_midnight_is_rejected() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");

    let outcome = evaluate_drop(&appointments, &providers(), &a1, "dr-smith", -20);

    assert_eq!(
        outcome,
        DropOutcome::Rejected {
            reason: RejectReason::OutsideDay
        }
    );
}

#[test]
fn zero_length_appointment_fits_no_zone() {
    let mut appointments = appointments();
    appointments.push(appt("z", "Zed", "dr-jones", "12:00", "12:00"));
    let z = find(&appointments, "z");

    let outcome = evaluate_drop(&appointments, &providers(), &z, "dr-smith", 300);

    assert_eq!(
        outcome,
        DropOutcome::Rejected {
            reason: RejectReason::NoDropZone
        }
    );
}

#[test]
fn configured_snap_granularity_is_used() {
    let appointments = appointments();
    let a1 = find(&appointments, "a1");
    let config = EngineConfig {
        snap_minutes: 5,
        ..EngineConfig::default()
    };

    let outcome = evaluate_drop_with(&config, &appointments, &providers(), &a1, "dr-jones", 722);

    assert_eq!(expect_move(outcome).new_start, dt("12:00"));
    let outcome = evaluate_drop_with(&config, &appointments, &providers(), &a1, "dr-jones", 728);
    assert_eq!(expect_move(outcome).new_start, dt("12:10"));
}

// ── DragSession ─────────────────────────────────────────────────────────────

#[test]
fn start_captures_original_placement() {
    let appointments = appointments();
    let session = DragSession::new().start(&find(&appointments, "a1")).unwrap();

    let state = session.drag_state().expect("dragging");
    assert_eq!(state.appointment.id, "a1");
    assert_eq!(state.original.provider_id, "dr-smith");
    assert_eq!(state.original_minutes(), (540, 570));
    assert!(state.hover.is_none());
}

#[test]
fn second_drag_is_rejected_and_first_survives() {
    let appointments = appointments();
    let session = DragSession::new().start(&find(&appointments, "a1")).unwrap();

    let err = session.start(&find(&appointments, "a2")).unwrap_err();

    assert!(matches!(err, SlotError::DragInProgress(ref id) if id == "a1"));
    assert_eq!(session.drag_state().unwrap().appointment.id, "a1");
}

#[test]
fn hover_records_snapped_target() {
    let appointments = appointments();
    let config = EngineConfig::default();
    let session = DragSession::new()
        .start(&find(&appointments, "a1"))
        .unwrap()
        .hover("dr-jones", 668, &config)
        .unwrap();

    assert_eq!(
        session.drag_state().unwrap().hover,
        Some(HoverTarget {
            provider_id: "dr-jones".to_string(),
            snapped_minutes: 675,
        })
    );
    assert!(matches!(
        DragSession::new().hover("dr-jones", 668, &config),
        Err(SlotError::NoActiveDrag)
    ));
}

#[test]
fn successful_drop_returns_to_idle() {
    let appointments = appointments();
    let config = EngineConfig::default();
    let session = DragSession::new().start(&find(&appointments, "a1")).unwrap();

    let (next, outcome) = session
        .end(&appointments, &providers(), "dr-smith", 720, &config)
        .unwrap();

    assert!(next.is_idle());
    assert!(matches!(outcome, DropOutcome::Move { .. }));
}

#[test]
fn rejected_drop_returns_to_idle() {
    let appointments = appointments();
    let config = EngineConfig::default();
    let session = DragSession::new().start(&find(&appointments, "a1")).unwrap();

    let (next, outcome) = session
        .end(&appointments, &providers(), "dr-smith", 1439, &config)
        .unwrap();

    assert!(next.is_idle());
    assert!(matches!(outcome, DropOutcome::Rejected { .. }));
}

#[test]
fn conflicting_drop_awaits_resolution() {
    let appointments = appointments();
    let config = EngineConfig::default();
    let session = DragSession::new().start(&find(&appointments, "a1")).unwrap();

    let (next, outcome) = session
        .end(&appointments, &providers(), "dr-smith", 600, &config)
        .unwrap();

    assert!(matches!(outcome, DropOutcome::Conflict { .. }));
    let (conflict, pending) = next.pending_conflict().expect("awaiting resolution");
    assert_eq!(conflict.appointment_id, "a2");
    assert_eq!(pending.appointment.id, "a1");

    // No new drag while the conflict is open.
    assert!(matches!(
        next.start(&find(&appointments, "a3")),
        Err(SlotError::DragInProgress(ref id)) if id == "a1"
    ));
    assert!(matches!(
        next.end(&appointments, &providers(), "dr-smith", 720, &config),
        Err(SlotError::NoActiveDrag)
    ));
}

#[test]
fn resolving_a_conflict_returns_commands_and_idle() {
    let appointments = appointments();
    let config = EngineConfig::default();
    let (awaiting, _) = DragSession::new()
        .start(&find(&appointments, "a1"))
        .unwrap()
        .end(&appointments, &providers(), "dr-smith", 600, &config)
        .unwrap();

    let (next, commands) = awaiting
        .resolve(ResolutionStrategy::Force, &appointments, &config)
        .unwrap();

    assert!(next.is_idle());
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].appointment_id, "a1");
}

#[test]
fn failed_resolution_keeps_the_conflict_open() {
    // dr-smith has no free hour before 17:00 once a1 takes 10:00-10:30.
    let appointments = vec![
        appt("a1", "Alice", "dr-smith", "09:00", "09:30"),
        appt("a2", "Bob", "dr-smith", "10:00", "11:00"),
        appt("m", "Mel", "dr-smith", "00:00", "09:00"),
        appt("p", "Pat", "dr-smith", "09:30", "10:00"),
        appt("n", "Ned", "dr-smith", "11:00", "17:00"),
    ];
    let config = EngineConfig {
        move_next_policy: MoveNextPolicy::Atomic,
        ..EngineConfig::default()
    };
    let (awaiting, _) = DragSession::new()
        .start(&find(&appointments, "a1"))
        .unwrap()
        .end(&appointments, &providers(), "dr-smith", 600, &config)
        .unwrap();

    let err = awaiting
        .resolve(ResolutionStrategy::MoveNext, &appointments, &config)
        .unwrap_err();

    assert!(matches!(err, SlotError::NoRescueSlot { ref appointment_id, .. } if appointment_id == "a2"));
    assert!(awaiting.pending_conflict().is_some());
}

#[test]
fn cancel_and_dismiss_return_to_idle() {
    let appointments = appointments();
    let config = EngineConfig::default();

    let dragging = DragSession::new().start(&find(&appointments, "a1")).unwrap();
    assert!(dragging.cancel().unwrap().is_idle());

    let (awaiting, _) = dragging
        .end(&appointments, &providers(), "dr-smith", 600, &config)
        .unwrap();
    assert!(awaiting.dismiss_conflict().unwrap().is_idle());
}

#[test]
fn state_violations_are_errors() {
    let idle = DragSession::default();
    let config = EngineConfig::default();

    assert!(matches!(idle.cancel(), Err(SlotError::NoActiveDrag)));
    assert!(matches!(
        idle.end(&appointments(), &providers(), "dr-smith", 0, &config),
        Err(SlotError::NoActiveDrag)
    ));
    assert!(matches!(
        idle.resolve(ResolutionStrategy::Swap, &appointments(), &config),
        Err(SlotError::NoPendingConflict)
    ));
    assert!(matches!(idle.dismiss_conflict(), Err(SlotError::NoPendingConflict)));
}

#[test]
fn session_serializes_with_a_state_tag() {
    let json = serde_json::to_value(DragSession::Idle).unwrap();
    assert_eq!(json, serde_json::json!({ "state": "idle" }));
}

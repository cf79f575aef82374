mod common;

use std::collections::BTreeMap;

use common::{local_state, Harness};
use hirafi::app::{InputField, InputMode};
use hirafi::domain::{BookingStatus, Role, User};
use hirafi::query::{compile_seeker_bookings, normalize_bookings, Query, WorkerSchema};
use hirafi::remote::{ReplyKind, StoreCommand, StoreOutcome};
use hirafi::storage::{JsonSessionStore, JsonStorage, SessionStore, TableStore};
use hirafi::worker::{HirafiWorker, WorkerMessage, WorkerResponse};
use hirafi::{AppState, Event, View};
use serde_json::{json, Value};
use tempfile::TempDir;

fn marketplace() -> Harness {
    Harness::seeded(&[
        (
            "users",
            json!({"id": "s-1", "first_name": "Amina", "last_name": "Khelifi",
                   "phone": "0550000001", "role": "seeker", "wilaya": "Blida"}),
        ),
        (
            "users",
            json!({"id": "w-1", "first_name": "Karim", "last_name": "Bouzid",
                   "phone": "0550000002", "role": "worker", "wilaya": "Blida",
                   "category": "plumbing", "is_verified": true}),
        ),
    ])
}

fn karim() -> User {
    User::new("w-1", "Karim", "Bouzid", "0550000002", Role::Worker)
}

fn log_in(harness: &mut Harness, state: &mut AppState, phone: &str) {
    harness.drive(state, &Event::Navigate(View::Login));
    assert_eq!(state.input_mode, InputMode::Editing(InputField::Phone));
    harness.type_text(state, phone);
    harness.drive(state, &Event::Submit);
}

fn request_booking(harness: &mut Harness, seeker: &mut AppState, details: &str) {
    harness.drive(seeker, &Event::Navigate(View::Search));
    harness.drive(seeker, &Event::Select);
    assert_eq!(seeker.view, View::WorkerDetail);
    harness.drive(seeker, &Event::Book);
    harness.type_text(seeker, details);
    harness.drive(seeker, &Event::Submit);
}

#[test]
fn seeker_logs_in_and_requests_a_booking() {
    let mut harness = marketplace();
    let mut seeker = local_state();

    log_in(&mut harness, &mut seeker, "0550000001");
    assert_eq!(seeker.view, View::Account);
    assert_eq!(seeker.current_user.as_ref().map(|u| u.id.as_str()), Some("s-1"));

    request_booking(&mut harness, &mut seeker, "Leaking tap in the kitchen");
    assert_eq!(seeker.notice.as_deref(), Some("Booking request sent"));
    assert!(seeker.alert.is_none());

    harness.drive(&mut seeker, &Event::Navigate(View::Bookings));
    assert_eq!(seeker.bookings.len(), 1);
    let booking = &seeker.bookings[0];
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.worker_id.as_deref(), Some("w-1"));
    assert_eq!(booking.details, "Leaking tap in the kitchen");
}

#[test]
fn login_session_survives_a_worker_restart() {
    let mut harness = marketplace();
    let mut seeker = local_state();
    log_in(&mut harness, &mut seeker, "0550000001");

    let session = JsonSessionStore::new(harness.dir.path().join("session.json")).unwrap();
    let restored = session.load().unwrap().unwrap();
    assert_eq!(restored.full_name(), "Amina Khelifi");

    harness.drive(&mut seeker, &Event::Logout);
    assert!(seeker.current_user.is_none());
    assert!(session.load().unwrap().is_none());
}

#[test]
fn restored_session_is_picked_up_on_permission_grant() {
    let dir = TempDir::new().unwrap();
    let session_path = dir.path().join("session.json");
    JsonSessionStore::new(session_path.clone())
        .unwrap()
        .save(&karim())
        .unwrap();

    let mut harness = Harness {
        worker: HirafiWorker::with_stores(
            Box::new(JsonStorage::new(dir.path().join("tables.json")).unwrap()),
            Box::new(JsonSessionStore::new(session_path).unwrap()),
        ),
        dir,
    };
    let mut state = local_state();
    harness.drive(&mut state, &Event::PermissionsGranted);

    assert_eq!(state.current_user, Some(karim()));
}

#[test]
fn only_the_first_accept_takes_the_booking() {
    let mut harness = marketplace();
    let mut seeker = local_state();
    log_in(&mut harness, &mut seeker, "0550000001");
    request_booking(&mut harness, &mut seeker, "Boiler service");

    let mut phone = local_state();
    let mut laptop = local_state();
    for device in [&mut phone, &mut laptop] {
        let _ = device.set_current_user(Some(karim()));
        harness.drive(device, &Event::Navigate(View::Bookings));
        assert_eq!(device.bookings.len(), 1);
    }

    harness.drive(&mut phone, &Event::Accept);
    assert_eq!(phone.notice.as_deref(), Some("Booking accepted"));
    assert_eq!(phone.bookings[0].status, BookingStatus::Accepted);

    harness.drive(&mut laptop, &Event::Accept);
    assert_eq!(laptop.notice.as_deref(), Some("Booking already accepted"));
    assert_eq!(laptop.bookings[0].status, BookingStatus::Pending);

    let again = harness.drive(&mut phone, &Event::Accept);
    assert!(again.is_empty());
    assert_eq!(phone.notice.as_deref(), Some("Booking already accepted"));

    harness.drive(&mut laptop, &Event::Navigate(View::Bookings));
    assert!(laptop.bookings.is_empty(), "accepted bookings leave the pending list");
}

#[test]
fn guarded_transition_affects_one_row_then_none() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables.json");
    let mut tables = JsonStorage::new(path.clone()).unwrap();

    let inserted = tables
        .execute(&StoreCommand::Insert {
            table: "bookings".to_string(),
            record: json!({"seeker_id": "s-1", "status": "pending",
                           "created_at": "2024-05-01T10:00:00Z"}),
        })
        .unwrap()
        .into_rows();
    let id = inserted[0]["id"].as_str().unwrap().to_string();

    let accept = StoreCommand::Transition {
        table: "bookings".to_string(),
        id,
        from: "pending".to_string(),
        to: "accepted".to_string(),
        assign: BTreeMap::from([("worker_id".to_string(), Value::from("w-1"))]),
    };
    assert_eq!(tables.execute(&accept).unwrap(), StoreOutcome::Affected(1));
    assert_eq!(tables.execute(&accept).unwrap(), StoreOutcome::Affected(0));
    drop(tables);

    let mut reopened = JsonStorage::new(path).unwrap();
    let rows = reopened
        .execute(&StoreCommand::Select(compile_seeker_bookings("s-1", &WorkerSchema::default())))
        .unwrap()
        .into_rows();
    let bookings = normalize_bookings(rows);
    assert_eq!(bookings[0].status, BookingStatus::Accepted);
    assert_eq!(bookings[0].worker_id.as_deref(), Some("w-1"));
}

#[test]
fn failed_insert_surfaces_the_raw_store_message() {
    let mut harness = marketplace();
    let mut state = local_state();
    let context = state.ledger.issue(ReplyKind::CreateBooking, None);

    let response = harness.worker.handle_message(WorkerMessage::execute(
        StoreCommand::Insert {
            table: "bookings".to_string(),
            record: json!("not a row"),
        },
        context,
    ));
    let WorkerResponse::CommandFailed { message, .. } = &response else {
        panic!("expected a failure, got {response:?}");
    };
    assert!(message.contains("non-object record"));

    harness.drive(&mut state, &Event::WorkerResponse(response.clone()));
    let alert = state.alert.expect("booking failure alert");
    assert_eq!(alert.title, "Booking failed");
    assert_eq!(&alert.message, message);
}

#[test]
fn unreadable_table_file_fails_bookings_loudly_and_keeps_the_session() {
    let mut harness = Harness::with_table_file("{ not json");
    let mut seeker = local_state();
    let _ = seeker.set_current_user(Some(User::new(
        "s-1", "Amina", "Khelifi", "0550000001", Role::Seeker,
    )));
    seeker.detail = hirafi::query::normalize_workers(vec![json!({
        "id": "w-1", "first_name": "Karim", "role": "worker"
    })])
    .pop();
    seeker.view = View::WorkerDetail;

    harness.drive(&mut seeker, &Event::Book);
    harness.type_text(&mut seeker, "Boiler service");
    harness.drive(&mut seeker, &Event::Submit);

    let alert = seeker.alert.clone().expect("booking failure alert");
    assert_eq!(alert.title, "Booking failed");
    assert!(alert.message.contains("failed to open table store"));

    let mut restored = local_state();
    harness.drive(&mut restored, &Event::PermissionsGranted);
    assert!(restored.current_user.is_none());

    let save = seeker.set_current_user(Some(karim()));
    let hirafi::Action::PostToWorker(save) = save else {
        panic!("expected a session save");
    };
    let saved = harness.worker.respond(&serde_json::to_string(&save).unwrap());
    assert_eq!(saved, Some(WorkerResponse::SessionSaved));
    harness.drive(&mut restored, &Event::PermissionsGranted);
    assert_eq!(restored.current_user, Some(karim()));
}

#[test]
fn selecting_everything_in_an_unknown_table_is_empty() {
    let mut harness = marketplace();
    let response = harness.worker.handle_message(WorkerMessage::execute(
        StoreCommand::Select(Query::new("reviews")),
        local_state().ledger.issue(ReplyKind::Search, None),
    ));
    assert!(matches!(
        response,
        WorkerResponse::CommandCompleted { outcome: StoreOutcome::Rows(rows), .. } if rows.is_empty()
    ));
}

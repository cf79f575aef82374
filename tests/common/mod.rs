//! Drives the reducer against a worker backed by temporary files, the way the
//! plugin runtime does when no remote store is configured.

#![allow(dead_code)]

use hirafi::app::Services;
use hirafi::remote::StoreCommand;
use hirafi::storage::{JsonSessionStore, JsonStorage, TableStore};
use hirafi::worker::HirafiWorker;
use hirafi::{handle_event, Action, AppState, Event, Theme};
use serde_json::Value;
use tempfile::TempDir;

pub struct Harness {
    pub dir: TempDir,
    pub worker: HirafiWorker,
}

impl Harness {
    /// Opens a worker over empty stores after seeding `rows` into the table
    /// file.
    pub fn seeded(rows: &[(&str, Value)]) -> Self {
        let dir = TempDir::new().unwrap();
        let tables_path = dir.path().join("tables.json");
        {
            let mut tables = JsonStorage::new(tables_path.clone()).unwrap();
            for (table, record) in rows {
                tables
                    .execute(&StoreCommand::Insert {
                        table: (*table).to_string(),
                        record: record.clone(),
                    })
                    .unwrap();
            }
        }

        let worker = HirafiWorker::with_stores(
            Box::new(JsonStorage::new(tables_path).unwrap()),
            Box::new(JsonSessionStore::new(dir.path().join("session.json")).unwrap()),
        );
        Self { dir, worker }
    }

    /// A worker that opens its stores lazily in a directory holding
    /// `tables_json` as its table file, the way the plugin runtime starts.
    pub fn with_table_file(tables_json: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tables.json"), tables_json).unwrap();
        let worker = HirafiWorker::in_dir(dir.path());
        Self { dir, worker }
    }

    /// Handles `event`, then runs every resulting worker message through its
    /// serialized form and feeds the responses back until nothing is left. Returns the network actions seen.
    pub fn drive(&mut self, state: &mut AppState, event: &Event) -> Vec<Action> {
        let mut network = Vec::new();
        let mut pending = vec![event.clone()];
        while let Some(event) = pending.pop() {
            let (_, actions) = handle_event(state, &event).unwrap();
            for action in actions {
                match action {
                    Action::PostToWorker(message) => {
                        let payload = serde_json::to_string(&message).unwrap();
                        if let Some(response) = self.worker.respond(&payload) {
                            pending.push(Event::WorkerResponse(response));
                        }
                    }
                    Action::WebRequest(_) => network.push(action),
                    Action::CloseFocus => {}
                }
            }
        }
        network
    }

    pub fn type_text(&mut self, state: &mut AppState, text: &str) {
        for c in text.chars() {
            self.drive(state, &Event::Char(c));
        }
    }
}

pub fn local_state() -> AppState {
    AppState::new(Theme::default(), Services::default())
}

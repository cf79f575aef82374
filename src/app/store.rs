//! Observable owner of the application state.
//!
//! The plugin runtime feeds every event through [`Store::dispatch`]. When the
//! reducer reports that the screen changed, each subscriber is called once
//! with the new state. The runtime subscribes a listener that marks the pane
//! for re-rendering.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use hirafi::app::{AppState, Services, Store, View};
//! use hirafi::ui::Theme;
//!
//! let mut store = Store::new(AppState::new(Theme::default(), Services::default()));
//! let renders = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&renders);
//! store.subscribe(move |_| counter.set(counter.get() + 1));
//!
//! store.navigate(View::Home);
//! assert_eq!(renders.get(), 1);
//! ```

use super::handler::{handle_event, Event};
use super::modes::View;
use super::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::User;

type Listener = Box<dyn FnMut(&AppState)>;

pub struct Store {
    state: AppState,
    listeners: Vec<Listener>,
}

impl Store {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Registers a listener called after every state change that needs a
    /// render.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs the reducer and notifies subscribers once if the screen changed.
    ///
    /// # Errors
    ///
    /// Propagates reducer errors; the state is left as the reducer left it.
    pub fn dispatch(&mut self, event: &Event) -> Result<Vec<Action>> {
        let (render, actions) = handle_event(&mut self.state, event)?;
        if render {
            self.notify();
        }
        Ok(actions)
    }

    /// Routes to `view` and notifies exactly once, even when the view is
    /// already showing.
    pub fn navigate(&mut self, view: View) -> Vec<Action> {
        match self.dispatch(&Event::Navigate(view)) {
            Ok(actions) => actions,
            Err(e) => {
                tracing::error!(error = %e, "navigation failed");
                Vec::new()
            }
        }
    }

    /// Sets or clears the logged-in user, notifies once, and returns the
    /// session write.
    pub fn set_current_user(&mut self, user: Option<User>) -> Action {
        let action = self.state.set_current_user(user);
        self.notify();
        action
    }

    fn notify(&mut self) {
        tracing::trace!(listeners = self.listeners.len(), "notifying subscribers");
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Services;
    use crate::domain::Role;
    use crate::ui::Theme;
    use crate::worker::WorkerMessage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn observed() -> (Store, Rc<RefCell<Vec<View>>>) {
        let mut store = Store::new(AppState::new(Theme::default(), Services::default()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| sink.borrow_mut().push(state.view));
        (store, seen)
    }

    #[test]
    fn navigate_notifies_once_per_call_even_without_change() {
        let (mut store, seen) = observed();
        store.navigate(View::Account);
        store.navigate(View::Account);
        assert_eq!(*seen.borrow(), vec![View::Account, View::Account]);
    }

    #[test]
    fn navigate_resets_scroll() {
        let (mut store, _) = observed();
        store.navigate(View::Account);
        store.dispatch(&Event::KeyDown).unwrap();
        store.dispatch(&Event::KeyDown).unwrap();
        assert_eq!(store.state().scroll_offset, 2);

        store.navigate(View::Account);
        assert_eq!(store.state().scroll_offset, 0);
    }

    #[test]
    fn events_without_visible_change_do_not_notify() {
        let (mut store, seen) = observed();
        store.dispatch(&Event::Backspace).unwrap();
        store.dispatch(&Event::CloseFocus).unwrap();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn set_current_user_notifies_and_persists() {
        let (mut store, seen) = observed();
        let user = User::new("1", "Lina", "B", "0", Role::Seeker);

        let action = store.set_current_user(Some(user));
        assert!(matches!(action, Action::PostToWorker(WorkerMessage::SaveSession { .. })));
        let action = store.set_current_user(None);
        assert!(matches!(action, Action::PostToWorker(WorkerMessage::ClearSession { .. })));
        assert_eq!(seen.borrow().len(), 2);
    }
}

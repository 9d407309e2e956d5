//! Navigation state machine.
//!
//! Tracks which screen is active and which event is selected, gating what
//! the rest of the client fetches and displays. The machine only exists
//! while a session is active; logout resets it to its initial state.

use crate::types::Event;

/// The screens a signed-in visitor can be on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// The event list
    Events,
    /// The seat map of the selected event
    Stage,
    /// The visitor's confirmed reservations
    Wallet,
}

/// Result of a navigation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// The requested view was entered
    Entered(View),
    /// The request was refused: the stage needs a selected event first
    StageWithoutSelection,
}

/// Current navigation state: active view plus the selected event
///
/// Invariant: `view == View::Stage` implies `selected_event.is_some()`.
/// The only way onto the stage without an existing selection is
/// [`NavigationState::select_event`], which establishes one.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationState {
    /// The screen currently shown
    pub view: View,
    /// The event whose seat map the stage shows, if any
    pub selected_event: Option<Event>,
}

impl NavigationState {
    /// Initial state on login: the event list, nothing selected
    #[must_use]
    pub const fn new() -> Self {
        Self {
            view: View::Events,
            selected_event: None,
        }
    }

    /// Select an event and move onto its stage
    pub fn select_event(&mut self, event: Event) {
        self.selected_event = Some(event);
        self.view = View::Stage;
    }

    /// Request a view change
    ///
    /// Entering the stage requires an existing selection; the refusal is a
    /// no-op on state and it is the caller's job to surface exactly one
    /// warning for it.
    pub fn navigate(&mut self, view: View) -> NavigateOutcome {
        if view == View::Stage && self.selected_event.is_none() {
            return NavigateOutcome::StageWithoutSelection;
        }

        self.view = view;
        NavigateOutcome::Entered(view)
    }

    /// Reset to the initial state (logout path)
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;
    use chrono::Utc;

    fn event(id: i64) -> Event {
        Event {
            id: EventId::new(id),
            name: format!("Event {id}"),
            venue: "Hall A".to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn initial_state_is_event_list() {
        let nav = NavigationState::new();
        assert_eq!(nav.view, View::Events);
        assert!(nav.selected_event.is_none());
    }

    #[test]
    fn selecting_an_event_enters_its_stage() {
        let mut nav = NavigationState::new();
        nav.select_event(event(1));
        assert_eq!(nav.view, View::Stage);
        assert_eq!(
            nav.selected_event.as_ref().map(|e| e.id),
            Some(EventId::new(1))
        );
    }

    #[test]
    fn stage_without_selection_is_refused_and_state_unchanged() {
        let mut nav = NavigationState::new();
        let before = nav.clone();

        let outcome = nav.navigate(View::Stage);

        assert_eq!(outcome, NavigateOutcome::StageWithoutSelection);
        assert_eq!(nav, before);
    }

    #[test]
    fn stage_with_selection_is_allowed_from_anywhere() {
        let mut nav = NavigationState::new();
        nav.select_event(event(1));
        assert_eq!(nav.navigate(View::Wallet), NavigateOutcome::Entered(View::Wallet));
        assert_eq!(nav.navigate(View::Stage), NavigateOutcome::Entered(View::Stage));
        assert_eq!(nav.view, View::Stage);
    }

    #[test]
    fn selection_survives_leaving_the_stage() {
        let mut nav = NavigationState::new();
        nav.select_event(event(2));
        let _ = nav.navigate(View::Events);
        assert!(nav.selected_event.is_some());
    }

    #[test]
    fn clear_resets_everything() {
        let mut nav = NavigationState::new();
        nav.select_event(event(3));
        nav.clear();
        assert_eq!(nav, NavigationState::new());
    }
}

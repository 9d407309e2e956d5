//! Application reducer.
//!
//! Routes every action through the navigation machine and the reconciler,
//! and describes the remote work each transition requires as effects. All
//! remote results come back as feedback actions, so every state change -
//! pull result, push notification, or local booking outcome - passes
//! through here exactly once, serialized by the store.

use smallvec::{SmallVec, smallvec};
use tickethub_core::{effect::Effect, reducer::Reducer};
use tracing::{debug, info, warn};

use crate::actions::AppAction;
use crate::environment::AppEnvironment;
use crate::navigation::{NavigateOutcome, View};
use crate::reconciler::SeatChangeOutcome;
use crate::state::AppState;
use crate::types::{BookingOutcome, EventId, Session, UserId};

/// Inline effect vector for app transitions
type Effects = SmallVec<[Effect<AppAction>; 4]>;

/// Reducer for the whole booking client.
#[derive(Clone, Debug)]
pub struct AppReducer;

impl AppReducer {
    /// Create a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action keeps the flow readable
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // ========== Session lifecycle ==========
            AppAction::RestoreSession => {
                let sessions = env.sessions();
                smallvec![Effect::future(async move {
                    match sessions.load().await {
                        Ok(Some(session)) => Some(AppAction::SessionRestored { session }),
                        Ok(None) => None,
                        Err(error) => {
                            warn!(%error, "Could not restore the persisted session");
                            None
                        },
                    }
                })]
            },

            AppAction::Login { username, password } => {
                let auth = env.auth();
                smallvec![Effect::future(async move {
                    match auth.login(&username, &password).await {
                        Ok(session) => Some(AppAction::LoggedIn { session }),
                        Err(error) => Some(AppAction::AuthFailed {
                            reason: error.to_string(),
                        }),
                    }
                })]
            },

            AppAction::Register { username, password } => {
                let auth = env.auth();
                smallvec![Effect::future(async move {
                    match auth.register(&username, &password).await {
                        Ok(()) => Some(AppAction::Registered),
                        Err(error) => Some(AppAction::AuthFailed {
                            reason: error.to_string(),
                        }),
                    }
                })]
            },

            AppAction::SessionRestored { session } => {
                info!(username = %session.username, "Session restored from disk");
                enter_session(state, session, env)
            },

            AppAction::LoggedIn { session } => {
                info!(username = %session.username, "Logged in");
                let mut effects = enter_session(state, session, env);
                if let Some(session) = state.session.clone() {
                    let sessions = env.sessions();
                    effects.push(Effect::future(async move {
                        if let Err(error) = sessions.save(&session).await {
                            warn!(%error, "Could not persist the session record");
                        }
                        None
                    }));
                }
                effects
            },

            AppAction::Registered => {
                state.set_notice("Registration successful. Please log in.");
                SmallVec::new()
            },

            AppAction::AuthFailed { reason } => {
                warn!(reason = %reason, "Authentication failed");
                state.set_notice(reason);
                SmallVec::new()
            },

            AppAction::Logout => {
                if state.session.is_none() {
                    debug!("Logout with no active session");
                    return SmallVec::new();
                }

                info!("Logging out; clearing per-session state");
                *state = AppState::new();

                let sessions = env.sessions();
                smallvec![Effect::future(async move {
                    if let Err(error) = sessions.clear().await {
                        warn!(%error, "Could not clear the persisted session record");
                    }
                    None
                })]
            },

            // ========== Navigation ==========
            AppAction::RefreshEvents => {
                if state.session.is_none() {
                    warn!("Ignoring event refresh without a session");
                    return SmallVec::new();
                }
                smallvec![fetch_events(env)]
            },

            AppAction::SelectEvent { event } => {
                if state.session.is_none() {
                    warn!(event = %event.id, "Ignoring event selection without a session");
                    return SmallVec::new();
                }

                info!(event = %event.id, name = %event.name, "Event selected");
                let event_id = event.id;
                state.reconciler.retarget(event_id);
                state.navigation.select_event(event);
                smallvec![fetch_seats(env, event_id)]
            },

            AppAction::Navigate { view } => {
                let Some(session) = &state.session else {
                    warn!(?view, "Ignoring navigation without a session");
                    return SmallVec::new();
                };
                let user_id = session.user_id;

                match state.navigation.navigate(view) {
                    NavigateOutcome::StageWithoutSelection => {
                        warn!("Stage requested without a selected event");
                        state.set_notice("Select an event to see its seat map.");
                        SmallVec::new()
                    },
                    NavigateOutcome::Entered(View::Wallet) => {
                        smallvec![fetch_tickets(env, user_id)]
                    },
                    NavigateOutcome::Entered(_) => SmallVec::new(),
                }
            },

            // ========== Booking ==========
            AppAction::BookSeat { seat_number } => {
                if state.session.is_none() {
                    return refuse_booking(state, seat_number, "Log in to book seats.");
                }
                if state.navigation.view != View::Stage
                    || state.navigation.selected_event.is_none()
                {
                    return refuse_booking(
                        state,
                        seat_number,
                        "Open an event's seat map to book.",
                    );
                }
                if let Some(in_flight) = state.booking_in_flight.clone() {
                    return refuse_booking(
                        state,
                        seat_number,
                        &format!("Still resolving the booking for {in_flight}."),
                    );
                }

                let (Some(session), Some(event)) = (
                    state.session.clone(),
                    state.navigation.selected_event.clone(),
                ) else {
                    // Unreachable behind the guards above, but a stranded
                    // in-flight marker would block all further bookings,
                    // so refuse instead of marking.
                    return refuse_booking(state, seat_number, "Open an event's seat map to book.");
                };

                state.booking_in_flight = Some(seat_number.clone());
                state.set_notice(format!("Attempting to book {seat_number}..."));

                smallvec![book_seat(env, event.id, seat_number, session)]
            },

            AppAction::BookingIgnored { .. } => {
                // Notice and warning were produced when the intent was
                // refused; this action only exists for observers awaiting
                // a resolution.
                SmallVec::new()
            },

            AppAction::BookingResolved {
                seat_number,
                outcome,
            } => {
                state.booking_in_flight = None;

                match outcome {
                    BookingOutcome::Success => {
                        info!(seat = %seat_number, "Booking confirmed by the remote store");
                        state.set_notice(format!("Success! You booked {seat_number}"));

                        // Authoritative refresh, never a local flip: the
                        // seat map and the wallet are both re-fetched.
                        let mut effects = Effects::new();
                        if let Some(event_id) = state.reconciler.tracked_event() {
                            effects.push(fetch_seats(env, event_id));
                        }
                        if let Some(session) = &state.session {
                            effects.push(fetch_tickets(env, session.user_id));
                        }
                        effects
                    },
                    BookingOutcome::Rejected { reason } => {
                        warn!(seat = %seat_number, reason = %reason, "Booking rejected");
                        // The remote-provided reason is shown unmodified.
                        state.set_notice(reason);
                        SmallVec::new()
                    },
                    BookingOutcome::TransportError { detail } => {
                        warn!(
                            seat = %seat_number,
                            detail = %detail,
                            "Booking attempt did not reach a verdict"
                        );
                        state.set_notice(format!(
                            "Could not book {seat_number}: the store is unreachable."
                        ));
                        SmallVec::new()
                    },
                }
            },

            // ========== Push channel ==========
            AppAction::SeatChangeNotified { change } => {
                match state.reconciler.seat_change(&change) {
                    SeatChangeOutcome::Applied => {
                        debug!(seat = %change.seat_number, event = %change.event_id,
                            "Seat marked sold from notification");
                    },
                    SeatChangeOutcome::AlreadySold => {
                        debug!(seat = %change.seat_number, "Duplicate notification ignored");
                    },
                    SeatChangeOutcome::UnknownSeat => {
                        debug!(seat = %change.seat_number,
                            "Notification for a seat not in the snapshot dropped");
                    },
                    SeatChangeOutcome::DifferentEvent => {
                        debug!(event = %change.event_id,
                            "Notification for another event filtered out");
                    },
                }

                // The client cannot tell a stranger's booking from its own
                // notification arriving ahead of the booking response;
                // re-fetching the wallet reconciles both cases.
                match &state.session {
                    Some(session) => smallvec![fetch_tickets(env, session.user_id)],
                    None => SmallVec::new(),
                }
            },

            AppAction::RealtimeConnected => {
                info!("Push channel subscribed");
                state.realtime_connected = true;
                SmallVec::new()
            },

            // ========== Pull results ==========
            AppAction::EventsFetched { events } => {
                debug!(count = events.len(), "Event list updated");
                state.events = events;
                SmallVec::new()
            },

            AppAction::EventsFetchFailed { detail } => {
                warn!(detail = %detail, "Event list fetch failed; keeping the previous list");
                SmallVec::new()
            },

            AppAction::SeatsFetched { event_id, seats } => {
                if !state.reconciler.seats_fetched(event_id, seats) {
                    debug!(event = %event_id,
                        "Discarding seat list for an event no longer selected");
                }
                SmallVec::new()
            },

            AppAction::SeatsFetchFailed { event_id, detail } => {
                warn!(event = %event_id, detail = %detail,
                    "Seat list fetch failed; keeping the previous snapshot");
                SmallVec::new()
            },

            AppAction::TicketsFetched { tickets } => {
                debug!(count = tickets.len(), "Ticket wallet updated");
                state.reconciler.tickets_fetched(tickets);
                SmallVec::new()
            },

            AppAction::TicketsFetchFailed { detail } => {
                warn!(detail = %detail, "Ticket fetch failed; keeping the previous wallet");
                SmallVec::new()
            },
        }
    }
}

/// Shared continuation for a restored or freshly created session:
/// the visitor lands on a fresh event list.
fn enter_session(state: &mut AppState, session: Session, env: &AppEnvironment) -> Effects {
    state.session = Some(session);
    state.navigation.clear();
    state.reconciler.clear();
    state.notice = None;
    smallvec![fetch_events(env)]
}

/// Refuse a booking intent: warn once, set the user-visible notice, and
/// resolve the intent for observers without touching the remote store.
fn refuse_booking(state: &mut AppState, seat_number: String, reason: &str) -> Effects {
    warn!(seat = %seat_number, reason, "Booking intent refused");
    state.set_notice(reason);
    let reason = reason.to_string();
    smallvec![Effect::future(async move {
        Some(AppAction::BookingIgnored {
            seat_number,
            reason,
        })
    })]
}

fn fetch_events(env: &AppEnvironment) -> Effect<AppAction> {
    let inventory = env.inventory();
    Effect::future(async move {
        match inventory.list_events().await {
            Ok(events) => Some(AppAction::EventsFetched { events }),
            Err(error) => Some(AppAction::EventsFetchFailed {
                detail: error.to_string(),
            }),
        }
    })
}

fn fetch_seats(env: &AppEnvironment, event_id: EventId) -> Effect<AppAction> {
    let inventory = env.inventory();
    Effect::future(async move {
        match inventory.list_seats(event_id).await {
            Ok(seats) => Some(AppAction::SeatsFetched { event_id, seats }),
            Err(error) => Some(AppAction::SeatsFetchFailed {
                event_id,
                detail: error.to_string(),
            }),
        }
    })
}

fn fetch_tickets(env: &AppEnvironment, user_id: UserId) -> Effect<AppAction> {
    let inventory = env.inventory();
    Effect::future(async move {
        match inventory.list_my_tickets(user_id).await {
            Ok(tickets) => Some(AppAction::TicketsFetched { tickets }),
            Err(error) => Some(AppAction::TicketsFetchFailed {
                detail: error.to_string(),
            }),
        }
    })
}

fn book_seat(
    env: &AppEnvironment,
    event_id: EventId,
    seat_number: String,
    session: Session,
) -> Effect<AppAction> {
    let inventory = env.inventory();
    Effect::future(async move {
        let outcome = inventory
            .book_seat(event_id, &seat_number, session.user_id, &session.username)
            .await;
        Some(AppAction::BookingResolved {
            seat_number,
            outcome,
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::mocks::{MockAuthApi, MockInventoryApi, MockSessionStore};
    use crate::types::{Event, Seat, SeatChange, SeatId, Ticket, TicketId};
    use chrono::Utc;
    use std::sync::Arc;
    use tickethub_testing::{ReducerTest, assertions, test_clock};

    fn test_env() -> AppEnvironment {
        AppEnvironment::new(
            Arc::new(MockInventoryApi::new()),
            Arc::new(MockAuthApi::new()),
            Arc::new(MockSessionStore::new()),
            Arc::new(test_clock()),
        )
    }

    fn session() -> Session {
        Session {
            user_id: UserId::new(1),
            username: "ada".to_string(),
        }
    }

    fn event(id: i64) -> Event {
        Event {
            id: EventId::new(id),
            name: format!("Event {id}"),
            venue: "Hall A".to_string(),
            date: Utc::now(),
        }
    }

    fn seat(id: i64, number: &str, sold: bool) -> Seat {
        Seat {
            id: SeatId::new(id),
            seat_number: number.to_string(),
            sold,
        }
    }

    fn staged_state() -> AppState {
        let mut state = AppState::new();
        state.session = Some(session());
        state.reconciler.retarget(EventId::new(1));
        state.navigation.select_event(event(1));
        assert!(state.reconciler.seats_fetched(
            EventId::new(1),
            vec![seat(1, "A1", false), seat(2, "B2", false)],
        ));
        state
    }

    #[test]
    fn login_issues_an_auth_effect() {
        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(AppState::new())
            .when_action(AppAction::Login {
                username: "ada".to_string(),
                password: "pw".to_string(),
            })
            .then_state(|state| assert!(!state.is_authenticated()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn logged_in_enters_a_fresh_event_list() {
        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(AppState::new())
            .when_action(AppAction::LoggedIn { session: session() })
            .then_state(|state| {
                assert!(state.is_authenticated());
                assert_eq!(state.navigation.view, View::Events);
            })
            // Event fetch plus session persistence
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[test]
    fn selecting_an_event_retargets_and_fetches_seats() {
        let mut state = AppState::new();
        state.session = Some(session());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::SelectEvent { event: event(7) })
            .then_state(|state| {
                assert_eq!(state.navigation.view, View::Stage);
                assert_eq!(state.reconciler.tracked_event(), Some(EventId::new(7)));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn stage_navigation_without_selection_warns_once_and_changes_nothing() {
        let mut state = AppState::new();
        state.session = Some(session());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::Navigate { view: View::Stage })
            .then_state(|state| {
                assert_eq!(state.navigation.view, View::Events);
                assert!(state.notice.as_deref().is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn wallet_navigation_refetches_tickets() {
        let mut state = AppState::new();
        state.session = Some(session());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::Navigate { view: View::Wallet })
            .then_state(|state| assert_eq!(state.navigation.view, View::Wallet))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn booking_marks_the_attempt_in_flight() {
        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(staged_state())
            .when_action(AppAction::BookSeat {
                seat_number: "A1".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.booking_in_flight.as_deref(), Some("A1"));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn double_click_booking_is_refused_while_in_flight() {
        let mut state = staged_state();
        state.booking_in_flight = Some("A1".to_string());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::BookSeat {
                seat_number: "A1".to_string(),
            })
            .then_state(|state| {
                // The original attempt stays in flight; the duplicate only
                // produced a notice.
                assert_eq!(state.booking_in_flight.as_deref(), Some("A1"));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn booking_off_stage_is_refused() {
        let mut state = AppState::new();
        state.session = Some(session());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::BookSeat {
                seat_number: "A1".to_string(),
            })
            .then_state(|state| assert!(state.booking_in_flight.is_none()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn booking_success_refetches_seats_and_tickets() {
        let mut state = staged_state();
        state.booking_in_flight = Some("A1".to_string());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::BookingResolved {
                seat_number: "A1".to_string(),
                outcome: BookingOutcome::Success,
            })
            .then_state(|state| {
                assert!(state.booking_in_flight.is_none());
                // No local flip: the snapshot waits for the re-fetch.
                assert!(state.reconciler.seats().iter().all(|s| !s.sold));
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[test]
    fn booking_rejection_surfaces_the_reason_verbatim() {
        let mut state = staged_state();
        state.booking_in_flight = Some("A1".to_string());

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::BookingResolved {
                seat_number: "A1".to_string(),
                outcome: BookingOutcome::Rejected {
                    reason: "Seat A1 is already taken.".to_string(),
                },
            })
            .then_state(|state| {
                assert_eq!(state.notice.as_deref(), Some("Seat A1 is already taken."));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn notification_marks_seat_and_refetches_tickets() {
        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(staged_state())
            .when_action(AppAction::SeatChangeNotified {
                change: SeatChange {
                    event_id: EventId::new(1),
                    seat_number: "B2".to_string(),
                },
            })
            .then_state(|state| {
                assert!(
                    state
                        .reconciler
                        .seats()
                        .iter()
                        .any(|s| s.seat_number == "B2" && s.sold)
                );
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn stale_seat_fetch_is_discarded_by_the_reducer() {
        let state = staged_state();

        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::SeatsFetched {
                event_id: EventId::new(99),
                seats: vec![seat(9, "Z9", true)],
            })
            .then_state(|state| {
                assert!(state.reconciler.seats().iter().all(|s| s.seat_number != "Z9"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn fetch_failures_keep_prior_data() {
        let mut state = staged_state();
        state.events = vec![event(1)];
        state.reconciler.tickets_fetched(vec![Ticket {
            id: TicketId::new(1),
            seat_number: "A1".to_string(),
            event: None,
        }]);

        let state = ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(AppAction::EventsFetchFailed {
                detail: "connection refused".to_string(),
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(state.events.len(), 1);
        assert_eq!(state.reconciler.tickets().len(), 1);
    }

    #[test]
    fn logout_clears_everything_and_clears_the_record() {
        ReducerTest::new(AppReducer::new())
            .with_env(test_env())
            .given_state(staged_state())
            .when_action(AppAction::Logout)
            .then_state(|state| {
                assert!(!state.is_authenticated());
                assert!(state.reconciler.seats().is_empty());
                assert!(state.reconciler.tickets().is_empty());
                assert!(state.events.is_empty());
                assert_eq!(state.navigation.view, View::Events);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }
}

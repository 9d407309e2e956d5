//! Property tests for the reconciler's ordering and confluence invariants.

#![allow(clippy::unwrap_used)] // Test code

use proptest::prelude::*;
use tickethub_client::reconciler::ReconcilerState;
use tickethub_client::types::{EventId, Seat, SeatChange};
use tickethub_client::types::SeatId;

fn arb_seat_number() -> impl Strategy<Value = String> {
    // Rows A-E, numbers up to 999; string-sorted like the real snapshot.
    ("[A-E]", 1u32..1000).prop_map(|(row, n)| format!("{row}{n}"))
}

fn arb_seats() -> impl Strategy<Value = Vec<Seat>> {
    prop::collection::btree_set(arb_seat_number(), 0..20).prop_flat_map(|numbers| {
        let numbers: Vec<String> = numbers.into_iter().collect();
        let len = numbers.len();
        (
            Just(numbers),
            prop::collection::vec(any::<bool>(), len),
            Just(()),
        )
            .prop_map(|(numbers, sold, ())| {
                numbers
                    .into_iter()
                    .zip(sold)
                    .enumerate()
                    .map(|(i, (seat_number, sold))| Seat {
                        id: SeatId::new(i64::try_from(i).unwrap()),
                        seat_number,
                        sold,
                    })
                    .collect()
            })
    })
}

proptest! {
    /// The exposed snapshot is sorted by seat number regardless of the
    /// order the store returned the seats in.
    #[test]
    fn snapshot_is_always_sorted(mut seats in arb_seats(), rotate in any::<prop::sample::Index>()) {
        // Disorder the input deterministically.
        if !seats.is_empty() {
            let mid = rotate.index(seats.len());
            seats.rotate_left(mid);
            seats.reverse();
        }

        let mut state = ReconcilerState::new();
        state.retarget(EventId::new(1));
        prop_assert!(state.seats_fetched(EventId::new(1), seats));

        let numbers: Vec<&str> = state.seats().iter().map(|s| s.seat_number.as_str()).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        prop_assert_eq!(numbers, sorted);
    }

    /// Applying a notification before or after the wholesale fetch that
    /// already contains the seat as sold converges to the same snapshot.
    #[test]
    fn notification_and_fetch_are_confluent(seats in arb_seats(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!seats.is_empty());

        let sold_number = seats[pick.index(seats.len())].seat_number.clone();
        let mut sold_view = seats.clone();
        for seat in &mut sold_view {
            if seat.seat_number == sold_number {
                seat.sold = true;
            }
        }
        let change = SeatChange {
            event_id: EventId::new(1),
            seat_number: sold_number,
        };

        // Order 1: notification first, fetch second.
        let mut a = ReconcilerState::new();
        a.retarget(EventId::new(1));
        prop_assert!(a.seats_fetched(EventId::new(1), seats.clone()));
        let _ = a.seat_change(&change);
        prop_assert!(a.seats_fetched(EventId::new(1), sold_view.clone()));

        // Order 2: fetch first, notification second.
        let mut b = ReconcilerState::new();
        b.retarget(EventId::new(1));
        prop_assert!(b.seats_fetched(EventId::new(1), seats));
        prop_assert!(b.seats_fetched(EventId::new(1), sold_view));
        let _ = b.seat_change(&change);

        prop_assert_eq!(a, b);
    }

    /// A sold seat never reverts, whatever notifications replay.
    #[test]
    fn sold_is_monotonic(seats in arb_seats(), replays in 1usize..5) {
        prop_assume!(!seats.is_empty());

        let mut state = ReconcilerState::new();
        state.retarget(EventId::new(1));
        prop_assert!(state.seats_fetched(EventId::new(1), seats));

        let numbers: Vec<String> = state.seats().iter().map(|s| s.seat_number.clone()).collect();
        for number in &numbers {
            for _ in 0..replays {
                let _ = state.seat_change(&SeatChange {
                    event_id: EventId::new(1),
                    seat_number: number.clone(),
                });
            }
        }

        prop_assert!(state.seats().iter().all(|s| s.sold));
    }
}

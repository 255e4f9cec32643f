//! Scheduling policy and the slot validator.
//!
//! All booking paths funnel through [`evaluate_slot`]; the clinic hours,
//! spacing and daily cap live in one [`SlotPolicy`] value instead of being
//! scattered across call sites.

use chrono::{Duration, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct SlotPolicy {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub min_gap: Duration,
    pub daily_cap: usize,
    pub granularity: Duration,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            closing: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            min_gap: Duration::minutes(15),
            daily_cap: 20,
            granularity: Duration::minutes(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SlotDecision {
    Accepted,
    Rejected {
        reason: String,
        open_slots: Vec<NaiveTime>,
    },
}

/// Decides whether `requested` can be booked given the other active
/// appointments of the same doctor on the same day.
pub fn evaluate_slot(
    policy: &SlotPolicy,
    requested: NaiveTime,
    booked: &[NaiveTime],
) -> SlotDecision {
    // Both edges of the working window are bookable.
    if requested < policy.opening || requested > policy.closing {
        return SlotDecision::Rejected {
            reason: format!(
                "Requested time {} is outside clinic hours ({} - {})",
                requested.format("%H:%M"),
                policy.opening.format("%H:%M"),
                policy.closing.format("%H:%M")
            ),
            open_slots: open_slots(policy, booked),
        };
    }

    if booked.len() >= policy.daily_cap {
        return SlotDecision::Rejected {
            reason: format!(
                "The daily limit of {} appointments has been reached",
                policy.daily_cap
            ),
            open_slots: open_slots(policy, booked),
        };
    }

    if let Some(conflict) = booked
        .iter()
        .find(|&&taken| gap_between(requested, taken) < policy.min_gap)
    {
        return SlotDecision::Rejected {
            reason: format!(
                "Requested time {} is within {} minutes of the appointment at {}",
                requested.format("%H:%M"),
                policy.min_gap.num_minutes(),
                conflict.format("%H:%M")
            ),
            open_slots: open_slots(policy, booked),
        };
    }

    SlotDecision::Accepted
}

/// Grid times in the working window that still satisfy the gap rule.
pub fn open_slots(policy: &SlotPolicy, booked: &[NaiveTime]) -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    let mut cursor = policy.opening;

    loop {
        if booked
            .iter()
            .all(|&taken| gap_between(cursor, taken) >= policy.min_gap)
        {
            slots.push(cursor);
        }

        let next = cursor + policy.granularity;
        if next > policy.closing || next <= cursor {
            break;
        }
        cursor = next;
    }

    slots
}

fn gap_between(a: NaiveTime, b: NaiveTime) -> Duration {
    let diff = a - b;
    if diff < Duration::zero() {
        -diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn accepts_free_slot() {
        let policy = SlotPolicy::default();
        assert_eq!(evaluate_slot(&policy, t(10, 0), &[]), SlotDecision::Accepted);
    }

    #[test]
    fn rejects_slot_within_gap() {
        let policy = SlotPolicy::default();
        let booked = vec![t(10, 0)];

        assert_matches!(
            evaluate_slot(&policy, t(10, 10), &booked),
            SlotDecision::Rejected { .. }
        );
    }

    #[test]
    fn accepts_slot_at_gap_boundary() {
        let policy = SlotPolicy::default();
        let booked = vec![t(10, 0)];

        // 20 minutes away, outside the 15-minute exclusion.
        assert_eq!(
            evaluate_slot(&policy, t(10, 20), &booked),
            SlotDecision::Accepted
        );
    }

    #[test]
    fn rejects_exact_duplicate_time() {
        let policy = SlotPolicy::default();
        let booked = vec![t(11, 0)];

        assert_matches!(
            evaluate_slot(&policy, t(11, 0), &booked),
            SlotDecision::Rejected { .. }
        );
    }

    #[test]
    fn window_edges_are_bookable() {
        let policy = SlotPolicy::default();

        assert_eq!(evaluate_slot(&policy, t(9, 30), &[]), SlotDecision::Accepted);
        assert_eq!(evaluate_slot(&policy, t(16, 0), &[]), SlotDecision::Accepted);
    }

    #[test]
    fn rejects_outside_window_regardless_of_load() {
        let policy = SlotPolicy::default();

        assert_matches!(
            evaluate_slot(&policy, t(8, 0), &[]),
            SlotDecision::Rejected { .. }
        );
        assert_matches!(
            evaluate_slot(&policy, t(17, 0), &[]),
            SlotDecision::Rejected { .. }
        );
    }

    #[test]
    fn rejects_when_daily_cap_reached() {
        let policy = SlotPolicy::default();
        // 20 bookings fill the cap; their exact times do not matter here.
        let booked: Vec<NaiveTime> = (0..20).map(|i| t(9, 30) + Duration::minutes(i * 20)).collect();

        let decision = evaluate_slot(&policy, t(12, 5), &booked);
        assert_matches!(
            decision,
            SlotDecision::Rejected { ref reason, .. } if reason.contains("daily limit")
        );
    }

    #[test]
    fn open_slots_follow_grid_and_gap() {
        let policy = SlotPolicy::default();
        let booked = vec![t(9, 30)];

        let slots = open_slots(&policy, &booked);
        // 09:30 and 09:45 fall inside the exclusion around the booking.
        assert!(!slots.contains(&t(9, 30)));
        assert!(!slots.contains(&t(9, 45)));
        assert!(slots.contains(&t(10, 0)));
        assert!(slots.contains(&t(16, 0)));
    }

    #[test]
    fn open_slots_cover_full_window_when_free() {
        let policy = SlotPolicy::default();
        let slots = open_slots(&policy, &[]);

        assert_eq!(slots.first(), Some(&t(9, 30)));
        assert_eq!(slots.last(), Some(&t(16, 0)));
        // 09:30 through 16:00 on a 15-minute grid is 27 slots.
        assert_eq!(slots.len(), 27);
    }
}

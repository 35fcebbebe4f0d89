//! Per-session pick timer.
//!
//! One ticker task per running draft broadcasts the countdown every
//! second. Expiry does not force a pick — the countdown simply reaches
//! zero and stays there. An auto-pick policy would hook in where the
//! countdown hits zero.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::gateway::events::{EventName, ServerFrame};
use crate::registry::Registry;
use crate::SessionId;

/// Later picks within a pack get less time: one fifteenth of the budget
/// is shaved off per pick.
const PICKS_PER_PACK_BUDGET: u32 = 15;
/// Countdown floor; even pick fifteen gets a few seconds.
const MIN_COUNTDOWN: u32 = 5;

#[derive(Debug, Default)]
pub struct PickTimer {
    pub remaining: u32,
    pub running: bool,
}

impl PickTimer {
    pub fn countdown_for(max_timer: u32, pick_number: u32) -> u32 {
        if max_timer == 0 {
            return 0;
        }
        max_timer
            .saturating_sub((max_timer / PICKS_PER_PACK_BUDGET) * pick_number)
            .max(MIN_COUNTDOWN)
    }

    /// Reset for a new pick; a zero budget keeps the timer off.
    pub fn reset(&mut self, max_timer: u32, pick_number: u32) {
        self.remaining = Self::countdown_for(max_timer, pick_number);
        self.running = max_timer > 0;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        if self.remaining > 0 {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.remaining = 0;
    }
}

/// Spawn the 1-second ticker for a session's draft. The task watches the
/// session itself: it exits when the session disappears or its draft
/// ends, so session destruction cancels the timer implicitly.
pub fn spawn_session_timer(registry: Arc<Registry>, session_id: SessionId) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(session) = registry.session(&session_id) else {
                return;
            };
            let mut session = session.lock();
            if !session.draft.is_drafting() {
                return;
            }
            if !session.timer.running {
                continue;
            }
            if session.timer.remaining > 0 {
                session.timer.remaining -= 1;
            }
            let countdown = session.timer.remaining;
            session.broadcast(
                &registry,
                ServerFrame::event(EventName::TIMER, &json!({ "countdown": countdown })),
            );
            if countdown == 0 {
                session.timer.running = false;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_shrinks_with_pick_number() {
        assert_eq!(PickTimer::countdown_for(75, 0), 75);
        assert_eq!(PickTimer::countdown_for(75, 1), 70);
        assert_eq!(PickTimer::countdown_for(75, 14), 5);
        // Clamped to the floor, never zero mid-pack.
        assert_eq!(PickTimer::countdown_for(75, 20), MIN_COUNTDOWN);
    }

    #[test]
    fn zero_budget_disables() {
        assert_eq!(PickTimer::countdown_for(0, 3), 0);
        let mut timer = PickTimer::default();
        timer.reset(0, 0);
        assert!(!timer.running);
    }

    #[test]
    fn pause_resume_round_trip() {
        let mut timer = PickTimer::default();
        timer.reset(60, 0);
        assert!(timer.running);
        timer.pause();
        assert!(!timer.running);
        timer.resume();
        assert!(timer.running);

        // A spent timer does not come back on resume.
        timer.stop();
        timer.resume();
        assert!(!timer.running);
    }
}

//! The two session timers.
//!
//! Wall-clock deadlines, no internal thread: the owner calls [`TimerSubsystem::due`]
//! with the current time and feeds each firing back through
//! [`TimerSubsystem::accept`] before acting on it.
//!
//! Every (re)start stamps the timer with a fresh generation. A firing carries
//! the generation it was scheduled under, so a firing collected before a
//! cancel or restart is recognised as stale and dropped.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Single-shot; locks the session when it fires.
    AutoLock,
    /// Repeating 1 Hz tick while the PIN is on screen.
    RevealCountdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerHandle {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerFiring {
    pub kind: TimerKind,
    pub generation: u64,
    pub due_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedTimer {
    generation: u64,
    next_due_ms: u64,
    /// `None` for single-shot timers.
    period_ms: Option<u64>,
    /// Single-shot firing already handed out by `due`.
    dispatched: bool,
}

#[derive(Debug, Clone)]
pub struct TimerSubsystem {
    auto_lock: Option<ArmedTimer>,
    reveal: Option<ArmedTimer>,
    next_generation: u64,
    auto_lock_ms: u64,
    tick_ms: u64,
}

pub const REVEAL_TICK_MS: u64 = 1000;

impl TimerSubsystem {
    pub fn new(auto_lock_ms: u64) -> Self {
        Self {
            auto_lock: None,
            reveal: None,
            next_generation: 1,
            auto_lock_ms,
            tick_ms: REVEAL_TICK_MS,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn handle(&self, kind: TimerKind) -> Option<TimerHandle> {
        self.slot(kind).map(|timer| TimerHandle {
            kind,
            generation: timer.generation,
        })
    }

    /// Next time (ms) at which `due` will return a firing.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        [self.auto_lock, self.reveal]
            .into_iter()
            .flatten()
            .filter(|timer| !timer.dispatched)
            .map(|timer| timer.next_due_ms)
            .min()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arms `kind`, replacing any outstanding instance of it.
    pub fn start(&mut self, kind: TimerKind, now_ms: u64) -> TimerHandle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let timer = match kind {
            TimerKind::AutoLock => ArmedTimer {
                generation,
                next_due_ms: now_ms.saturating_add(self.auto_lock_ms),
                period_ms: None,
                dispatched: false,
            },
            TimerKind::RevealCountdown => ArmedTimer {
                generation,
                next_due_ms: now_ms.saturating_add(self.tick_ms),
                period_ms: Some(self.tick_ms),
                dispatched: false,
            },
        };
        let previous = self.slot_mut(kind).replace(timer);

        tracing::debug!(
            timer = ?kind,
            generation,
            replaced = previous.map(|t| t.generation),
            due_at_ms = timer.next_due_ms,
            "Timer armed"
        );
        TimerHandle { kind, generation }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.slot_mut(kind).take() {
            tracing::debug!(timer = ?kind, generation = timer.generation, "Timer cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::AutoLock);
        self.cancel(TimerKind::RevealCountdown);
    }

    /// Collects every firing due at `now_ms`, ordered by due time.
    ///
    /// A repeating timer that fell behind yields one firing per missed
    /// period, so each tick is delivered as its own event.
    pub fn due(&mut self, now_ms: u64) -> Vec<TimerFiring> {
        let mut firings = Vec::new();

        if let Some(timer) = self.auto_lock.as_mut() {
            if !timer.dispatched && timer.next_due_ms <= now_ms {
                timer.dispatched = true;
                firings.push(TimerFiring {
                    kind: TimerKind::AutoLock,
                    generation: timer.generation,
                    due_at_ms: timer.next_due_ms,
                });
            }
        }

        if let Some(timer) = self.reveal.as_mut() {
            let period = timer.period_ms.unwrap_or(REVEAL_TICK_MS).max(1);
            while timer.next_due_ms <= now_ms {
                firings.push(TimerFiring {
                    kind: TimerKind::RevealCountdown,
                    generation: timer.generation,
                    due_at_ms: timer.next_due_ms,
                });
                timer.next_due_ms = timer.next_due_ms.saturating_add(period);
            }
        }

        // Stable: at equal due times the auto-lock comes first.
        firings.sort_by_key(|firing| firing.due_at_ms);
        firings
    }

    /// Returns `true` if `firing` belongs to the live instance of its timer.
    ///
    /// Accepting a single-shot firing disarms that timer.
    pub fn accept(&mut self, firing: &TimerFiring) -> bool {
        let kind = firing.kind;
        let Some(timer) = self.slot(kind) else {
            tracing::debug!(timer = ?kind, generation = firing.generation, "Dropped firing for cancelled timer");
            return false;
        };
        if timer.generation != firing.generation {
            tracing::debug!(
                timer = ?kind,
                stale = firing.generation,
                live = timer.generation,
                "Dropped stale timer firing"
            );
            return false;
        }
        if timer.period_ms.is_none() {
            self.slot_mut(kind).take();
        }
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn slot(&self, kind: TimerKind) -> Option<&ArmedTimer> {
        match kind {
            TimerKind::AutoLock => self.auto_lock.as_ref(),
            TimerKind::RevealCountdown => self.reveal.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<ArmedTimer> {
        match kind {
            TimerKind::AutoLock => &mut self.auto_lock,
            TimerKind::RevealCountdown => &mut self.reveal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_lock_fires_once_at_deadline() {
        let mut timers = TimerSubsystem::new(120_000);
        timers.start(TimerKind::AutoLock, 0);

        assert!(timers.due(119_999).is_empty());
        let firings = timers.due(120_000);
        assert_eq!(firings.len(), 1);
        assert!(timers.due(200_000).is_empty());

        assert!(timers.accept(&firings[0]));
        assert!(!timers.is_armed(TimerKind::AutoLock));
    }

    #[test]
    fn restart_replaces_instance_and_stales_old_firing() {
        let mut timers = TimerSubsystem::new(1000);
        let first = timers.start(TimerKind::AutoLock, 0);
        let firings = timers.due(1000);
        let second = timers.start(TimerKind::AutoLock, 1000);

        assert_ne!(first.generation, second.generation);
        assert!(!timers.accept(&firings[0]));
        assert!(timers.is_armed(TimerKind::AutoLock));
        assert_eq!(timers.next_deadline_ms(), Some(2000));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerSubsystem::new(1000);
        timers.start(TimerKind::RevealCountdown, 0);
        let firings = timers.due(1000);
        timers.cancel(TimerKind::RevealCountdown);

        assert!(!timers.accept(&firings[0]));
        assert!(timers.due(10_000).is_empty());
        assert_eq!(timers.next_deadline_ms(), None);
    }

    #[test]
    fn reveal_countdown_catches_up_one_tick_per_second() {
        let mut timers = TimerSubsystem::new(120_000);
        timers.start(TimerKind::RevealCountdown, 500);
        let firings = timers.due(3600);
        let due: Vec<u64> = firings.iter().map(|f| f.due_at_ms).collect();
        assert_eq!(due, vec![1500, 2500, 3500]);
        assert!(firings.iter().all(|f| timers.accept(f)));
        assert!(timers.is_armed(TimerKind::RevealCountdown));
        assert_eq!(timers.next_deadline_ms(), Some(4500));
    }

    #[test]
    fn firings_are_ordered_by_due_time() {
        let mut timers = TimerSubsystem::new(2500);
        timers.start(TimerKind::RevealCountdown, 0);
        timers.start(TimerKind::AutoLock, 0);
        let kinds: Vec<TimerKind> = timers.due(3000).iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimerKind::RevealCountdown,
                TimerKind::RevealCountdown,
                TimerKind::AutoLock,
                TimerKind::RevealCountdown,
            ]
        );
    }

    #[test]
    fn cancel_all_clears_both() {
        let mut timers = TimerSubsystem::new(1000);
        timers.start(TimerKind::AutoLock, 0);
        timers.start(TimerKind::RevealCountdown, 0);
        timers.cancel_all();
        assert!(timers.handle(TimerKind::AutoLock).is_none());
        assert!(timers.handle(TimerKind::RevealCountdown).is_none());
    }
}

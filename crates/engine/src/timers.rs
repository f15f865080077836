use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct ScheduledTimer<T> {
    id: TimerId,
    started_at: Duration,
    due_at: Duration,
    payload: T,
}

/// One-shot timers on the simulation clock.
///
/// The clock only moves when `advance` is called with the fixed step, so a
/// timer never fires while a frame is still being built. Each timer fires
/// exactly once and is then forgotten.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<ScheduledTimer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(ScheduledTimer {
            id,
            started_at: self.now,
            due_at: self.now.saturating_add(delay),
            payload,
        });
        id
    }

    /// Fraction of the delay elapsed, in `[0, 1]`. `None` once fired.
    pub fn progress(&self, id: TimerId) -> Option<f32> {
        let timer = self.pending.iter().find(|timer| timer.id == id)?;
        let total = timer.due_at.saturating_sub(timer.started_at);
        if total.is_zero() {
            return Some(1.0);
        }
        let elapsed = self.now.saturating_sub(timer.started_at);
        Some((elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0))
    }

    /// Moves the clock forward and returns the payloads that came due, in due order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due_at <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|timer| (timer.due_at, timer.id.0));
        due.into_iter().map(|timer| timer.payload).collect()
    }
}

use std::time::Duration;

use engine::{TileLayer, TimerId, TimerQueue};
use tracing::info;

use crate::tiles::STAIRS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionState {
    Playing,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionEvent {
    None,
    /// The player stepped onto the stairs; the fade has started.
    StairsReached,
    /// The fade finished; the level should be torn down and rebuilt.
    RebuildRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FadeFinished;

/// Watches the stairs trigger and runs the fade out of a level.
#[derive(Debug, Clone)]
pub struct LevelProgression {
    state: ProgressionState,
    fade_duration: Duration,
    timers: TimerQueue<FadeFinished>,
    fade_timer: Option<TimerId>,
    fade_finished: bool,
}

impl LevelProgression {
    /// Arms the one-shot stairs trigger on `stuff`.
    pub fn new(fade_duration: Duration, stuff: &mut TileLayer) -> Self {
        stuff.triggers_mut().arm(STAIRS);
        Self {
            state: ProgressionState::Playing,
            fade_duration,
            timers: TimerQueue::new(),
            fade_timer: None,
            fade_finished: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ProgressionState {
        self.state
    }

    /// Fade to black, `0.0` while playing up to `1.0` once the fade is done.
    pub fn fade_level(&self) -> f32 {
        if self.fade_finished {
            return 1.0;
        }
        self.fade_timer
            .and_then(|timer| self.timers.progress(timer))
            .unwrap_or(0.0)
    }

    pub fn update(
        &mut self,
        stuff: &mut TileLayer,
        player_tile: (i32, i32),
        dt: Duration,
    ) -> ProgressionEvent {
        let mut event = ProgressionEvent::None;
        for FadeFinished in self.timers.advance(dt) {
            self.fade_finished = true;
            self.fade_timer = None;
            event = ProgressionEvent::RebuildRequested;
        }
        if event != ProgressionEvent::None {
            return event;
        }

        if self.state == ProgressionState::Playing
            && stuff.fire_trigger_at(player_tile.0, player_tile.1) == Some(STAIRS)
        {
            self.state = ProgressionState::Transitioning;
            self.fade_timer = Some(self.timers.schedule(self.fade_duration, FadeFinished));
            info!(
                tile_x = player_tile.0,
                tile_y = player_tile.1,
                fade_ms = self.fade_duration.as_millis() as u64,
                "fade_started"
            );
            return ProgressionEvent::StairsReached;
        }
        ProgressionEvent::None
    }
}

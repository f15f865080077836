use std::collections::HashSet;

use engine::TileLayer;
use tracing::debug;

use crate::dungeon::{Dungeon, RoomId};
use crate::tiles::BLANK;

pub const HIDDEN_ALPHA: f32 = 1.0;
pub const ACTIVE_ALPHA: f32 = 0.0;
pub const REVEALED_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    Active,
    Revealed,
}

impl VisibilityState {
    pub fn shadow_alpha(self) -> f32 {
        match self {
            VisibilityState::Hidden => HIDDEN_ALPHA,
            VisibilityState::Active => ACTIVE_ALPHA,
            VisibilityState::Revealed => REVEALED_ALPHA,
        }
    }
}

/// Fog of war over the shadow layer. At most one room is active; rooms the
/// player has left stay dimmed rather than going dark again.
#[derive(Debug, Clone)]
pub struct RoomVisibility {
    states: Vec<VisibilityState>,
    active: Option<RoomId>,
    visited: HashSet<RoomId>,
    repaints: usize,
}

impl RoomVisibility {
    /// Covers the whole shadow layer in opaque fog.
    pub fn new(dungeon: &Dungeon, shadow: &mut TileLayer) -> Self {
        let (width, height) = (shadow.width() as i32, shadow.height() as i32);
        shadow.fill(BLANK, 0, 0, width, height);
        shadow.set_alpha(0, 0, width, height, HIDDEN_ALPHA);
        Self {
            states: vec![VisibilityState::Hidden; dungeon.room_count()],
            active: None,
            visited: HashSet::new(),
            repaints: 0,
        }
    }

    pub fn state(&self, room: RoomId) -> Option<VisibilityState> {
        self.states.get(room.0).copied()
    }

    #[cfg(test)]
    pub(crate) fn active_room(&self) -> Option<RoomId> {
        self.active
    }

    #[cfg(test)]
    pub(crate) fn has_visited(&self, room: RoomId) -> bool {
        self.visited.contains(&room)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of room repaints issued against the shadow layer.
    pub fn repaint_count(&self) -> usize {
        self.repaints
    }

    /// Returns `false` when `room` is already the active room; nothing is
    /// repainted in that case.
    pub fn set_active_room(
        &mut self,
        room: Option<RoomId>,
        dungeon: &Dungeon,
        shadow: &mut TileLayer,
    ) -> bool {
        if room == self.active {
            return false;
        }

        if let Some(previous) = self.active.take() {
            self.transition(previous, VisibilityState::Revealed, dungeon, shadow);
        }
        if let Some(next) = room {
            if self.transition(next, VisibilityState::Active, dungeon, shadow) {
                self.active = Some(next);
                self.visited.insert(next);
            }
        }
        debug!(active = ?self.active, visited = self.visited.len(), "active_room_changed");
        true
    }

    fn transition(
        &mut self,
        id: RoomId,
        state: VisibilityState,
        dungeon: &Dungeon,
        shadow: &mut TileLayer,
    ) -> bool {
        let (Some(slot), Some(room)) = (self.states.get_mut(id.0), dungeon.room(id)) else {
            return false;
        };
        *slot = state;
        shadow.set_alpha(
            room.x(),
            room.y(),
            room.width(),
            room.height(),
            state.shadow_alpha(),
        );
        self.repaints += 1;
        true
    }
}

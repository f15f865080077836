use std::collections::HashMap;

/// One-shot triggers keyed by tile index.
///
/// A trigger fires at most once per arming: `take` reports the fire and
/// disarms in the same call, so a second occupant of the tile sees nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTriggers {
    armed: HashMap<u16, bool>,
}

impl TileTriggers {
    pub fn arm(&mut self, tile: u16) {
        self.armed.insert(tile, true);
    }

    pub fn disarm(&mut self, tile: u16) {
        if let Some(armed) = self.armed.get_mut(&tile) {
            *armed = false;
        }
    }

    pub fn is_armed(&self, tile: u16) -> bool {
        self.armed.get(&tile).copied().unwrap_or(false)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.values().filter(|armed| **armed).count()
    }

    /// Fires and disarms in one step.
    pub fn take(&mut self, tile: u16) -> bool {
        let fired = self.is_armed(tile);
        if fired {
            self.disarm(tile);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_fires_once_then_stays_disarmed() {
        let mut triggers = TileTriggers::default();
        triggers.arm(81);

        assert!(triggers.take(81));
        assert!(!triggers.take(81));
        assert!(!triggers.is_armed(81));
    }

    #[test]
    fn unknown_tiles_never_fire() {
        let mut triggers = TileTriggers::default();
        assert!(!triggers.take(5));
        triggers.disarm(5);
        assert_eq!(triggers.armed_count(), 0);
    }

    #[test]
    fn rearm_after_disarm() {
        let mut triggers = TileTriggers::default();
        triggers.arm(81);
        triggers.disarm(81);
        assert!(!triggers.take(81));
        triggers.arm(81);
        assert!(triggers.take(81));
    }
}

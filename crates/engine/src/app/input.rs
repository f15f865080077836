use super::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Input state sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    /// Unit-length movement direction, y growing downward. Opposing keys cancel.
    pub fn movement_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_down(InputAction::MoveLeft) {
            axis.x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            axis.x += 1.0;
        }
        if self.is_down(InputAction::MoveUp) {
            axis.y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            axis.y += 1.0;
        }
        axis.normalized_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_movement() {
        assert_eq!(InputSnapshot::empty().movement_axis(), Vec2::ZERO);
    }

    #[test]
    fn opposing_keys_cancel() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true);
        assert_eq!(snapshot.movement_axis(), Vec2::ZERO);
    }

    #[test]
    fn diagonal_is_normalized() {
        let axis = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveRight, true)
            .movement_axis();
        assert!((axis.length() - 1.0).abs() < 1e-5);
        assert!(axis.x > 0.0 && axis.y < 0.0);
    }
}

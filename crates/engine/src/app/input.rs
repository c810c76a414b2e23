use crate::sim::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
    Quit,
}

const ACTION_COUNT: usize = 5;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Dash => 3,
            InputAction::Quit => 4,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "move_left" | "left" => Some(InputAction::MoveLeft),
            "move_right" | "right" => Some(InputAction::MoveRight),
            "jump" => Some(InputAction::Jump),
            "dash" => Some(InputAction::Dash),
            "quit" => Some(InputAction::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

/// Input seen by one simulation tick: held buttons plus presses since the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
    jump_pressed: bool,
    dash_pressed: bool,
    quit_requested: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self) -> Self {
        self.jump_pressed = true;
        self
    }

    pub fn with_dash_pressed(mut self) -> Self {
        self.dash_pressed = true;
        self
    }

    pub fn with_quit_requested(mut self) -> Self {
        self.quit_requested = true;
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn dash_pressed(&self) -> bool {
        self.dash_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Horizontal intent in `{-1, 0, 1}`; holding both directions cancels out.
    pub fn movement(&self) -> Vec2 {
        let right = self.is_down(InputAction::MoveRight) as i32;
        let left = self.is_down(InputAction::MoveLeft) as i32;
        Vec2::new((right - left) as f32, 0.0)
    }
}

/// Accumulates button transitions between ticks.
#[derive(Debug, Default)]
pub struct InputCollector {
    actions: ActionStates,
    jump_pressed_edge: bool,
    dash_pressed_edge: bool,
    quit_requested: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_action(&mut self, action: InputAction, is_down: bool) {
        let was_down = self.actions.is_down(action);
        self.actions.set(action, is_down);
        if !is_down || was_down {
            return;
        }
        match action {
            InputAction::Jump => self.jump_pressed_edge = true,
            InputAction::Dash => self.dash_pressed_edge = true,
            InputAction::Quit => self.quit_requested = true,
            InputAction::MoveLeft | InputAction::MoveRight => {}
        }
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    /// Press edges are handed out once and then cleared; held state and quit persist.
    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            actions: self.actions,
            jump_pressed: self.jump_pressed_edge,
            dash_pressed: self.dash_pressed_edge,
            quit_requested: self.quit_requested,
        };
        self.jump_pressed_edge = false;
        self.dash_pressed_edge = false;
        snapshot
    }
}

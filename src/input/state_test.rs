use crate::{
    drivers::joystick::hid_report::Direction,
    input::{
        command::{Axis, Command},
        state::JoystickState,
    },
};

/// Apply every character of `keys` that maps to a command
fn apply_keys(state: &mut JoystickState, keys: &str) {
    for c in keys.chars() {
        if let Some(cmd) = Command::from_char(c) {
            state.apply(cmd);
        }
    }
}

#[test]
fn test_command_bindings() {
    assert_eq!(Command::from_char('1'), Some(Command::ToggleButton));
    assert_eq!(
        Command::from_char('2'),
        Some(Command::SetDpad(Direction::Down))
    );
    assert_eq!(
        Command::from_char('4'),
        Some(Command::SetDpad(Direction::Left))
    );
    assert_eq!(
        Command::from_char('5'),
        Some(Command::SetDpad(Direction::Centered))
    );
    assert_eq!(
        Command::from_char('6'),
        Some(Command::SetDpad(Direction::Right))
    );
    assert_eq!(
        Command::from_char('8'),
        Some(Command::SetDpad(Direction::Up))
    );
    assert_eq!(
        Command::from_char('a'),
        Some(Command::MoveAxis(Axis::Horizontal, -1))
    );
    assert_eq!(
        Command::from_char('w'),
        Some(Command::MoveAxis(Axis::Vertical, 1))
    );
    assert_eq!(Command::from_char('q'), Some(Command::Quit));

    for c in ['0', '3', '7', '9', 'x', 'A', 'Q', ' ', '\n'] {
        assert_eq!(Command::from_char(c), None, "{c:?} should not be bound");
    }
}

#[test]
fn test_dpad_codes() {
    let cases = [('2', 5), ('4', 7), ('5', 0), ('6', 3), ('8', 1)];
    for (key, code) in cases {
        let mut state = JoystickState::default();
        apply_keys(&mut state, &key.to_string());
        assert_eq!(state.dpad as u8, code, "key {key}");
    }
}

#[test]
fn test_dpad_overwrites() {
    let mut state = JoystickState::default();
    apply_keys(&mut state, "68");
    assert_eq!(state.dpad, Direction::Up);
    apply_keys(&mut state, "5");
    assert_eq!(state.dpad, Direction::Centered);
}

#[test]
fn test_axis_steps() {
    let mut state = JoystickState::default();
    apply_keys(&mut state, "dd");
    assert_eq!(state.horizontal, 40);
    apply_keys(&mut state, "a");
    assert_eq!(state.horizontal, 20);
    apply_keys(&mut state, "ss");
    assert_eq!(state.vertical, -40);
    apply_keys(&mut state, "w");
    assert_eq!(state.vertical, -20);
}

#[test]
fn test_axis_clamp() {
    let mut state = JoystickState::default();
    apply_keys(&mut state, &"a".repeat(20));
    assert_eq!(state.horizontal, -100);
    apply_keys(&mut state, &"d".repeat(20));
    assert_eq!(state.horizontal, 100);
    apply_keys(&mut state, &"s".repeat(20));
    assert_eq!(state.vertical, -100);
    apply_keys(&mut state, &"w".repeat(20));
    assert_eq!(state.vertical, 100);
}

#[test]
fn test_repeated_commands_are_idempotent() {
    for key in ["2", "4", "5", "6", "8"] {
        let mut once = JoystickState::default();
        apply_keys(&mut once, key);
        let mut twice = JoystickState::default();
        apply_keys(&mut twice, &key.repeat(2));
        assert_eq!(once, twice, "key {key}");
    }

    // Axis commands settle once they reach the end of the range
    let mut state = JoystickState::default();
    apply_keys(&mut state, &"d".repeat(5));
    let settled = state;
    apply_keys(&mut state, "d");
    assert_eq!(state, settled);
}

#[test]
fn test_button_toggles() {
    let mut state = JoystickState::default();
    apply_keys(&mut state, "1");
    assert!(state.button_pressed);
    apply_keys(&mut state, "1");
    assert!(!state.button_pressed);
    assert_eq!(state, JoystickState::default());
}

#[test]
fn test_quit_leaves_state() {
    let mut state = JoystickState::default();
    apply_keys(&mut state, "16d");
    let before = state;
    state.apply(Command::Quit);
    assert_eq!(state, before);
}

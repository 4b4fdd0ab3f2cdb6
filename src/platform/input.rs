//! Keyboard mapping shared by the frontends

use crate::sim::{DotColor, TickInput};

/// What a key press asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(DotColor),
    Pause,
    Restart,
    Quit,
}

/// Map a key name (DOM `KeyboardEvent.key` spelling) to a command
pub fn command_for_key(key: &str) -> Option<Command> {
    match key {
        "r" | "R" => Some(Command::Press(DotColor::Red)),
        "g" | "G" => Some(Command::Press(DotColor::Green)),
        "b" | "B" => Some(Command::Press(DotColor::Blue)),
        "p" | "P" => Some(Command::Pause),
        " " | "Spacebar" => Some(Command::Restart),
        "Escape" | "Esc" => Some(Command::Quit),
        _ => None,
    }
}

impl Command {
    /// Fold into the input for the next tick. `Quit` is the frontend's job.
    pub fn apply(self, input: &mut TickInput) {
        match self {
            Command::Press(color) => input.presses.push(color),
            Command::Pause => input.pause = !input.pause,
            Command::Restart => input.restart = true,
            Command::Quit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_keys_either_case() {
        assert_eq!(command_for_key("r"), Some(Command::Press(DotColor::Red)));
        assert_eq!(command_for_key("G"), Some(Command::Press(DotColor::Green)));
        assert_eq!(command_for_key("b"), Some(Command::Press(DotColor::Blue)));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(command_for_key("p"), Some(Command::Pause));
        assert_eq!(command_for_key(" "), Some(Command::Restart));
        assert_eq!(command_for_key("Escape"), Some(Command::Quit));
        assert_eq!(command_for_key("x"), None);
        assert_eq!(command_for_key("Enter"), None);
    }

    #[test]
    fn test_apply_accumulates_presses() {
        let mut input = TickInput::default();
        Command::Press(DotColor::Red).apply(&mut input);
        Command::Press(DotColor::Blue).apply(&mut input);
        Command::Restart.apply(&mut input);
        assert_eq!(input.presses, vec![DotColor::Red, DotColor::Blue]);
        assert!(input.restart);
    }

    #[test]
    fn test_double_pause_in_one_frame_cancels() {
        let mut input = TickInput::default();
        Command::Pause.apply(&mut input);
        assert!(input.pause);
        Command::Pause.apply(&mut input);
        assert!(!input.pause);
    }
}

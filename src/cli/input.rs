//! Keyboard commands read from stdin while a countdown runs.

use crate::types::AppState;

/// A single-key command typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Start (or resume) ticking
    Start,
    /// Stop ticking
    Stop,
    /// Restore the configured duration
    Reset,
    /// Pretend the app moved to the background
    Background,
    /// Pretend the app returned to the foreground
    Foreground,
    /// Leave the countdown
    Quit,
}

impl KeyCommand {
    /// Parses one input line; surrounding whitespace and case are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Some(Self::Start),
            "p" | "stop" => Some(Self::Stop),
            "r" | "reset" => Some(Self::Reset),
            "b" | "background" => Some(Self::Background),
            "f" | "foreground" => Some(Self::Foreground),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Lifecycle transition simulated by this command, if any.
    pub fn app_state(&self) -> Option<AppState> {
        match self {
            Self::Background => Some(AppState::Background),
            Self::Foreground => Some(AppState::Active),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_keys() {
        assert_eq!(KeyCommand::parse("s"), Some(KeyCommand::Start));
        assert_eq!(KeyCommand::parse("p"), Some(KeyCommand::Stop));
        assert_eq!(KeyCommand::parse("r"), Some(KeyCommand::Reset));
        assert_eq!(KeyCommand::parse("b"), Some(KeyCommand::Background));
        assert_eq!(KeyCommand::parse("f"), Some(KeyCommand::Foreground));
        assert_eq!(KeyCommand::parse("q"), Some(KeyCommand::Quit));
    }

    #[test]
    fn test_parse_words_and_whitespace() {
        assert_eq!(KeyCommand::parse("  Reset\n"), Some(KeyCommand::Reset));
        assert_eq!(KeyCommand::parse("QUIT"), Some(KeyCommand::Quit));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(KeyCommand::parse(""), None);
        assert_eq!(KeyCommand::parse("x"), None);
    }

    #[test]
    fn test_app_state() {
        assert_eq!(KeyCommand::Background.app_state(), Some(AppState::Background));
        assert_eq!(KeyCommand::Foreground.app_state(), Some(AppState::Active));
        assert_eq!(KeyCommand::Start.app_state(), None);
    }
}

//! Event handling module
//!
//! Uses crossterm for terminal event handling.

use crossterm::{
    ExecutableCommand,
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
};
use std::time::Duration;

/// Event poll interval (milliseconds); also the worker-drain cadence
const TICK_RATE: u64 = 50;

/// Event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Home key
    Home,
    /// End key
    End,
    /// Character input
    Char(char),
    /// Pasted text (bracketed paste)
    Paste(String),
    /// Ctrl+C exit
    CtrlC,
    /// Window resize
    Resize(u16, u16),
    /// No event (timeout)
    None,
}

impl From<Event> for TuiEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key_event) => key_event.into(),
            Event::Resize(width, height) => TuiEvent::Resize(width, height),
            Event::Paste(text) => TuiEvent::Paste(text),
            Event::Mouse(_) => TuiEvent::None,
            Event::FocusGained => TuiEvent::None,
            Event::FocusLost => TuiEvent::None,
        }
    }
}

impl From<KeyEvent> for TuiEvent {
    fn from(key: KeyEvent) -> Self {
        // Ignore release/repeat events
        if key.kind != KeyEventKind::Press {
            return TuiEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            return TuiEvent::CtrlC;
        }

        match key.code {
            KeyCode::Esc => TuiEvent::Escape,
            KeyCode::Enter => TuiEvent::Enter,
            KeyCode::Up => TuiEvent::Up,
            KeyCode::Down => TuiEvent::Down,
            KeyCode::Left => TuiEvent::Left,
            KeyCode::Right => TuiEvent::Right,
            KeyCode::Tab | KeyCode::BackTab => TuiEvent::Tab,
            KeyCode::Backspace => TuiEvent::Backspace,
            KeyCode::Delete => TuiEvent::Delete,
            KeyCode::Home => TuiEvent::Home,
            KeyCode::End => TuiEvent::End,
            KeyCode::Char(c) => TuiEvent::Char(c),
            _ => TuiEvent::None,
        }
    }
}

/// Event poller
#[derive(Debug)]
pub struct EventPoll {
    tick_rate: Duration,
}

impl EventPoll {
    /// Create new event poller
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for the next event
    pub fn next(&self) -> TuiEvent {
        if event::poll(self.tick_rate).unwrap_or(false) {
            event::read().map(TuiEvent::from).unwrap_or(TuiEvent::None)
        } else {
            TuiEvent::None
        }
    }
}

impl Default for EventPoll {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE))
    }
}

/// Enable bracketed paste mode so pasted paths arrive in one piece
pub fn enable_bracketed_paste() -> std::io::Result<()> {
    std::io::stdout().execute(EnableBracketedPaste)?;
    Ok(())
}

/// Disable bracketed paste mode
pub fn disable_bracketed_paste() -> std::io::Result<()> {
    std::io::stdout().execute(DisableBracketedPaste)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            TuiEvent::from(press(KeyCode::Enter, KeyModifiers::NONE)),
            TuiEvent::Enter
        );
        assert_eq!(
            TuiEvent::from(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            TuiEvent::CtrlC
        );
        assert_eq!(
            TuiEvent::from(press(KeyCode::Char('c'), KeyModifiers::NONE)),
            TuiEvent::Char('c')
        );
        assert_eq!(
            TuiEvent::from(press(KeyCode::F(1), KeyModifiers::NONE)),
            TuiEvent::None
        );
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(TuiEvent::from(key), TuiEvent::None);
    }

    #[test]
    fn test_paste() {
        assert_eq!(
            TuiEvent::from(Event::Paste("/tmp/docs".to_string())),
            TuiEvent::Paste("/tmp/docs".to_string())
        );
    }
}

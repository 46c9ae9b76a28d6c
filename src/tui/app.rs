//! TUI application main module
//!
//! Owns the terminal and runs the foreground loop. Each tick drains the
//! worker's events through the controller, redraws when something changed,
//! and feeds the next key press to [`handle_event`].

use crate::controller::{Controller, SelectionDialog};
use crate::tui::event::{self, EventPoll, TuiEvent};
use crate::tui::state::{AppState, ConfirmButton, InputState, MenuItem, Screen};
use crate::tui::ui::render;
use crate::worker;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// TUI application
pub struct TuiApp {
    /// Terminal
    terminal: DefaultTerminal,
    /// Event poller
    event_poll: EventPoll,
    /// UI state
    state: AppState,
    /// Selection and worker state
    controller: Controller,
    /// Folder/file pickers
    dialog: Box<dyn SelectionDialog>,
}

impl TuiApp {
    /// Create new TUI application; switches the terminal to raw mode
    pub fn new(controller: Controller, dialog: Box<dyn SelectionDialog>) -> Self {
        let terminal = ratatui::init();
        // Chained after the terminal-restoring hook installed by `init`
        worker::route_worker_panics_to_log();
        if let Err(e) = event::enable_bracketed_paste() {
            warn!(error = %e, "Bracketed paste unavailable");
        }

        Self {
            terminal,
            event_poll: EventPoll::default(),
            state: AppState::default(),
            controller,
            dialog,
        }
    }

    /// Set log path
    pub fn set_log_path(&mut self, path: PathBuf) {
        self.state.log_path = Some(path);
    }

    /// Run until the user exits. Any live run is cancelled and joined first.
    pub fn run(mut self) -> std::io::Result<()> {
        let result = self.event_loop();

        self.controller.shutdown();
        let _ = event::disable_bracketed_paste();
        ratatui::restore();

        result
    }

    fn event_loop(&mut self) -> std::io::Result<()> {
        let mut dirty = true;

        loop {
            if self.controller.poll() {
                self.state.sync_screen(&self.controller);
                dirty = true;
            }

            if dirty {
                render(&mut self.terminal, &mut self.state, &self.controller)?;
                dirty = false;
            }

            match self.event_poll.next() {
                TuiEvent::None => {}
                TuiEvent::Resize(_, _) => dirty = true,
                event => {
                    if handle_event(
                        &mut self.state,
                        &mut self.controller,
                        self.dialog.as_ref(),
                        event,
                    ) {
                        info!("Interactive session closed");
                        return Ok(());
                    }
                    dirty = true;
                }
            }
        }
    }
}

/// Apply one input event. Returns true when the application should exit.
///
/// An open dialog is modal: it swallows every key until dismissed.
pub fn handle_event(
    state: &mut AppState,
    controller: &mut Controller,
    dialog: &dyn SelectionDialog,
    event: TuiEvent,
) -> bool {
    if event == TuiEvent::CtrlC {
        state.should_exit = true;
        return true;
    }

    if controller.current_dialog().is_some() {
        if matches!(
            event,
            TuiEvent::Enter | TuiEvent::Escape | TuiEvent::Char(' ')
        ) {
            controller.dismiss_dialog();
        }
        return false;
    }

    let exit = match state.screen {
        Screen::MainMenu => handle_main_menu(state, controller, dialog, event),
        Screen::PathInput => {
            handle_path_input(state, controller, event);
            false
        }
        Screen::Confirm => {
            handle_confirm(state, controller, event);
            false
        }
        Screen::Exit => handle_exit(state, event),
    };

    state.sync_screen(controller);
    exit
}

fn handle_main_menu(
    state: &mut AppState,
    controller: &mut Controller,
    dialog: &dyn SelectionDialog,
    event: TuiEvent,
) -> bool {
    match event {
        TuiEvent::Up | TuiEvent::Left => state.menu_state.prev(),
        TuiEvent::Down | TuiEvent::Right | TuiEvent::Tab => state.menu_state.next(),
        TuiEvent::Enter => match state.menu_state.selected_item() {
            MenuItem::SelectFolder => {
                controller.select_folder(dialog);
            }
            MenuItem::SelectFiles => {
                controller.select_files(dialog);
            }
            MenuItem::EnterPath => {
                let default_folder = controller.config().default_folder.display().to_string();
                state.input_state = InputState::with_value(&default_folder);
                state.screen = Screen::PathInput;
            }
            MenuItem::Exit => state.screen = Screen::Exit,
        },
        TuiEvent::Escape | TuiEvent::Char('q') => state.screen = Screen::Exit,
        _ => {}
    }
    false
}

fn handle_path_input(state: &mut AppState, controller: &mut Controller, event: TuiEvent) {
    let input = &mut state.input_state;
    match event {
        TuiEvent::Char(c) => input.insert_char(c),
        TuiEvent::Paste(text) => input.insert_pasted(&text),
        TuiEvent::Backspace => input.delete_before_cursor(),
        TuiEvent::Delete => input.delete_after_cursor(),
        TuiEvent::Left => input.move_cursor_left(),
        TuiEvent::Right => input.move_cursor_right(),
        TuiEvent::Home => input.move_cursor_to_start(),
        TuiEvent::End => input.move_cursor_to_end(),
        TuiEvent::Enter => {
            let text = input.value().to_string();
            if controller.select_path(&text) {
                input.clear();
            }
        }
        TuiEvent::Escape => state.reset_to_main_menu(),
        _ => {}
    }
}

fn handle_confirm(state: &mut AppState, controller: &mut Controller, event: TuiEvent) {
    match event {
        TuiEvent::Left | TuiEvent::Right | TuiEvent::Tab => {
            if !controller.is_running() {
                state.focused_button = state.focused_button.toggle();
            }
        }
        TuiEvent::Enter => match state.focused_button {
            ConfirmButton::Start => {
                if controller.start_conversion() {
                    debug!("Run started from confirmation screen");
                }
            }
            ConfirmButton::Cancel => controller.cancel(),
        },
        TuiEvent::Char('s') | TuiEvent::Char('S') => {
            controller.start_conversion();
        }
        TuiEvent::Escape | TuiEvent::Char('c') | TuiEvent::Char('C') => controller.cancel(),
        _ => {}
    }
}

fn handle_exit(state: &mut AppState, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Char('y') | TuiEvent::Char('Y') | TuiEvent::Enter => {
            state.should_exit = true;
            true
        }
        TuiEvent::Char('n') | TuiEvent::Char('N') | TuiEvent::Escape => {
            state.reset_to_main_menu();
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::DialogKind;
    use crate::selection::InputSelection;
    use crate::worker::tests::RecordingConverter;
    use std::fs;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    struct FolderPick(Option<PathBuf>);

    impl SelectionDialog for FolderPick {
        fn pick_folder(&self) -> Option<PathBuf> {
            self.0.clone()
        }

        fn pick_files(&self, _extension: &str) -> Option<Vec<PathBuf>> {
            None
        }
    }

    fn setup() -> (AppState, Controller, Arc<RecordingConverter>) {
        let converter = Arc::new(RecordingConverter::default());
        let controller = Controller::new(Config::default(), converter.clone());
        (AppState::default(), controller, converter)
    }

    fn press(
        state: &mut AppState,
        controller: &mut Controller,
        dialog: &dyn SelectionDialog,
        events: &[TuiEvent],
    ) -> bool {
        events
            .iter()
            .any(|event| handle_event(state, controller, dialog, event.clone()))
    }

    fn wait_until_idle(state: &mut AppState, controller: &mut Controller) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !controller.is_idle() {
            assert!(Instant::now() < deadline, "run did not finish");
            if controller.poll() {
                state.sync_screen(controller);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        state.sync_screen(controller);
    }

    #[test]
    fn test_folder_flow_end_to_end() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.docx"), b"x").unwrap();
        fs::write(dir.path().join("b.docx"), b"x").unwrap();
        let (mut state, mut controller, converter) = setup();
        let dialog = FolderPick(Some(dir.path().to_path_buf()));

        press(&mut state, &mut controller, &dialog, &[TuiEvent::Enter]);
        assert_eq!(state.screen, Screen::Confirm);
        assert_eq!(state.focused_button, ConfirmButton::Start);

        press(&mut state, &mut controller, &dialog, &[TuiEvent::Enter]);
        wait_until_idle(&mut state, &mut controller);

        assert_eq!(state.screen, Screen::MainMenu);
        assert_eq!(converter.calls().len(), 2);
        assert_eq!(controller.current_dialog().unwrap().kind, DialogKind::Success);

        // The dialog is modal: arrows do not move the menu
        press(&mut state, &mut controller, &dialog, &[TuiEvent::Down]);
        assert_eq!(state.menu_state.selected_item(), MenuItem::SelectFolder);

        press(&mut state, &mut controller, &dialog, &[TuiEvent::Enter]);
        assert!(controller.current_dialog().is_none());
    }

    #[test]
    fn test_dismissed_picker_keeps_main_menu() {
        let (mut state, mut controller, _) = setup();
        let dialog = FolderPick(None);

        press(&mut state, &mut controller, &dialog, &[TuiEvent::Enter]);
        assert_eq!(state.screen, Screen::MainMenu);
        assert!(controller.is_idle());
    }

    #[test]
    fn test_cancel_button_returns_to_menu() {
        let dir = tempdir().unwrap();
        let (mut state, mut controller, converter) = setup();
        let dialog = FolderPick(Some(dir.path().to_path_buf()));

        press(
            &mut state,
            &mut controller,
            &dialog,
            &[TuiEvent::Enter, TuiEvent::Right, TuiEvent::Enter],
        );
        assert_eq!(state.screen, Screen::MainMenu);
        assert!(controller.is_idle());
        assert!(converter.calls().is_empty());
    }

    #[test]
    fn test_typed_path_reaches_confirmation() {
        let dir = tempdir().unwrap();
        let (mut state, mut controller, _) = setup();
        let dialog = FolderPick(None);

        press(
            &mut state,
            &mut controller,
            &dialog,
            &[TuiEvent::Down, TuiEvent::Down, TuiEvent::Enter],
        );
        assert_eq!(state.screen, Screen::PathInput);
        assert_eq!(state.input_state.value(), "./files");

        state.input_state.clear();
        let path = dir.path().display().to_string();
        press(
            &mut state,
            &mut controller,
            &dialog,
            &[TuiEvent::Paste(format!("'{}'", path)), TuiEvent::Enter],
        );
        assert_eq!(state.screen, Screen::Confirm);
        assert_eq!(
            controller.selection(),
            Some(&InputSelection::Folder(dir.path().to_path_buf()))
        );
    }

    #[test]
    fn test_bad_typed_path_shows_error() {
        let (mut state, mut controller, _) = setup();
        let dialog = FolderPick(None);
        state.screen = Screen::PathInput;
        state.input_state = InputState::with_value("/no/such/place");

        press(&mut state, &mut controller, &dialog, &[TuiEvent::Enter]);
        assert_eq!(state.screen, Screen::PathInput);
        assert_eq!(controller.current_dialog().unwrap().kind, DialogKind::Error);
    }

    #[test]
    fn test_exit_confirmation() {
        let (mut state, mut controller, _) = setup();
        let dialog = FolderPick(None);

        assert!(!press(&mut state, &mut controller, &dialog, &[TuiEvent::Escape]));
        assert_eq!(state.screen, Screen::Exit);
        assert!(!press(&mut state, &mut controller, &dialog, &[TuiEvent::Char('n')]));
        assert_eq!(state.screen, Screen::MainMenu);

        assert!(press(
            &mut state,
            &mut controller,
            &dialog,
            &[TuiEvent::Char('q'), TuiEvent::Char('y')]
        ));
        assert!(state.should_exit);
    }

    #[test]
    fn test_ctrl_c_exits_anywhere() {
        let (mut state, mut controller, _) = setup();
        state.screen = Screen::PathInput;
        assert!(handle_event(
            &mut state,
            &mut controller,
            &FolderPick(None),
            TuiEvent::CtrlC
        ));
    }
}

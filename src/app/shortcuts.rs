//! Window-wide keyboard shortcuts

use super::App;
use crate::session::Event;
use eframe::egui;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Open,
    Reset,
    Identify,
}

/// Shortcut bound to a key press. All of them need the command modifier
/// (Ctrl, or Cmd on macOS) and nothing else.
pub fn shortcut_for(modifiers: egui::Modifiers, key: egui::Key) -> Option<Shortcut> {
    if !modifiers.command || modifiers.alt || modifiers.shift {
        return None;
    }
    match key {
        egui::Key::O => Some(Shortcut::Open),
        egui::Key::R => Some(Shortcut::Reset),
        egui::Key::Enter => Some(Shortcut::Identify),
        _ => None,
    }
}

/// Identification waits for a file that is still decoding, same as the
/// sidebar button
fn shortcut_enabled(shortcut: Shortcut, loading_file: bool) -> bool {
    !(loading_file && shortcut == Shortcut::Identify)
}

impl App {
    pub(crate) fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // The reset modal owns the keyboard while it is open
        if self.session.confirm_reset_pending() {
            return;
        }
        let pressed: Vec<Shortcut> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, repeat: false, modifiers, .. } => {
                        shortcut_for(*modifiers, *key)
                    }
                    _ => None,
                })
                .collect()
        });

        for shortcut in pressed {
            if !shortcut_enabled(shortcut, self.is_loading_file()) {
                debug!(?shortcut, "Shortcut ignored while a file is loading");
                continue;
            }
            match shortcut {
                Shortcut::Open => self.open_file_dialog(),
                Shortcut::Reset => self.dispatch(Event::ResetRequested),
                Shortcut::Identify => self.dispatch(Event::TriggerRequested),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Key, Modifiers};

    #[test]
    fn command_modifier_is_required() {
        assert_eq!(shortcut_for(Modifiers::COMMAND, Key::O), Some(Shortcut::Open));
        assert_eq!(shortcut_for(Modifiers::COMMAND, Key::R), Some(Shortcut::Reset));
        assert_eq!(shortcut_for(Modifiers::COMMAND, Key::Enter), Some(Shortcut::Identify));
        assert_eq!(shortcut_for(Modifiers::NONE, Key::O), None);
        assert_eq!(shortcut_for(Modifiers::NONE, Key::Enter), None);
    }

    #[test]
    fn extra_modifiers_or_other_keys_do_nothing() {
        let shifted = Modifiers { shift: true, ..Modifiers::COMMAND };
        assert_eq!(shortcut_for(shifted, Key::R), None);
        let alt = Modifiers { alt: true, ..Modifiers::COMMAND };
        assert_eq!(shortcut_for(alt, Key::O), None);
        assert_eq!(shortcut_for(Modifiers::COMMAND, Key::S), None);
    }

    #[test]
    fn identify_waits_for_a_loading_file() {
        assert!(!shortcut_enabled(Shortcut::Identify, true));
        assert!(shortcut_enabled(Shortcut::Identify, false));
        assert!(shortcut_enabled(Shortcut::Open, true));
        assert!(shortcut_enabled(Shortcut::Reset, true));
    }
}

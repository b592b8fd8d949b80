use super::session::TriageSession;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriageAction {
    Confirm,
    Reject,
    Skip,
    Retry,
}

impl TriageAction {
    /// Forward to the session. Key repeat is harmless: the session ignores
    /// input its current state does not accept.
    pub fn apply(self, session: &TriageSession) -> Option<JoinHandle<()>> {
        match self {
            TriageAction::Confirm => session.decide(true),
            TriageAction::Reject => session.decide(false),
            TriageAction::Skip => session.skip(),
            TriageAction::Retry => session.retry(),
        }
    }
}

/// Keyboard bindings of the triage screen.
///
/// | keys                 | action  |
/// |----------------------|---------|
/// | `y` `a` Enter Right  | confirm |
/// | `n` `x` Left         | reject  |
/// | `s` Space            | skip    |
/// | `r`                  | retry   |
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMap;

impl KeyMap {
    pub fn translate(&self, key: &KeyEvent) -> Option<TriageAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Right => Some(TriageAction::Confirm),
            KeyCode::Left => Some(TriageAction::Reject),
            KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
                'y' | 'a' => Some(TriageAction::Confirm),
                'n' | 'x' => Some(TriageAction::Reject),
                's' | ' ' => Some(TriageAction::Skip),
                'r' => Some(TriageAction::Retry),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn bindings() {
        let map = KeyMap;
        assert_eq!(map.translate(&key(KeyCode::Char('Y'))), Some(TriageAction::Confirm));
        assert_eq!(map.translate(&key(KeyCode::Enter)), Some(TriageAction::Confirm));
        assert_eq!(map.translate(&key(KeyCode::Left)), Some(TriageAction::Reject));
        assert_eq!(map.translate(&key(KeyCode::Char('x'))), Some(TriageAction::Reject));
        assert_eq!(map.translate(&key(KeyCode::Char(' '))), Some(TriageAction::Skip));
        assert_eq!(map.translate(&key(KeyCode::Char('r'))), Some(TriageAction::Retry));
        assert_eq!(map.translate(&key(KeyCode::Char('q'))), None);
    }

    #[test]
    fn releases_and_chords_are_ignored() {
        let map = KeyMap;
        let release = KeyEvent {
            code: KeyCode::Char('y'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map.translate(&release), None);

        let ctrl = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(map.translate(&ctrl), None);
    }
}

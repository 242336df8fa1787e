use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::editor::FormatAction;

/// What the editor does with a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Run a toolbar formatting action on the current selection.
    Format(FormatAction),
    /// Swallow the chord so the host does not act on it (e.g. browser save).
    Suppress,
    /// Not an editor shortcut; let the edit surface handle it.
    Ignore,
}

/// Map a key event to an editor shortcut.
///
/// Ctrl (or Cmd/Super on macOS) + B and + I format the selection; + S is
/// intercepted and does nothing. Key releases are ignored.
pub fn map_key(key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    let command = key.modifiers.contains(KeyModifiers::CONTROL)
        || key.modifiers.contains(KeyModifiers::SUPER);
    if !command {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'b' => KeyAction::Format(FormatAction::Bold),
            'i' => KeyAction::Format(FormatAction::Italic),
            's' => KeyAction::Suppress,
            _ => KeyAction::Ignore,
        },
        _ => KeyAction::Ignore,
    }
}

/// Parse a chord such as `ctrl+b`, `cmd+shift+i` or `esc`.
///
/// # Errors
/// Returns a message naming the unknown modifier or key.
pub fn parse_key_chord(chord: &str) -> Result<KeyEvent, String> {
    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = chord.split('+').map(str::trim).collect();
    let key = parts
        .pop()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| format!("empty key chord: {chord:?}"))?;

    for part in parts {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "cmd" | "command" | "super" | "meta" => KeyModifiers::SUPER,
            "alt" | "option" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            other => return Err(format!("unknown modifier: {other}")),
        };
    }

    let code = match key.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(format!("unknown key: {key}")),
            }
        }
    };
    Ok(KeyEvent::new(code, modifiers))
}

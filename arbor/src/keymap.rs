//! Key combinations and their mapping to logical tree actions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::KeymapError;

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// A key the terminal reported that has no counterpart here. Never
    /// bound and never handled.
    Unsupported,
}

/// A key combination (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Key without modifiers
    pub const fn key(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub const fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub const fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub const fn alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }
}

impl From<Key> for KeyCombo {
    fn from(key: Key) -> Self {
        Self::key(key)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{c}"),
            Key::F(n) => write!(f, "F{n}"),
            Key::Enter => f.write_str("Enter"),
            Key::Escape => f.write_str("Esc"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Tab => f.write_str("Tab"),
            Key::Space => f.write_str("Space"),
            Key::Up => f.write_str("Up"),
            Key::Down => f.write_str("Down"),
            Key::Left => f.write_str("Left"),
            Key::Right => f.write_str("Right"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
            Key::Insert => f.write_str("Insert"),
            Key::Delete => f.write_str("Delete"),
            Key::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Parses strings such as `"Down"`, `"ArrowDown"`, `"Shift+Home"`, `"+"`,
/// `"Ctrl++"` or `"F5"`. Names are case-insensitive.
impl FromStr for KeyCombo {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeymapError::InvalidKey(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        // A trailing '+' is the plus key itself, not a separator.
        let (prefix, key_name) = if trimmed == "+" {
            ("", "+")
        } else if let Some(prefix) = trimmed.strip_suffix("++") {
            (prefix, "+")
        } else {
            match trimmed.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", trimmed),
            }
        };

        let mut modifiers = Modifiers::NONE;
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            match part.trim().to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(invalid()),
            }
        }

        let key = parse_key(key_name.trim()).ok_or_else(invalid)?;
        Ok(KeyCombo::new(key, modifiers))
    }
}

fn parse_key(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(if c == ' ' { Key::Space } else { Key::Char(c) });
    }
    let lower = name.to_ascii_lowercase();
    let key = match lower.strip_prefix("arrow").unwrap_or(&lower) {
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "enter" | "return" => Key::Enter,
        "space" | "spacebar" => Key::Space,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "plus" => Key::Char('+'),
        "minus" => Key::Char('-'),
        other => {
            let n: u8 = other.strip_prefix('f')?.parse().ok()?;
            if !(1..=24).contains(&n) {
                return None;
            }
            Key::F(n)
        }
    };
    Some(key)
}

/// Logical actions a key can trigger on the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeAction {
    NextNode,
    PrevNode,
    FirstNode,
    LastNode,
    Collapse,
    Expand,
    ExpandOrDescend,
    /// Promote focus into selection (toggles in multi-select mode).
    ToggleSelection,
    ToggleExpansion,
    /// Range-select from the focused node to the first node.
    ExtendToFirst,
    /// Range-select from the focused node to the last node.
    ExtendToLast,
}

impl TreeAction {
    pub const ALL: [TreeAction; 11] = [
        TreeAction::NextNode,
        TreeAction::PrevNode,
        TreeAction::FirstNode,
        TreeAction::LastNode,
        TreeAction::Collapse,
        TreeAction::Expand,
        TreeAction::ExpandOrDescend,
        TreeAction::ToggleSelection,
        TreeAction::ToggleExpansion,
        TreeAction::ExtendToFirst,
        TreeAction::ExtendToLast,
    ];

    /// Name used in settings files.
    pub fn name(&self) -> &'static str {
        match self {
            TreeAction::NextNode => "next_node",
            TreeAction::PrevNode => "prev_node",
            TreeAction::FirstNode => "first_node",
            TreeAction::LastNode => "last_node",
            TreeAction::Collapse => "collapse",
            TreeAction::Expand => "expand",
            TreeAction::ExpandOrDescend => "expand_or_descend",
            TreeAction::ToggleSelection => "toggle_selection",
            TreeAction::ToggleExpansion => "toggle_expansion",
            TreeAction::ExtendToFirst => "extend_to_first",
            TreeAction::ExtendToLast => "extend_to_last",
        }
    }
}

impl fmt::Display for TreeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts `snake_case` and `camelCase` names (`next_node`, `nextNode`).
impl FromStr for TreeAction {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        TreeAction::ALL
            .into_iter()
            .find(|action| action.name().replace('_', "") == normalized)
            .ok_or_else(|| KeymapError::UnknownAction(s.to_string()))
    }
}

/// Key combination to action bindings.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<KeyCombo, TreeAction>,
}

impl KeyMap {
    /// Map with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key. Unsupported keys are never bound.
    pub fn bind(&mut self, combo: KeyCombo, action: TreeAction) {
        if combo.key == Key::Unsupported {
            return;
        }
        self.bindings.insert(combo, action);
    }

    pub fn unbind(&mut self, combo: &KeyCombo) -> Option<TreeAction> {
        self.bindings.remove(combo)
    }

    /// Replace every binding of `action` with `combos`.
    pub fn rebind(&mut self, action: TreeAction, combos: impl IntoIterator<Item = KeyCombo>) {
        self.bindings.retain(|_, bound| *bound != action);
        for combo in combos {
            self.bind(combo, action);
        }
    }

    /// Action for a key press.
    ///
    /// Character keys fall back to their unshifted binding, since symbols
    /// like `+` arrive with Shift held on most layouts.
    pub fn action_for(&self, combo: &KeyCombo) -> Option<TreeAction> {
        if let Some(action) = self.bindings.get(combo) {
            return Some(*action);
        }
        match combo.key {
            Key::Char(_) if combo.modifiers.shift => {
                let unshifted = KeyCombo::new(
                    combo.key,
                    Modifiers {
                        shift: false,
                        ..combo.modifiers
                    },
                );
                self.bindings.get(&unshifted).copied()
            }
            _ => None,
        }
    }

    /// Keys bound to `action`, in display order.
    pub fn keys_for(&self, action: TreeAction) -> Vec<KeyCombo> {
        let mut keys: Vec<KeyCombo> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(combo, _)| *combo)
            .collect();
        keys.sort_by_key(|combo| combo.to_string());
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Default bindings: arrows navigate, Home/End jump, Left and `-` collapse,
/// `+` expands, Right expands or descends, Space and Enter toggle selection,
/// Shift+Home/End extend a range.
impl Default for KeyMap {
    fn default() -> Self {
        let mut map = KeyMap::empty();
        map.bind(KeyCombo::key(Key::Down), TreeAction::NextNode);
        map.bind(KeyCombo::key(Key::Up), TreeAction::PrevNode);
        map.bind(KeyCombo::key(Key::Home), TreeAction::FirstNode);
        map.bind(KeyCombo::key(Key::End), TreeAction::LastNode);
        map.bind(KeyCombo::key(Key::Left), TreeAction::Collapse);
        map.bind(KeyCombo::key(Key::Char('-')), TreeAction::Collapse);
        map.bind(KeyCombo::key(Key::Char('+')), TreeAction::Expand);
        map.bind(KeyCombo::key(Key::Right), TreeAction::ExpandOrDescend);
        map.bind(KeyCombo::key(Key::Space), TreeAction::ToggleSelection);
        map.bind(KeyCombo::key(Key::Enter), TreeAction::ToggleSelection);
        map.bind(KeyCombo::key(Key::Home).shift(), TreeAction::ExtendToFirst);
        map.bind(KeyCombo::key(Key::End).shift(), TreeAction::ExtendToLast);
        map
    }
}

// Conversion from crossterm types

impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab | KeyCode::BackTab => Key::Tab,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Insert => Key::Insert,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Unsupported,
        }
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            shift: mods.contains(KeyModifiers::SHIFT),
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }
}

impl From<crossterm::event::KeyEvent> for KeyCombo {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        Self::new(event.code.into(), event.modifiers.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_combos() {
        assert_eq!("Down".parse(), Ok(KeyCombo::key(Key::Down)));
        assert_eq!("ArrowDown".parse(), Ok(KeyCombo::key(Key::Down)));
        assert_eq!("shift+home".parse(), Ok(KeyCombo::key(Key::Home).shift()));
        assert_eq!("+".parse(), Ok(KeyCombo::key(Key::Char('+'))));
        assert_eq!("Ctrl++".parse(), Ok(KeyCombo::key(Key::Char('+')).ctrl()));
        assert_eq!("-".parse(), Ok(KeyCombo::key(Key::Char('-'))));
        assert_eq!(" ".parse(), Err::<KeyCombo, _>(KeymapError::InvalidKey(" ".into())));
        assert_eq!("Space".parse(), Ok(KeyCombo::key(Key::Space)));
        assert_eq!("F5".parse(), Ok(KeyCombo::key(Key::F(5))));
        assert_eq!("x".parse(), Ok(KeyCombo::key(Key::Char('x'))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("Hyper+Down".parse::<KeyCombo>().is_err());
        assert!("F99".parse::<KeyCombo>().is_err());
        assert!("Nope".parse::<KeyCombo>().is_err());
        assert!("".parse::<KeyCombo>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["Shift+Home", "Ctrl++", "Space", "F3", "-"] {
            let combo: KeyCombo = text.parse().unwrap();
            assert_eq!(combo.to_string(), text);
        }
    }

    #[test]
    fn test_action_names() {
        assert_eq!("next_node".parse(), Ok(TreeAction::NextNode));
        assert_eq!("nextNode".parse(), Ok(TreeAction::NextNode));
        assert_eq!("ExpandOrDescend".parse(), Ok(TreeAction::ExpandOrDescend));
        assert_eq!(
            "fly".parse::<TreeAction>(),
            Err(KeymapError::UnknownAction("fly".into()))
        );
    }

    #[test]
    fn test_default_bindings() {
        let map = KeyMap::default();
        assert_eq!(map.action_for(&Key::Down.into()), Some(TreeAction::NextNode));
        assert_eq!(map.action_for(&Key::Left.into()), Some(TreeAction::Collapse));
        assert_eq!(map.action_for(&Key::Char('-').into()), Some(TreeAction::Collapse));
        assert_eq!(map.action_for(&Key::Space.into()), Some(TreeAction::ToggleSelection));
        assert_eq!(
            map.action_for(&KeyCombo::key(Key::End).shift()),
            Some(TreeAction::ExtendToLast)
        );
        assert_eq!(map.action_for(&Key::Char('q').into()), None);
        assert!(map.keys_for(TreeAction::ToggleExpansion).is_empty());
    }

    #[test]
    fn test_shifted_char_falls_back() {
        let map = KeyMap::default();
        let shifted_plus = KeyCombo::key(Key::Char('+')).shift();
        assert_eq!(map.action_for(&shifted_plus), Some(TreeAction::Expand));
        let shifted_down = KeyCombo::key(Key::Down).shift();
        assert_eq!(map.action_for(&shifted_down), None);
    }

    #[test]
    fn test_rebind_replaces_previous_keys() {
        let mut map = KeyMap::default();
        map.rebind(TreeAction::NextNode, [KeyCombo::key(Key::Char('j'))]);
        assert_eq!(map.action_for(&Key::Down.into()), None);
        assert_eq!(map.action_for(&Key::Char('j').into()), Some(TreeAction::NextNode));
        assert_eq!(map.keys_for(TreeAction::Collapse).len(), 2);
    }

    #[test]
    fn test_crossterm_space_is_space_key() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let combo: KeyCombo = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE).into();
        assert_eq!(combo, KeyCombo::key(Key::Space));
        let combo: KeyCombo = KeyEvent::new(KeyCode::Home, KeyModifiers::SHIFT).into();
        assert_eq!(combo, KeyCombo::key(Key::Home).shift());
    }

    #[test]
    fn test_empty_and_default_maps() {
        assert!(KeyMap::empty().is_empty());
        assert_eq!(KeyMap::default().len(), 12);
    }

    #[test]
    fn test_unsupported_crossterm_keys() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let combo: KeyCombo = KeyEvent::new(KeyCode::CapsLock, KeyModifiers::NONE).into();
        assert_eq!(combo.key, Key::Unsupported);
        let combo: KeyCombo = KeyEvent::new(KeyCode::Char('\0'), KeyModifiers::NONE).into();
        assert_eq!(combo.key, Key::Char('\0'));

        let mut map = KeyMap::empty();
        map.bind(KeyCombo::key(Key::Unsupported), TreeAction::NextNode);
        assert!(map.is_empty());
        assert!("Unsupported".parse::<KeyCombo>().is_err());
    }
}

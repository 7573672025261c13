//! Keybinding registry: maps key events to feed actions with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Like,
    Bookmark,
    Retry,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Next post",
            Self::NavUp => "Previous post",
            Self::PageDown => "Scroll down half a screen",
            Self::PageUp => "Scroll up half a screen",
            Self::Top => "Jump to first post",
            Self::Bottom => "Jump to last post",
            Self::Like => "Like / unlike post",
            Self::Bookmark => "Bookmark / unbookmark post",
            Self::Retry => "Retry loading the feed",
            Self::ShowHelp => "Show help",
        }
    }
}

/// Parse an action name from config.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "top" => Some(Action::Top),
        "bottom" => Some(Action::Bottom),
        "like" => Some(Action::Like),
        "bookmark" => Some(Action::Bookmark),
        "retry" => Some(Action::Retry),
        "help" | "show_help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context. Determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Active everywhere unless a specific context overrides the key.
    Global,
    /// The scrolling feed.
    Feed,
    /// The full-screen error view.
    Error,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config: "q", "Ctrl+d", "Enter", "PageDown", "F5".
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        self.bind(Context::Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Context::Global, KeySpec::plain(Char('?')), Action::ShowHelp);

        self.bind(Context::Feed, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(Context::Feed, KeySpec::plain(Down), Action::NavDown);
        self.bind(Context::Feed, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(Context::Feed, KeySpec::plain(Up), Action::NavUp);
        self.bind(Context::Feed, KeySpec::ctrl('d'), Action::PageDown);
        self.bind(Context::Feed, KeySpec::plain(PageDown), Action::PageDown);
        self.bind(Context::Feed, KeySpec::ctrl('u'), Action::PageUp);
        self.bind(Context::Feed, KeySpec::plain(PageUp), Action::PageUp);
        self.bind(Context::Feed, KeySpec::plain(Char('g')), Action::Top);
        self.bind(Context::Feed, KeySpec::plain(Char('G')), Action::Bottom);
        self.bind(Context::Feed, KeySpec::plain(Char('l')), Action::Like);
        self.bind(Context::Feed, KeySpec::plain(Char('b')), Action::Bookmark);

        self.bind(Context::Error, KeySpec::plain(Char('r')), Action::Retry);
        self.bind(Context::Error, KeySpec::plain(Enter), Action::Retry);
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Each override replaces every existing binding of that action, keeping
    /// the contexts it was bound in. Returns warnings for unknown action names
    /// or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first and then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// (context, key label, description) for every binding, in registration order.
    pub fn all_bindings(&self) -> Vec<(Context, String, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_feed_bindings() {
        let kb = KeybindingRegistry::new();
        assert_eq!(
            kb.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Feed),
            Some(Action::Like)
        );
        assert_eq!(
            kb.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Feed),
            Some(Action::PageDown)
        );
    }

    #[test]
    fn test_global_fallback() {
        let kb = KeybindingRegistry::new();
        assert_eq!(
            kb.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Error),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_context_isolation() {
        let kb = KeybindingRegistry::new();
        assert_eq!(
            kb.action_for_key(KeyCode::Char('r'), KeyModifiers::NONE, Context::Feed),
            None
        );
        assert_eq!(
            kb.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Error),
            None
        );
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(
            parse_key_string("x"),
            Some(KeySpec::plain(KeyCode::Char('x')))
        );
        assert_eq!(parse_key_string("Ctrl+f"), Some(KeySpec::ctrl('f')));
        assert_eq!(
            parse_key_string("PageDown"),
            Some(KeySpec::plain(KeyCode::PageDown))
        );
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+ab"), None);
        assert_eq!(parse_key_string("bogus"), None);
    }

    #[test]
    fn test_override_replaces_binding() {
        let mut kb = KeybindingRegistry::new();
        let overrides = HashMap::from([("like".to_string(), "f".to_string())]);
        let warnings = kb.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            kb.action_for_key(KeyCode::Char('f'), KeyModifiers::NONE, Context::Feed),
            Some(Action::Like)
        );
        assert_eq!(
            kb.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Feed),
            None
        );
    }

    #[test]
    fn test_override_warnings() {
        let mut kb = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("teleport".to_string(), "t".to_string()),
            ("like".to_string(), "Ctrl+".to_string()),
        ]);
        let warnings = kb.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 2);
        // Failed override leaves the default in place.
        assert_eq!(
            kb.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Feed),
            Some(Action::Like)
        );
    }

    #[test]
    fn test_all_bindings_lists_defaults() {
        let kb = KeybindingRegistry::new();
        let all = kb.all_bindings();
        assert!(all
            .iter()
            .any(|(ctx, key, desc)| *ctx == Context::Error && key == "r" && desc.contains("Retry")));
        assert!(all.iter().any(|(_, key, _)| key == "Ctrl+d"));
    }
}

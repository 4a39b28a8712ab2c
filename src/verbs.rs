//! The built-in IRC verb → action table.
//!
//! Grounded on the original engine's `IrcApiActionText`/`IrcApiActions`
//! hash table and its refcounted process-wide init/teardown
//! (`botty_init`/`botty_cleanup`). Since the table is pure, immutable data
//! with no OS resource behind it, it is modeled here as a lazily
//! initialized process-wide singleton via `once_cell`, with no teardown —
//! the idiomatic Rust equivalent once there's nothing to actually release.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// The verbs the dispatcher's built-in handling reacts to directly (beyond
/// server numerics and matched commands). `Other` covers verbs the fixed
/// table recognizes but gives no special handling (`KICK`, `MODE`,
/// `TOPIC`, ...): recognizing them still matters, since it's what keeps
/// them from falling through to the generic `MSG` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// A user joined a channel.
    Join,
    /// A user parted a channel.
    Part,
    /// A user quit the server.
    Quit,
    /// A user changed nickname.
    Nick,
    /// A recognized verb with no built-in state change.
    Other,
}

static KNOWN_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "JOIN", "PART", "QUIT", "NICK", "KICK", "MODE", "TOPIC", "INVITE",
    ]
    .into_iter()
    .collect()
});

/// Looks up the built-in [`Verb`] for an action string, if any.
pub fn lookup(action: &str) -> Option<Verb> {
    if !KNOWN_VERBS.contains(action) {
        return None;
    }
    match action {
        "JOIN" => Some(Verb::Join),
        "PART" => Some(Verb::Part),
        "QUIT" => Some(Verb::Quit),
        "NICK" => Some(Verb::Nick),
        _ => Some(Verb::Other),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recognizes_known_verbs() {
        assert_eq!(lookup("JOIN"), Some(Verb::Join));
        assert_eq!(lookup("PRIVMSG"), None);
    }
}

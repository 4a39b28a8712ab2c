//! The user-facing event callback table.
//!
//! Grounded on the original engine's fixed `cb[CALLBACK_COUNT]` array,
//! turned into a `HashMap<EventKind, CallbackFn>` now that event kinds are
//! a closed Rust enum rather than an index into a C array.

use std::collections::HashMap;

use irc_interface::EventKind;
use irc_proto::IrcMessage;

/// A user-registered event handler.
pub type CallbackFn = Box<dyn FnMut(&IrcMessage)>;

/// The table of event-kind → handler mappings.
#[derive(Default)]
pub struct CallbackTable {
    handlers: HashMap<EventKind, CallbackFn>,
}

impl CallbackTable {
    /// Creates an empty table; every event kind is a no-op until set.
    pub fn new() -> CallbackTable {
        CallbackTable::default()
    }

    /// Registers (or replaces) the handler for `kind`.
    pub fn set(&mut self, kind: EventKind, handler: CallbackFn) {
        self.handlers.insert(kind, handler);
    }

    /// Invokes the handler for `kind`, if one is registered.
    pub fn fire(&mut self, kind: EventKind, msg: &IrcMessage) {
        if let Some(handler) = self.handlers.get_mut(&kind) {
            handler(msg);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fires_registered_handler_with_the_message() {
        let mut table = CallbackTable::new();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
        let seen2 = seen.clone();
        table.set(
            EventKind::Msg,
            Box::new(move |msg| *seen2.borrow_mut() = msg.body().to_owned()),
        );
        let msg = IrcMessage::parse_user(":a!a@h PRIVMSG #c :hello".to_owned(), None);
        table.fire(EventKind::Msg, &msg);
        assert_eq!(*seen.borrow(), "hello");
    }

    #[test]
    fn unregistered_kind_is_a_no_op() {
        let mut table = CallbackTable::new();
        let msg = IrcMessage::parse_user(":a!a@h PRIVMSG #c :hello".to_owned(), None);
        table.fire(EventKind::Join, &msg); // must not panic
    }
}

//! Parsing of raw IRC lines into [`IrcMessage`].
//!
//! Unlike a destructive, in-place tokenizer, this parser never mutates the
//! line it was given. It records `(start, end)` byte offsets into the owned
//! buffer and resolves them to borrowed slices on demand, the same technique
//! the general-purpose `Message::parse_string` in this crate's history used
//! for the full wire grammar — specialized here to the bounded, fixed-shape
//! fields a bot actually needs.

use crate::limits::{BOT_ARG_DELIM, CMD_CHAR, MAX_BOT_ARGS, MAX_PARAMETERS};

/// A byte-offset pair into an [`IrcMessage`]'s owned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Part {
    start: u32,
    end: u32,
}

impl Part {
    fn new(start: usize, end: usize) -> Part {
        Part {
            start: start as u32,
            end: end as u32,
        }
    }

    fn index<'a>(&self, s: &'a str) -> &'a str {
        &s[self.start as usize..self.end as usize]
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Something a command registry can report about a matched command, needed
/// by the parser to know how many argument tokens to split off.
pub trait CommandArity {
    /// Returns the declared number of arguments for `name`, if registered.
    fn arity(&self, name: &str) -> Option<usize>;
}

/// A parsed inbound IRC line.
///
/// All string-valued accessors borrow from the message's own buffer; the
/// message never reads or writes outside that buffer. A line that doesn't
/// match the expected grammar parses to an [`IrcMessage`] with empty fields
/// rather than failing — callers are expected to treat an empty `action` as
/// "ignore this line".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    buf: String,
    is_server: bool,
    nick: Part,
    action: Part,
    target: Part,
    body: Part,
    tokens: Vec<Part>,
}

impl IrcMessage {
    fn empty(buf: String, is_server: bool) -> IrcMessage {
        IrcMessage {
            buf,
            is_server,
            nick: Part::default(),
            action: Part::default(),
            target: Part::default(),
            body: Part::default(),
            tokens: Vec::new(),
        }
    }

    /// True if this message came from the server itself (a numeric reply or
    /// a bare server-originated line) rather than from a user.
    pub fn is_server(&self) -> bool {
        self.is_server
    }

    /// The origin nickname. Empty for server messages.
    pub fn nick(&self) -> &str {
        self.nick.index(&self.buf)
    }

    /// The verb or numeric reply code.
    pub fn action(&self) -> &str {
        self.action.index(&self.buf)
    }

    /// The channel or nick this message was addressed to.
    pub fn target(&self) -> &str {
        self.target.index(&self.buf)
    }

    /// The trailing text payload.
    pub fn body(&self) -> &str {
        self.body.index(&self.buf)
    }

    /// Returns the `i`th split token of the body, if present.
    pub fn token(&self, i: usize) -> Option<&str> {
        self.tokens.get(i).map(|p| p.index(&self.buf))
    }

    /// Number of split tokens produced from the body.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Parses a line sent by another user or the server on a user's behalf,
    /// of the form `:<nick>!<host> <action> <target> :<body>`.
    ///
    /// If `body` begins with [`crate::limits::CMD_CHAR`] and `registry` is
    /// supplied, the body is additionally tokenized into up to
    /// [`crate::limits::MAX_BOT_ARGS`] slots (or the command's own declared
    /// arity, once the verb in the first slot is known).
    pub fn parse_user(line: String, registry: Option<&dyn CommandArity>) -> IrcMessage {
        let mut msg = IrcMessage::empty(line, false);
        let buf = msg.buf.clone();
        let mut cursor = 0usize;

        // :<nick>!<host>
        let bang = match find_from(&buf, cursor, '!') {
            Some(i) => i,
            None => return msg,
        };
        let nick_start = if buf.as_bytes().get(cursor) == Some(&b':') {
            cursor + 1
        } else {
            cursor
        };
        msg.nick = Part::new(nick_start, bang);
        // the space terminating the combined "<nick>!<host>" token also
        // terminates the host, so there is no separate host token to skip.
        cursor = match find_from(&buf, bang, ' ') {
            Some(i) => i + 1,
            None => return msg,
        };

        // action
        let (action, next) = match read_token(&buf, cursor) {
            Some(v) => v,
            None => return msg,
        };
        msg.action = action;
        cursor = next;

        // target
        let (target, next) = match read_token(&buf, cursor) {
            Some(v) => v,
            None => return msg,
        };
        msg.target = target;
        cursor = next;

        if cursor >= buf.len() {
            return msg;
        }
        let body_start = if buf.as_bytes().get(cursor) == Some(&b':') {
            cursor + 1
        } else {
            cursor
        };
        msg.body = Part::new(body_start, buf.len());

        let body = msg.body();
        if body.starts_with(CMD_CHAR) {
            msg.tokens = tokenize_command(body_start, &buf[body_start..], registry);
        }

        msg
    }

    /// Parses a line sent directly by the server, of the form
    /// `:<server> <action> <nick-echo> [:<body>]`.
    ///
    /// The body, once isolated, is tokenized on the parameter delimiter
    /// (`:`) into up to [`crate::limits::MAX_PARAMETERS`] slots.
    pub fn parse_server(line: String) -> IrcMessage {
        let mut msg = IrcMessage::empty(line, true);
        let buf = msg.buf.clone();
        let mut cursor = 0usize;

        // skip source server token
        cursor = match advance_past_token(&buf, cursor) {
            Some(i) => i,
            None => return msg,
        };

        // action / numeric
        let (action, next) = match read_token(&buf, cursor) {
            Some(v) => v,
            None => return msg,
        };
        msg.action = action;
        cursor = next;

        // skip nick-echo token
        cursor = match advance_past_token(&buf, cursor) {
            Some(i) => i,
            None => return msg,
        };

        if cursor >= buf.len() {
            return msg;
        }
        let body_start = if buf.as_bytes().get(cursor) == Some(&b':') {
            cursor + 1
        } else {
            cursor
        };
        msg.body = Part::new(body_start, buf.len());

        msg.tokens = split_on(body_start, &buf[body_start..], ':', MAX_PARAMETERS);
        msg
    }
}

fn find_from(s: &str, from: usize, needle: char) -> Option<usize> {
    s.get(from..)?.find(needle).map(|i| i + from)
}

/// Advances past one whitespace-delimited token starting at `cursor`,
/// returning the index just after the following space (or end of string).
fn advance_past_token(s: &str, cursor: usize) -> Option<usize> {
    if cursor > s.len() {
        return None;
    }
    match find_from(s, cursor, ' ') {
        Some(i) => Some(i + 1),
        None => {
            if cursor < s.len() {
                Some(s.len())
            } else {
                None
            }
        }
    }
}

/// Reads one whitespace-delimited token starting at `cursor`, returning the
/// token's `Part` and the cursor position just past it (including the
/// separating space, if any).
fn read_token(s: &str, cursor: usize) -> Option<(Part, usize)> {
    if cursor >= s.len() {
        return None;
    }
    match find_from(s, cursor, ' ') {
        Some(i) => Some((Part::new(cursor, i), i + 1)),
        None => Some((Part::new(cursor, s.len()), s.len())),
    }
}

/// Splits `body` (whose first byte is the command char) into up to
/// `MAX_BOT_ARGS`, or the matched command's declared arity, slots separated
/// by [`BOT_ARG_DELIM`]. `offset` is `body`'s start position in the full
/// buffer, so returned `Part`s index correctly into it.
fn tokenize_command(offset: usize, body: &str, registry: Option<&dyn CommandArity>) -> Vec<Part> {
    let rest = &body[1..]; // drop CMD_CHAR
    let rest_offset = offset + 1;
    let mut limit = MAX_BOT_ARGS;

    if let Some(registry) = registry {
        if let Some(verb_end) = rest.find(BOT_ARG_DELIM) {
            if let Some(arity) = registry.arity(&rest[..verb_end]) {
                limit = arity;
            }
        } else if let Some(arity) = registry.arity(rest) {
            limit = arity;
        }
    }

    split_on(rest_offset, rest, BOT_ARG_DELIM, limit.max(1))
}

/// Splits `text` on `delim` into at most `limit` parts; the final part keeps
/// the untokenized remainder of the string ("rest of line" semantics).
/// `offset` is `text`'s start position in the full buffer.
fn split_on(offset: usize, text: &str, delim: char, limit: usize) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut pos = 0usize;
    while parts.len() < limit {
        if parts.len() + 1 == limit {
            parts.push(Part::new(offset + pos, offset + text.len()));
            break;
        }
        match text[pos..].find(delim) {
            Some(i) => {
                parts.push(Part::new(offset + pos, offset + pos + i));
                pos += i + 1;
            }
            None => {
                parts.push(Part::new(offset + pos, offset + text.len()));
                break;
            }
        }
    }
    parts
}

//! Trait interfaces for the external collaborators the engine depends on but
//! does not itself implement a single fixed version of: the raw transport,
//! the command registry, and per-channel nick bookkeeping.
//!
//! Each trait follows the same shape the rest of this crate family uses
//! elsewhere: a small required surface plus default methods built on top of
//! it, so a minimal implementation is a handful of lines while a caller
//! wanting finer control can override individual defaults.

use std::io;

use irc_proto::IrcMessage;

/// Which way a [`Transport`] is being asked about readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollInterest {
    /// The transport has bytes ready to be read without blocking.
    Readable,
    /// The transport can accept a write without blocking.
    Writable,
}

/// A non-blocking byte-stream transport: a plain or TLS-wrapped TCP
/// connection, or a test double.
///
/// The engine never blocks on I/O; every method here is expected to return
/// immediately. `poll` answers "would this op block right now", and
/// `read`/`send` behave like the underlying non-blocking socket calls they
/// wrap (an `io::ErrorKind::WouldBlock` is a valid, non-fatal outcome the
/// caller is expected to have already ruled out via `poll`).
pub trait Transport {
    /// Opens a connection to `host:port`. `tls` selects whether the
    /// transport should negotiate TLS on connect.
    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<()>;

    /// Returns whether the transport is ready for the given interest
    /// without blocking.
    fn poll(&mut self, interest: PollInterest) -> io::Result<bool>;

    /// Attempts a non-blocking read into `buf`, returning the number of
    /// bytes read (`0` means the remote end closed the connection).
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Attempts a non-blocking write of `buf`, returning the number of
    /// bytes actually written.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Closes the connection. Default no-op for transports with no
    /// explicit teardown (e.g. one backed by an already-owned socket that
    /// closes on drop).
    fn close(&mut self) {}
}

/// Flags a registered command can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandFlags {
    /// Only the configured master nickname may invoke this command.
    pub master_only: bool,
}

/// A single registered command's metadata.
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    /// Declared argument arity; bounds how many tokens the parser splits
    /// the command body into.
    pub arity: usize,
    /// Permission flags for this command.
    pub flags: CommandFlags,
}

/// A lookup table mapping command verbs to their metadata.
///
/// Implements [`irc_proto::CommandArity`] automatically so a registry can be
/// handed straight to the parser.
pub trait CommandRegistry {
    /// Looks up a command's full entry by name.
    fn lookup(&self, name: &str) -> Option<CommandEntry>;

    /// Registers or replaces a command.
    fn register(&mut self, name: &str, entry: CommandEntry);

    /// Removes a command, if present.
    fn unregister(&mut self, name: &str) -> Option<CommandEntry> {
        let _ = name;
        None
    }
}

impl<T: CommandRegistry + ?Sized> irc_proto::CommandArity for T {
    fn arity(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(|e| e.arity)
    }
}

/// Per-channel nickname bookkeeping.
///
/// A default implementation only needs `add`/`remove`/`contains`/`iter`;
/// the rest are convenience wrappers over those.
pub trait NickSet {
    /// Registers `nick` as present in `channel`.
    fn add(&mut self, channel: &str, nick: &str);

    /// Removes `nick` from `channel`, if present.
    fn remove(&mut self, channel: &str, nick: &str);

    /// Returns whether `nick` is currently tracked as present in `channel`.
    fn contains(&self, channel: &str, nick: &str) -> bool;

    /// Returns every nickname currently tracked for `channel`.
    fn iter(&self, channel: &str) -> Vec<String>;

    /// Removes `nick` from every channel it's tracked in (used when a user
    /// quits or otherwise disconnects rather than parting a single
    /// channel).
    fn remove_everywhere(&mut self, nick: &str) {
        for channel in self.channels() {
            self.remove(&channel, nick);
        }
    }

    /// Drops all tracked state for every channel.
    fn clear(&mut self) {
        for channel in self.channels() {
            for nick in self.iter(&channel) {
                self.remove(&channel, &nick);
            }
        }
    }

    /// Lists every channel with any tracked nick state.
    fn channels(&self) -> Vec<String>;
}

/// The kinds of lifecycle/protocol events user code can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Fired once the initial connection to the server is established.
    Connect,
    /// Fired once all configured channels have been joined.
    Join,
    /// Fired when another user joins a channel the bot is in.
    UserJoin,
    /// Fired when another user parts or quits.
    UserPart,
    /// Fired when another user changes nickname.
    UserNickChange,
    /// Fired for any server numeric reply without more specific handling.
    ServerCode,
    /// Fired for any user message that didn't match a registered command.
    Msg,
}

/// Data handed to a matched command's handler.
pub struct CmdData<'a> {
    /// The message that triggered the command.
    pub msg: &'a IrcMessage,
    /// The nickname that sent the command.
    pub caller: &'a str,
}

/// A restricted, object-safe view of the engine a command handler is
/// allowed to act through: enough to reply, without the command registry
/// needing to know the engine's concrete transport type.
pub trait EngineHandle {
    /// Formats, splits if necessary, and enqueues an outbound message.
    fn send(&mut self, target: &str, action: &str, ctcp: Option<&str>, body: &str);

    /// Sends a raw, preformatted line immediately, bypassing the outbound
    /// queue.
    fn send_raw(&mut self, line: &str);

    /// The candidate nickname currently in use.
    fn current_nick(&self) -> &str;
}

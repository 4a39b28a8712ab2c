//! A cooperative, non-async IRC connection engine for building chat bots.
//!
//! The engine maintains a single connection to an IRC server, drives a
//! connection/registration state machine, parses and dispatches server
//! traffic to user-registered handlers and commands, and emits outbound
//! traffic through a throttled, fair send queue while cooperatively
//! scheduling long-running bot processes. See [`Engine`] for the entry
//! point; [`Engine::tick`] is the single cooperative driver callers loop on.
//!
//! Wire parsing, numeric reply codes, and protocol constants live in the
//! sibling [`irc_proto`] crate; the transport, command-registry, and
//! nick-list collaborator traits live in [`irc_interface`].

#![warn(missing_docs)]

pub mod callback;
pub mod clock;
pub mod commands;
pub mod config;
pub mod ctcp;
mod dispatcher;
pub mod engine;
pub mod error;
pub mod nicklist;
pub mod outbound;
pub mod process;
pub mod state;
pub mod transport;
pub mod verbs;

pub use crate::callback::CallbackFn;
pub use crate::clock::{Clock, FakeClock};
pub use crate::commands::{CommandFn, HashCommandRegistry};
pub use crate::config::{BotConfig, BotConfigBuilder};
pub use crate::engine::Engine;
pub use crate::error::{EngineError, Result, TickOutcome};
pub use crate::nicklist::ChannelNickLists;
pub use crate::process::{ProcessStep, StepResult};
pub use crate::state::ConnectionState;

pub use irc_interface::{
    CmdData, CommandEntry, CommandFlags, CommandRegistry, EngineHandle, EventKind, NickSet,
    PollInterest, Transport,
};
pub use irc_proto::{ChannelExt, IrcMessage, Response};

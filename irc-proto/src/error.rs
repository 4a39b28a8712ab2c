//! Errors produced while parsing wire messages.

use thiserror::Error;

/// An error encountered while tokenizing a raw line into an
/// [`crate::message::IrcMessage`].
///
/// Parsing never returns this to a dispatcher: a malformed line simply
/// yields an empty message (see [`crate::message::IrcMessage::parse_user`]
/// and [`crate::message::IrcMessage::parse_server`]). It exists so the
/// parser's internal helpers have a way to explain *why* they stopped
/// early, for logging.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MessageParseError {
    /// The line was empty or contained only whitespace.
    #[error("cannot parse an empty message")]
    EmptyMessage,
    /// A user message was missing the leading `:<nick>!<host>` prefix.
    #[error("message was missing a nick prefix")]
    MissingPrefix,
    /// A message ended before an action/verb token could be read.
    #[error("message was missing an action")]
    MissingAction,
    /// A message ended before a target token could be read.
    #[error("message was missing a target")]
    MissingTarget,
}

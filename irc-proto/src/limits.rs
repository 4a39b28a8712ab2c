//! Protocol-level size and timing constants.
//!
//! Values mirror the constants of the bot engine this crate's wire layer was
//! modeled on (`MAX_NICK_LEN`, `MAX_CHAN_LEN`, `MAX_MSG_LEN`, `MSG_PER_SECOND_LIM`,
//! `THROTTLE_WAIT_SEC`, `NICK_ATTEMPTS`, ...).

/// Maximum length of a nickname.
pub const NICK_MAX: usize = 32;
/// Maximum length of a command/action verb or numeric reply code.
pub const CMD_MAX: usize = 16;
/// Maximum length of a channel or user target.
pub const CHAN_MAX: usize = 64;
/// Maximum length of a message body, and the largest line this crate will
/// ever place on the wire or accept from it.
pub const MSG_MAX: usize = 512;
/// Upper bound on the number of whitespace-delimited tokens a user command
/// invocation is split into when no command-specific arity is known.
pub const MAX_BOT_ARGS: usize = 8;
/// Upper bound on the number of parameters a server numeric reply is split
/// into.
pub const MAX_PARAMETERS: usize = 15;
/// Upper bound on the number of wire-sized chunks one logical outbound
/// message may be split into.
pub const MAX_MSG_SPLITS: usize = 4;
/// Maximum outbound messages sent per second, per target, while not
/// throttled.
pub const MSG_PER_SECOND_LIM: u64 = 2;
/// Seconds to back off after a throttle signal before retrying the head of
/// a target's queue.
pub const THROTTLE_WAIT_SEC: u64 = 10;
/// Number of candidate nicknames tried before giving up on registration.
pub const NICK_ATTEMPTS: usize = 3;
/// Seconds allowed between `CONNECTED` and reaching `JOINED` before the
/// registration-timeout watchdog forces a retry.
pub const REGISTER_TIMEOUT_SEC: u64 = 60;
/// Character that introduces a bot command inside a `PRIVMSG` body.
pub const CMD_CHAR: char = '.';
/// Delimiter between a command's own arguments.
pub const BOT_ARG_DELIM: char = ' ';
/// Substring NOTICEs are scanned for to detect server-side throttling.
pub const THROTTLE_NEEDLE: &str = "throttle";
/// The CTCP delimiter byte.
pub const CTCP_MARKER: char = '\u{1}';
/// Line terminator every outbound line must end with.
pub const MSG_FOOTER: &str = "\r\n";

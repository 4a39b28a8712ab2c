//! Routes one parsed inbound line to lifecycle handling, the command
//! registry, or a user callback keyed by event kind.
//!
//! Grounded on `bot_parse`/`parseServer`/`defaultServActions`/`userJoined`/
//! `userLeft`/`userNickChange` in the original engine's dispatcher.

use irc_interface::{CmdData, CommandRegistry, EventKind, NickSet, Transport};
use irc_proto::limits::THROTTLE_NEEDLE;
use irc_proto::IrcMessage;

use crate::engine::Engine;
use crate::error::{EngineError, TickOutcome};
use crate::state::ConnectionState;
use crate::verbs::{self, Verb};

/// Dispatches a single already-line-split inbound message: PING fast-path,
/// server vs. user line split, numeric replies, command matching, and the
/// built-in verb table.
pub(crate) fn dispatch_line<T: Transport>(engine: &mut Engine<T>, line: &str) -> TickOutcome {
    if let Some(outcome) = handle_ping(engine, line) {
        return outcome;
    }

    let prefix = line
        .strip_prefix(':')
        .and_then(|rest| rest.split(' ').next())
        .unwrap_or("");

    if !prefix.contains('!') {
        handle_server_line(engine, line)
    } else {
        handle_user_line(engine, line)
    }
}

/// `PING <token>` must be answered immediately regardless of connection
/// state, without going through the outbound queue.
fn handle_ping<T: Transport>(engine: &mut Engine<T>, line: &str) -> Option<TickOutcome> {
    let rest = line.strip_prefix("PING")?;
    let token = rest.trim_start();
    engine.send_raw(&format!("PONG {}", token));
    Some(TickOutcome::Continue)
}

/// Step 1 of §4.5: a line with no `nick!host` prefix is server-originated
/// (a numeric reply, or a verb the server itself sends like `NOTICE`).
fn handle_server_line<T: Transport>(engine: &mut Engine<T>, line: &str) -> TickOutcome {
    let msg = IrcMessage::parse_server(line.to_owned());
    if msg.action().is_empty() {
        return TickOutcome::Continue;
    }

    match msg.action() {
        "433" => {
            if engine.advance_nick_attempt() {
                engine.set_state(ConnectionState::Connected);
                TickOutcome::Continue
            } else {
                TickOutcome::Fatal(EngineError::NicksExhausted(engine.nick_attempts_max()))
            }
        }
        "001" => {
            engine.set_state(ConnectionState::Registered);
            TickOutcome::Continue
        }
        "353" => {
            handle_names_reply(engine, &msg);
            TickOutcome::Continue
        }
        "NOTICE" => {
            if msg.body().to_ascii_lowercase().contains(THROTTLE_NEEDLE) {
                for target in engine.outbound_targets() {
                    engine.set_throttle(&target);
                }
            }
            TickOutcome::Continue
        }
        _ => {
            engine.fire(EventKind::ServerCode, &msg);
            TickOutcome::Continue
        }
    }
}

/// `353` carries `"<sym> <channel>"` as its first parameter and a
/// space-separated nick list as its last; register every nick present.
fn handle_names_reply<T: Transport>(engine: &mut Engine<T>, msg: &IrcMessage) {
    let channel = match msg.token(0).and_then(|p| p.split_whitespace().last()) {
        Some(c) => c.to_owned(),
        None => return,
    };
    let names = match msg.token(msg.token_count().saturating_sub(1)) {
        Some(n) => n,
        None => return,
    };
    for nick in names.split_whitespace() {
        let nick = nick.trim_start_matches(|c| matches!(c, '@' | '+' | '%' | '~' | '&'));
        if !nick.is_empty() {
            engine.nicks_mut().add(&channel, nick);
        }
    }
}

/// Steps 2-5 of §4.5: a line carrying a `nick!user@host` prefix.
fn handle_user_line<T: Transport>(engine: &mut Engine<T>, line: &str) -> TickOutcome {
    let msg = IrcMessage::parse_user(line.to_owned(), Some(engine.commands()));

    // Step 2: self-echo suppression.
    if !msg.nick().is_empty() && msg.nick() == engine.current_nick() {
        return TickOutcome::Continue;
    }

    // Step 3: command match.
    if msg.token_count() > 0 {
        if let Some(verb) = msg.token(0) {
            let verb = verb.to_owned();
            if let Some(outcome) = try_command(engine, &msg, &verb) {
                return outcome;
            }
        }
    }

    // Step 4: fixed IRC verb table.
    if let Some(outcome) = handle_verb(engine, &msg) {
        return outcome;
    }

    // Step 5: fallback.
    engine.fire(EventKind::Msg, &msg);
    TickOutcome::Continue
}

fn try_command<T: Transport>(
    engine: &mut Engine<T>,
    msg: &IrcMessage,
    name: &str,
) -> Option<TickOutcome> {
    let entry = engine.commands().lookup(name)?;

    if entry.flags.master_only {
        let is_master = engine.config().master() == Some(msg.nick());
        if !is_master {
            log::warn!("refusing master-only command {} from {}", name, msg.nick());
            return Some(TickOutcome::Continue);
        }
    }

    let caller = msg.nick().to_owned();
    let data = CmdData { msg, caller: &caller };
    match engine.invoke_command(name, &data) {
        Some(Ok(())) => Some(TickOutcome::Continue),
        Some(Err(e)) => {
            log::error!("command {} returned an error: {}", name, e);
            Some(TickOutcome::CommandError)
        }
        None => None,
    }
}

/// Step 4: built-in reactions to JOIN/PART/QUIT/NICK; other recognized
/// verbs (KICK, MODE, TOPIC, ...) are consumed with no state change.
/// Returns `None` only when `msg.action()` isn't in the fixed table at
/// all, so the caller falls through to the generic `MSG` callback.
fn handle_verb<T: Transport>(engine: &mut Engine<T>, msg: &IrcMessage) -> Option<TickOutcome> {
    let verb = verbs::lookup(msg.action())?;
    let nick = msg.nick().to_owned();
    let channel = if !msg.target().is_empty() {
        msg.target().to_owned()
    } else {
        msg.body().trim_start_matches(':').to_owned()
    };

    match verb {
        Verb::Join => {
            engine.nicks_mut().add(&channel, &nick);
            engine.fire(EventKind::UserJoin, msg);
        }
        Verb::Part => {
            engine.nicks_mut().remove(&channel, &nick);
            engine.fire(EventKind::UserPart, msg);
        }
        Verb::Quit => {
            engine.nicks_mut().remove_everywhere(&nick);
            engine.fire(EventKind::UserPart, msg);
        }
        Verb::Nick => {
            let new_nick = if !msg.body().is_empty() {
                msg.body().to_owned()
            } else {
                msg.target().trim_start_matches(':').to_owned()
            };
            for chan in engine.nicks_mut().channels() {
                if engine.nicks_mut().contains(&chan, &nick) {
                    engine.nicks_mut().remove(&chan, &nick);
                    engine.nicks_mut().add(&chan, &new_nick);
                }
            }
            engine.fire(EventKind::UserNickChange, msg);
        }
        Verb::Other => {}
    }

    Some(TickOutcome::Continue)
}

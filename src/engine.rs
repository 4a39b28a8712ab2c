//! The engine loop: owns the connection, drives the state machine, and
//! coordinates the parser, dispatcher, outbound queue, and process
//! scheduler on every tick.
//!
//! Grounded on `bot_run()`: each call to [`Engine::tick`] advances the
//! connection lifecycle, then performs exactly one of two paths — drain one
//! already-buffered line, or perform one slow-path network step.

use std::collections::VecDeque;

use irc_interface::{CommandFlags, EngineHandle, EventKind, PollInterest, Transport};
use irc_proto::limits::MSG_MAX;
use irc_proto::line::LineSplitter;
use irc_proto::IrcMessage;

use crate::callback::{CallbackFn, CallbackTable};
use crate::clock::{Clock, MonotonicClock};
use crate::commands::{CommandFn, HashCommandRegistry};
use crate::config::BotConfig;
use crate::dispatcher;
use crate::error::{EngineError, TickOutcome};
use crate::nicklist::ChannelNickLists;
use crate::outbound::OutboundIndex;
use crate::process::{ProcessQueue, ProcessStep};
use crate::state::{ConnectionState, NickAttempt};
use crate::transport::TcpTransport;

/// The IRC connection engine. Owns everything needed to drive one bot
/// connection via repeated calls to [`Engine::tick`].
pub struct Engine<T: Transport = TcpTransport> {
    config: BotConfig,
    transport: T,
    clock: Box<dyn Clock>,

    state: ConnectionState,
    nick_attempt: NickAttempt,
    joined: bool,
    start_time_ms: Option<u64>,

    outbound: OutboundIndex,
    processes: ProcessQueue,
    nicks: ChannelNickLists,
    commands: HashCommandRegistry,
    callbacks: CallbackTable,

    pending_lines: VecDeque<String>,
    read_buf: Vec<u8>,
    /// Bytes read from the socket but not yet resolved into a complete
    /// `\r\n`-terminated line; a line spanning two `read()` calls must
    /// survive here until the rest of it arrives.
    line_buf: String,
    splitter: LineSplitter,
}

impl Engine<TcpTransport> {
    /// Creates an engine with the default non-blocking TCP transport.
    pub fn new(config: BotConfig) -> Engine<TcpTransport> {
        Engine::with_transport(config, TcpTransport::new())
    }
}

impl<T: Transport> Engine<T> {
    /// Creates an engine over a caller-supplied transport (a real socket, or
    /// a test double).
    pub fn with_transport(config: BotConfig, transport: T) -> Engine<T> {
        Engine {
            config,
            transport,
            clock: Box::new(MonotonicClock::new()),
            state: ConnectionState::initial(),
            nick_attempt: NickAttempt::new(irc_proto::limits::NICK_ATTEMPTS),
            joined: false,
            start_time_ms: None,
            outbound: OutboundIndex::new(),
            processes: ProcessQueue::new(),
            nicks: ChannelNickLists::default(),
            commands: HashCommandRegistry::new(),
            callbacks: CallbackTable::new(),
            pending_lines: VecDeque::new(),
            read_buf: vec![0u8; MSG_MAX],
            line_buf: String::new(),
            splitter: LineSplitter::new(),
        }
    }

    /// Creates an engine over a caller-supplied transport and [`Clock`],
    /// letting tests drive rate limiting, throttle backoff, and the
    /// registration watchdog deterministically instead of against real
    /// wall-clock time.
    pub fn with_transport_and_clock(config: BotConfig, transport: T, clock: Box<dyn Clock>) -> Engine<T> {
        Engine {
            clock,
            ..Engine::with_transport(config, transport)
        }
    }

    /// Connects the underlying transport and moves to [`ConnectionState::Connected`].
    /// IRC registration itself happens on subsequent ticks.
    pub fn connect(&mut self) -> crate::error::Result<()> {
        self.nick_attempt = NickAttempt::new(irc_proto::limits::NICK_ATTEMPTS);
        self.transport
            .connect(self.config.server(), self.config.port(), self.config.use_tls())?;
        self.state = ConnectionState::Connected;
        self.fire(EventKind::Connect, &IrcMessage::parse_server(String::new()));
        Ok(())
    }

    /// Registers (or replaces) the handler for an event kind.
    pub fn set_callback(&mut self, kind: EventKind, handler: CallbackFn) {
        self.callbacks.set(kind, handler);
    }

    /// Registers a user command.
    pub fn add_command(&mut self, name: &str, arity: usize, flags: CommandFlags, handler: CommandFn) {
        self.commands.add_command(name, arity, flags, handler);
    }

    /// Schedules a long-running process, returning its pid.
    pub fn enqueue_process(&mut self, step: Box<dyn ProcessStep>, cmd: &str, caller: &str) -> u32 {
        let now = self.clock.now_ms();
        self.processes.enqueue(step, cmd, caller, now)
    }

    /// Cancels a scheduled process by pid.
    pub fn cancel_process(&mut self, pid: u32) -> bool {
        self.processes.dequeue_by_pid(pid)
    }

    /// The candidate nickname currently in use.
    pub fn current_nick(&self) -> &str {
        self.config
            .nicknames()
            .get(self.nick_attempt.index())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Formats, splits if necessary, and enqueues an outbound message.
    pub fn send(&mut self, target: &str, action: &str, ctcp_verb: Option<&str>, body: &str) {
        let overhead = irc_proto::line::overhead_len(self.current_nick());
        let chunks = irc_proto::line::split_message(body, overhead);
        let now = self.clock.now_ms();
        for chunk in chunks {
            let wire = irc_proto::line::format_line(action, target, ctcp_verb, &chunk);
            self.outbound.enqueue(target, wire.into_bytes(), now);
        }
    }

    /// Sends a raw, preformatted line immediately, bypassing the outbound
    /// queue. Used for PING replies and the NICK/USER/JOIN handshake.
    pub fn send_raw(&mut self, line: &str) {
        let wire = format!("{}{}", line, irc_proto::limits::MSG_FOOTER);
        let _ = self.transport.send(wire.as_bytes());
    }

    /// Informs the outbound queue that `target` is being throttled by the
    /// server.
    pub fn set_throttle(&mut self, target: &str) {
        self.outbound.set_throttle(target);
    }

    pub(crate) fn fire(&mut self, kind: EventKind, msg: &IrcMessage) {
        self.callbacks.fire(kind, msg);
    }

    pub(crate) fn config(&self) -> &BotConfig {
        &self.config
    }

    pub(crate) fn commands(&self) -> &HashCommandRegistry {
        &self.commands
    }

    /// Invokes a registered command's handler, giving it access back to the
    /// engine through the restricted [`EngineHandle`] view.
    ///
    /// The registry is temporarily taken out of `self` so the handler can
    /// borrow the engine mutably without also holding a borrow of the
    /// registry it was looked up in.
    pub(crate) fn invoke_command(
        &mut self,
        name: &str,
        data: &irc_interface::CmdData,
    ) -> Option<Result<(), String>> {
        let commands = std::mem::take(&mut self.commands);
        let result = commands.invoke(name, self, data);
        self.commands = commands;
        result
    }

    pub(crate) fn nicks_mut(&mut self) -> &mut ChannelNickLists {
        &mut self.nicks
    }

    pub(crate) fn advance_nick_attempt(&mut self) -> bool {
        self.nick_attempt.advance()
    }

    pub(crate) fn nick_attempts_max(&self) -> usize {
        irc_proto::limits::NICK_ATTEMPTS
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn outbound_targets(&self) -> Vec<String> {
        self.outbound.targets()
    }

    /// Advances the engine by one cooperative step: first the connection
    /// lifecycle, then either one buffered line or one network poll.
    pub fn tick(&mut self) -> TickOutcome {
        if let Some(outcome) = self.drive_lifecycle() {
            return outcome;
        }

        if let Some(line) = self.pending_lines.pop_front() {
            return dispatcher::dispatch_line(self, &line);
        }

        self.slow_path()
    }

    /// Proactively advances `None`/`Connected`/`Registered`/`Joined`. Returns
    /// `Some(Fatal(..))` only on unrecoverable registration exhaustion;
    /// `None` otherwise (including when no transition was due).
    fn drive_lifecycle(&mut self) -> Option<TickOutcome> {
        match self.state {
            ConnectionState::None => None,
            ConnectionState::Connected => {
                let nick = self.current_nick().to_owned();
                self.send_raw(&format!("NICK {}", nick));
                self.send_raw(&format!(
                    "USER {} {} test: {}",
                    self.config.ident(),
                    self.config.server(),
                    self.config.realname()
                ));
                self.start_time_ms = Some(self.clock.now_ms());
                // pending registration: the dispatcher reacts to 001/433
                // while already in Listening.
                self.state = ConnectionState::Listening;
                None
            }
            ConnectionState::Registered => {
                for channel in self.config.channels().to_vec() {
                    self.send_raw(&format!("JOIN {}", channel));
                }
                self.state = ConnectionState::Joined;
                None
            }
            ConnectionState::Joined => {
                self.joined = true;
                let join_msg = IrcMessage::parse_server(String::new());
                self.fire(EventKind::Join, &join_msg);
                self.state = ConnectionState::Listening;
                None
            }
            ConnectionState::Listening => {
                if !self.joined {
                    if let Some(start) = self.start_time_ms {
                        let now = self.clock.now_ms();
                        if now.saturating_sub(start) >= self.config.register_timeout_sec() * 1000 {
                            self.state = ConnectionState::Registered;
                            self.start_time_ms = None;
                        }
                    }
                }
                None
            }
        }
    }

    fn slow_path(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();

        self.processes.tick(now);
        self.outbound.tick(now, &mut self.transport);

        match self.transport.poll(PollInterest::Readable) {
            Ok(true) => {}
            Ok(false) => return TickOutcome::Continue,
            Err(e) => return TickOutcome::Fatal(EngineError::Io(e)),
        }

        let n = match self.transport.read(&mut self.read_buf) {
            Ok(n) => n,
            Err(e) => return TickOutcome::Fatal(EngineError::Io(e)),
        };

        if n == 0 {
            return TickOutcome::Fatal(EngineError::RemoteClosed);
        }

        self.line_buf
            .push_str(&String::from_utf8_lossy(&self.read_buf[..n]));

        while let Some((line, consumed)) = self.splitter.next_line(&self.line_buf) {
            if !line.is_empty() {
                self.pending_lines.push_back(line.to_owned());
            }
            self.line_buf.drain(..consumed);
            self.splitter.reset();
        }

        TickOutcome::Continue
    }

    /// Runs the engine until a fatal outcome is reached. A thin convenience
    /// wrapper; callers wanting finer control should call [`Engine::tick`]
    /// directly from their own loop.
    pub fn run(&mut self) -> EngineError {
        loop {
            match self.tick() {
                TickOutcome::Fatal(e) => return e,
                TickOutcome::Continue | TickOutcome::CommandError => {}
            }
        }
    }
}

impl<T: Transport> EngineHandle for Engine<T> {
    fn send(&mut self, target: &str, action: &str, ctcp: Option<&str>, body: &str) {
        Engine::send(self, target, action, ctcp, body)
    }

    fn send_raw(&mut self, line: &str) {
        Engine::send_raw(self, line)
    }

    fn current_nick(&self) -> &str {
        Engine::current_nick(self)
    }
}


//! End-to-end engine scenarios driven purely through the public API and a
//! fake in-memory [`Transport`], exercising the tick-by-tick sequences
//! described alongside the engine's design (PING reply, registration up to
//! `Listening`, nick-collision exhaustion, self-echo suppression, and
//! master-gated commands).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use bottybot::{
    BotConfig, CmdData, CommandFlags, Engine, EngineHandle, EventKind, FakeClock, PollInterest,
    ProcessStep, StepResult, TickOutcome, Transport,
};

#[derive(Default)]
struct FakeTransport {
    inbound: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
}

impl FakeTransport {
    fn push_line(&mut self, line: &str) {
        self.inbound.extend(line.as_bytes());
        self.inbound.extend(b"\r\n");
    }

    fn sent_lines(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .collect()
    }
}

impl Transport for FakeTransport {
    fn connect(&mut self, _host: &str, _port: u16, _tls: bool) -> io::Result<()> {
        Ok(())
    }

    fn poll(&mut self, interest: PollInterest) -> io::Result<bool> {
        Ok(match interest {
            PollInterest::Readable => !self.inbound.is_empty(),
            PollInterest::Writable => true,
        })
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inbound.len().min(buf.len());
        for (i, slot) in buf.iter_mut().enumerate().take(n) {
            *slot = self.inbound.pop_front().unwrap();
        }
        Ok(n)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sent.push(buf.to_vec());
        Ok(buf.len())
    }
}

fn config() -> BotConfig {
    BotConfig::builder("irc.example.net")
        .nickname("bot0")
        .nickname("bot1")
        .nickname("bot2")
        .channel("#chan")
        .master("owner")
        .build()
}

/// A transport wrapped in `Rc<RefCell<..>>` so the test can keep feeding it
/// lines after handing ownership to the engine.
#[derive(Default, Clone)]
struct SharedTransport(Rc<RefCell<FakeTransport>>);

impl Transport for SharedTransport {
    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<()> {
        self.0.borrow_mut().connect(host, port, tls)
    }
    fn poll(&mut self, interest: PollInterest) -> io::Result<bool> {
        self.0.borrow_mut().poll(interest)
    }
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.borrow_mut().read(buf)
    }
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().send(buf)
    }
}

#[test]
fn s1_ping_gets_an_immediate_pong() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick(); // CONNECTED -> Listening; sends NICK/USER

    shared.0.borrow_mut().push_line("PING :abc123");
    engine.tick(); // slow path: reads the PING into the line buffer
    engine.tick(); // fast path: dispatches the buffered PING line

    let sent = shared.0.borrow().sent_lines();
    assert!(sent.iter().any(|l| l == "PONG :abc123\r\n"));
}

#[test]
fn s2_connected_sends_nick_and_user() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick();

    let sent = shared.0.borrow().sent_lines();
    assert!(sent.iter().any(|l| l == "NICK bot0\r\n"));
    assert!(sent
        .iter()
        .any(|l| l == "USER bot0 irc.example.net test: a bottybot bot\r\n"));
}

#[test]
fn s3_nick_collision_retries_with_next_candidate() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick(); // sends NICK bot0 / USER

    shared.0.borrow_mut().push_line(":srv 433 * bot0 :Nickname is already in use");
    engine.tick(); // read
    engine.tick(); // dispatch 433

    assert_eq!(engine.current_nick(), "bot1");
}

#[test]
fn registration_reaches_listening_and_fires_join_once() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());

    let joins = Rc::new(RefCell::new(0u32));
    let joins2 = joins.clone();
    engine.set_callback(EventKind::Join, Box::new(move |_| *joins2.borrow_mut() += 1));

    engine.connect().unwrap();
    engine.tick(); // CONNECTED -> Listening, sends NICK/USER

    shared.0.borrow_mut().push_line(":srv 001 bot0 :Welcome");
    engine.tick(); // read
    engine.tick(); // dispatch 001 -> Registered
    engine.tick(); // drive_lifecycle: Registered -> sends JOIN, state Joined
    engine.tick(); // drive_lifecycle: Joined -> joined=true, fires Join, Listening

    assert_eq!(*joins.borrow(), 1);

    let sent = shared.0.borrow().sent_lines();
    assert!(sent.iter().any(|l| l.starts_with("JOIN #chan")));
}

#[test]
fn s8_nick_attempts_are_exhausted_after_every_candidate_is_rejected() {
    // `config()` configures NICK_ATTEMPTS (3) candidate nicknames, but
    // exhaustion is bound on the NICK_ATTEMPTS constant itself, not on the
    // candidate count: three collisions retry (walking the tracker through
    // indices 0->1->2->3, the last one past the final configured
    // candidate), and only a fourth is fatal.
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick();

    for _ in 0..3 {
        shared
            .0
            .borrow_mut()
            .push_line(":srv 433 * nick :Nickname is already in use");
        engine.tick(); // read
        engine.tick(); // dispatch -> retries with next candidate
        engine.tick(); // CONNECTED -> Listening again, resends NICK/USER
    }

    shared
        .0
        .borrow_mut()
        .push_line(":srv 433 * nick :Nickname is already in use");
    engine.tick(); // read
    let outcome = engine.tick(); // dispatch the fourth collision: exhausted
    assert!(matches!(outcome, TickOutcome::Fatal(_)));
}

#[test]
fn s10_self_echo_does_not_fire_the_msg_callback() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick();

    let fired = Rc::new(RefCell::new(false));
    let fired2 = fired.clone();
    engine.set_callback(EventKind::Msg, Box::new(move |_| *fired2.borrow_mut() = true));

    shared.0.borrow_mut().push_line(":bot0!b@h PRIVMSG #chan :hi there");
    engine.tick(); // read
    engine.tick(); // dispatch, self-echo suppressed

    assert!(!*fired.borrow());
}

#[test]
fn a_line_split_across_two_reads_is_not_dispatched_until_complete() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick(); // CONNECTED -> Listening; sends NICK/USER

    // Push only the first half of the line (no terminator yet) and let the
    // engine read it; a naive per-read splitter would treat this partial
    // fragment as a complete (malformed) line and dispatch it immediately.
    shared.0.borrow_mut().inbound.extend(b"PING :ab");
    engine.tick(); // slow path: reads the partial fragment, no full line yet

    let sent_before = shared.0.borrow().sent_lines();
    assert!(
        !sent_before.iter().any(|l| l.starts_with("PONG")),
        "must not reply to an incomplete line"
    );

    // The rest of the line arrives on a later read.
    shared.0.borrow_mut().inbound.extend(b"c123\r\n");
    engine.tick(); // slow path: completes the line
    engine.tick(); // fast path: dispatches the now-complete PING

    let sent = shared.0.borrow().sent_lines();
    assert!(sent.iter().any(|l| l == "PONG :abc123\r\n"));
}

#[test]
fn s4_rate_limited_burst_sends_one_message_per_interval() {
    // Each queued message needs two pump steps to clear (one to confirm the
    // send, one to confirm it wasn't throttled), so a burst of 3 under
    // `MSG_PER_SECOND_LIM = 2` goes out roughly 1000ms apart, not 500ms —
    // see DESIGN.md's Open Question resolution #4.
    let shared = SharedTransport::default();
    let clock = FakeClock::new(0);
    let mut engine = Engine::with_transport_and_clock(config(), shared.clone(), Box::new(clock.clone()));
    engine.connect().unwrap();
    engine.tick(); // CONNECTED -> Listening; sends NICK/USER

    engine.send("#chan", "PRIVMSG", None, "one");
    engine.send("#chan", "PRIVMSG", None, "two");
    engine.send("#chan", "PRIVMSG", None, "three");

    engine.tick(); // pump: Init -> Sent for "one"
    let sent = shared.0.borrow().sent_lines();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("one"));

    clock.advance(500);
    engine.tick(); // pump: Sent -> pop "one"

    clock.advance(500); // t=1000
    engine.tick(); // pump: Init -> Sent for "two"
    let sent = shared.0.borrow().sent_lines();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("two"));

    clock.advance(500); // t=1500
    engine.tick(); // pump: Sent -> pop "two"

    clock.advance(500); // t=2000
    engine.tick(); // pump: Init -> Sent for "three"
    let sent = shared.0.borrow().sent_lines();
    assert_eq!(sent.len(), 3);
    assert!(sent[2].contains("three"));
}

#[test]
fn s5_throttle_backoff_delays_retry_by_the_full_window() {
    let shared = SharedTransport::default();
    let clock = FakeClock::new(0);
    let mut engine = Engine::with_transport_and_clock(config(), shared.clone(), Box::new(clock.clone()));
    engine.connect().unwrap();
    engine.tick();

    engine.send("#chan", "PRIVMSG", None, "one");
    engine.tick(); // Init -> Sent
    assert_eq!(shared.0.borrow().sent_lines().len(), 1);

    engine.set_throttle("#chan");
    clock.advance(500);
    engine.tick(); // Sent, throttled -> rewind to Init
    assert_eq!(
        shared.0.borrow().sent_lines().len(),
        1,
        "must not be popped while throttled"
    );

    // The 10s backoff window hasn't elapsed yet.
    clock.advance(5000);
    engine.tick();
    assert_eq!(shared.0.borrow().sent_lines().len(), 1);

    // The rest of the window elapses; the retry goes out.
    clock.advance(5000);
    engine.tick(); // Init -> Sent (retry)
    assert_eq!(shared.0.borrow().sent_lines().len(), 2);
}

#[test]
fn s6_scheduled_process_runs_to_completion_and_can_be_cancelled() {
    struct CountingStep {
        calls: Rc<RefCell<u32>>,
        finish_after: u32,
    }

    impl ProcessStep for CountingStep {
        fn step(&mut self) -> StepResult {
            *self.calls.borrow_mut() += 1;
            if *self.calls.borrow() >= self.finish_after {
                StepResult::Done
            } else {
                StepResult::Continue
            }
        }
    }

    let shared = SharedTransport::default();
    let clock = FakeClock::new(0);
    let mut engine = Engine::with_transport_and_clock(config(), shared.clone(), Box::new(clock.clone()));
    engine.connect().unwrap();
    engine.tick(); // CONNECTED -> Listening

    let calls = Rc::new(RefCell::new(0u32));
    let pid = engine.enqueue_process(
        Box::new(CountingStep { calls: calls.clone(), finish_after: 2 }),
        "cmd",
        "owner",
    );

    clock.advance(600); // interval is 500ms
    engine.tick(); // one step
    assert_eq!(*calls.borrow(), 1);

    clock.advance(600);
    engine.tick(); // second step -> Done, dequeued
    assert_eq!(*calls.borrow(), 2);
    assert!(!engine.cancel_process(pid), "already completed processes are gone");

    let cancelled_calls = Rc::new(RefCell::new(0u32));
    let pid2 = engine.enqueue_process(
        Box::new(CountingStep { calls: cancelled_calls.clone(), finish_after: 1000 }),
        "cmd2",
        "owner",
    );
    assert!(engine.cancel_process(pid2));

    clock.advance(600);
    engine.tick();
    assert_eq!(*cancelled_calls.borrow(), 0, "a cancelled process must never step again");
}

#[test]
fn master_only_command_is_refused_from_a_non_master_nick() {
    let shared = SharedTransport::default();
    let mut engine = Engine::with_transport(config(), shared.clone());
    engine.connect().unwrap();
    engine.tick();

    let ran = Rc::new(RefCell::new(false));
    let ran2 = ran.clone();
    engine.add_command(
        "shutdown",
        1,
        CommandFlags { master_only: true },
        Box::new(move |_engine: &mut dyn EngineHandle, _data: &CmdData| {
            *ran2.borrow_mut() = true;
            Ok(())
        }),
    );

    shared.0.borrow_mut().push_line(":stranger!s@h PRIVMSG #chan :.shutdown");
    engine.tick();
    engine.tick();
    assert!(!*ran.borrow());

    shared.0.borrow_mut().push_line(":owner!o@h PRIVMSG #chan :.shutdown");
    engine.tick();
    engine.tick();
    assert!(*ran.borrow());
}

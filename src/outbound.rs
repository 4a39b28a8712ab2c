//! The per-target outbound send queue: FIFO ordering, rate limiting, and
//! throttle-aware backoff.
//!
//! Grounded directly on the authoritative, multi-channel, millisecond-
//! timestamped queue pump (see `DESIGN.md`'s Open Question resolution #1).
//! Using a `VecDeque` instead of an intrusive linked list structurally
//! removes the dangling-tail bug that implementation's single-channel
//! sibling had on its last `pop`.

use std::collections::{HashMap, VecDeque};

use irc_interface::Transport;
use irc_proto::limits::{MSG_PER_SECOND_LIM, THROTTLE_WAIT_SEC};

/// Lifecycle of one queued outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundState {
    /// Not yet handed to the transport.
    Init,
    /// Handed to the transport; waiting to confirm it wasn't throttled
    /// before freeing it.
    Sent,
}

/// One queued outbound wire message.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    wire: Vec<u8>,
    state: OutboundState,
}

impl OutboundMessage {
    fn new(wire: Vec<u8>) -> OutboundMessage {
        OutboundMessage {
            wire,
            state: OutboundState::Init,
        }
    }
}

/// The FIFO of pending messages for one target, plus its rate/throttle
/// bookkeeping.
#[derive(Debug, Default)]
pub struct TargetQueue {
    messages: VecDeque<OutboundMessage>,
    next_send_at_ms: u64,
    throttle_count: u32,
    last_throttle_count: u32,
    is_throttled: bool,
}

impl TargetQueue {
    /// Number of messages currently queued (pending + in-flight).
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing is queued for this target.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn calculate_next_send_ms(now_ms: u64, throttled: bool) -> u64 {
        if throttled {
            now_ms + THROTTLE_WAIT_SEC * 1000
        } else {
            now_ms + 1000 / MSG_PER_SECOND_LIM
        }
    }

    /// Advances this target's queue by one pump step: rate-limit check,
    /// throttle-edge detection, then a single Init-or-Sent state
    /// transition for the head of the queue.
    fn pump(&mut self, now_ms: u64, socket_writable: bool, transport: &mut dyn Transport) {
        if now_ms < self.next_send_at_ms {
            return;
        }

        self.is_throttled = self.throttle_count != self.last_throttle_count;
        if self.is_throttled {
            self.last_throttle_count = self.throttle_count;
        }

        if !socket_writable {
            return;
        }

        let status = match self.messages.front() {
            Some(m) => m.state,
            None => return,
        };

        match status {
            OutboundState::Init => {
                let wire = self.messages.front().unwrap().wire.clone();
                // Best-effort: a partial non-blocking write is treated as
                // sent for scheduling purposes, matching the C pump's
                // fire-and-forget `connection_client_send` call.
                let _ = transport.send(&wire);
                self.messages.front_mut().unwrap().state = OutboundState::Sent;
                self.next_send_at_ms = Self::calculate_next_send_ms(now_ms, false);
            }
            OutboundState::Sent => {
                if self.is_throttled {
                    self.messages.front_mut().unwrap().state = OutboundState::Init;
                    self.next_send_at_ms = Self::calculate_next_send_ms(now_ms, true);
                } else {
                    self.messages.pop_front();
                    self.next_send_at_ms = Self::calculate_next_send_ms(now_ms, false);
                }
            }
        }
    }
}

/// All per-target outbound queues, keyed by target (channel or nick).
#[derive(Debug, Default)]
pub struct OutboundIndex {
    queues: HashMap<String, TargetQueue>,
}

impl OutboundIndex {
    /// Creates an empty index.
    pub fn new() -> OutboundIndex {
        OutboundIndex::default()
    }

    /// Appends `wire` to `target`'s queue, creating the queue lazily.
    pub fn enqueue(&mut self, target: &str, wire: Vec<u8>, now_ms: u64) {
        let queue = self.queues.entry(target.to_owned()).or_insert_with(|| {
            let mut q = TargetQueue::default();
            q.next_send_at_ms = now_ms;
            q
        });
        queue.messages.push_back(OutboundMessage::new(wire));
    }

    /// Signals that the server indicated `target` is being throttled.
    pub fn set_throttle(&mut self, target: &str) {
        if let Some(queue) = self.queues.get_mut(target) {
            queue.throttle_count += 1;
        }
    }

    /// Returns the number of messages still queued for `target`.
    pub fn pending_for(&self, target: &str) -> usize {
        self.queues.get(target).map(TargetQueue::len).unwrap_or(0)
    }

    /// Every target with a queue currently tracked, whether or not it still
    /// has messages pending.
    pub fn targets(&self) -> Vec<String> {
        self.queues.keys().cloned().collect()
    }

    /// Pumps every target's queue once. Called once per engine tick.
    pub fn tick(&mut self, now_ms: u64, transport: &mut dyn Transport) {
        let writable = transport.poll(irc_interface::PollInterest::Writable).unwrap_or(false);
        for queue in self.queues.values_mut() {
            queue.pump(now_ms, writable, transport);
        }
    }

    /// Drops every queued message across every target, for shutdown.
    pub fn drain_all(&mut self) {
        self.queues.clear();
    }
}

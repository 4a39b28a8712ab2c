//! Default per-channel nickname bookkeeping.
//!
//! Grounded on the per-channel `bot_regName(bot, channel, nick)` signature
//! declared in the later engine header, not the single global list its own
//! function bodies actually used (see `DESIGN.md`'s Open Question #3).

use std::collections::{HashMap, HashSet};

use irc_interface::NickSet;

/// A `HashMap<channel, HashSet<nick>>`-backed [`NickSet`].
#[derive(Debug, Default)]
pub struct ChannelNickLists {
    channels: HashMap<String, HashSet<String>>,
}

impl ChannelNickLists {
    /// Creates an empty nick-list store.
    pub fn new() -> ChannelNickLists {
        ChannelNickLists::default()
    }
}

impl NickSet for ChannelNickLists {
    fn add(&mut self, channel: &str, nick: &str) {
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .insert(nick.to_owned());
    }

    fn remove(&mut self, channel: &str, nick: &str) {
        if let Some(nicks) = self.channels.get_mut(channel) {
            nicks.remove(nick);
        }
    }

    fn contains(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get(channel)
            .map(|nicks| nicks.contains(nick))
            .unwrap_or(false)
    }

    fn iter(&self, channel: &str) -> Vec<String> {
        self.channels
            .get(channel)
            .map(|nicks| nicks.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }
}

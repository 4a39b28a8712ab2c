//! Bot configuration.
//!
//! Every field that has a sensible default is optional, with an accessor
//! method that supplies the default, rather than forcing callers to fill in
//! every field by hand.

#[cfg(feature = "toml_config")]
use serde::Deserialize;

use irc_proto::limits::NICK_ATTEMPTS;

/// Immutable bot configuration, built via [`BotConfigBuilder`] or loaded
/// from TOML (behind the `toml_config` feature).
#[cfg_attr(feature = "toml_config", derive(Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    server: String,
    port: Option<u16>,
    use_tls: Option<bool>,
    password: Option<String>,
    ident: Option<String>,
    realname: Option<String>,
    master: Option<String>,
    nicknames: Vec<String>,
    channels: Vec<String>,
    ctcp_version: Option<String>,
    register_timeout_sec: Option<u64>,
    command_char: Option<char>,
}

impl BotConfig {
    /// Starts building a config for the given server host.
    pub fn builder(server: impl Into<String>) -> BotConfigBuilder {
        BotConfigBuilder::new(server)
    }

    /// Loads a config from a TOML document.
    #[cfg(feature = "toml_config")]
    pub fn from_toml_str(s: &str) -> Result<BotConfig, toml::de::Error> {
        toml::from_str(s)
    }

    /// The server host to connect to.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The port to connect on. Defaults to `6697` if TLS is enabled, else
    /// `6667`.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.use_tls() { 6697 } else { 6667 })
    }

    /// Whether to negotiate TLS on connect. Defaults to `false`.
    pub fn use_tls(&self) -> bool {
        self.use_tls.unwrap_or(false)
    }

    /// The server password, if one is configured.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The ident/username sent in registration. Defaults to the first
    /// candidate nickname.
    pub fn ident(&self) -> &str {
        self.ident
            .as_deref()
            .unwrap_or_else(|| self.nicknames.first().map(String::as_str).unwrap_or(""))
    }

    /// The realname sent in registration. Defaults to `"a bottybot bot"`.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or("a bottybot bot")
    }

    /// The privileged master nickname, if one is configured.
    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    /// Candidate nicknames, tried in order on registration collisions. At
    /// most [`NICK_ATTEMPTS`] are consulted.
    pub fn nicknames(&self) -> &[String] {
        &self.nicknames
    }

    /// Channels to join once registered.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// The body sent in reply to a CTCP VERSION query. Defaults to
    /// `"bottybot"`.
    pub fn ctcp_version(&self) -> &str {
        self.ctcp_version.as_deref().unwrap_or("bottybot")
    }

    /// Seconds allowed between `CONNECTED` and `JOINED` before the
    /// registration watchdog forces a retry. Defaults to
    /// [`irc_proto::limits::REGISTER_TIMEOUT_SEC`].
    pub fn register_timeout_sec(&self) -> u64 {
        self.register_timeout_sec
            .unwrap_or(irc_proto::limits::REGISTER_TIMEOUT_SEC)
    }

    /// The character that introduces a bot command. Defaults to
    /// [`irc_proto::limits::CMD_CHAR`].
    pub fn command_char(&self) -> char {
        self.command_char.unwrap_or(irc_proto::limits::CMD_CHAR)
    }
}

/// Builder for [`BotConfig`].
#[derive(Debug, Clone)]
pub struct BotConfigBuilder {
    inner: BotConfig,
}

impl BotConfigBuilder {
    /// Starts a new builder for the given server host.
    pub fn new(server: impl Into<String>) -> BotConfigBuilder {
        BotConfigBuilder {
            inner: BotConfig {
                server: server.into(),
                port: None,
                use_tls: None,
                password: None,
                ident: None,
                realname: None,
                master: None,
                nicknames: Vec::new(),
                channels: Vec::new(),
                ctcp_version: None,
                register_timeout_sec: None,
                command_char: None,
            },
        }
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.inner.port = Some(port);
        self
    }

    /// Enables or disables TLS.
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.inner.use_tls = Some(use_tls);
        self
    }

    /// Sets the server password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.inner.password = Some(password.into());
        self
    }

    /// Sets the ident/username.
    pub fn ident(mut self, ident: impl Into<String>) -> Self {
        self.inner.ident = Some(ident.into());
        self
    }

    /// Sets the realname.
    pub fn realname(mut self, realname: impl Into<String>) -> Self {
        self.inner.realname = Some(realname.into());
        self
    }

    /// Sets the privileged master nickname.
    pub fn master(mut self, master: impl Into<String>) -> Self {
        self.inner.master = Some(master.into());
        self
    }

    /// Appends a candidate nickname. Only the first [`NICK_ATTEMPTS`] are
    /// ever consulted.
    pub fn nickname(mut self, nick: impl Into<String>) -> Self {
        self.inner.nicknames.push(nick.into());
        self
    }

    /// Appends a channel to join.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.inner.channels.push(channel.into());
        self
    }

    /// Sets the registration watchdog timeout.
    pub fn register_timeout_sec(mut self, secs: u64) -> Self {
        self.inner.register_timeout_sec = Some(secs);
        self
    }

    /// Freezes the builder into an immutable [`BotConfig`].
    pub fn build(self) -> BotConfig {
        self.inner
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_follow_tls() {
        let cfg = BotConfig::builder("irc.example.net").build();
        assert_eq!(cfg.port(), 6667);
        let cfg = BotConfig::builder("irc.example.net").use_tls(true).build();
        assert_eq!(cfg.port(), 6697);
    }

    #[test]
    fn ident_defaults_to_first_nickname() {
        let cfg = BotConfig::builder("irc.example.net")
            .nickname("bot")
            .nickname("bot_")
            .build();
        assert_eq!(cfg.ident(), "bot");
        assert_eq!(cfg.nicknames().len(), 2);
    }

    #[cfg(feature = "toml_config")]
    #[test]
    fn loads_from_toml() {
        let toml = r#"
            server = "irc.example.net"
            nicknames = ["bot", "bot_"]
            channels = ["#chan"]
        "#;
        let cfg = BotConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.server(), "irc.example.net");
        assert_eq!(cfg.channels(), &["#chan".to_owned()]);
    }
}

//! A minimal manual smoke test: connects to a server, joins a channel, and
//! echoes every `PRIVMSG` it sees to stdout via the `MSG` callback.
//!
//! Not part of the crate's public surface — run with `cargo run --example
//! smoke_bot -- irc.example.net '#bottest' mybot`. Wiring a logger and
//! parsing process arguments is left to a downstream binary; this one
//! exists purely to drive the engine by hand while developing.

use std::{env, thread, time::Duration};

use bottybot::{BotConfig, Engine, EventKind, TickOutcome};

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "irc.example.net".to_owned());
    let channel = args.next().unwrap_or_else(|| "#bottest".to_owned());
    let nick = args.next().unwrap_or_else(|| "bottybot".to_owned());

    let config = BotConfig::builder(server)
        .nickname(nick.clone())
        .nickname(format!("{}_", nick))
        .nickname(format!("{}__", nick))
        .channel(channel)
        .ident(nick)
        .realname("a bottybot smoke test")
        .build();

    let mut engine = Engine::new(config);
    engine.set_callback(
        EventKind::Msg,
        Box::new(|msg| println!("<{}> {}", msg.nick(), msg.body())),
    );
    engine.set_callback(EventKind::Join, Box::new(|_| println!("-- joined --")));

    if let Err(e) = engine.connect() {
        eprintln!("connect failed: {}", e);
        return;
    }

    loop {
        match engine.tick() {
            TickOutcome::Fatal(e) => {
                eprintln!("engine stopped: {}", e);
                break;
            }
            TickOutcome::Continue | TickOutcome::CommandError => {}
        }
        thread::sleep(Duration::from_millis(10));
    }
}

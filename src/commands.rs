//! The default [`CommandRegistry`] implementation and command dispatch
//! types.
//!
//! Grounded on `CmdData{info,msg}` and `bot->commands`'s hash-table lookup
//! plus the `CMDFLAG_MASTER` permission check in the original dispatcher.

use std::collections::HashMap;

use irc_interface::{CmdData, CommandEntry, CommandFlags, CommandRegistry, EngineHandle};

/// A command handler. Returns a negative-equivalent `Err` to signal
/// failure; the dispatcher logs but does not treat this as fatal. Takes a
/// restricted [`EngineHandle`] rather than the engine itself, so the
/// registry stays independent of the engine's transport type.
pub type CommandFn = Box<dyn Fn(&mut dyn EngineHandle, &CmdData) -> Result<(), String>>;

/// A registered command: its metadata plus its handler.
pub struct RegisteredCommand {
    entry: CommandEntry,
    handler: CommandFn,
}

/// A `HashMap`-backed [`CommandRegistry`].
#[derive(Default)]
pub struct HashCommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
}

impl HashCommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> HashCommandRegistry {
        HashCommandRegistry::default()
    }

    /// Registers a command with its handler in one call.
    pub fn add_command(
        &mut self,
        name: &str,
        arity: usize,
        flags: CommandFlags,
        handler: CommandFn,
    ) {
        self.commands.insert(
            name.to_owned(),
            RegisteredCommand {
                entry: CommandEntry { arity, flags },
                handler,
            },
        );
    }

    /// Invokes the handler registered for `name`, if any.
    pub fn invoke(
        &self,
        name: &str,
        engine: &mut dyn EngineHandle,
        data: &CmdData,
    ) -> Option<Result<(), String>> {
        self.commands.get(name).map(|cmd| (cmd.handler)(engine, data))
    }
}

impl CommandRegistry for HashCommandRegistry {
    fn lookup(&self, name: &str) -> Option<CommandEntry> {
        self.commands.get(name).map(|c| c.entry)
    }

    fn register(&mut self, name: &str, entry: CommandEntry) {
        self.commands.insert(
            name.to_owned(),
            RegisteredCommand {
                entry,
                handler: Box::new(|_engine, _data| Ok(())),
            },
        );
    }

    fn unregister(&mut self, name: &str) -> Option<CommandEntry> {
        self.commands.remove(name).map(|c| c.entry)
    }
}

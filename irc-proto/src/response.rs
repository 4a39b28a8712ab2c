//! Numeric server reply codes the engine's dispatcher treats specially.
//!
//! Only the replies this engine actually reacts to are named; everything
//! else arrives as a plain numeric string in [`crate::message::IrcMessage::action`]
//! and is passed through to the `ServerCode` callback untouched.
#![allow(non_camel_case_types)]

use std::str::FromStr;

macro_rules! make_response {
    ($($(#[$attr:meta])+ $variant:ident = $value:expr),+ $(,)?) => {
        /// A known numeric server reply.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum Response {
            $($(#[$attr])+ $variant = $value),+
        }

        impl Response {
            /// Looks up a `Response` by its numeric code.
            pub fn from_u16(val: u16) -> Option<Response> {
                match val {
                    $($value => Some(Response::$variant),)+
                    _ => None
                }
            }
        }
    }
}

make_response! {
    /// Successful registration (the end of the welcome burst).
    RPL_WELCOME = 1,
    /// Part of a NAMES reply listing users in a channel.
    RPL_NAMREPLY = 353,
    /// Marks the end of a NAMES reply.
    RPL_ENDOFNAMES = 366,
    /// Marks the end of the MOTD.
    RPL_ENDOFMOTD = 376,
    /// Sent in place of a MOTD when the server has none configured.
    ERR_NOMOTD = 422,
    /// The requested nickname is already in use.
    ERR_NICKNAMEINUSE = 433,
}

impl Response {
    /// A very rough split between informational and error replies: the IRC
    /// numeric space reserves everything at or above 400 for errors.
    pub fn is_error(self) -> bool {
        (self as u16) >= 400
    }
}

impl FromStr for Response {
    type Err = ();

    fn from_str(s: &str) -> Result<Response, ()> {
        s.parse::<u16>().ok().and_then(Response::from_u16).ok_or(())
    }
}

pub mod del;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod get;
pub mod incr;
pub mod set;
pub mod ttl;

use std::{str, vec};

use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;

use del::Del;
use exists::Exists;
use expire::Expire;
use get::Get;
use incr::Incr;
use set::Set;
use ttl::Ttl;

/// The closed set of supported verbs. Dispatch is an exhaustive match, so a
/// new verb is a compile-time-checked change at every consumption site.
#[derive(Debug, PartialEq)]
pub enum Command {
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    Get(Get),
    Incr(Incr),
    Set(Set),
    Ttl(Ttl),
}

impl Executable for Command {
    fn exec(self, store: &mut Store) -> Frame {
        match self {
            Command::Del(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Expire(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Incr(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::Ttl(cmd) => cmd.exec(store),
        }
    }
}

/// Interprets a command frame against the store and produces the reply frame.
/// Command-level failures (unknown verb, bad arity, bad argument) become
/// error replies and leave the store untouched.
pub fn dispatch(frame: Frame, store: &mut Store) -> Frame {
    match Command::try_from(frame) {
        Ok(command) => command.exec(store),
        Err(err) => Frame::Error(err.to_string()),
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands as RESP arrays of bulk strings.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let parser = &mut CommandParser::new(frames);
        let command_name = parser.parse_command_name()?;

        match &command_name[..] {
            "del" => Del::try_from(parser).map(Command::Del),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "expire" => Expire::try_from(parser).map(Command::Expire),
            "get" => Get::try_from(parser).map(Command::Get),
            "incr" => Incr::try_from(parser).map(Command::Incr),
            "set" => Set::try_from(parser).map(Command::Set),
            "ttl" => Ttl::try_from(parser).map(Command::Ttl),
            _ => Err(CommandError::UnknownCommand(command_name)),
        }
    }
}

pub(crate) struct CommandParser {
    parts: vec::IntoIter<Frame>,
    // Number of elements in the command array, the verb included.
    arity: usize,
}

impl CommandParser {
    fn new(frames: Vec<Frame>) -> CommandParser {
        CommandParser {
            arity: frames.len(),
            parts: frames.into_iter(),
        }
    }

    pub(crate) fn arity(&self) -> usize {
        self.arity
    }

    fn parse_command_name(&mut self) -> Result<String, CommandError> {
        // Verb lookup is case-insensitive.
        self.next_string().map(|name| name.to_lowercase())
    }

    pub(crate) fn next_string(&mut self) -> Result<String, CommandError> {
        let frame = self.parts.next().ok_or(CommandError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(|_| CommandError::InvalidFrame {
                    expected: "UTF-8 string".to_string(),
                    actual: Frame::Bulk(bytes.clone()),
                }),
            frame => Err(CommandError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Returns the next element as-is. Values are stored verbatim, so `SET`
    /// does not care what variant its value argument is.
    pub(crate) fn next_frame(&mut self) -> Result<Frame, CommandError> {
        self.parts.next().ok_or(CommandError::EndOfStream)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("invalid command {0}")]
    UnknownCommand(String),
    #[error("wrong number of arguments for the {0} command")]
    WrongArity(&'static str),
    #[error("seconds argument must be a positive number")]
    InvalidSeconds,
    #[error("invalid option {0}")]
    InvalidOption(String),
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

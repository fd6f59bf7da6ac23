use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

/// Set `key` to hold the value argument, verbatim. An existing entry is
/// overwritten and any prior expiration is cleared.
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Frame,
}

impl Executable for Set {
    fn exec(self, store: &mut Store) -> Frame {
        store.set(self.key, self.value);
        Frame::Simple("OK".to_string())
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() != 3 {
            return Err(CommandError::WrongArity("SET"));
        }
        let key = parser.next_string()?;
        let value = parser.next_frame()?;
        Ok(Self { key, value })
    }
}

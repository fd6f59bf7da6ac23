use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

/// Increment the number stored at `key` by one. An absent key is seeded with
/// `0` before the increment, so the first INCR replies with 1.
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: String,
}

impl Executable for Incr {
    fn exec(self, store: &mut Store) -> Frame {
        let value = match store.get(&self.key) {
            Some(value) => value,
            None => {
                let seed = Frame::Simple("0".to_string());
                store.set(self.key.clone(), seed.clone());
                seed
            }
        };

        let number = match value.to_string().parse::<i64>() {
            Ok(number) => number,
            Err(_) => return Frame::Error("value can't be converted to number".to_string()),
        };

        // A counter at i64::MAX cannot grow; report it instead of wrapping.
        let number = match number.checked_add(1) {
            Some(number) => number,
            None => return Frame::Error("increment or decrement would overflow".to_string()),
        };
        store.set(self.key, Frame::Simple(number.to_string()));

        Frame::Integer(number)
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() != 2 {
            return Err(CommandError::WrongArity("INCR"));
        }
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

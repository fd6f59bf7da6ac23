use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

/// Count how many of the given keys currently exist. A key whose expiration
/// has passed does not count and is evicted by the lookup.
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<String>,
}

impl Executable for Exists {
    fn exec(self, store: &mut Store) -> Frame {
        let mut count = 0;
        for key in self.keys {
            if store.get(&key).is_some() {
                count += 1;
            }
        }
        Frame::Integer(count)
    }
}

impl TryFrom<&mut CommandParser> for Exists {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() < 2 {
            return Err(CommandError::WrongArity("EXISTS"));
        }

        let mut keys = Vec::with_capacity(parser.arity() - 1);
        loop {
            match parser.next_string() {
                Ok(key) => keys.push(key),
                Err(CommandError::EndOfStream) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    fn command_frame(parts: &[&str]) -> Frame {
        Frame::Array(
            parts
                .iter()
                .map(|part| Frame::Bulk(Bytes::from(part.to_string())))
                .collect(),
        )
    }

    #[test]
    fn counts_live_keys() {
        let mut store = Store::new();
        store.set("name".to_string(), Frame::Bulk(Bytes::from("john")));
        store.set_with_expire(
            "stale".to_string(),
            Frame::Bulk(Bytes::from("x")),
            crate::store::now() - 10,
        );

        let cmd =
            Command::try_from(command_frame(&["EXISTS", "name", "stale", "missing"])).unwrap();
        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Integer(1));
    }

    #[test]
    fn repeated_keys_are_counted_each_time() {
        let mut store = Store::new();
        store.set("name".to_string(), Frame::Bulk(Bytes::from("john")));

        let cmd = Command::try_from(command_frame(&["EXISTS", "name", "name"])).unwrap();
        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Integer(2));
    }

    #[test]
    fn zero_keys() {
        let err = Command::try_from(command_frame(&["EXISTS"])).unwrap_err();

        assert_eq!(err, CommandError::WrongArity("EXISTS"));
    }
}

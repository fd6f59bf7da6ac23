use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

/// Remove the given keys, replying with the number that actually existed.
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<String>,
}

impl Executable for Del {
    fn exec(self, store: &mut Store) -> Frame {
        let mut count = 0;
        for key in self.keys {
            if store.delete(&key) {
                count += 1;
            }
        }
        Frame::Integer(count)
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() < 2 {
            return Err(CommandError::WrongArity("DEL"));
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
    fn counts_existing_keys_only() {
        let mut store = Store::new();
        store.set("name".to_string(), Frame::Bulk(Bytes::from("john")));
        store.set("age".to_string(), Frame::Bulk(Bytes::from("20")));

        let cmd = Command::try_from(command_frame(&["DEL", "name", "lastname", "age"])).unwrap();
        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Integer(2));
        assert_eq!(store.get("name"), None);
        assert_eq!(store.get("age"), None);
    }

    #[test]
    fn expired_keys_are_not_counted() {
        let mut store = Store::new();
        store.set_with_expire(
            "stale".to_string(),
            Frame::Bulk(Bytes::from("x")),
            crate::store::now() - 10,
        );

        let cmd = Command::try_from(command_frame(&["DEL", "stale"])).unwrap();
        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Integer(0));
    }

    #[test]
    fn zero_keys() {
        let err = Command::try_from(command_frame(&["DEL"])).unwrap_err();

        assert_eq!(err, CommandError::WrongArity("DEL"));
    }
}

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

/// Get the value of `key`. A missing (or lazily expired) key replies with the
/// simple string `not found`.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: &mut Store) -> Frame {
        match store.get(&self.key) {
            Some(value) => value,
            None => Frame::Simple("not found".to_string()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() != 2 {
            return Err(CommandError::WrongArity("GET"));
        }
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn existing_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: String::from("key1")
            })
        );

        let mut store = Store::new();
        store.set(String::from("key1"), Frame::Bulk(Bytes::from("1")));

        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Bulk(Bytes::from("1")));
    }

    #[test]
    fn missing_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let mut store = Store::new();
        let result = cmd.exec(&mut store);

        assert_eq!(result, Frame::Simple("not found".to_string()));
    }

    #[test]
    fn wrong_arity() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("extra")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(err, CommandError::WrongArity("GET"));
    }
}

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{self, Store};

/// Remaining time to live of `key`, in seconds. Replies -2 when the key does
/// not exist (a lazily expired key is evicted by this very lookup, so it also
/// reports -2) and -1 when the key exists but has no timeout.
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
}

impl Executable for Ttl {
    fn exec(self, store: &mut Store) -> Frame {
        match store.get_with_expire(&self.key) {
            None => Frame::Integer(-2),
            Some((_, 0)) => Frame::Integer(-1),
            Some((_, expires_at)) => Frame::Integer(expires_at - store::now()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() != 2 {
            return Err(CommandError::WrongArity("TTL"));
        }
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatch;
    use bytes::Bytes;

    fn ttl_frame(key: &str) -> Frame {
        Frame::Array(vec![
            Frame::Bulk(Bytes::from("TTL")),
            Frame::Bulk(Bytes::from(key.to_string())),
        ])
    }

    #[test]
    fn missing_key() {
        let mut store = Store::new();

        let reply = dispatch(ttl_frame("missing"), &mut store);
        assert_eq!(reply, Frame::Integer(-2));
    }

    #[test]
    fn key_without_expiration() {
        let mut store = Store::new();
        store.set("name".to_string(), Frame::Bulk(Bytes::from("john")));

        let reply = dispatch(ttl_frame("name"), &mut store);
        assert_eq!(reply, Frame::Integer(-1));
    }

    #[test]
    fn key_with_expiration() {
        let mut store = Store::new();
        store.set_with_expire(
            "name".to_string(),
            Frame::Bulk(Bytes::from("john")),
            store::now() + 100,
        );

        let reply = dispatch(ttl_frame("name"), &mut store);
        match reply {
            Frame::Integer(remaining) => assert!((99..=100).contains(&remaining)),
            reply => panic!("unexpected reply: {:?}", reply),
        }
    }

    #[test]
    fn expired_key_reports_missing() {
        let mut store = Store::new();
        store.set_with_expire(
            "name".to_string(),
            Frame::Bulk(Bytes::from("john")),
            store::now() - 10,
        );

        // The lookup evicts the stale entry, so the reply is -2, never a
        // negative remainder.
        let reply = dispatch(ttl_frame("name"), &mut store);
        assert_eq!(reply, Frame::Integer(-2));
    }
}

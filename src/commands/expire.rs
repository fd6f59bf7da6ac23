use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{self, Store};

/// Set a timeout of `seconds` on `key`, optionally guarded:
///
/// - `NX` applies only when the key has no timeout yet.
/// - `XX` applies only when the key already has one.
/// - `GT` applies only when the new deadline is later than the current one.
/// - `LT` applies only when it is earlier. As in Redis, `GT` and `LT` treat a
///   key without a timeout as having an infinite one, so neither applies.
///
/// Replies 1 when the timeout was set, 0 otherwise. Negative seconds delete
/// the key outright.
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: String,
    pub seconds: i64,
    pub option: Option<ExpireOption>,
}

#[derive(Debug, PartialEq)]
pub enum ExpireOption {
    Nx,
    Xx,
    Gt,
    Lt,
}

impl Executable for Expire {
    fn exec(self, store: &mut Store) -> Frame {
        if self.seconds < 0 {
            store.delete(&self.key);
            return Frame::Integer(0);
        }

        let (value, current_expire) = match store.get_with_expire(&self.key) {
            Some(entry) => entry,
            None => return Frame::Integer(0),
        };

        // `seconds` is attacker controlled and may be as large as i64::MAX;
        // a deadline past the end of the epoch is not representable.
        let new_expire = match store::now().checked_add(self.seconds) {
            Some(new_expire) => new_expire,
            None => return Frame::Error("invalid expire time".to_string()),
        };
        let applies = match self.option {
            None => true,
            Some(ExpireOption::Nx) => current_expire == 0,
            Some(ExpireOption::Xx) => current_expire > 0,
            Some(ExpireOption::Gt) => current_expire > 0 && new_expire > current_expire,
            Some(ExpireOption::Lt) => current_expire > 0 && new_expire < current_expire,
        };

        if applies {
            store.set_with_expire(self.key, value, new_expire);
            Frame::Integer(1)
        } else {
            Frame::Integer(0)
        }
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.arity() < 3 || parser.arity() > 4 {
            return Err(CommandError::WrongArity("EXPIRE"));
        }

        let key = parser.next_string()?;
        let seconds = parser
            .next_string()?
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidSeconds)?;

        let option = match parser.next_string() {
            Ok(option) => Some(ExpireOption::try_from(option)?),
            Err(CommandError::EndOfStream) => None,
            Err(err) => return Err(err),
        };

        Ok(Self {
            key,
            seconds,
            option,
        })
    }
}

impl TryFrom<String> for ExpireOption {
    type Error = CommandError;

    fn try_from(option: String) -> Result<Self, Self::Error> {
        match option.to_uppercase().as_str() {
            "NX" => Ok(ExpireOption::Nx),
            "XX" => Ok(ExpireOption::Xx),
            "GT" => Ok(ExpireOption::Gt),
            "LT" => Ok(ExpireOption::Lt),
            _ => Err(CommandError::InvalidOption(option)),
        }
    }
}

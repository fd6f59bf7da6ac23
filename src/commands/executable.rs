use crate::frame::Frame;
use crate::store::Store;

/// A validated command, ready to run against the store. Commands never fail
/// out of band: every outcome, including command-level errors, is a reply
/// frame for the client.
pub trait Executable {
    fn exec(self, store: &mut Store) -> Frame;
}

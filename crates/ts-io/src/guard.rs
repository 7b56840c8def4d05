//! Cleanup of partially created destinations.

use std::path::PathBuf;

use log::debug;

use crate::{Destination, MemorySink};

enum Target {
    Local(PathBuf),
    Memory(MemorySink),
}

/// Removes a destination's contents on drop unless disarmed.
///
/// Arm it right after a stream has been opened and disarm it once the
/// session is fully initialised, so an error in between leaves nothing behind.
/// Never arm it before the open succeeds: a failed create-new open would
/// otherwise delete someone else's file.
pub struct PartialFileGuard {
    target: Option<Target>,
}

impl PartialFileGuard {
    pub fn new(destination: &Destination) -> Self {
        let target = match destination {
            Destination::Local(path) => Target::Local(path.clone()),
            Destination::Memory(sink) => Target::Memory(sink.clone()),
        };
        Self { target: Some(target) }
    }

    /// Keep the destination: the file is no longer partial.
    pub fn disarm(&mut self) {
        self.target = None;
    }

    pub fn is_armed(&self) -> bool {
        self.target.is_some()
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        match self.target.take() {
            Some(Target::Local(path)) => {
                // Best effort; the caller is already handling another error.
                if std::fs::remove_file(&path).is_ok() {
                    debug!("removed partial file {}", path.display());
                }
            }
            Some(Target::Memory(sink)) => sink.lock().clear(),
            None => {}
        }
    }
}

//! Background writer for persisted snapshots.
//!
//! Dispatch hands encoded snapshots to a dedicated thread and returns
//! immediately. Consecutive queued writes collapse into the newest one;
//! only the latest snapshot is ever read back.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::sync::Arc;

use crate::persist::error::PersistError;
use crate::persist::storage::Storage;

const ERROR_CHANNEL_SIZE: usize = 64;

pub(crate) enum WriteCommand {
    Write(Vec<u8>),
    Remove,
    /// Acknowledged once every command queued before it has been applied.
    Flush(SyncSender<()>),
}

/// Delivers persistence errors to the log and to the error channel.
///
/// The channel is bounded; when nobody drains it, further errors are
/// only logged.
#[derive(Clone)]
pub(crate) struct ErrorReporter {
    sender: SyncSender<PersistError>,
}

impl ErrorReporter {
    pub(crate) fn channel() -> (Self, Receiver<PersistError>) {
        let (sender, receiver) = mpsc::sync_channel(ERROR_CHANNEL_SIZE);
        (Self { sender }, receiver)
    }

    pub(crate) fn report(&self, error: PersistError) {
        tracing::warn!(error = %error, "Persistence error");
        let _ = self.sender.try_send(error);
    }
}

pub(crate) fn spawn_writer(
    storage: Arc<dyn Storage>,
    key: String,
    errors: ErrorReporter,
) -> Sender<WriteCommand> {
    let (sender, receiver) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("stockroom-persist".to_string())
        .spawn(move || writer_loop(receiver, storage, key, errors));
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "Failed to start persistence writer");
    }
    sender
}

fn writer_loop(
    receiver: Receiver<WriteCommand>,
    storage: Arc<dyn Storage>,
    key: String,
    errors: ErrorReporter,
) {
    let mut pending = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match receiver.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            WriteCommand::Write(mut bytes) => {
                let mut superseded = 0usize;
                loop {
                    match receiver.try_recv() {
                        Ok(WriteCommand::Write(newer)) => {
                            bytes = newer;
                            superseded += 1;
                        }
                        Ok(other) => {
                            pending = Some(other);
                            break;
                        }
                        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                    }
                }
                if superseded > 0 {
                    tracing::trace!(superseded, "Coalesced snapshot writes");
                }
                match storage.set(&key, &bytes) {
                    Ok(()) => tracing::trace!(key = %key, bytes = bytes.len(), "Snapshot written"),
                    Err(err) => errors.report(err.into()),
                }
            }
            WriteCommand::Remove => match storage.remove(&key) {
                Ok(()) => tracing::debug!(key = %key, "Snapshot purged"),
                Err(err) => errors.report(err.into()),
            },
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::trace!("Persistence writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::storage::{MemoryStorage, StorageError};
    use parking_lot::Mutex;

    /// Records every value written, in order.
    #[derive(Default)]
    struct RecordingStorage {
        writes: Mutex<Vec<Vec<u8>>>,
    }

    impl Storage for RecordingStorage {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.writes.lock().last().cloned())
        }

        fn set(&self, _key: &str, value: &[u8]) -> Result<(), StorageError> {
            self.writes.lock().push(value.to_vec());
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            self.writes.lock().clear();
            Ok(())
        }
    }

    fn flush(sender: &Sender<WriteCommand>) {
        let (ack, done) = mpsc::sync_channel(1);
        sender.send(WriteCommand::Flush(ack)).unwrap();
        done.recv().unwrap();
    }

    #[test]
    fn latest_write_wins() {
        let storage = Arc::new(RecordingStorage::default());
        let (errors, _rx) = ErrorReporter::channel();
        let sender = spawn_writer(storage.clone(), "persist:root".into(), errors);

        for n in 0..50u8 {
            sender.send(WriteCommand::Write(vec![n])).unwrap();
        }
        flush(&sender);

        let writes = storage.writes.lock();
        assert!(!writes.is_empty());
        assert!(writes.len() <= 50);
        assert_eq!(writes.last(), Some(&vec![49]));
    }

    #[test]
    fn remove_is_ordered_after_pending_writes() {
        let storage = MemoryStorage::new();
        let (errors, _rx) = ErrorReporter::channel();
        let sender = spawn_writer(Arc::new(storage.clone()), "persist:root".into(), errors);

        sender.send(WriteCommand::Write(b"{}".to_vec())).unwrap();
        sender.send(WriteCommand::Remove).unwrap();
        flush(&sender);

        assert_eq!(storage.get("persist:root").unwrap(), None);
    }

    #[test]
    fn reporter_drops_errors_when_channel_is_full() {
        let (errors, rx) = ErrorReporter::channel();
        for _ in 0..(ERROR_CHANNEL_SIZE + 10) {
            errors.report(PersistError::WriterStopped);
        }
        assert_eq!(rx.try_iter().count(), ERROR_CHANNEL_SIZE);
    }
}

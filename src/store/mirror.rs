use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{
    error::{AppError, Result},
    storage::JsonStorage,
};

/// Upper bound on how long a batch may keep absorbing commands, in debounce
/// windows counted from the first one.
const MAX_WAIT_WINDOWS: u32 = 4;

enum Op {
    Write(Value),
    Remove,
}

enum Command {
    Put { key: String, op: Op },
    Flush(oneshot::Sender<Option<AppError>>),
}

/// Write-behind copy of store mutations into persistent storage.
///
/// Callers enqueue and move on. A single worker coalesces commands per key
/// while they keep arriving within the debounce window, then writes the
/// latest value for each key in first-touched order. A steady stream of
/// commands still gets written once the batch is `MAX_WAIT_WINDOWS` old.
pub struct Mirror {
    tx: mpsc::UnboundedSender<Command>,
}

impl Mirror {
    pub fn spawn(storage: JsonStorage, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(storage, debounce, rx));
        Self { tx }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => self.send(Command::Put { key, op: Op::Write(value) }),
            Err(e) => tracing::error!(key, "Failed to encode mirrored value: {}", e),
        }
    }

    pub fn remove(&self, key: impl Into<String>) {
        self.send(Command::Put { key: key.into(), op: Op::Remove });
    }

    /// Waits for everything enqueued so far to reach storage. Returns the
    /// first write failure seen since the previous flush.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(done_tx))
            .map_err(|_| AppError::Internal("Mirror worker has stopped".to_string()))?;

        match done_rx.await {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err),
            Err(_) => Err(AppError::Internal("Mirror worker has stopped".to_string())),
        }
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::error!("Mirror worker has stopped; change not persisted");
        }
    }
}

async fn run(storage: JsonStorage, debounce: Duration, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut pending: Vec<(String, Op)> = Vec::new();
    let mut failure: Option<AppError> = None;

    while let Some(command) = rx.recv().await {
        let mut waiters = Vec::new();
        absorb(command, &mut pending, &mut waiters);

        if waiters.is_empty() && !debounce.is_zero() {
            let deadline = Instant::now() + debounce * MAX_WAIT_WINDOWS;
            loop {
                let wait = debounce.min(deadline.saturating_duration_since(Instant::now()));
                if wait.is_zero() {
                    break;
                }
                match tokio::time::timeout(wait, rx.recv()).await {
                    Ok(Some(command)) => {
                        absorb(command, &mut pending, &mut waiters);
                        if !waiters.is_empty() {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }

        apply(&storage, &mut pending, &mut failure).await;

        if !waiters.is_empty() {
            let result = failure.take();
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }

    // Senders are gone; persist whatever is left.
    apply(&storage, &mut pending, &mut failure).await;
}

fn absorb(
    command: Command,
    pending: &mut Vec<(String, Op)>,
    waiters: &mut Vec<oneshot::Sender<Option<AppError>>>,
) {
    match command {
        Command::Put { key, op } => match pending.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = op,
            None => pending.push((key, op)),
        },
        Command::Flush(done) => waiters.push(done),
    }
}

async fn apply(storage: &JsonStorage, pending: &mut Vec<(String, Op)>, failure: &mut Option<AppError>) {
    if pending.is_empty() {
        return;
    }
    tracing::debug!(count = pending.len(), "Mirroring store changes");

    for (key, op) in pending.drain(..) {
        let result = match op {
            Op::Write(value) => storage.set(&key, &value).await,
            Op::Remove => storage.remove(&key).await,
        };

        // JsonStorage already logged the failure.
        if let Err(e) = result {
            failure.get_or_insert(e);
        }
    }
}

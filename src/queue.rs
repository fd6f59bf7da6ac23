use thiserror::Error as ThisError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::commands;
use crate::frame::Frame;
use crate::store::Store;

/// Capacity of the task queue. A full queue makes submitters await their turn
/// instead of dropping work.
const TASK_QUEUE_SIZE: usize = 1000;

/// How long a session waits for its reply before giving up on the worker.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("the execution queue worker is gone")]
    WorkerGone,
    #[error("timed out waiting for the command reply")]
    ReplyTimeout,
}

/// One command frame paired with the single-use channel its reply travels on.
struct Task {
    command: Frame,
    reply: oneshot::Sender<Frame>,
}

/// A cheaply cloneable handle for submitting commands to the queue. Sessions
/// hold one of these and never touch the store themselves.
#[derive(Clone)]
pub struct ExecutorHandle {
    tasks: mpsc::Sender<Task>,
}

impl ExecutorHandle {
    /// Submits a command and waits for its reply. Submission awaits while the
    /// queue is full (back-pressure); the reply wait is bounded by
    /// `REPLY_TIMEOUT` so a stalled worker cannot wedge the session forever.
    pub async fn execute(&self, command: Frame) -> Result<Frame, Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task = Task {
            command,
            reply: reply_tx,
        };

        self.tasks.send(task).await.map_err(|_| Error::WorkerGone)?;

        match timeout(REPLY_TIMEOUT, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(Error::WorkerGone),
            Err(_) => Err(Error::ReplyTimeout),
        }
    }
}

/// Spawns the single worker that owns the store and returns the handle for
/// submitting tasks to it. The worker dequeues tasks strictly one at a time,
/// so no two commands ever execute concurrently and the store needs no
/// locking. It runs for as long as any handle is alive.
pub fn start(store: Store) -> ExecutorHandle {
    let (tasks_tx, tasks_rx) = mpsc::channel(TASK_QUEUE_SIZE);

    tokio::spawn(run_worker(tasks_rx, store));

    ExecutorHandle { tasks: tasks_tx }
}

async fn run_worker(mut tasks: mpsc::Receiver<Task>, mut store: Store) {
    while let Some(task) = tasks.recv().await {
        let reply = commands::dispatch(task.command, &mut store);

        // The session may have timed out and dropped its receiver; the store
        // mutation stands either way.
        if task.reply.send(reply).is_err() {
            debug!("reply channel closed before the reply was sent");
        }
    }
}

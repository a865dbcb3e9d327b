//! Stream tasks - one async consumer per camera
//!
//! The pose estimator (outside this crate) pushes deliveries into a bounded
//! channel; a spawned task drains it into the session. Frame pacing is
//! whatever the producer's cadence is. Nothing here is tied to rendering.

use std::sync::Arc;

use repsync_core::{PoseFrame, RepError, RepResult, StreamId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Session;

/// Message from a camera producer to its stream task
#[derive(Debug, Clone)]
pub enum StreamMessage {
    Frame(PoseFrame),
    /// Explicit end-of-stream
    End,
}

/// Producer side of a stream task
#[derive(Debug, Clone)]
pub struct StreamHandle {
    stream: StreamId,
    tx: mpsc::Sender<StreamMessage>,
}

impl StreamHandle {
    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Deliver a frame, waiting for buffer space
    pub async fn send_frame(&self, frame: PoseFrame) -> RepResult<()> {
        self.tx
            .send(StreamMessage::Frame(frame))
            .await
            .map_err(|_| RepError::StreamClosed(self.stream))
    }

    /// Deliver a frame without waiting
    ///
    /// A full buffer drops the frame and reports `StreamFull`.
    pub fn try_send_frame(&self, frame: PoseFrame) -> RepResult<()> {
        match self.tx.try_send(StreamMessage::Frame(frame)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(stream = %self.stream, "frame buffer full, dropping frame");
                Err(RepError::StreamFull(self.stream))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(RepError::StreamClosed(self.stream)),
        }
    }

    /// Signal that the camera has stopped for good
    pub async fn end(&self) -> RepResult<()> {
        self.tx
            .send(StreamMessage::End)
            .await
            .map_err(|_| RepError::StreamClosed(self.stream))
    }
}

/// What a stream task processed before it exited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub frames: u64,
    pub rejected: u64,
    pub counted: u64,
    /// True if the producer sent an explicit end
    pub ended: bool,
}

/// Spawn the task for one camera stream
///
/// The task exits when every `StreamHandle` is dropped (the phase stays as
/// last published) or after an explicit `End` (the stream is ended in the
/// session and counting suspends).
pub fn spawn_stream(
    session: Arc<Session>,
    stream: StreamId,
    capacity: usize,
) -> (StreamHandle, JoinHandle<StreamReport>) {
    let (tx, mut rx) = mpsc::channel(capacity.max(1));

    let task = tokio::spawn(async move {
        let mut report = StreamReport::default();
        while let Some(msg) = rx.recv().await {
            match msg {
                StreamMessage::Frame(frame) => {
                    report.frames += 1;
                    match session.update(stream, frame) {
                        Ok(outcome) => {
                            if outcome.counted() {
                                report.counted += 1;
                            }
                        }
                        Err(e) => {
                            report.rejected += 1;
                            tracing::warn!(%stream, error = %e, "frame rejected");
                        }
                    }
                }
                StreamMessage::End => {
                    session.end_stream(stream);
                    report.ended = true;
                    break;
                }
            }
        }
        tracing::debug!(%stream, ?report, "stream task finished");
        report
    });

    (StreamHandle { stream, tx }, task)
}

/// Both stream tasks of a session
pub struct SessionDriver {
    pub front: StreamHandle,
    pub side: StreamHandle,
    tasks: [JoinHandle<StreamReport>; 2],
}

impl SessionDriver {
    /// Spawn front and side tasks with the session's channel capacity
    pub fn spawn(session: Arc<Session>) -> Self {
        let capacity = session.config().channel_capacity;
        let (front, front_task) = spawn_stream(Arc::clone(&session), StreamId::Front, capacity);
        let (side, side_task) = spawn_stream(session, StreamId::Side, capacity);
        SessionDriver {
            front,
            side,
            tasks: [front_task, side_task],
        }
    }

    pub fn handle(&self, stream: StreamId) -> &StreamHandle {
        match stream {
            StreamId::Front => &self.front,
            StreamId::Side => &self.side,
        }
    }

    /// End both streams and wait for the tasks to drain
    ///
    /// Frames queued before shutdown are still applied. Clones of the
    /// handles that outlive the driver get `StreamClosed` afterwards.
    pub async fn shutdown(self) -> RepResult<[StreamReport; 2]> {
        let SessionDriver { front, side, tasks } = self;
        for handle in [&front, &side] {
            // A task that already exited has nothing left to end
            if let Err(e) = handle.end().await {
                tracing::debug!(stream = %handle.stream(), error = %e, "stream task already gone");
            }
        }
        drop(front);
        drop(side);

        let [front_task, side_task] = tasks;
        let front = front_task
            .await
            .map_err(|e| RepError::Io(format!("front stream task: {e}")))?;
        let side = side_task
            .await
            .map_err(|e| RepError::Io(format!("side stream task: {e}")))?;
        Ok([front, side])
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::error::{Result, ThermalError};
use crate::frame::RawFrame;

use super::engine::{RenderedFrame, ThermalEngine};
use super::snapshot::SharedConfig;

/// Frames waiting for the worker. One slot: a newer frame replaces a queued one.
const LIVE_QUEUE_CAPACITY: usize = 1;

/// Result of one frame on the live path.
#[derive(Debug)]
pub enum LiveEvent {
    Rendered(Box<RenderedFrame>),
    /// The frame could not be processed; the worker continues with the next one.
    Skipped(ThermalError),
}

/// Off-thread preview pipeline with drop-oldest backpressure.
///
/// `push` never blocks the capture thread. The worker renders each frame with
/// the config snapshot current when it starts on that frame.
pub struct LivePipeline {
    frames: Option<Sender<RawFrame>>,
    evict: Receiver<RawFrame>,
    dropped: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl LivePipeline {
    /// Start the worker thread. Events arrive on the returned receiver.
    pub fn spawn(
        engine: Arc<ThermalEngine>,
        config: Arc<SharedConfig>,
    ) -> Result<(Self, Receiver<LiveEvent>)> {
        let (frame_tx, frame_rx) = bounded::<RawFrame>(LIVE_QUEUE_CAPACITY);
        let (event_tx, event_rx) = unbounded::<LiveEvent>();
        let evict = frame_rx.clone();

        let worker = std::thread::Builder::new()
            .name("thermal-live".into())
            .spawn(move || worker_loop(&engine, &config, &frame_rx, &event_tx))?;

        info!("live pipeline started");
        Ok((
            Self {
                frames: Some(frame_tx),
                evict,
                dropped: Arc::new(AtomicU64::new(0)),
                worker: Some(worker),
            },
            event_rx,
        ))
    }

    /// Queue a frame, evicting the queued one if the worker is still busy.
    ///
    /// Frames pushed after the worker has stopped are discarded with a warning
    /// and not counted as dropped.
    pub fn push(&self, frame: RawFrame) {
        let Some(tx) = &self.frames else {
            return;
        };
        if !self.is_running() {
            warn!("live worker stopped, frame discarded");
            return;
        }
        let mut frame = frame;
        loop {
            match tx.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    // The queue holds its own receiver, so it never reports
                    // disconnection; check the worker instead.
                    if !self.is_running() {
                        warn!("live worker stopped, frame discarded");
                        return;
                    }
                    if self.evict.try_recv().is_ok() {
                        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(dropped = total, "live queue full, dropped oldest frame");
                    }
                    frame = back;
                }
                Err(TrySendError::Disconnected(_)) => {
                    warn!("live worker stopped, frame discarded");
                    return;
                }
            }
        }
    }

    /// Whether the worker thread is still consuming frames.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Frames evicted before the worker reached them.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Close the queue and wait for the worker to finish the frame in flight.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Closing the last sender ends the worker's receive loop.
        self.frames.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("live worker panicked");
            }
            info!(dropped = self.dropped(), "live pipeline stopped");
        }
    }
}

impl Drop for LivePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    engine: &ThermalEngine,
    config: &SharedConfig,
    frames: &Receiver<RawFrame>,
    events: &Sender<LiveEvent>,
) {
    for frame in frames.iter() {
        let snapshot = config.snapshot();
        let event = match engine.render_frame(&frame, &snapshot) {
            Ok(rendered) => LiveEvent::Rendered(Box::new(rendered)),
            Err(err) => {
                warn!(%err, "frame skipped");
                LiveEvent::Skipped(err)
            }
        };
        if events.send(event).is_err() {
            debug!("live event receiver dropped, stopping worker");
            break;
        }
    }
}

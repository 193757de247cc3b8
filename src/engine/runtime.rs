// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::build::BuildRunner;
use crate::deploy::ArtifactCopier;

use super::cycle::CycleOrchestrator;
use super::queue::TriggerQueue;
use super::RuntimeEvent;

/// Single consumer of the trigger channel.
///
/// The poller, the manual listener and the signal handler all publish
/// `RuntimeEvent`s; this loop runs one cycle at a time and parks triggers
/// that arrive meanwhile in a [`TriggerQueue`].
pub struct Runtime<B: BuildRunner, C: ArtifactCopier> {
    orchestrator: CycleOrchestrator<B, C>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    queue: TriggerQueue,
}

impl<B: BuildRunner, C: ArtifactCopier> fmt::Debug for Runtime<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("orchestrator", &self.orchestrator)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl<B: BuildRunner, C: ArtifactCopier> Runtime<B, C> {
    pub fn new(
        orchestrator: CycleOrchestrator<B, C>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        queue_length: usize,
    ) -> Self {
        Self {
            orchestrator,
            event_rx,
            queue: TriggerQueue::new(queue_length),
        }
    }

    /// Main event loop.
    ///
    /// - Takes the next queued trigger, or waits for one on the channel.
    /// - Runs one cycle.
    /// - Moves everything that arrived during the cycle into the queue.
    ///
    /// Returns the orchestrator (and with it the statistics) once shutdown is
    /// requested or every sender is gone and nothing is pending.
    pub async fn run(mut self) -> CycleOrchestrator<B, C> {
        info!("wad runtime started");

        loop {
            let reason = match self.queue.pop() {
                Some(reason) => reason,
                None => match self.event_rx.recv().await {
                    Some(RuntimeEvent::Triggered { reason }) => reason,
                    Some(RuntimeEvent::ShutdownRequested) => {
                        info!("shutdown requested; stopping runtime");
                        break;
                    }
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
            };

            let report = self.orchestrator.run_cycle(reason).await;
            debug!(?report, "cycle finished");

            if !self.absorb_pending() {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        self.orchestrator
    }

    /// Drain events that arrived while a cycle ran. Returns `false` if one of
    /// them asked for shutdown.
    fn absorb_pending(&mut self) -> bool {
        loop {
            match self.event_rx.try_recv() {
                Ok(RuntimeEvent::Triggered { reason }) => self.queue.record_trigger(reason),
                Ok(RuntimeEvent::ShutdownRequested) => return false,
                // Empty or disconnected: `recv` sorts out the latter.
                Err(_) => return true,
            }
        }
    }
}

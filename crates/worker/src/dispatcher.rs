// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs handlers for queued jobs on a fixed number of slots.
//!
//! Each slot is a task fed through its own single-job channel. Idle slots
//! announce themselves on a channel prepopulated with every slot id, so
//! the dispatch loop only takes a job off the queue once it can hand it on.

use crate::client::JobClient;
use crate::handler::JobHandler;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use zb_core::Job;

pub(crate) struct JobDispatcher {
    pub(crate) job_type: String,
    pub(crate) concurrency: usize,
    pub(crate) handler: Arc<dyn JobHandler>,
    pub(crate) client: JobClient,
    pub(crate) queue: mpsc::Receiver<Job>,
    pub(crate) finished: mpsc::Sender<()>,
    pub(crate) cancel: CancellationToken,
}

impl JobDispatcher {
    /// Dispatch until cancelled or the queue closes, then wait for every
    /// running handler.
    pub(crate) async fn run(mut self) {
        let concurrency = self.concurrency.max(1);
        let (idle_tx, mut idle_rx) = mpsc::channel::<usize>(concurrency);
        let mut slots = Vec::with_capacity(concurrency);
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(concurrency);

        for id in 0..concurrency {
            let (job_tx, job_rx) = mpsc::channel::<Job>(1);
            let slot = Slot {
                id,
                jobs: job_rx,
                idle: idle_tx.clone(),
                finished: self.finished.clone(),
                handler: Arc::clone(&self.handler),
                client: self.client.clone(),
                cancel: self.cancel.clone(),
            };
            slots.push(job_tx);
            tasks.push(tokio::spawn(slot.run()));
            let _ = idle_tx.try_send(id);
        }
        drop(idle_tx);

        loop {
            let job = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                job = self.queue.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };
            let slot = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                slot = idle_rx.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };
            let Some(sender) = slots.get(slot) else {
                break;
            };
            debug!(job_key = %job.key, slot, "dispatching job");
            if sender.send(job).await.is_err() {
                break;
            }
        }

        info!(job_type = %self.job_type, "dispatcher closing, waiting for running handlers");
        drop(slots);
        for task in tasks {
            let _ = task.await;
        }
        info!(job_type = %self.job_type, "dispatcher closed");
    }
}

struct Slot {
    id: usize,
    jobs: mpsc::Receiver<Job>,
    idle: mpsc::Sender<usize>,
    finished: mpsc::Sender<()>,
    handler: Arc<dyn JobHandler>,
    client: JobClient,
    cancel: CancellationToken,
}

impl Slot {
    async fn run(mut self) {
        while let Some(job) = self.jobs.recv().await {
            // handed over just before close
            if self.cancel.is_cancelled() {
                break;
            }
            let key = job.key;
            let outcome =
                AssertUnwindSafe(self.handler.handle(self.client.clone(), job)).catch_unwind().await;
            if let Err(panic) = outcome {
                error!(job_key = %key, slot = self.id, panic = %panic_message(&*panic), "job handler panicked");
            }
            let _ = self.finished.send(()).await;
            if self.idle.send(self.id).await.is_err() {
                break;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

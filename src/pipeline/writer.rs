//! Single-writer append queue.
//!
//! One dedicated thread drains an unbounded FIFO and appends each batch to the
//! store, so batches land in exactly the order they were enqueued. Failed
//! appends are reported through the failure hook and dropped; the provider is
//! never blocked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::error::StorageError;
use crate::logging::structured::LogContext;
use crate::storage::models::LocationSample;
use crate::storage::store::SampleStore;
use crate::{log_debug, log_warn};

enum WriterCommand {
    Append {
        ctx: LogContext,
        samples: Vec<LocationSample>,
    },
    Flush(mpsc::Sender<()>),
}

type FailureHook = Box<dyn Fn(&StorageError) + Send + 'static>;

pub struct SampleWriter {
    sender: Mutex<Option<mpsc::Sender<WriterCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<AtomicUsize>,
}

impl SampleWriter {
    /// Spawn the writer thread.
    pub fn spawn(
        store: Arc<dyn SampleStore>,
        on_failure: impl Fn(&StorageError) + Send + 'static,
    ) -> Result<Self, StorageError> {
        let (sender, receiver) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let thread_pending = Arc::clone(&pending);
        let on_failure: FailureHook = Box::new(on_failure);

        let handle = thread::Builder::new()
            .name("meerkat-sample-writer".to_string())
            .spawn(move || writer_loop(store.as_ref(), &receiver, &thread_pending, &on_failure))?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
            pending,
        })
    }

    /// Queue samples for appending. Returns immediately.
    pub fn enqueue(&self, ctx: &LogContext, samples: Vec<LocationSample>) -> Result<(), StorageError> {
        if samples.is_empty() {
            return Ok(());
        }
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(StorageError::Closed)?;

        self.pending.fetch_add(1, Ordering::AcqRel);
        let command = WriterCommand::Append {
            ctx: ctx.clone(),
            samples,
        };
        if sender.send(command).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    /// Block until every batch queued before this call has been processed.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        let sent = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(WriterCommand::Flush(done_tx)).is_ok(),
            None => false,
        };
        if sent {
            let _ = done_rx.recv();
        }
    }

    /// Batches queued but not yet appended.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Stop accepting work, drain what is queued, and join the thread.
    pub fn close(&self) {
        drop(self.sender.lock().take());
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                log::error!("SAMPLE_WRITER_PANICKED");
            }
        }
    }
}

impl Drop for SampleWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn writer_loop(
    store: &dyn SampleStore,
    receiver: &mpsc::Receiver<WriterCommand>,
    pending: &AtomicUsize,
    on_failure: &FailureHook,
) {
    while let Ok(command) = receiver.recv() {
        match command {
            WriterCommand::Append { ctx, samples } => {
                match store.append(&samples) {
                    Ok(()) => {
                        log_debug!(ctx, "SAMPLES_APPENDED", count = samples.len());
                    }
                    Err(err) => {
                        log_warn!(
                            ctx,
                            "SAMPLES_DROPPED",
                            count = samples.len(),
                            error = err.to_string()
                        );
                        on_failure(&err);
                    }
                }
                pending.fetch_sub(1, Ordering::AcqRel);
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::debug!("SAMPLE_WRITER_EXIT");
}

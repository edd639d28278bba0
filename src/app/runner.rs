use crate::{Error, Result, client::Envelope, models::Model};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

/// Runs one model call at a time on a background task.
///
/// There is no queue: while a run is outstanding, `start` refuses with
/// [`Error::Busy`]. The result is handed to a single completion callback.
#[derive(Debug, Clone, Default)]
pub struct BackgroundRunner {
    busy: Arc<AtomicBool>,
}

pub struct RunHandle {
    pub id: Uuid,
    handle: JoinHandle<()>,
}

impl RunHandle {
    /// Waits until the completion callback has returned.
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| Error::internal(format!("run {} did not complete: {}", self.id, e)))
    }
}

/// Clears the busy flag even if the run panics.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BackgroundRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Spawns the run on the current tokio runtime. The busy flag is cleared
    /// before `on_complete` is called, so the callback may start another run.
    pub fn start<F>(&self, model: Arc<dyn Model>, input: String, on_complete: F) -> Result<RunHandle>
    where
        F: FnOnce(Envelope) + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }

        let guard = BusyGuard(Arc::clone(&self.busy));
        let id = Uuid::new_v4();

        let handle = tokio::spawn(async move {
            info!("Run {} started for {}", id, model.model_id());
            let envelope = model.process_input(&input).await;
            info!("Run {} finished (success: {})", id, envelope.is_success());

            drop(guard);
            on_complete(envelope);
        });

        Ok(RunHandle { id, handle })
    }
}

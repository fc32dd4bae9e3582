//! Runs one isolated scheduler task per account and restarts crashed ones

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinSet};
use tracing::Instrument;

use crate::error::{FishingError, Result};
use crate::scheduler::{Account, AccountScheduler, FishingBackend, SchedulerConfig};

/// Default pause before a crashed account loop is started again
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(60);

/// Aborts the wrapped task when dropped, so cancelling the supervising task
/// also tears down the scheduler (and any open session) it was awaiting
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct Supervisor {
    tasks: JoinSet<()>,
    accounts: usize,
}

impl Supervisor {
    /// Spawn one supervised loop per token
    ///
    /// An empty token list is a configuration error.
    pub fn start<B>(
        backend: Arc<B>,
        config: SchedulerConfig,
        restart_delay: Duration,
        tokens: Vec<String>,
    ) -> Result<Self>
    where
        B: FishingBackend + 'static,
    {
        if tokens.is_empty() {
            return Err(FishingError::config("no account tokens configured"));
        }

        let config = Arc::new(config);
        let mut tasks = JoinSet::new();
        let accounts = tokens.len();

        for (index, token) in tokens.into_iter().enumerate() {
            let span = tracing::info_span!("account", n = index + 1);
            tasks.spawn(
                supervise(index, token, backend.clone(), config.clone(), restart_delay)
                    .instrument(span),
            );
        }

        tracing::info!("Started {} account(s)", accounts);
        Ok(Self { tasks, accounts })
    }

    pub fn accounts(&self) -> usize {
        self.accounts
    }

    /// Wait for every account task; under normal operation this never returns
    pub async fn wait(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    tracing::error!("Supervisor task ended abnormally: {}", e);
                }
            }
        }
    }

    /// Cancel every account task and wait for them to unwind
    pub async fn shutdown(&mut self) {
        tracing::info!("Shutting down {} account(s)", self.accounts);
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
    }
}

async fn supervise<B>(
    index: usize,
    token: String,
    backend: Arc<B>,
    config: Arc<SchedulerConfig>,
    restart_delay: Duration,
) where
    B: FishingBackend + 'static,
{
    let mut generation = 0u32;
    loop {
        generation += 1;
        let account = Account::new(index, token.clone());
        let scheduler = AccountScheduler::new(account, backend.clone(), config.clone());

        let mut handle = tokio::spawn(scheduler.run().in_current_span());
        let _guard = AbortOnDrop(handle.abort_handle());

        match (&mut handle).await {
            Ok(()) => tracing::warn!("Fishing loop exited unexpectedly"),
            Err(e) if e.is_panic() => {
                tracing::error!(
                    "Fishing loop crashed (run {}): {}",
                    generation,
                    panic_message(e.into_panic().as_ref())
                );
            }
            Err(_) => return,
        }

        tracing::info!("Restarting in {} seconds...", restart_delay.as_secs());
        tokio::time::sleep(restart_delay).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

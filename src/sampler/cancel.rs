use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Owner side of a stop request.
pub struct Canceller {
    tx: watch::Sender<bool>,
}

/// Observer side, handed to the sampler's stop condition.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (Canceller, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancelSignal { rx })
}

impl Canceller {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the
    /// canceller is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_on_ctrl_c(canceller: Canceller) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current sample");
            canceller.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiter() {
        let (canceller, mut signal) = cancel_pair();
        assert!(!signal.is_cancelled());
        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
            signal.is_cancelled()
        });
        canceller.cancel();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn cancel_before_wait_is_seen() {
        let (canceller, signal) = cancel_pair();
        canceller.cancel();
        let mut late = signal.clone();
        assert!(late.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), late.cancelled())
            .await
            .expect("already-cancelled signal should resolve immediately");
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_canceller_never_fires() {
        let (canceller, mut signal) = cancel_pair();
        drop(canceller);
        let result = tokio::time::timeout(Duration::from_secs(5), signal.cancelled()).await;
        assert!(result.is_err());
    }
}

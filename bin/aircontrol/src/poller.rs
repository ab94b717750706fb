use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use philips::DeviceClient;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{DeviceSync, Inventory, Result};

/// Periodic refresh task.
pub struct Poller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn start<C, I>(sync: Arc<DeviceSync<C, I>>, period: Duration) -> Self
    where
        C: DeviceClient + 'static,
        I: Inventory + 'static,
    {
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(sync, period, token.clone()));

        info!("polling every {}s", period.as_secs());

        Self { token, handle }
    }

    /// Cancels the task, interrupting a fetch in flight, and waits for it.
    pub async fn stop(self) -> Result<()> {
        self.token.cancel();
        self.handle.await?;

        debug!("poller stopped");
        Ok(())
    }
}

async fn run<C, I>(sync: Arc<DeviceSync<C, I>>, period: Duration, token: CancellationToken)
where
    C: DeviceClient,
    I: Inventory,
{
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => (),
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = sync.refresh() => {
                // fetch failures are already logged by refresh
                if let Err(err) = result {
                    debug!("refresh skipped: {err}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::testing::RecordingInventory;
    use crate::Registry;
    use async_trait::async_trait;
    use philips::{Status, Values};

    #[derive(Clone, Default)]
    struct CountingDevice {
        polls: Arc<AtomicUsize>,
        hang: bool,
    }

    #[async_trait]
    impl DeviceClient for CountingDevice {
        async fn get_status(&self) -> philips::Result<Status> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }

            Ok(Status::new())
        }

        async fn set_values(&self, _values: Values) -> philips::Result<()> {
            Ok(())
        }
    }

    async fn started(
        client: CountingDevice,
    ) -> Arc<DeviceSync<CountingDevice, RecordingInventory>> {
        let sync = Arc::new(DeviceSync::new(
            client,
            Registry::new(RecordingInventory::default()),
        ));
        sync.start().await.unwrap();
        sync
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_every_tick() {
        let client = CountingDevice::default();
        let polls = client.polls.clone();

        let poller = Poller::start(started(client).await, Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(25)).await;
        poller.stop().await.unwrap();

        // ticks at 0s, 10s and 20s
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_fetch() {
        let client = CountingDevice {
            hang: true,
            ..CountingDevice::default()
        };
        let polls = client.polls.clone();

        let poller = Poller::start(started(client).await, Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(30)).await;
        poller.stop().await.unwrap();

        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }
}

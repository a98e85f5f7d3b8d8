use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const RESIZE_WINDOW: Duration = Duration::from_millis(200);

/// Delivers the last value of a burst once no new value has arrived for
/// `window`.
pub struct Debouncer<T> {
    window: Duration,
    sender: mpsc::Sender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(window: Duration, sender: mpsc::Sender<T>) -> Self {
        Self {
            window,
            sender,
            pending: None,
        }
    }

    /// Cancels the scheduled delivery, if any, and schedules `value`.
    pub fn trigger(&mut self, value: T) {
        self.cancel();
        let sender = self.sender.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if sender.send(value).await.is_err() {
                log::debug!("Debounced value dropped: receiver closed");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn burst_delivers_only_the_last_value() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(RESIZE_WINDOW, tx);

        debouncer.trigger((80u16, 24u16));
        debouncer.trigger((100, 30));
        debouncer.trigger((120, 40));

        assert_eq!(rx.recv().await, Some((120, 40)));
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn event_inside_window_postpones_delivery() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(RESIZE_WINDOW, tx);

        debouncer.trigger(1);
        sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        let second = Instant::now();
        debouncer.trigger(2);
        assert_eq!(rx.recv().await, Some(2));
        assert!(second.elapsed() >= RESIZE_WINDOW);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_value() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(RESIZE_WINDOW, tx);

        debouncer.trigger("resize");
        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}

use tokio::sync::watch;

/// Per-screen busy flag. Only the owning controller can raise or clear it;
/// everyone else gets a [`BusyWatcher`].
#[derive(Debug)]
pub struct BusySignal {
    tx: watch::Sender<bool>,
}

impl BusySignal {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub(crate) fn raise(&self) {
        self.set(true);
    }

    pub(crate) fn clear(&self) {
        self.set(false);
    }

    fn set(&self, busy: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != busy;
            *current = busy;
            changed
        });
    }

    pub fn is_busy(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> BusyWatcher {
        BusyWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BusyWatcher {
    rx: watch::Receiver<bool>,
}

impl BusyWatcher {
    pub fn is_busy(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the flag is clear. Returns `false` if the owning
    /// controller was dropped first.
    pub async fn wait_idle(&mut self) -> bool {
        self.rx.wait_for(|busy| !*busy).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watcher_follows_signal() {
        let signal = BusySignal::new();
        let mut watcher = signal.subscribe();
        assert!(!watcher.is_busy());

        signal.raise();
        assert!(signal.is_busy());
        assert!(watcher.is_busy());

        signal.clear();
        assert!(watcher.wait_idle().await);
    }

    #[tokio::test]
    async fn wait_idle_reports_dropped_owner() {
        let signal = BusySignal::new();
        signal.raise();
        let mut watcher = signal.subscribe();
        drop(signal);
        assert!(!watcher.wait_idle().await);
    }
}

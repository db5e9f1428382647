//! Background queue for listener callbacks.

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::debug;

use super::{Dispatcher, Job};

enum Command {
    Run(Job),
    Stop,
}

/// Runs dispatched callbacks one at a time, in order, on a dedicated thread.
pub struct QueueDispatcher {
    tx: Mutex<Sender<Command>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl QueueDispatcher {
    /// Spawn the queue thread.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = channel::<Command>();
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            // Ends on Stop or when every sender is gone.
            while let Ok(Command::Run(job)) = rx.recv() {
                job();
            }
        })?;
        Ok(Self { tx: Mutex::new(tx), handle: Mutex::new(Some(handle)) })
    }

    /// Finish queued callbacks and join the thread.
    pub fn stop(&self) {
        let _ = self.tx.lock().send(Command::Stop);
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                debug!("listener queue thread panicked");
            }
        }
    }
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, job: Job) {
        if self.tx.lock().send(Command::Run(job)).is_err() {
            debug!("listener queue stopped, dropping callback");
        }
    }
}

impl Drop for QueueDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_jobs_run_in_order() {
        let queue = QueueDispatcher::spawn("cameo-test-queue").unwrap();
        let (tx, rx) = mpsc::channel();
        for i in 0..3 {
            let tx = tx.clone();
            queue.dispatch(Box::new(move || {
                let _ = tx.send(i);
            }));
        }
        queue.stop();
        let got: Vec<i32> = rx.try_iter().collect();
        assert_eq!(got, vec![0, 1, 2]);
    }

    #[test]
    fn test_dispatch_after_stop_is_dropped() {
        let queue = QueueDispatcher::spawn("cameo-test-queue").unwrap();
        queue.stop();
        queue.dispatch(Box::new(|| panic!("must not run")));
    }
}

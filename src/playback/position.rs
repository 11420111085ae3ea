//! Periodic elapsed-time poll.
//!
//! The poll task runs only while a track is playing. It never touches the state
//! itself: it sends `Envelope::Tick` through the dispatcher queue like any other
//! producer, tagged with a generation so ticks from a stopped task are ignored.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::dispatcher::Envelope;

struct PollTask {
    stop: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl PollTask {
    fn spawn(interval: Duration, generation: u64, ticks: Sender<Envelope>) -> Self {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let join = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if ticks.send(Envelope::Tick(generation)).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            stop,
            join: Some(join),
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

pub(crate) struct PositionSync {
    interval: Duration,
    ticks: Sender<Envelope>,
    generation: u64,
    task: Option<PollTask>,
}

impl PositionSync {
    pub fn new(interval: Duration, ticks: Sender<Envelope>) -> Self {
        Self {
            interval,
            ticks,
            generation: 0,
            task: None,
        }
    }

    /// (Re)start polling. Any running task is stopped first.
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;
        self.task = Some(PollTask::spawn(
            self.interval,
            self.generation,
            self.ticks.clone(),
        ));
    }

    /// Stop and join the running task, if any.
    pub fn stop(&mut self) {
        self.task = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Whether a tick carrying `generation` came from the running task.
    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

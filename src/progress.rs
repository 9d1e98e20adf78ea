//! Download progress: a fixed-interval ticker that runs beside the transfer.

use crossbeam_channel::{select, tick, Receiver};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Receives visual feedback events for one download.
pub trait ProgressReporter: Send + Sync {
    fn started(&self, url: &Url);
    /// Called once per elapsed interval, `n` counts from 1.
    fn tick(&self, n: u64);
    fn finished(&self, ok: bool);
}

/// Spinner on stderr, advanced once per tick.
pub struct SpinnerReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        SpinnerReporter {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut guard) = self.bar.lock() {
            f(&mut guard);
        }
    }
}

impl Default for SpinnerReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SpinnerReporter {
    fn started(&self, url: &Url) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("downloading {url}"));
        self.with_bar(|bar| *bar = Some(pb));
    }

    fn tick(&self, _n: u64) {
        self.with_bar(|bar| {
            if let Some(pb) = bar {
                pb.tick();
            }
        });
    }

    fn finished(&self, ok: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                if ok {
                    pb.finish_with_message("download done");
                } else {
                    pb.abandon_with_message("download failed");
                }
            }
        });
    }
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn started(&self, _url: &Url) {}
    fn tick(&self, _n: u64) {}
    fn finished(&self, _ok: bool) {}
}

/// Emit one tick per `interval` until `done` yields or disconnects.
/// Returns the number of ticks emitted.
pub(crate) fn run_ticker(
    interval: Duration,
    done: &Receiver<()>,
    reporter: &dyn ProgressReporter,
) -> u64 {
    let ticks = tick(interval);
    let mut count = 0;
    loop {
        select! {
            recv(done) -> _ => break,
            recv(ticks) -> _ => {
                count += 1;
                reporter.tick(count);
            }
        }
    }
    count
}

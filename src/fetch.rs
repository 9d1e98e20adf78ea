use crate::config::DEFAULT_TICK_INTERVAL;
use crate::errors::{InsbinError, Result};
use crate::progress::{run_ticker, ProgressReporter, SpinnerReporter};
use crossbeam_channel::bounded;
use log::{debug, warn};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};
use std::thread;
use std::time::Duration;
use url::Url;

const CHUNK_SIZE: usize = 8 * 1024;

/// Destination for downloaded archive bytes.
pub trait ArchiveSink: Write {
    type Archive: Read;

    /// Finish writing and hand back a reader positioned at the start.
    fn into_archive(self) -> io::Result<Self::Archive>;
}

#[derive(Debug, Default)]
pub struct MemorySink(Vec<u8>);

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ArchiveSink for MemorySink {
    type Archive = Cursor<Vec<u8>>;

    fn into_archive(self) -> io::Result<Self::Archive> {
        Ok(Cursor::new(self.0))
    }
}

/// Anonymous temp file, removed by the OS once dropped.
#[derive(Debug)]
pub struct TempFileSink(File);

impl TempFileSink {
    pub fn new() -> io::Result<Self> {
        tempfile::tempfile().map(TempFileSink)
    }
}

impl Write for TempFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl ArchiveSink for TempFileSink {
    type Archive = File;

    fn into_archive(mut self) -> io::Result<Self::Archive> {
        self.0.flush()?;
        self.0.seek(SeekFrom::Start(0))?;
        Ok(self.0)
    }
}

/// A completed transfer.
#[derive(Debug)]
pub struct Download<A> {
    pub archive: A,
    pub len: u64,
    /// Hex SHA-256 of the received bytes.
    pub sha256: String,
    pub ticks: u64,
}

pub struct ArchiveFetcher {
    client: Client,
    tick_interval: Duration,
    reporter: Box<dyn ProgressReporter>,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl ArchiveFetcher {
    pub fn new(client: Client) -> Self {
        ArchiveFetcher {
            client,
            tick_interval: DEFAULT_TICK_INTERVAL,
            reporter: Box::new(SpinnerReporter::new()),
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Download `url` fully into memory.
    pub fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let download = self.fetch_into(url, MemorySink::default())?;
        Ok(download.archive.into_inner())
    }

    /// Stream `url` into `sink` while a ticker thread reports progress.
    /// The ticker is joined before this returns.
    pub fn fetch_into<S: ArchiveSink>(
        &self,
        url: &Url,
        mut sink: S,
    ) -> Result<Download<S::Archive>> {
        debug!("downloading archive from {url}");
        let (done_tx, done_rx) = bounded::<()>(0);
        let reporter = self.reporter.as_ref();
        let interval = self.tick_interval;

        reporter.started(url);
        let (transfer, ticks) = thread::scope(|s| {
            // The ticker owns the receiver so a dead ticker disconnects the channel.
            let ticker = s.spawn(move || run_ticker(interval, &done_rx, reporter));
            let transfer = self.transfer(url, &mut sink);
            if transfer.is_ok() {
                // Rendezvous: returns once the ticker has observed completion.
                let _ = done_tx.send(());
            }
            drop(done_tx);
            let ticks = ticker.join().unwrap_or_else(|_| {
                warn!("progress reporter panicked while downloading {url}");
                0
            });
            (transfer, ticks)
        });
        reporter.finished(transfer.is_ok());

        let (len, sha256) = transfer?;
        debug!("downloaded {len} bytes from {url} ({ticks} ticks)");
        let archive = sink
            .into_archive()
            .map_err(|e| InsbinError::download(url, e.to_string()))?;
        Ok(Download {
            archive,
            len,
            sha256,
            ticks,
        })
    }

    fn transfer<W: Write>(&self, url: &Url, sink: &mut W) -> Result<(u64, String)> {
        let mut resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| InsbinError::download(url, e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(InsbinError::DownloadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = match resp.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(InsbinError::download(url, e.to_string())),
            };
            sink.write_all(&buf[..n])
                .map_err(|e| InsbinError::download(url, e.to_string()))?;
            hasher.update(&buf[..n]);
            total += n as u64;
        }
        Ok((total, hex::encode(hasher.finalize())))
    }
}

pub fn verify_sha256(url: &Url, actual: &str, expected: &str) -> Result<()> {
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(InsbinError::download(
            url,
            format!("checksum mismatch expected {expected} got {actual}"),
        ));
    }
    Ok(())
}

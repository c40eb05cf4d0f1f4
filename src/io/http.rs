//! Remote documents read through HTTP Range requests.
//!
//! The header walk issues many reads of a few dozen bytes each, so the
//! reader fetches whole aligned blocks and serves reads from the most
//! recent one. A document smaller than [`BLOCK_SIZE`] costs one HEAD and one
//! GET.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, RANGE};

use super::ReadAt;
use crate::error::{Error, Result};

/// Bytes fetched per range request.
pub const BLOCK_SIZE: u64 = 64 * 1024;

const MAX_RETRY: u32 = 10;

/// The most recently fetched block.
struct Block {
    start: u64,
    data: Vec<u8>,
}

/// HTTP Range reader for remote documents
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    block: Mutex<Option<Block>>,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Open `url` after checking it with a HEAD request.
    ///
    /// Fails unless the server answers with success, advertises
    /// `Accept-Ranges: bytes` and sends a `Content-Length`.
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let resp = client.head(&url).send()?;
        if !resp.status().is_success() {
            return Err(Error::Remote(format!(
                "{url}: HEAD answered {}",
                resp.status()
            )));
        }
        let size = remote_size(resp.headers())
            .map_err(|reason| Error::Remote(format!("{url}: {reason}")))?;

        debug!("{url}: {size} bytes, range requests supported");

        Ok(Self {
            client,
            url,
            size,
            block: Mutex::new(None),
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// Fetch `[start, end)` with one range request, retrying on timeouts
    /// and connection failures.
    fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let range = format!("bytes={}-{}", start, end - 1);
        let mut retry_count = 0;

        let resp = loop {
            match self.client.get(&self.url).header(RANGE, &range).send() {
                Ok(resp) => break resp,
                Err(e) if (e.is_timeout() || e.is_connect()) && retry_count + 1 < MAX_RETRY => {
                    retry_count += 1;
                    warn!("{}: {e}, retry {retry_count}/{MAX_RETRY}", self.url);
                    std::thread::sleep(Duration::from_millis(500 * u64::from(retry_count)));
                }
                Err(e) => return Err(e.into()),
            }
        };

        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(Error::Remote(format!(
                "{}: range {range} answered {}",
                self.url,
                resp.status()
            )));
        }
        let served = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        if served.is_some_and(|(first, _)| first != start) {
            return Err(Error::Remote(format!(
                "{}: asked for {range}, server sent {:?}",
                self.url,
                served
            )));
        }

        let mut data = resp.bytes()?.to_vec();
        data.truncate((end - start) as usize);
        self.transferred_bytes
            .fetch_add(data.len() as u64, Ordering::Relaxed);
        debug!("{}: fetched {range} ({} bytes)", self.url, data.len());

        Ok(data)
    }
}

impl ReadAt for HttpRangeReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut cached = self.block.lock().unwrap_or_else(PoisonError::into_inner);
        let mut filled = 0;

        while filled < buf.len() {
            let pos = offset + filled as u64;
            if pos >= self.size {
                break;
            }

            let block_start = pos - pos % BLOCK_SIZE;
            let block = match cached.take() {
                Some(block) if block.start == block_start => block,
                _ => Block {
                    start: block_start,
                    data: self.fetch(block_start, (block_start + BLOCK_SIZE).min(self.size))?,
                },
            };

            let from = (pos - block.start) as usize;
            let n = block.data.len().saturating_sub(from).min(buf.len() - filled);
            if n > 0 {
                buf[filled..filled + n].copy_from_slice(&block.data[from..from + n]);
                filled += n;
            }
            *cached = Some(block);

            // the server sent less than it promised
            if n == 0 {
                break;
            }
        }

        Ok(filled)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Size of a range-capable resource from its HEAD response headers.
fn remote_size(headers: &HeaderMap) -> std::result::Result<u64, &'static str> {
    let accepts_bytes = headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|unit| unit.trim().eq_ignore_ascii_case("bytes")));
    if !accepts_bytes {
        return Err("server does not support range requests");
    }

    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .ok_or("server did not send a Content-Length")
}

/// First and last byte of a `Content-Range: bytes first-last/total` value.
fn parse_content_range(value: &str) -> Option<(u64, u64)> {
    let (unit, rest) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (range, _total) = rest.split_once('/')?;
    let (first, last) = range.split_once('-')?;
    Some((first.trim().parse().ok()?, last.trim().parse().ok()?))
}

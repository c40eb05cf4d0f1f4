//! A one-request-per-connection HTTP server for range reader tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Advertise byte ranges and honour them.
    Ranges,
    /// Leave `Accept-Ranges` out of the HEAD answer.
    NoRanges,
    /// Advertise byte ranges but answer every GET with the whole body.
    IgnoresRanges,
}

pub struct Server {
    pub url: String,
    gets: Arc<AtomicUsize>,
}

impl Server {
    /// Serve `body` on a local port until the test process exits.
    pub fn start(body: Vec<u8>, behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/doc.odt", listener.local_addr().unwrap());
        let gets = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&gets);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let _ = answer(stream, &body, behavior, &counter);
            }
        });

        Self { url, gets }
    }

    /// Number of GET requests answered so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

fn answer(
    stream: TcpStream,
    body: &[u8],
    behavior: Behavior,
    gets: &AtomicUsize,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request = String::new();
    reader.read_line(&mut request)?;
    let method = request.split_whitespace().next().unwrap_or_default().to_string();

    let mut range = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("range")
        {
            range = parse_range(value.trim(), body.len());
        }
    }

    let mut stream = stream;
    if method == "HEAD" {
        let accept = if behavior == Behavior::NoRanges {
            ""
        } else {
            "Accept-Ranges: bytes\r\n"
        };
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{accept}Connection: close\r\n\r\n",
            body.len()
        )?;
        return stream.flush();
    }

    gets.fetch_add(1, Ordering::SeqCst);
    match range {
        Some((first, last)) if behavior != Behavior::IgnoresRanges => {
            let part = &body[first..=last];
            write!(
                stream,
                "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\n\
                 Content-Range: bytes {first}-{last}/{}\r\nConnection: close\r\n\r\n",
                part.len(),
                body.len()
            )?;
            stream.write_all(part)?;
        }
        _ => {
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )?;
            stream.write_all(body)?;
        }
    }
    stream.flush()
}

/// `bytes=first-last`, with `last` clamped to the body.
fn parse_range(value: &str, len: usize) -> Option<(usize, usize)> {
    let (first, last) = value.strip_prefix("bytes=")?.split_once('-')?;
    let first: usize = first.trim().parse().ok()?;
    let last: usize = last.trim().parse().ok()?;
    let last = last.min(len.checked_sub(1)?);
    (first <= last).then_some((first, last))
}

//! Main entry point for the odtext CLI application.
//!
//! This binary prints the text of an OpenDocument file read from the local
//! filesystem or from an HTTP URL.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use odtext::text::{self, FormatOptions};
use odtext::{Archive, ChecksumStatus, Cli, HttpRangeReader, LocalFileReader, ReadAt, logging};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate reader
/// based on whether the input is a local file or HTTP URL.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level());

    if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.file.clone())?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        process(reader.clone(), &cli)?;

        info!(
            "Total bytes transferred: {}",
            format_size(reader.transferred_bytes() - transferred_before)
        );
    } else {
        let reader = Arc::new(
            LocalFileReader::new(Path::new(&cli.file))
                .with_context(|| format!("Can't open {}", cli.file))?,
        );
        process(reader, &cli)?;
    }

    Ok(())
}

/// List the archive or convert the requested member, depending on `cli`.
fn process<R: ReadAt>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let archive = Archive::new(reader);

    if cli.list || cli.verbose {
        return list_members(&archive, cli.verbose);
    }

    let Some(header) = archive.locate(&cli.member, cli.match_flags(), None)? else {
        bail!("Can't open {}: Is it an OpenDocument Text?", cli.file);
    };

    let member = archive
        .decode(&header)
        .with_context(|| format!("Can't extract {} from {}", header.name(), cli.file))?;

    // the decoder has already warned; --strict turns it into a failure
    if let ChecksumStatus::Mismatch { expected, actual } = member.checksum
        && cli.strict
    {
        bail!(
            "{}: checksum mismatch (expected {expected:#010x}, got {actual:#010x})",
            header.name()
        );
    }

    let out = if cli.raw {
        member.into_bytes()
    } else {
        let opts = FormatOptions {
            subst: cli.subst,
            charset: cli.charset(),
            width: cli.wrap_width(),
            ..FormatOptions::default()
        };
        text::render(member.data, &opts)?
    };

    write_output(&out, cli)
}

fn write_output(out: &[u8], cli: &Cli) -> Result<()> {
    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Can't open {} for writing", path.display()))?;
            file.write_all(out)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(out)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// List the members reachable through the local headers.
///
/// The verbose format is a table with sizes, compression ratio and
/// timestamps.
fn list_members<R: ReadAt>(archive: &Archive<R>, verbose: bool) -> Result<()> {
    let headers = archive.headers()?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut member_count = 0usize;

    for header in &headers {
        if !verbose {
            println!("{}", header.name());
            continue;
        }

        let (year, month, day) = header.mod_date();
        let (hour, minute, _second) = header.mod_time();
        let uncompressed = u64::from(header.uncompressed_size);
        let compressed = u64::from(header.compressed_size);

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            uncompressed,
            compressed,
            ratio(compressed, uncompressed),
            year,
            month,
            day,
            hour,
            minute,
            header.name()
        );

        if !header.is_directory() {
            total_uncompressed += uncompressed;
            total_compressed += compressed;
            member_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            member_count
        );
    }

    Ok(())
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        format!("{:>4}%", 0)
    }
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

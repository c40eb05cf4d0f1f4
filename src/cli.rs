use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, warn};

use crate::text::{Charset, DEFAULT_WIDTH, SubstMode};
use crate::zip::MatchFlags;

#[derive(Parser, Debug)]
#[command(name = "odtext")]
#[command(version)]
#[command(about = "Print the text of an OpenDocument file, local or over HTTP", long_about = None)]
#[command(after_help = "Examples:\n  \
  odtext report.odt                      print report.odt wrapped at 65 columns\n  \
  odtext --width=-1 -o out.txt a.odt     write unwrapped text to out.txt\n  \
  odtext --raw --member meta.xml a.odt   dump another member as XML\n  \
  odtext -v https://example.com/a.odt    list members of a remote document")]
pub struct Cli {
    /// OpenDocument file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Print the member's XML instead of converting it
    #[arg(long)]
    pub raw: bool,

    /// Output character set (default: from the locale)
    #[arg(long, value_name = "CHARSET")]
    pub encoding: Option<String>,

    /// Wrap lines after N characters, -1 to disable
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_WIDTH as i32,
        allow_negative_numbers = true,
        value_parser = parse_width
    )]
    pub width: i32,

    /// Which typographic characters to replace with ASCII look-alikes
    #[arg(long, value_enum, default_value_t = SubstMode::Some)]
    pub subst: SubstMode,

    /// Archive member to convert
    #[arg(long, value_name = "NAME", default_value = "content.xml")]
    pub member: String,

    /// Match any member whose name contains NAME
    #[arg(long)]
    pub partial: bool,

    /// Ignore ASCII case when matching the member name
    #[arg(long)]
    pub ignore_case: bool,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// List members (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List members verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Fail when the member's checksum does not match
    #[arg(long)]
    pub strict: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Print debug messages
    #[arg(long)]
    pub debug: bool,
}

fn parse_width(value: &str) -> Result<i32, String> {
    let width: i32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    match width {
        -1 | 5.. => Ok(width),
        _ => Err("width must be -1 or at least 5".to_string()),
    }
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            return LevelFilter::Debug;
        }
        match self.quiet {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Error,
            _ => LevelFilter::Off,
        }
    }

    pub fn wrap_width(&self) -> Option<usize> {
        usize::try_from(self.width).ok()
    }

    pub fn match_flags(&self) -> MatchFlags {
        let mut flags = MatchFlags::PARTIAL;
        if !self.partial {
            flags = flags | MatchFlags::EXACT;
        }
        if !self.ignore_case {
            flags = flags | MatchFlags::CASE_SENSITIVE;
        }
        flags
    }

    /// The requested output charset, or the locale's if none was given.
    pub fn charset(&self) -> Charset {
        match &self.encoding {
            Some(label) => Charset::for_label(label).unwrap_or_else(|| {
                warn!("Conversion to {label} is not supported. Using us-ascii as fall-back.");
                Charset::Ascii
            }),
            None => Charset::from_env(),
        }
    }
}

//! Command-line arguments.

use crate::config::AppConfig;
use clap::Parser;

/// i3bar status line: prints status updates to stdout as expected by i3bar.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// MPD address (host:port). Overrides DSTS_MPD_ADDR.
    #[arg(long)]
    pub mpd_addr: Option<String>,

    /// Maximum visible characters of the MPD block. Overrides DSTS_MARQUEE_WIDTH.
    #[arg(long)]
    pub marquee_width: Option<usize>,

    /// Show the Tamriel calendar time.
    #[arg(long)]
    pub tamriel: bool,

    /// Hide the Unix timestamp and date/time blocks.
    #[arg(long)]
    pub no_clock: bool,
}

impl CliArgs {
    /// Apply flags on top of `config`. Flags not given leave it untouched.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(addr) = &self.mpd_addr {
            config.mpd_addr = Some(addr.clone());
        }
        if let Some(width) = self.marquee_width {
            config.marquee_width = width;
        }
        if self.tamriel {
            config.tamriel = true;
        }
        if self.no_clock {
            config.clock = false;
        }
    }
}

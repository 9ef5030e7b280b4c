//! Configuration and CLI argument handling

use std::{str::FromStr, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
    countdown::{CountdownOptions, EmitPolicy, Formatter},
    error::CountdownError,
    state::TimeUnits,
    tasks::DEFAULT_FRAME_MS,
};

/// How the remaining time is rendered in status responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayFormat {
    /// HH:MM:SS with cumulative hours
    Clock,
    /// Dd HH:MM:SS.mmm
    Full,
    /// Whole seconds left
    Seconds,
}

impl DisplayFormat {
    pub fn formatter(self) -> Formatter {
        match self {
            Self::Clock => Arc::new(|units: &TimeUnits| units.clock()),
            Self::Full => Arc::new(|units: &TimeUnits| units.full()),
            Self::Seconds => Arc::new(|units: &TimeUnits| format!("{}s", units.total_seconds)),
        }
    }
}

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-timer")]
#[command(about = "A drift-correcting countdown timer served over HTTP")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Countdown duration in milliseconds
    #[arg(short, long, default_value = "60000", allow_negative_numbers = true)]
    pub duration: i64,

    /// Milliseconds removed per tick
    #[arg(short, long, default_value = "1000")]
    pub interval: u64,

    /// Do not start counting as soon as the server is up
    #[arg(long)]
    pub no_auto_start: bool,

    /// Events to deliver: "all", "none", or a comma-separated list of names
    #[arg(long, default_value = "all", value_parser = parse_emit_policy)]
    pub emit: EmitPolicy,

    /// Display format used in status responses
    #[arg(long, value_enum, default_value_t = DisplayFormat::Clock)]
    pub format: DisplayFormat,

    /// Keep ticking while the host surface is hidden instead of reconciling
    #[arg(long)]
    pub no_visibility_fix: bool,

    /// Re-anchor remaining time when a scroll gesture ends
    #[arg(long)]
    pub scroll_fix: bool,

    /// Frame period of the tick source in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_emit_policy(value: &str) -> Result<EmitPolicy, CountdownError> {
    EmitPolicy::from_str(value)
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Validate the countdown inputs
    pub fn countdown_options(&self) -> Result<CountdownOptions, CountdownError> {
        Ok(CountdownOptions::new(self.duration)?
            .with_interval(self.interval)?
            .with_auto_start(!self.no_auto_start)
            .with_emit(self.emit.clone())
            .with_visibility_fix(!self.no_visibility_fix)
            .with_scroll_fix(self.scroll_fix))
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

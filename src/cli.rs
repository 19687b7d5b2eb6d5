use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{parse_log_level, parse_position, parse_resolution, parse_wait_timeout};
use crate::config::Options;

/// Open a window on the dispatcher thread and echo its input
#[derive(Parser, Debug, Default)]
#[command(name = "windowing-demo")]
#[command(version)]
#[command(about = "Thread-affine window binding demo", long_about = None)]
pub struct Cli {
    /// Window size (e.g., 640x480)
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Window position (e.g., 100,100)
    #[arg(short, long, value_name = "X,Y", allow_hyphen_values = true)]
    pub position: Option<String>,

    /// Window title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Start in fullscreen mode
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Start in windowed mode
    #[arg(short, long)]
    pub windowed: bool,

    /// Block waiting for events instead of polling
    #[arg(short, long)]
    pub event_driven: bool,

    /// Event wait timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub wait_timeout: Option<String>,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the in-process headless platform even when a native backend is built in
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames (runs until the window closes otherwise)
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref res) = self.res {
            opts.resolution = Some(parse_resolution(res).context("Invalid resolution format")?);
        }

        if let Some(ref position) = self.position {
            opts.position = Some(parse_position(position).context("Invalid position format")?);
        }

        if let Some(ref title) = self.title {
            opts.title = Some(title.clone());
        }

        if self.fullscreen {
            opts.fullscreen = Some(true);
        }
        if self.windowed {
            opts.fullscreen = Some(false);
        }

        if self.event_driven {
            opts.event_driven = Some(true);
        }

        if let Some(ref timeout) = self.wait_timeout {
            opts.wait_timeout = Some(parse_wait_timeout(timeout)?);
        }

        if let Some(ref level) = self.log_level {
            opts.log_level = Some(parse_log_level(level)?);
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use crate::geometry::Point;
    use crate::logging::LogLevel;
    use std::time::Duration;

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            res: Some("800x600".to_string()),
            fullscreen: true,
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(
            opts.resolution,
            Some(Resolution {
                width: 800,
                height: 600
            })
        );
        assert_eq!(opts.fullscreen, Some(true));
    }

    #[test]
    fn test_windowed_overrides_fullscreen() {
        let cli = Cli {
            fullscreen: true,
            windowed: true,
            ..Default::default()
        };
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.fullscreen, Some(false));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file_opts = Options::default();
        file_opts.title = Some("from file".to_string());
        file_opts.event_driven = Some(false);

        let cli = Cli::parse_from([
            "windowing-demo",
            "--title",
            "from cli",
            "-e",
            "--wait-timeout",
            "10",
            "--position=-5,40",
            "-l",
            "debug",
        ]);
        let opts = cli.merge_into_options(file_opts).unwrap();

        assert_eq!(opts.title.as_deref(), Some("from cli"));
        assert_eq!(opts.event_driven, Some(true));
        assert_eq!(opts.wait_timeout, Some(Duration::from_millis(10)));
        assert_eq!(opts.position, Some(Point::new(-5, 40)));
        assert_eq!(opts.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_invalid_resolution() {
        let cli = Cli {
            res: Some("invalid".to_string()),
            ..Default::default()
        };

        let result = cli.merge_into_options(Options::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let cli = Cli {
            log_level: Some("chatty".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }
}

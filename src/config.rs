use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::geometry::{Point, Size};
use crate::logging::LogLevel;
use crate::window::{PlatformOptions, WindowCreateInfo, WindowState};

/// Demo options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub resolution: Option<Resolution>,
    pub position: Option<Point>,
    pub title: Option<String>,
    pub fullscreen: Option<bool>,
    pub event_driven: Option<bool>,
    pub wait_timeout: Option<Duration>,
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            resolution: Some(Resolution {
                width: 640,
                height: 480,
            }),
            position: Some(Point::new(100, 100)),
            title: None,
            fullscreen: None,
            event_driven: None,
            wait_timeout: None,
            log_level: None,
        }
    }
}

impl Options {
    pub const DEFAULT_TITLE: &'static str = "windowing demo";

    pub fn create_info(&self) -> WindowCreateInfo {
        let resolution = self.resolution.unwrap_or(Resolution {
            width: 640,
            height: 480,
        });
        let state = if self.fullscreen == Some(true) {
            WindowState::FullScreen
        } else {
            WindowState::Normal
        };
        WindowCreateInfo::new(
            self.position.unwrap_or_default(),
            Size::new(
                i32::try_from(resolution.width).unwrap_or(i32::MAX),
                i32::try_from(resolution.height).unwrap_or(i32::MAX),
            ),
            state,
            self.title.as_deref().unwrap_or(Self::DEFAULT_TITLE),
        )
    }

    pub fn platform_options(&self) -> PlatformOptions {
        PlatformOptions {
            event_driven: self.event_driven.unwrap_or(false),
            wait_timeout: self
                .wait_timeout
                .unwrap_or(PlatformOptions::DEFAULT_WAIT_TIMEOUT),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Apply one `key = value` entry. Unknown keys are ignored with a warning.
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_lowercase().as_str() {
            "resolution" => self.resolution = Some(parse_resolution(value)?),
            "position" => self.position = Some(parse_position(value)?),
            "title" => self.title = Some(value.to_string()),
            "fullscreen" => self.fullscreen = Some(parse_bool(value)?),
            "event_driven" => self.event_driven = Some(parse_bool(value)?),
            "wait_timeout" => self.wait_timeout = Some(parse_wait_timeout(value)?),
            "log_level" => self.log_level = Some(parse_log_level(value)?),
            _ => tracing::warn!(key, "unknown configuration key"),
        }
        Ok(())
    }
}

/// Load options from a `key = value` file. `#` starts a comment.
///
/// Without a path the defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<Options> {
    let mut options = Options::default();
    let Some(path) = path else {
        return Ok(options);
    };

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&data, &mut options)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(options)
}

/// Parse config text into `options`, overriding the keys it mentions.
pub fn parse_config(data: &str, options: &mut Options) -> Result<()> {
    for (number, line) in data.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((content, _comment)) => content,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            anyhow::bail!("Line {}: key without value", number + 1);
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Line {}: missing key", number + 1);
        }
        options
            .apply(key, value.trim())
            .with_context(|| format!("Line {}", number + 1))?;
    }
    Ok(())
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: u32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: u32 = parts[1].trim().parse().context("Invalid height value")?;

    if width == 0 || height == 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Resolution { width, height })
}

/// Parse a window position in the format "X,Y"
pub fn parse_position(s: &str) -> Result<Point> {
    let Some((x, y)) = s.split_once(',') else {
        anyhow::bail!("Position must be in X,Y format");
    };
    let x: i32 = x.trim().parse().context("Invalid x value")?;
    let y: i32 = y.trim().parse().context("Invalid y value")?;
    Ok(Point::new(x, y))
}

/// Parse an event wait timeout in milliseconds
pub fn parse_wait_timeout(s: &str) -> Result<Duration> {
    let millis: u64 = s.parse().context("Invalid wait timeout")?;
    if millis == 0 {
        anyhow::bail!("Wait timeout must be at least 1 ms");
    }
    Ok(Duration::from_millis(millis))
}

pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    s.parse()
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Invalid boolean: {}", s),
    }
}

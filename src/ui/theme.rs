use std::io::IsTerminal;

use crossterm::style::Color;

use crate::sampler::Trend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Color,
    Plain,
    Json,
}

impl OutputMode {
    /// `None` for `auto` or anything unrecognised.
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "color" | "colour" => Some(OutputMode::Color),
            "plain" | "mono" | "monochrome" => Some(OutputMode::Plain),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }

    pub fn is_human(self) -> bool {
        self != OutputMode::Json
    }
}

pub fn detect_output_mode() -> OutputMode {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return OutputMode::Plain;
    }
    if std::io::stdout().is_terminal() {
        OutputMode::Color
    } else {
        OutputMode::Plain
    }
}

pub fn resolve_output_mode(config: &str) -> OutputMode {
    OutputMode::from_config_str(config).unwrap_or_else(detect_output_mode)
}

pub const ERROR_COLOR: Color = Color::Red;
pub const HEADER_COLOR: Color = Color::Blue;

/// Growth is red, shrinkage green, no change keeps the terminal colour.
pub fn trend_color(trend: Trend) -> Option<Color> {
    match trend {
        Trend::Increased => Some(Color::Red),
        Trend::Decreased => Some(Color::Green),
        Trend::Unchanged => None,
    }
}

pub fn trend_marker(trend: Trend) -> char {
    match trend {
        Trend::Increased => '+',
        Trend::Decreased => '-',
        Trend::Unchanged => '=',
    }
}

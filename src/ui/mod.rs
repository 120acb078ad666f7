//! Terminal presentation of sample lines and operator messages.

pub mod table;
pub mod theme;

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use crate::sampler::SampleLine;
use theme::{ERROR_COLOR, HEADER_COLOR, OutputMode, trend_color};

pub const FAILURE_TEXT: &str = "Validate if service is operational.";

pub struct Presenter<W: Write> {
    out: W,
    mode: OutputMode,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self { out, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Flushes so the prompt is visible before input is read.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn error_line(&mut self, text: &str) -> io::Result<()> {
        self.colored(text, Some(ERROR_COLOR))?;
        writeln!(self.out)
    }

    pub fn heading(&mut self, text: &str) -> io::Result<()> {
        self.colored(text, Some(HEADER_COLOR))?;
        writeln!(self.out)
    }

    pub fn rule(&mut self) -> io::Result<()> {
        self.blank()?;
        self.line(&table::rule())
    }

    pub fn table_header(&mut self) -> io::Result<()> {
        if !self.mode.is_human() {
            return Ok(());
        }
        self.heading(&table::header_line())?;
        self.line(&table::separator())
    }

    pub fn table_separator(&mut self) -> io::Result<()> {
        if !self.mode.is_human() {
            return Ok(());
        }
        self.blank()?;
        self.line(&table::separator())
    }

    pub fn sample_line(&mut self, sample: &SampleLine) -> io::Result<()> {
        match (self.mode, sample) {
            (OutputMode::Json, _) => {
                let json = serde_json::to_string(sample).map_err(io::Error::other)?;
                writeln!(self.out, "{json}")?;
            }
            (_, SampleLine::Failure { failure, .. }) => {
                self.error_line(&format!("{FAILURE_TEXT} ({failure})"))?;
            }
            (OutputMode::Plain, SampleLine::Sample { line, .. }) => {
                self.line(&table::plain_row(line))?;
            }
            (OutputMode::Color, SampleLine::Sample { line, .. }) => {
                for cell in table::cells(line, false) {
                    self.colored(&cell.text, cell.trend.and_then(trend_color))?;
                }
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn colored(&mut self, text: &str, color: Option<Color>) -> io::Result<()> {
        match (self.mode, color) {
            (OutputMode::Color, Some(color)) => {
                queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)
            }
            _ => write!(self.out, "{text}"),
        }
    }
}

use std::fmt::Display;
use std::time::Duration;

use chrono::{Local, TimeZone};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Pads to `width` display columns, always leaving at least one space.
pub fn pad_right(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.width()).max(1);
    format!("{s}{}", " ".repeat(pad))
}

/// Bytes as kibibytes with five decimals: `1536` -> `"1.50000"`.
/// Ties round away from zero (`16` -> `"0.01563"`).
pub fn format_kib(bytes: u64) -> String {
    let scaled = (u128::from(bytes) * 100_000 + 512) / 1024;
    format!("{}.{:05}", scaled / 100_000, scaled % 100_000)
}

/// `HH:MM:SS.fffffff` at 100 ns resolution. Hours keep counting past a day.
pub fn format_cpu_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    let ticks = duration.subsec_nanos() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{ticks:07}")
}

pub fn format_start_time(epoch_secs: u64) -> String {
    format_start_time_in(epoch_secs, &Local)
}

pub fn format_start_time_in<Tz>(epoch_secs: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(epoch_secs)
        .ok()
        .and_then(|secs| tz.timestamp_opt(secs, 0).single())
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

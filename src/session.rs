use std::io::{self, Write};
use std::pin::pin;

use futures::StreamExt;

use crate::sampler::{Sampler, SamplerOptions};
use crate::system::{ProcessEntry, SnapshotSource};
use crate::ui::Presenter;

/// Runs one monitoring session against `target` and prints every line.
/// Returns the number of lines produced.
pub async fn monitor<S, W>(
    source: S,
    target: &ProcessEntry,
    options: SamplerOptions,
    ui: &mut Presenter<W>,
) -> io::Result<usize>
where
    S: SnapshotSource,
    W: Write,
{
    if ui.mode().is_human() {
        ui.rule()?;
        ui.line(&format!("{} [Id: {} ]", target.name, target.pid))?;
        ui.blank()?;
    }
    ui.table_header()?;

    let mut lines = pin!(Sampler::new(source, target.identity(), options).into_stream());
    let mut count = 0;
    while let Some(line) = lines.next().await {
        ui.sample_line(&line)?;
        ui.table_separator()?;
        count += 1;
    }
    Ok(count)
}

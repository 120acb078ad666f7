use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::format::{format_start_time, truncate_unicode};
use crate::system::{ProcessEntry, SnapshotSource};
use crate::ui::Presenter;

const NAME_WIDTH: usize = 48;
const BANNER_RULE: &str =
    "*********************************************************************************";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListThenLookup,
    Lookup,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => MenuChoice::ListThenLookup,
            "2" => MenuChoice::Lookup,
            _ => MenuChoice::Exit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelection {
    Unparsable(String),
    NotListed(u32),
}

impl fmt::Display for InvalidSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSelection::Unparsable(input) => write!(f, "'{input}' is not a process id"),
            InvalidSelection::NotListed(pid) => {
                write!(f, "{pid} is not one of the listed instances")
            }
        }
    }
}

impl std::error::Error for InvalidSelection {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(ProcessEntry),
    NoInstances,
    Invalid(InvalidSelection),
    Exit,
}

pub fn parse_selection(
    input: &str,
    candidates: &[ProcessEntry],
) -> Result<ProcessEntry, InvalidSelection> {
    let trimmed = input.trim();
    let pid: u32 = trimmed
        .parse()
        .map_err(|_| InvalidSelection::Unparsable(trimmed.to_string()))?;
    candidates
        .iter()
        .find(|entry| entry.pid == pid)
        .cloned()
        .ok_or(InvalidSelection::NotListed(pid))
}

/// `None` at end of input.
pub fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn intro<W: Write>(ui: &mut Presenter<W>) -> io::Result<()> {
    ui.line(BANNER_RULE)?;
    ui.line("To check performance of a process with minimal parameters in less than a minute.")?;
    ui.line(BANNER_RULE)?;
    ui.line("Let's get started!")?;
    ui.blank()
}

pub fn completion<W: Write>(ui: &mut Presenter<W>) -> io::Result<()> {
    ui.blank()?;
    ui.line(BANNER_RULE)?;
    ui.line("The performance check is been completed.")?;
    ui.line(BANNER_RULE)
}

pub fn run_menu<S, R, W>(
    source: &mut S,
    input: &mut R,
    ui: &mut Presenter<W>,
) -> io::Result<Selection>
where
    S: SnapshotSource,
    R: BufRead,
    W: Write,
{
    intro(ui)?;
    ui.line(" \u{25A0} Press 1, to get list of processes, their associated name & Id.")?;
    ui.line(" \u{25A0} Press 2, if process name already known.")?;
    ui.prompt(" \u{25A0} Press any key, to exit.")?;

    let Some(answer) = read_line(input)? else {
        return Ok(Selection::Exit);
    };
    let choice = MenuChoice::parse(&answer);
    debug!(?choice, "menu choice");
    match choice {
        MenuChoice::ListThenLookup => {
            print_listing(&source.list_processes(), ui)?;
            ask_name_and_select(source, input, ui)
        }
        MenuChoice::Lookup => ask_name_and_select(source, input, ui),
        MenuChoice::Exit => Ok(Selection::Exit),
    }
}

fn ask_name_and_select<S, R, W>(
    source: &mut S,
    input: &mut R,
    ui: &mut Presenter<W>,
) -> io::Result<Selection>
where
    S: SnapshotSource,
    R: BufRead,
    W: Write,
{
    ui.rule()?;
    ui.prompt("Enter the process name :")?;
    let Some(name) = read_line(input)? else {
        return Ok(Selection::Exit);
    };
    select_by_name(source, &name, input, ui)
}

pub fn select_by_name<S, R, W>(
    source: &mut S,
    name: &str,
    input: &mut R,
    ui: &mut Presenter<W>,
) -> io::Result<Selection>
where
    S: SnapshotSource,
    R: BufRead,
    W: Write,
{
    ui.rule()?;
    let matches = source.processes_by_name(name);
    ui.blank()?;
    ui.line("Process instances are as follows: ")?;
    for entry in &matches {
        ui.line(&format!(" \u{25A0} {} [Id: {} ]", entry.name, entry.pid))?;
    }
    if matches.is_empty() {
        ui.error_line(" \u{25A0} No instances found.")?;
        return Ok(Selection::NoInstances);
    }

    ui.blank()?;
    ui.prompt("Select one instance and enter the id :")?;
    let Some(answer) = read_line(input)? else {
        return Ok(Selection::Exit);
    };
    Ok(match parse_selection(&answer, &matches) {
        Ok(entry) => Selection::Chosen(entry),
        Err(err) => Selection::Invalid(err),
    })
}

/// Non-interactive selection for `--pid`.
pub fn select_by_pid<S: SnapshotSource>(source: &mut S, pid: u32) -> Selection {
    match source.list_processes().into_iter().find(|e| e.pid == pid) {
        Some(entry) => Selection::Chosen(entry),
        None => Selection::Invalid(InvalidSelection::NotListed(pid)),
    }
}

pub fn print_listing<W: Write>(entries: &[ProcessEntry], ui: &mut Presenter<W>) -> io::Result<()> {
    ui.line("Processes are as follows:")?;
    for entry in entries {
        let name = truncate_unicode(&entry.name, NAME_WIDTH);
        match &entry.start_time {
            Ok(start_time) => ui.line(&format!(
                "Started at {} : {} [Id: {} ]",
                format_start_time(*start_time),
                name,
                entry.pid
            ))?,
            Err(err) => ui.error_line(&format!("{err} [ {name} ]"))?,
        }
    }
    ui.blank()?;
    ui.line(&format!("Number of processes: {}", entries.len()))
}

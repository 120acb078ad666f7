use std::path::Path;

use super::snapshot::ProcessIdentity;

/// One row of a process listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    /// Seconds since the Unix epoch, or why the OS would not report it.
    pub start_time: Result<u64, String>,
}

impl ProcessEntry {
    pub fn identity(&self) -> ProcessIdentity {
        match self.start_time {
            Ok(start_time) => ProcessIdentity::new(self.pid, start_time),
            Err(_) => ProcessIdentity::unverified(self.pid),
        }
    }
}

/// Case-insensitive name match that ignores an executable extension on
/// either side, so `notepad` finds `Notepad.exe`.
pub fn name_matches(candidate: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    candidate.eq_ignore_ascii_case(query) || stem(candidate).eq_ignore_ascii_case(stem(query))
}

fn stem(name: &str) -> &str {
    let path = Path::new(name);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("exe") => path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name),
        _ => name,
    }
}

pub fn filter_by_name(entries: Vec<ProcessEntry>, query: &str) -> Vec<ProcessEntry> {
    let mut matches: Vec<ProcessEntry> = entries
        .into_iter()
        .filter(|entry| name_matches(&entry.name, query))
        .collect();
    matches.sort_by_key(|entry| entry.pid);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, name: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
            start_time: Ok(1_700_000_000),
        }
    }

    #[test]
    fn matches_ignore_case_and_exe_suffix() {
        assert!(name_matches("Notepad.exe", "notepad"));
        assert!(name_matches("notepad", "NOTEPAD.EXE"));
        assert!(name_matches("bash", "bash"));
        assert!(!name_matches("bash", "ba"));
        assert!(!name_matches("bash", "   "));
    }

    #[test]
    fn other_extensions_are_part_of_the_name() {
        assert!(!name_matches("script.py", "script"));
        assert!(name_matches("script.py", "script.py"));
    }

    #[test]
    fn filter_sorts_matches_by_pid() {
        let entries = vec![entry(30, "worker"), entry(4, "init"), entry(12, "worker")];
        let pids: Vec<u32> = filter_by_name(entries, "worker")
            .iter()
            .map(|e| e.pid)
            .collect();
        assert_eq!(pids, vec![12, 30]);
    }

    #[test]
    fn identity_without_start_time_is_unverified() {
        let mut e = entry(9, "svc");
        assert_eq!(e.identity(), ProcessIdentity::new(9, 1_700_000_000));
        e.start_time = Err("Access is denied".into());
        assert_eq!(e.identity(), ProcessIdentity::unverified(9));
    }
}

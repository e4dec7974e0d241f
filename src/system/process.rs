use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::users::UserResolver;

/// pid of `kthreadd`, the parent of every kernel thread.
pub const KTHREADD_PID: u32 = 2;

/// Fields after the closing `)` of the name that a usable stat line carries.
const MIN_STAT_FIELDS: usize = 22;
const STATE_FIELD: usize = 0;
const PPID_FIELD: usize = 1;
const RSS_FIELD: usize = 21;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub state: char,
    pub memory_kb: u64,
    pub uid: u32,
    pub user: String,
    pub is_kernel_thread: bool,
    /// Per-process CPU is not sampled; always 0.0.
    pub cpu_percent: f32,
}

/// The parts of `/proc/<pid>/stat` the monitor cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatRecord {
    pub name: String,
    pub state: char,
    pub ppid: u32,
    pub rss_pages: u64,
}

impl StatRecord {
    pub fn is_kernel_thread(&self) -> bool {
        self.ppid == KTHREADD_PID || is_bracketed(&self.name)
    }
}

fn is_bracketed(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

/// Parse one stat line. The name sits between the first `(` and the last `)`,
/// so names containing spaces or parentheses survive intact.
pub fn parse_stat_line(line: &str) -> Option<StatRecord> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }
    let name = &line[open + 1..close];
    let fields: Vec<&str> = line[close + 1..].split_whitespace().collect();
    if fields.len() < MIN_STAT_FIELDS {
        return None;
    }

    let state = fields[STATE_FIELD].chars().next()?;
    let ppid = fields[PPID_FIELD].parse().ok()?;
    let rss_pages = fields[RSS_FIELD].parse().ok()?;

    Some(StatRecord {
        name: name.to_string(),
        state,
        ppid,
        rss_pages,
    })
}

/// First numeric token on the `Uid:` line of `/proc/<pid>/status`.
pub fn parse_status_uid(contents: &str) -> Option<u32> {
    contents.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "Uid:" {
            return None;
        }
        tokens.next()?.parse().ok()
    })
}

/// Lazy scan of the process table.
///
/// Yields only entries that could be read and parsed; anything that vanished
/// mid-scan or had a short record is dropped and counted in [`skipped`].
///
/// [`skipped`]: ProcessEnumerator::skipped
pub struct ProcessEnumerator<'a, U: UserResolver> {
    root: PathBuf,
    pids: std::vec::IntoIter<u32>,
    page_size_kb: u64,
    users: &'a mut U,
    skipped: usize,
}

impl<'a, U: UserResolver> ProcessEnumerator<'a, U> {
    pub fn new(root: &Path, page_size_kb: u64, users: &'a mut U) -> Self {
        let pids = list_pids(root);
        Self {
            root: root.to_path_buf(),
            pids: pids.into_iter(),
            page_size_kb,
            users,
            skipped: 0,
        }
    }

    /// Entries dropped so far because they were unreadable or malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn read_entry(&mut self, pid: u32) -> Option<ProcessEntry> {
        let dir = self.root.join(pid.to_string());
        let stat = fs::read_to_string(dir.join("stat")).ok()?;
        let record = parse_stat_line(stat.lines().next()?)?;

        let uid = fs::read_to_string(dir.join("status"))
            .ok()
            .and_then(|status| parse_status_uid(&status))
            .unwrap_or(0);

        Some(ProcessEntry {
            pid,
            is_kernel_thread: record.is_kernel_thread(),
            memory_kb: record.rss_pages.saturating_mul(self.page_size_kb),
            state: record.state,
            name: record.name,
            uid,
            user: self.users.display_name(uid),
            cpu_percent: 0.0,
        })
    }
}

impl<U: UserResolver> Iterator for ProcessEnumerator<'_, U> {
    type Item = ProcessEntry;

    fn next(&mut self) -> Option<ProcessEntry> {
        while let Some(pid) = self.pids.next() {
            match self.read_entry(pid) {
                Some(entry) => return Some(entry),
                None => self.skipped += 1,
            }
        }
        None
    }
}

/// Numeric directory names under the procfs root, ascending.
fn list_pids(root: &Path) -> Vec<u32> {
    let Ok(entries) = fs::read_dir(root) else {
        tracing::warn!(root = %root.display(), "process table unavailable");
        return Vec::new();
    };
    let mut pids: Vec<u32> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            name.parse().ok().filter(|pid| *pid > 0)
        })
        .collect();
    pids.sort_unstable();
    pids
}

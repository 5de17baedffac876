use tracing::warn;

use crate::models::{LineStatusEntry, StatusKind};

/// A cluster of lines the feed reports together
#[derive(Debug, PartialEq, Eq)]
pub struct LineGroup {
    /// Canonical token, also what gets spelled out in speech
    pub token: &'static str,
    pub lines: &'static [&'static str],
    pub aliases: &'static [&'static str],
}

/// Every known group, in the order full updates are read out
pub static LINE_GROUPS: &[LineGroup] = &[
    LineGroup {
        token: "123",
        lines: &["1", "2", "3"],
        aliases: &[],
    },
    LineGroup {
        token: "456",
        lines: &["4", "5", "6"],
        aliases: &[],
    },
    LineGroup {
        token: "7",
        lines: &["7"],
        aliases: &["seven", "flushing"],
    },
    LineGroup {
        token: "ACE",
        lines: &["A", "C", "E"],
        aliases: &[],
    },
    LineGroup {
        token: "BDFM",
        lines: &["B", "D", "F", "M"],
        aliases: &[],
    },
    LineGroup {
        token: "G",
        lines: &["G"],
        aliases: &["crosstown"],
    },
    LineGroup {
        token: "JZ",
        lines: &["J", "Z"],
        aliases: &[],
    },
    LineGroup {
        token: "L",
        lines: &["L"],
        aliases: &["canarsie"],
    },
    LineGroup {
        token: "NQR",
        lines: &["N", "Q", "R", "W"],
        aliases: &["NQRW"],
    },
    LineGroup {
        token: "S",
        lines: &["S", "GS", "FS", "H"],
        aliases: &[
            "shuttle",
            "shuttles",
            "times square shuttle",
            "franklin avenue shuttle",
            "rockaway park shuttle",
        ],
    },
    LineGroup {
        token: "SIR",
        lines: &["SI"],
        aliases: &["staten island railway", "staten island railroad", "staten island"],
    },
];

/// Aggregate status of one group against the current feed
#[derive(Debug, PartialEq)]
pub enum GroupStatus<'a> {
    Good,
    /// Worst member status, plus every degraded member entry in feed order
    Degraded {
        kind: StatusKind,
        entries: Vec<&'a LineStatusEntry>,
    },
    /// The feed said nothing about this group
    Unreported,
}

#[derive(Debug, PartialEq)]
pub struct GroupReport<'a> {
    pub group: &'static LineGroup,
    pub status: GroupStatus<'a>,
}

impl GroupReport<'_> {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, GroupStatus::Degraded { .. })
    }
}

/// Uppercase and drop spaces, periods and dashes: "a. c. e." and "Ace" both become "ACE"
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '-'))
        .flat_map(char::to_uppercase)
        .collect()
}

impl LineGroup {
    fn matches(&self, key: &str) -> bool {
        self.token == key
            || self.lines.iter().any(|line| *line == key)
            || self.aliases.iter().any(|alias| normalize(alias) == key)
    }

    /// Whether a feed entry id names this group or one of its lines
    fn owns(&self, line_id: &str) -> bool {
        let key = normalize(line_id);
        self.token == key || self.lines.iter().any(|line| *line == key)
    }
}

/// Resolve a slot value to its group. Case-insensitive, accepts single lines and aliases.
pub fn find_group(slot: &str) -> Option<&'static LineGroup> {
    let key = normalize(slot);
    if key.is_empty() {
        return None;
    }
    LINE_GROUPS.iter().find(|group| group.matches(&key))
}

/// Aggregate the feed entries belonging to one group
pub fn report_for<'a>(
    group: &'static LineGroup,
    entries: &'a [LineStatusEntry],
) -> GroupReport<'a> {
    let members: Vec<&LineStatusEntry> = entries
        .iter()
        .filter(|entry| group.owns(&entry.line_id))
        .collect();

    if members.is_empty() {
        return GroupReport {
            group,
            status: GroupStatus::Unreported,
        };
    }

    let degraded: Vec<&LineStatusEntry> = members
        .into_iter()
        .filter(|entry| !entry.kind().is_nominal())
        .collect();

    let worst = degraded
        .iter()
        .map(|entry| entry.kind())
        .max_by_key(StatusKind::severity);

    let status = match worst {
        None => GroupStatus::Good,
        Some(kind) => GroupStatus::Degraded {
            kind,
            entries: degraded,
        },
    };

    GroupReport { group, status }
}

/// Aggregate every known group, in canonical order
pub fn report_all(entries: &[LineStatusEntry]) -> Vec<GroupReport<'_>> {
    for entry in entries {
        if !LINE_GROUPS.iter().any(|group| group.owns(&entry.line_id)) {
            warn!(line = %entry.line_id, "feed entry matches no known line group");
        }
    }

    LINE_GROUPS
        .iter()
        .map(|group| report_for(group, entries))
        .collect()
}

//! SSML templates and cards.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::groups::{GroupReport, GroupStatus};
use crate::models::{LineStatusEntry, SkillResponse, StatusKind};

pub const NOT_FOUND: &str = "Sorry, I didn't hear a subway line I understand";
pub const UNAVAILABLE: &str =
    "Sorry, I'm having trouble reaching the subway status service right now. Please try again later.";
pub const ALL_GOOD: &str = "Good service on all lines";
pub const ALL_OTHERS_GOOD: &str = "Good service on all other lines";
pub const FULL_UPDATE_CARD_TITLE: &str = "Subway Status";

fn speak(body: &str) -> String {
    format!("<speak> {body} </speak>")
}

fn spell(token: &str) -> String {
    format!("<say-as interpret-as=\"spell-out\">{token}</say-as>")
}

/// Predicate used for a single degraded group, e.g. "is experiencing delays".
/// Nominal groups use their own template and never get here.
fn single_phrase(kind: &StatusKind) -> &'static str {
    match kind {
        StatusKind::PlannedWork => "has planned work",
        StatusKind::ServiceChange => "has a service change",
        StatusKind::Delays => "is experiencing delays",
        StatusKind::Suspended => "is suspended",
        StatusKind::Other(_) | StatusKind::GoodService => "has a status update",
    }
}

/// Sentence opener used when listing degraded groups
fn headline(kind: &StatusKind) -> &'static str {
    match kind {
        StatusKind::PlannedWork => "There is planned work on the",
        StatusKind::ServiceChange => "There are service changes on the",
        StatusKind::Delays => "There are delays on the",
        StatusKind::Suspended => "Service is suspended on the",
        StatusKind::Other(_) | StatusKind::GoodService => "There are status updates on the",
    }
}

fn incident_text(entry: &LineStatusEntry) -> String {
    let mut text = entry.status_text.clone();
    if let Some(detail) = &entry.detail_text {
        text.push_str("\n\n");
        text.push_str(detail);
    }
    if let Some(posted) = &entry.posted {
        text.push_str("\n\nPosted ");
        text.push_str(posted);
    }
    text
}

pub fn not_found() -> SkillResponse {
    SkillResponse::speak(speak(NOT_FOUND))
}

pub fn unavailable() -> SkillResponse {
    SkillResponse::speak(speak(UNAVAILABLE))
}

/// Response for a single requested group
pub fn single_group(report: &GroupReport<'_>) -> SkillResponse {
    let token = report.group.token;

    match &report.status {
        GroupStatus::Good => {
            SkillResponse::speak(speak(&format!("Good service on the {} line", spell(token))))
        }
        GroupStatus::Unreported => SkillResponse::speak(speak(&format!(
            "I couldn't find a status for the {} line right now",
            spell(token)
        ))),
        GroupStatus::Degraded { kind, entries } => {
            let ssml = speak(&format!(
                "The {} line {}. I've added a card with the details on the Alexa App.",
                spell(token),
                single_phrase(kind)
            ));
            let content = entries
                .iter()
                .map(|entry| incident_text(entry))
                .collect::<Vec<_>>()
                .join("\n\n");

            SkillResponse::speak(ssml).with_card(format!("Subway Status for {token}"), content)
        }
    }
}

/// Response for a full system update
pub fn all_groups(reports: &[GroupReport<'_>]) -> SkillResponse {
    let degraded: Vec<&GroupReport<'_>> = reports.iter().filter(|r| r.is_degraded()).collect();
    let any_good = reports
        .iter()
        .any(|r| matches!(r.status, GroupStatus::Good));

    if degraded.is_empty() {
        return if any_good {
            SkillResponse::speak(speak(ALL_GOOD))
        } else {
            unavailable()
        };
    }

    // Worst status first; groups keep canonical order within a status
    let mut by_kind: BTreeMap<Reverse<u8>, (&StatusKind, Vec<&str>)> = BTreeMap::new();
    let mut card = Vec::new();

    for report in &degraded {
        if let GroupStatus::Degraded { kind, entries } = &report.status {
            by_kind
                .entry(Reverse(kind.severity()))
                .or_insert_with(|| (kind, Vec::new()))
                .1
                .push(report.group.token);

            let details = entries
                .iter()
                .map(|entry| incident_text(entry))
                .collect::<Vec<_>>()
                .join("\n\n");
            card.push(format!("{}: {}", report.group.token, details));
        }
    }

    let mut sentences: Vec<String> = by_kind
        .values()
        .map(|(kind, tokens)| {
            format!("<s>{} {} lines</s>", headline(kind), spell(&tokens.join("<break/>")))
        })
        .collect();

    if any_good {
        sentences.push(format!("<s>{ALL_OTHERS_GOOD}</s>"));
    }

    SkillResponse::speak(speak(&sentences.join(" ")))
        .with_card(FULL_UPDATE_CARD_TITLE.to_string(), card.join("\n\n"))
}

use tracing::{debug, info, warn};

use crate::error::FeedError;
use crate::feed::StatusSource;
use crate::groups::{self, LineGroup};
use crate::models::{LineStatusEntry, SkillEvent, SkillRequest, SkillResponse};
use crate::parser::parse_feed;
use crate::speech;

pub const STATUS_OF_LINE: &str = "StatusOfLine";
pub const FULL_STATUS_UPDATE: &str = "FullStatusUpdate";
pub const LINE_SLOT: &str = "subwayLineOrGroup";

/// Which flow an event takes
#[derive(Debug, PartialEq)]
enum Route<'a> {
    SingleLine(Option<&'a str>),
    FullUpdate,
    SessionEnded,
}

fn route(event: &SkillEvent) -> Route<'_> {
    match &event.request {
        SkillRequest::IntentRequest { intent } if intent.name == STATUS_OF_LINE => {
            Route::SingleLine(intent.slot_value(LINE_SLOT))
        }
        SkillRequest::SessionEndedRequest => Route::SessionEnded,
        // FullStatusUpdate, launch, and anything unrecognised
        _ => Route::FullUpdate,
    }
}

async fn load_entries(source: &dyn StatusSource) -> Result<Vec<LineStatusEntry>, FeedError> {
    let body = source.fetch().await?;
    parse_feed(&body)
}

/// Handle one invocation. Always produces a valid response envelope.
pub async fn dispatch(source: &dyn StatusSource, event: &SkillEvent) -> SkillResponse {
    match route(event) {
        Route::SingleLine(slot) => {
            // Validate the slot before spending a fetch on it
            let Some(group) = slot.and_then(groups::find_group) else {
                info!(slot = ?slot, "no recognised subway line in request");
                return speech::not_found();
            };
            single_line(source, group).await
        }
        Route::FullUpdate => full_update(source).await,
        Route::SessionEnded => {
            debug!("session ended");
            SkillResponse::empty()
        }
    }
}

async fn single_line(source: &dyn StatusSource, group: &'static LineGroup) -> SkillResponse {
    let entries = match load_entries(source).await {
        Ok(entries) => entries,
        Err(e) => return feed_failure(&e),
    };

    let report = groups::report_for(group, &entries);
    info!(group = group.token, degraded = report.is_degraded(), "line status");
    speech::single_group(&report)
}

async fn full_update(source: &dyn StatusSource) -> SkillResponse {
    let entries = match load_entries(source).await {
        Ok(entries) => entries,
        Err(e) => return feed_failure(&e),
    };

    let reports = groups::report_all(&entries);
    info!(
        degraded = reports.iter().filter(|r| r.is_degraded()).count(),
        "full status update"
    );
    speech::all_groups(&reports)
}

fn feed_failure(err: &FeedError) -> SkillResponse {
    if err.is_retrieval() {
        warn!(error = %err, "status feed unreachable");
    } else {
        warn!(error = %err, "status feed unreadable");
    }
    speech::unavailable()
}

//! Market-session awareness for the notice shown before results.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// NYSE opening bell in UTC, encoded as hour * 100 + minute.
const OPENING_BELL_HHMM: u32 = 1430;

/// Returns the notice to show when US markets are closed at `now`.
///
/// Weekends and weekday mornings before the opening bell both mean the
/// prices shown come from the most recent market-open session.
pub fn market_notice(now: DateTime<Utc>) -> Option<String> {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return Some(
            "The market is closed today; prices are from the most recent market-open day."
                .to_string(),
        );
    }
    if now.hour() * 100 + now.minute() < OPENING_BELL_HHMM {
        return Some(
            "The market has not opened yet; prices are from the most recent market-open day."
                .to_string(),
        );
    }
    None
}

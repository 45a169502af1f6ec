//! ISO-8601 duration conversion (`PT1H2M3S` → 3723 s → `1:02:03`).

use std::sync::LazyLock;

use mediadash_core::UNKNOWN_DURATION;
use regex::Regex;

// Weeks, days, hours, minutes and seconds. Year and month designators have no
// fixed length in seconds and are deliberately not matched.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:(\d+(?:[.,]\d+)?)W)?(?:(\d+(?:[.,]\d+)?)D)?(?:T(?:(\d+(?:[.,]\d+)?)H)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)S)?)?$",
    )
    .expect("valid duration regex")
});

const SECONDS_PER_UNIT: [f64; 5] = [604_800.0, 86_400.0, 3_600.0, 60.0, 1.0];

/// A converted video duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoDuration {
    Known { seconds: i64 },
    Unknown,
}

impl VideoDuration {
    #[must_use]
    pub fn seconds(self) -> Option<i64> {
        match self {
            VideoDuration::Known { seconds } => Some(seconds),
            VideoDuration::Unknown => None,
        }
    }

    /// `H:MM:SS` with unbounded hours, or the `unknown` sentinel.
    #[must_use]
    pub fn hms(self) -> String {
        match self {
            VideoDuration::Known { seconds } => format_hms(seconds),
            VideoDuration::Unknown => UNKNOWN_DURATION.to_owned(),
        }
    }
}

/// Converts an ISO-8601 duration string to whole seconds (fractions are
/// truncated). Anything unparseable yields [`VideoDuration::Unknown`].
#[must_use]
pub fn parse_iso8601_duration(raw: &str) -> VideoDuration {
    let Some(caps) = DURATION_RE.captures(raw.trim()) else {
        return VideoDuration::Unknown;
    };

    let mut total = 0.0_f64;
    let mut any_component = false;
    for (index, unit) in SECONDS_PER_UNIT.iter().enumerate() {
        if let Some(m) = caps.get(index + 1) {
            let Ok(value) = m.as_str().replace(',', ".").parse::<f64>() else {
                return VideoDuration::Unknown;
            };
            total += value * unit;
            any_component = true;
        }
    }

    // "P" and "PT" alone are not durations.
    if !any_component || raw.trim().ends_with('T') || !total.is_finite() {
        return VideoDuration::Unknown;
    }

    #[allow(clippy::cast_possible_truncation)]
    let seconds = total.trunc() as i64;
    VideoDuration::Known { seconds }
}

fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_hours_minutes_seconds() {
        let d = parse_iso8601_duration("PT1H2M3S");
        assert_eq!(d, VideoDuration::Known { seconds: 3723 });
        assert_eq!(d.hms(), "1:02:03");
    }

    #[test]
    fn converts_partial_components() {
        assert_eq!(parse_iso8601_duration("PT45S").seconds(), Some(45));
        assert_eq!(parse_iso8601_duration("PT4M").hms(), "0:04:00");
        assert_eq!(parse_iso8601_duration("PT2H").seconds(), Some(7200));
    }

    #[test]
    fn live_stream_zero_duration() {
        let d = parse_iso8601_duration("P0D");
        assert_eq!(d.seconds(), Some(0));
        assert_eq!(d.hms(), "0:00:00");
    }

    #[test]
    fn days_and_weeks_fold_into_hours() {
        let d = parse_iso8601_duration("P1DT2H");
        assert_eq!(d.seconds(), Some(93_600));
        assert_eq!(d.hms(), "26:00:00");
        assert_eq!(parse_iso8601_duration("P1W").seconds(), Some(604_800));
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(parse_iso8601_duration("PT1.9S").seconds(), Some(1));
        assert_eq!(parse_iso8601_duration("PT0,5M").seconds(), Some(30));
    }

    #[test]
    fn malformed_input_yields_unknown_for_both_values() {
        for raw in ["", "P", "PT", "1H2M", "PT1X", "garbage", "P1Y", "P2M", "PT-5S"] {
            let d = parse_iso8601_duration(raw);
            assert_eq!(d, VideoDuration::Unknown, "input {raw:?}");
            assert_eq!(d.seconds(), None);
            assert_eq!(d.hms(), UNKNOWN_DURATION);
        }
    }
}

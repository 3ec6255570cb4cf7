//! Time zone resolution
//!
//! Turns a human-supplied zone descriptor into the `"time_zone": "±HH:MM"`
//! option understood by date histograms. Descriptors are either fixed
//! offsets (`-08:00`, `+0545`) or IANA zone names (`Asia/Kathmandu`). Named
//! zones resolve to the offset in effect at evaluation time, so a zone that
//! observes daylight saving yields different offsets across the year.

use crate::query::error::{QueryError, QueryResult};
use crate::query::fragment::Fragment;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone used when neither `TZ` nor the platform names one
pub const DEFAULT_FALLBACK_ZONE: &str = "UTC";

const SYSTEM_LOCALTIME: &str = "/etc/localtime";
const ZONEINFO_MARKER: &str = "zoneinfo/";

/// A fixed difference from UTC, displayed as `±HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    /// Offset of `seconds` east of UTC
    pub fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Seconds east of UTC
    pub fn seconds(&self) -> i32 {
        self.seconds
    }
}

impl From<FixedOffset> for UtcOffset {
    fn from(offset: FixedOffset) -> Self {
        Self::from_seconds(offset.local_minus_utc())
    }
}

impl std::fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        // Sub-minute remainders only occur in historical LMT offsets
        let minutes = self.seconds.unsigned_abs() / 60;
        write!(f, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
    }
}

/// Parse `±HH:MM` or `±HHMM`.
///
/// Returns `Ok(None)` when `s` does not look like an offset at all, and an
/// error when it does but is out of range.
pub fn parse_fixed_offset(s: &str) -> QueryResult<Option<UtcOffset>> {
    let re = regex::Regex::new(r"^([+-])(\d{2}):?(\d{2})$")
        .map_err(|e| QueryError::UnknownTimeZone(format!("offset pattern: {}", e)))?;

    let caps = match re.captures(s) {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let hours: i32 = caps[2]
        .parse()
        .map_err(|_| QueryError::UnknownTimeZone(s.to_string()))?;
    let minutes: i32 = caps[3]
        .parse()
        .map_err(|_| QueryError::UnknownTimeZone(s.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(QueryError::UnknownTimeZone(s.to_string()));
    }

    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    Ok(Some(UtcOffset::from_seconds(seconds)))
}

/// Resolve `zone` to the offset in effect at `at`.
pub fn resolve_offset(zone: &str, at: DateTime<Utc>) -> QueryResult<UtcOffset> {
    // POSIX allows a leading colon on TZ values
    let zone = zone.trim().trim_start_matches(':');

    if let Some(offset) = parse_fixed_offset(zone)? {
        return Ok(offset);
    }

    let tz: Tz = zone
        .parse()
        .map_err(|_| QueryError::UnknownTimeZone(zone.to_string()))?;

    Ok(tz.offset_from_utc_datetime(&at.naive_utc()).fix().into())
}

/// Name of the process's local zone.
///
/// `TZ` wins when set (an empty value means UTC), then the zone the
/// platform's `/etc/localtime` points at, then `fallback`.
pub fn local_zone_name(fallback: &str) -> String {
    choose_local_zone(std::env::var("TZ").ok(), system_zone_name(), fallback)
}

fn choose_local_zone(tz_var: Option<String>, system: Option<String>, fallback: &str) -> String {
    match tz_var {
        Some(tz) if tz.trim().is_empty() => DEFAULT_FALLBACK_ZONE.to_string(),
        Some(tz) => tz,
        None => system.unwrap_or_else(|| {
            tracing::warn!(fallback, "No local time zone configured, using fallback");
            fallback.to_string()
        }),
    }
}

fn system_zone_name() -> Option<String> {
    let target = std::fs::read_link(SYSTEM_LOCALTIME).ok()?;
    zone_from_link(&target.to_string_lossy())
}

/// Zone name from a zoneinfo path, without the `posix/` or `right/` tree.
fn zone_from_link(target: &str) -> Option<String> {
    let start = target.rfind(ZONEINFO_MARKER)? + ZONEINFO_MARKER.len();
    let name = &target[start..];
    let name = name
        .strip_prefix("posix/")
        .or_else(|| name.strip_prefix("right/"))
        .unwrap_or(name);

    (!name.is_empty()).then(|| name.to_string())
}

/// `"time_zone": "±HH:MM"` for `zone`, or for the local zone when `None`.
///
/// ```
/// use esdsl::query::time_zone;
///
/// let tz = time_zone(Some("-08:00")).unwrap();
/// assert_eq!(tz.to_text().unwrap(), r#""time_zone": "-08:00""#);
/// ```
pub fn time_zone(zone: Option<&str>) -> QueryResult<Fragment> {
    time_zone_at(zone, Utc::now())
}

/// Like [`time_zone`], evaluated at an explicit instant
pub fn time_zone_at(zone: Option<&str>, at: DateTime<Utc>) -> QueryResult<Fragment> {
    resolve_time_zone(zone, DEFAULT_FALLBACK_ZONE, at)
}

/// Like [`time_zone`], with a configured zone in place of the UTC fallback
pub fn time_zone_with_fallback(zone: Option<&str>, fallback: &str) -> QueryResult<Fragment> {
    resolve_time_zone(zone, fallback, Utc::now())
}

fn resolve_time_zone(
    zone: Option<&str>,
    fallback: &str,
    at: DateTime<Utc>,
) -> QueryResult<Fragment> {
    let name = match zone {
        Some(zone) => zone.to_string(),
        None => local_zone_name(fallback),
    };

    let offset = resolve_offset(&name, at)?;
    tracing::trace!(zone = %name, offset = %offset, "Resolved time zone");

    Ok(Fragment::scalar("time_zone", offset.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn text(zone: &str, when: DateTime<Utc>) -> String {
        time_zone_at(Some(zone), when).unwrap().to_text().unwrap()
    }

    #[test]
    fn test_fixed_offset_passes_through() {
        assert_eq!(text("-08:00", at(2024, 1, 15)), r#""time_zone": "-08:00""#);
        assert_eq!(text("+05:30", at(2024, 1, 15)), r#""time_zone": "+05:30""#);
    }

    #[test]
    fn test_fixed_offset_without_colon() {
        assert_eq!(text("+0545", at(2024, 1, 15)), r#""time_zone": "+05:45""#);
    }

    #[test]
    fn test_fixed_offset_out_of_range() {
        assert!(matches!(
            parse_fixed_offset("+25:00"),
            Err(QueryError::UnknownTimeZone(_))
        ));
        assert!(matches!(
            parse_fixed_offset("-08:75"),
            Err(QueryError::UnknownTimeZone(_))
        ));
        assert_eq!(parse_fixed_offset("Asia/Tokyo").unwrap(), None);
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(text("Asia/Kathmandu", at(2024, 1, 15)), r#""time_zone": "+05:45""#);
        assert_eq!(text("UTC", at(2024, 1, 15)), r#""time_zone": "+00:00""#);
    }

    #[test]
    fn test_named_zone_tracks_daylight_saving() {
        assert_eq!(text("America/New_York", at(2024, 1, 15)), r#""time_zone": "-05:00""#);
        assert_eq!(text("America/New_York", at(2024, 7, 15)), r#""time_zone": "-04:00""#);
    }

    #[test]
    fn test_negative_offset_with_minutes() {
        let offset = resolve_offset("America/St_Johns", at(2024, 1, 15)).unwrap();
        assert_eq!(offset.seconds(), -(3 * 3600 + 30 * 60));
        assert_eq!(offset.to_string(), "-03:30");
    }

    #[test]
    fn test_posix_leading_colon() {
        let offset = resolve_offset(":Asia/Kathmandu", at(2024, 1, 15)).unwrap();
        assert_eq!(offset.to_string(), "+05:45");
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        match time_zone(Some("Mars/Olympus")) {
            Err(QueryError::UnknownTimeZone(zone)) => assert_eq!(zone, "Mars/Olympus"),
            other => panic!("expected unknown time zone, got {:?}", other),
        }
    }

    #[test]
    fn test_choose_local_zone() {
        assert_eq!(
            choose_local_zone(Some("Asia/Kathmandu".into()), Some("Europe/Berlin".into()), "UTC"),
            "Asia/Kathmandu"
        );
        assert_eq!(
            choose_local_zone(None, Some("Europe/Berlin".into()), "UTC"),
            "Europe/Berlin"
        );
        assert_eq!(choose_local_zone(None, None, "Asia/Tokyo"), "Asia/Tokyo");
        assert_eq!(
            choose_local_zone(Some(String::new()), Some("Europe/Berlin".into()), "Asia/Tokyo"),
            "UTC"
        );
    }

    #[test]
    fn test_zone_from_link() {
        assert_eq!(
            zone_from_link("/usr/share/zoneinfo/Europe/Berlin").as_deref(),
            Some("Europe/Berlin")
        );
        assert_eq!(
            zone_from_link("../usr/share/zoneinfo/posix/Europe/Berlin").as_deref(),
            Some("Europe/Berlin")
        );
        assert_eq!(
            zone_from_link("/usr/share/zoneinfo/right/Asia/Tokyo").as_deref(),
            Some("Asia/Tokyo")
        );
        assert_eq!(zone_from_link("/usr/share/zoneinfo/"), None);
        assert_eq!(zone_from_link("/etc/custom-zone"), None);
    }

    #[test]
    fn test_local_zone_from_tz_variable() {
        let saved = std::env::var("TZ").ok();
        std::env::set_var("TZ", "Asia/Kathmandu");

        let name = local_zone_name("UTC");
        let tz = time_zone(None);

        match saved {
            Some(value) => std::env::set_var("TZ", value),
            None => std::env::remove_var("TZ"),
        }

        assert_eq!(name, "Asia/Kathmandu");
        assert_eq!(tz.unwrap().to_text().unwrap(), r#""time_zone": "+05:45""#);
    }

    #[test]
    fn test_explicit_zone_ignores_fallback() {
        let tz = time_zone_with_fallback(Some("+01:00"), "Asia/Tokyo").unwrap();
        assert_eq!(tz.to_text().unwrap(), r#""time_zone": "+01:00""#);
    }

    #[test]
    fn test_offset_from_fixed() {
        let fixed = FixedOffset::west_opt(8 * 3600).unwrap();
        assert_eq!(UtcOffset::from(fixed).to_string(), "-08:00");
    }
}

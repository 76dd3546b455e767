use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Attaches `tz` to a wall-clock time.
///
/// Ambiguous times (the repeated hour in autumn) take the earlier instant.
/// Times inside the spring gap move forward to the first valid minute.
pub fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<FixedOffset> {
    let mut t = local;
    loop {
        if let Some(res) = tz.from_local_datetime(&t).earliest() {
            return res.fixed_offset();
        }
        t += Duration::minutes(1);
        if t - local > Duration::days(1) {
            // No zone has a gap this long; fall back to the offset in effect at the UTC reading.
            return tz.from_utc_datetime(&local).fixed_offset();
        }
    }
}

/// `YYYYMMDDhhmmss ±zzzz`, the timestamp form used in XMLTV documents.
pub fn xmltv_timestamp(t: DateTime<FixedOffset>) -> String {
    t.format("%Y%m%d%H%M%S %z").to_string()
}

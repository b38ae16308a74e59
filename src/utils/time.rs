use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};


/// This is the standard way of showing a day in burplog, for example
/// "Mon, Jan 5, 2024".
pub fn day_label(day: NaiveDate) -> String {
    day.format("%a, %b %-d, %Y").to_string()
}

/// Local calendar day an instant falls on. The grouping key shared by the
/// entry logs and the vitamin checkmarks.
pub fn day_key<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Wall clock time of an instant, like "09:12".
pub fn clock_time<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .naive_local()
        .format("%H:%M")
        .to_string()
}

/// Day plus wall clock time, like "Mon, Jan 5, 2024 09:12".
pub fn day_and_time<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    let local = instant.with_timezone(tz).naive_local();
    format!("{} {}", day_label(local.date()), local.format("%H:%M"))
}

/// Renders a duration as whole hours and minutes, like "2h 5m" or "45m".
pub fn format_duration_hm(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

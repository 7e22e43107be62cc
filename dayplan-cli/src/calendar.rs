use chrono::{Duration, NaiveDate, NaiveDateTime};
use dayplan_core::{to_canonical_date, CalendarSlot};

fn slot_datetime(day: NaiveDate, minute_of_day: u32) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN) + Duration::minutes(i64::from(minute_of_day))
}

/// Emit a minimal ICS calendar containing one VEVENT per slot.
///
/// Notes:
/// - DTSTART/DTEND are floating local times (no TZID, no Z).
/// - UIDs are stable per day and position so re-imports replace rather than duplicate.
pub fn slots_to_ics(day: NaiveDate, slots: &[CalendarSlot], include_breaks: bool) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//dayplan//EN\r\n");

    let stamp = to_canonical_date(day).replace('-', "");
    for (i, slot) in slots.iter().enumerate() {
        if slot.is_break && !include_breaks {
            continue;
        }
        let dtstart = slot_datetime(day, slot.start).format("%Y%m%dT%H%M%S");
        let dtend = slot_datetime(day, slot.end).format("%Y%m%dT%H%M%S");

        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:dayplan-{stamp}-{i}@dayplan\r\n"));
        s.push_str(&format!("DTSTART:{dtstart}\r\n"));
        s.push_str(&format!("DTEND:{dtend}\r\n"));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&slot.title)));
        if slot.is_break {
            s.push_str("TRANSP:TRANSPARENT\r\n");
        }
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

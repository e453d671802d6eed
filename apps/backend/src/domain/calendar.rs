//! iCalendar export of a participant's drafted games.
//!
//! Start times are Toronto wall-clock times, emitted with
//! `TZID=America/Toronto` and a matching VTIMEZONE block.

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

const TZID: &str = "America/Toronto";
const UID_DOMAIN: &str = "tempodraft.app";

/// Games are blocked out for two and a half hours.
pub const GAME_DURATION: Duration = Duration::minutes(150);

#[derive(Debug, Clone)]
pub struct CalendarGame {
    pub season_game_id: i64,
    pub opponent: String,
    pub venue: String,
    pub starts_at: PrimitiveDateTime,
}

/// Escape TEXT values: backslash, semicolon, comma and newline.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

fn local_stamp(at: PrimitiveDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

fn utc_stamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    format!("{}Z", local_stamp(PrimitiveDateTime::new(utc.date(), utc.time())))
}

fn timezone_block(lines: &mut Vec<String>) {
    lines.extend(
        [
            "BEGIN:VTIMEZONE",
            "TZID:America/Toronto",
            "BEGIN:DAYLIGHT",
            "TZOFFSETFROM:-0500",
            "TZOFFSETTO:-0400",
            "TZNAME:EDT",
            "DTSTART:19700308T020000",
            "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU",
            "END:DAYLIGHT",
            "BEGIN:STANDARD",
            "TZOFFSETFROM:-0400",
            "TZOFFSETTO:-0500",
            "TZNAME:EST",
            "DTSTART:19701101T020000",
            "RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU",
            "END:STANDARD",
            "END:VTIMEZONE",
        ]
        .map(String::from),
    );
}

/// Render a VCALENDAR with one VEVENT per game, CRLF line endings.
pub fn render_calendar(games: &[CalendarGame], generated_at: OffsetDateTime) -> String {
    let mut lines: Vec<String> = [
        "BEGIN:VCALENDAR",
        "VERSION:2.0",
        "PRODID:-//Tempo Draft//EN",
        "CALSCALE:GREGORIAN",
        "METHOD:PUBLISH",
        "X-WR-CALNAME:Toronto Tempo Games",
        "X-WR-TIMEZONE:America/Toronto",
    ]
    .map(String::from)
    .to_vec();
    timezone_block(&mut lines);

    let dtstamp = utc_stamp(generated_at);
    for game in games {
        let ends_at = game.starts_at + GAME_DURATION;
        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:{}@{UID_DOMAIN}", game.season_game_id));
        lines.push(format!("DTSTAMP:{dtstamp}"));
        lines.push(format!("DTSTART;TZID={TZID}:{}", local_stamp(game.starts_at)));
        lines.push(format!("DTEND;TZID={TZID}:{}", local_stamp(ends_at)));
        lines.push(format!(
            "SUMMARY:{}",
            escape_text(&format!("Toronto Tempo vs {}", game.opponent))
        ));
        lines.push(format!("LOCATION:{}", escape_text(&game.venue)));
        lines.push("DESCRIPTION:Drafted via Tempo Draft".into());
        lines.push("END:VEVENT".into());
    }

    lines.push("END:VCALENDAR".into());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

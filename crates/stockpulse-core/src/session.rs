//! Trading-session gate for the mainland exchanges.
//!
//! Sessions run Monday to Friday, 09:15-11:30 and 13:00-15:00 exchange time
//! (UTC+8). The gate can judge either the wall clock or the timestamp a vendor
//! embedded in a quote; a quote stamped on an earlier day means the market is
//! closed regardless of the clock.

use time::macros::offset;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, Weekday};

/// Offset of the exchange clock.
pub const EXCHANGE_OFFSET: UtcOffset = offset!(+8);

const SESSIONS: [(u16, u16); 2] = [(915, 1130), (1300, 1500)];

/// Current time on the exchange clock.
pub fn exchange_now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(EXCHANGE_OFFSET)
}

/// Whether a weekday/time-of-day falls inside a trading session.
pub fn is_trading_time(weekday: Weekday, time: Time) -> bool {
    if matches!(weekday, Weekday::Saturday | Weekday::Sunday) {
        return false;
    }
    let hhmm = u16::from(time.hour()) * 100 + u16::from(time.minute());
    SESSIONS
        .iter()
        .any(|(open, close)| (*open..=*close).contains(&hhmm))
}

/// Wall-clock mode evaluated at `now`.
pub fn is_market_open_at(now: OffsetDateTime) -> bool {
    let local = now.to_offset(EXCHANGE_OFFSET);
    is_trading_time(local.weekday(), local.time())
}

/// Wall-clock mode evaluated now.
pub fn is_market_open() -> bool {
    is_market_open_at(exchange_now())
}

/// Session check for an optional vendor timestamp, evaluated at `now`.
///
/// Missing, blank or unparsable timestamps fall back to wall-clock mode.
pub fn is_session_open_at(vendor_timestamp: Option<&str>, now: OffsetDateTime) -> bool {
    let Some(stamp) = vendor_timestamp.and_then(parse_vendor_timestamp) else {
        return is_market_open_at(now);
    };

    let today = now.to_offset(EXCHANGE_OFFSET).date();
    if stamp.date() != today {
        return false;
    }
    is_trading_time(stamp.weekday(), stamp.time())
}

/// Session check for an optional vendor timestamp, evaluated now.
pub fn is_session_open(vendor_timestamp: Option<&str>) -> bool {
    is_session_open_at(vendor_timestamp, exchange_now())
}

/// Parse `YYYYMMDDHHMMSS`, `YYYY-MM-DD HH:MM:SS` or `YYYY/MM/DD HH:MM:SS`.
pub fn parse_vendor_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if !raw
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '/' | ':' | ' '))
    {
        return None;
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return None;
    }

    let number = |range: std::ops::Range<usize>| digits.get(range)?.parse::<u16>().ok();
    let year = i32::from(number(0..4)?);
    let month = Month::try_from(u8::try_from(number(4..6)?).ok()?).ok()?;
    let day = u8::try_from(number(6..8)?).ok()?;
    let hour = u8::try_from(number(8..10)?).ok()?;
    let minute = u8::try_from(number(10..12)?).ok()?;
    let second = u8::try_from(number(12..14)?).ok()?;

    let date = Date::from_calendar_date(year, month, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// `YYYY-MM-DD HH:MM:SS` rendering used for `QuoteSnapshot::update_time`.
pub fn format_vendor_timestamp(stamp: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        stamp.year(),
        u8::from(stamp.month()),
        stamp.day(),
        stamp.hour(),
        stamp.minute(),
        stamp.second()
    )
}

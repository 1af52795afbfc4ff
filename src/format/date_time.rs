//! DOS date/time packing, decoded via the host's local-time→epoch function
//! (letting it decide DST, per the reference behavior).
use chrono::{Local, TimeZone};

/// Decodes a DOS `(date, time)` pair (year offset 1980, 1-based month) into
/// epoch seconds. Returns `None` for a combination that doesn't name a real
/// calendar date/time, or one the local timezone rejects as ambiguous/
/// nonexistent in a way `earliest()` can't resolve.
pub(crate) fn dos_to_epoch(date: u16, time: u16) -> Option<i64> {
    let year = i32::from((date >> 9) & 0x7f) + 1980;
    let month = u32::from((date >> 5) & 0xf);
    let day = u32::from(date & 0x1f);
    let hour = u32::from((time >> 11) & 0x1f);
    let minute = u32::from((time >> 5) & 0x3f);
    let second = u32::from((time & 0x1f) << 1);

    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)?;
    Local.from_local_datetime(&naive).earliest().map(|dt| dt.timestamp())
}

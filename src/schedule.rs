use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use log::{debug, trace};

use crate::{
    chrono_util::localize,
    schema::{ChannelId, Programme, ScheduleEntry},
};

/// Turns the entries of one day page into zoned programmes.
///
/// Pages list programmes in airing order and usually run past midnight, so a start time
/// earlier than the previous one belongs to the following day.
pub fn resolve_day(
    channel: &ChannelId,
    date: NaiveDate,
    entries: Vec<ScheduleEntry>,
    tz: Tz,
    lang: &'static str,
) -> Vec<Programme> {
    let mut days_ahead = 0;
    let mut previous_start = None;
    let mut ret = Vec::with_capacity(entries.len());
    for entry in entries {
        if previous_start.is_some_and(|p| entry.start < p) {
            days_ahead += 1;
            trace!("Rolled over midnight before {:?}", entry.title);
        }
        previous_start = Some(entry.start);

        let Some(start_date) = date.checked_add_days(Days::new(days_ahead)) else {
            continue;
        };
        let start = localize(tz, start_date.and_time(entry.start));
        let stop = zoned_stop(tz, start_date, start, &entry);
        ret.push(Programme::from_entry(
            channel.clone(),
            entry,
            start,
            stop,
            lang,
        ));
    }
    ret
}

/// Stop wall-clock times are localized on their own; durations count elapsed time from the start.
fn zoned_stop(
    tz: Tz,
    start_date: NaiveDate,
    start: DateTime<FixedOffset>,
    entry: &ScheduleEntry,
) -> Option<DateTime<FixedOffset>> {
    match (entry.stop, entry.duration) {
        (Some(stop), _) if stop == entry.start => None,
        (Some(stop), _) => {
            let days = if stop < entry.start { 1 } else { 0 };
            let stop_date = start_date.checked_add_days(Days::new(days))?;
            Some(localize(tz, stop_date.and_time(stop)))
        }
        (None, Some(duration)) if duration > Duration::zero() => {
            Some((start + duration).with_timezone(&tz).fixed_offset())
        }
        _ => None,
    }
}

/// Merges the programmes of all day pages of one channel.
///
/// The result is ordered by start without duplicate starts, and every programme but the
/// last one has a stop time.
pub fn merge_channel(mut programmes: Vec<Programme>) -> Vec<Programme> {
    programmes.sort_by_key(|p| p.start());
    let before = programmes.len();
    programmes.dedup_by_key(|p| p.start());
    if programmes.len() != before {
        debug!(
            "Dropped {} programmes listed on two day pages",
            before - programmes.len()
        );
    }

    for i in 1..programmes.len() {
        let next_start = programmes[i].start();
        let current = &mut programmes[i - 1];
        if current.stop().is_none() {
            current.set_stop(next_start);
        }
    }
    programmes
}

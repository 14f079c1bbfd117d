// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use jiff::Zoned;

use crate::{Error, TimeOfDay};

/// Returns the next moment after `now` at which the clock shows `target`.
///
/// The result is today if `target` is still ahead of `now`'s hour and minute, and tomorrow
/// otherwise. A `target` equal to `now`'s hour and minute counts as already passed, so an
/// alarm set for the current minute rings tomorrow instead of right away. The result always
/// has zero seconds and lies in `now`'s time zone.
///
/// Days are added on the calendar, so month ends and leap days roll over correctly. When
/// the composed time falls into a daylight saving transition, jiff's compatible
/// disambiguation picks the offset.
///
/// # Errors
///
/// Returns [`Error::Calendar`] only if the result lies beyond the range of timestamps jiff
/// can represent, which happens at the very end of year 9999.
///
/// # Examples
///
/// ```
/// use jiff::civil::date;
/// use jiff::tz::TimeZone;
/// use reveille::next_occurrence;
///
/// let now = date(2024, 3, 10).at(15, 30, 0, 0).to_zoned(TimeZone::UTC)?;
/// let alarm = next_occurrence(&now, "14:00".parse()?)?;
///
/// assert_eq!(alarm.datetime(), date(2024, 3, 11).at(14, 0, 0, 0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn next_occurrence(now: &Zoned, target: TimeOfDay) -> Result<Zoned, Error> {
    let already_passed = (target.hour(), target.minute()) <= (now.hour(), now.minute());

    let date = if already_passed { now.date().tomorrow()? } else { now.date() };

    Ok(date.to_datetime(target.to_civil()).to_zoned(now.time_zone().clone())?)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use jiff::civil::{DateTime, date};
    use jiff::tz::TimeZone;
    use rstest::rstest;

    use super::*;

    fn utc(datetime: DateTime) -> Zoned {
        datetime.to_zoned(TimeZone::UTC).unwrap()
    }

    fn time(hour: i8, minute: i8) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[rstest]
    #[case::passed_earlier_today(date(2024, 3, 10).at(15, 30, 0, 0), time(14, 0), date(2024, 3, 11).at(14, 0, 0, 0))]
    #[case::later_today(date(2024, 3, 10).at(13, 59, 0, 0), time(14, 0), date(2024, 3, 10).at(14, 0, 0, 0))]
    #[case::month_rollover(date(2024, 1, 31).at(23, 0, 0, 0), time(8, 0), date(2024, 2, 1).at(8, 0, 0, 0))]
    #[case::leap_day_rollover(date(2024, 2, 28).at(10, 0, 0, 0), time(10, 0), date(2024, 2, 29).at(10, 0, 0, 0))]
    #[case::non_leap_year(date(2023, 2, 28).at(10, 0, 0, 0), time(9, 0), date(2023, 3, 1).at(9, 0, 0, 0))]
    #[case::year_rollover(date(2023, 12, 31).at(23, 30, 0, 0), time(0, 15), date(2024, 1, 1).at(0, 15, 0, 0))]
    #[case::same_hour_later_minute(date(2024, 6, 1).at(7, 10, 0, 0), time(7, 11), date(2024, 6, 1).at(7, 11, 0, 0))]
    #[case::same_hour_earlier_minute(date(2024, 6, 1).at(7, 10, 0, 0), time(7, 9), date(2024, 6, 2).at(7, 9, 0, 0))]
    fn scenarios(#[case] now: DateTime, #[case] target: TimeOfDay, #[case] expected: DateTime) {
        let alarm = next_occurrence(&utc(now), target).unwrap();
        assert_eq!(alarm.datetime(), expected);
    }

    // Deliberate boundary choice: an alarm for the current minute rings tomorrow, never
    // immediately at setup time.
    #[rstest]
    #[case::start_of_minute(0)]
    #[case::middle_of_minute(30)]
    #[case::end_of_minute(59)]
    fn equal_time_rolls_to_tomorrow(#[case] second: i8) {
        let now = utc(date(2024, 3, 10).at(14, 0, second, 0));

        let alarm = next_occurrence(&now, time(14, 0)).unwrap();

        assert_eq!(alarm.datetime(), date(2024, 3, 11).at(14, 0, 0, 0));
    }

    #[test]
    fn seconds_of_now_do_not_leak_into_result() {
        let now = utc(date(2024, 3, 10).at(8, 0, 42, 123_456_789));

        let alarm = next_occurrence(&now, time(9, 30)).unwrap();

        assert_eq!(alarm.datetime(), date(2024, 3, 10).at(9, 30, 0, 0));
    }

    #[test]
    fn result_keeps_time_zone_of_now() {
        let tz = TimeZone::get("Europe/Berlin").unwrap();
        let now = date(2024, 7, 1).at(22, 0, 0, 0).to_zoned(tz).unwrap();

        let alarm = next_occurrence(&now, time(6, 30)).unwrap();

        assert_eq!(alarm.time_zone().iana_name(), Some("Europe/Berlin"));
        assert_eq!(alarm.datetime(), date(2024, 7, 2).at(6, 30, 0, 0));
        assert_eq!(alarm.offset(), jiff::tz::offset(2));
    }

    #[test]
    fn spring_forward_gap_moves_later() {
        // 02:30 does not exist in New York on 2024-03-10.
        let tz = TimeZone::get("America/New_York").unwrap();
        let now = date(2024, 3, 10).at(1, 0, 0, 0).to_zoned(tz).unwrap();

        let alarm = next_occurrence(&now, time(2, 30)).unwrap();

        assert!(alarm > now);
        assert_eq!(alarm.datetime(), date(2024, 3, 10).at(3, 30, 0, 0));
    }

    #[test]
    fn end_of_supported_range_is_an_error() {
        // The last instant jiff can represent is late on 9999-12-30 UTC.
        let now = utc(date(9999, 12, 30).at(12, 0, 0, 0));

        let error = next_occurrence(&now, time(6, 0)).unwrap_err();

        assert!(matches!(error, Error::Calendar(_)), "{error:?}");
    }

    #[test]
    fn every_minute_of_the_day_resolves_strictly_later_with_target_clock() {
        let now = utc(date(2024, 2, 29).at(11, 17, 5, 0));

        for hour in 0..24 {
            for minute in 0..60 {
                let target = time(hour, minute);
                let alarm = next_occurrence(&now, target).unwrap();

                assert!(alarm > now, "{target} resolved to {alarm}, not after {now}");
                assert_eq!((alarm.hour(), alarm.minute(), alarm.second()), (hour, minute, 0));

                let expected_date = if (hour, minute) > (11, 17) { date(2024, 2, 29) } else { date(2024, 3, 1) };
                assert_eq!(alarm.date(), expected_date, "{target}");
            }
        }
    }
}

use chrono::{Duration, NaiveDate};
use gantt_tool::calendar::{
    MAX_BUSINESS_DAYS, WorkCalendar, add_business_days, days_remaining_in_month, format_date,
    parse_date, weekday_to_dates,
};
use gantt_tool::{Scale, ScheduleError};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn closed(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
    dates.iter().copied().collect()
}

#[test]
fn parses_unpadded_and_padded_dates() {
    assert_eq!(parse_date("1970/1/1"), Some(d(1970, 1, 1)));
    assert_eq!(parse_date("1970/01/01"), Some(d(1970, 1, 1)));
    assert_eq!(parse_date(" 2020/4/10 "), Some(d(2020, 4, 10)));
    assert_eq!(parse_date("1970-01-01"), None);
    assert_eq!(parse_date("TK1's end"), None);
    assert_eq!(format_date(d(2020, 4, 1)), "2020/04/01");
}

#[test]
fn weekday_names_enumerate_matching_dates() {
    let (start, end) = (d(2020, 4, 1), d(2020, 4, 15));
    let cases = [
        ("Monday", vec![d(2020, 4, 6), d(2020, 4, 13)]),
        ("Tuesday", vec![d(2020, 4, 7), d(2020, 4, 14)]),
        ("Wednesday", vec![d(2020, 4, 1), d(2020, 4, 8), d(2020, 4, 15)]),
        ("Friday", vec![d(2020, 4, 3), d(2020, 4, 10)]),
        ("Saturday", vec![d(2020, 4, 4), d(2020, 4, 11)]),
        ("sun", vec![d(2020, 4, 5), d(2020, 4, 12)]),
        ("m", vec![]),
        ("s", vec![]),
        ("XXX", vec![]),
        ("", vec![]),
    ];
    for (name, expected) in cases {
        assert_eq!(weekday_to_dates(name, start, end), expected, "weekday {name:?}");
    }
}

#[test]
fn business_day_stepping_matches_reference_cases() {
    let cases = [
        (d(2020, 4, 1), 10.0, vec![], d(2020, 4, 10)),
        (d(2020, 4, 1), 10.0, vec![d(2020, 4, 5)], d(2020, 4, 11)),
        (d(2020, 4, 1), 10.0, vec![d(2020, 4, 4), d(2020, 4, 5)], d(2020, 4, 12)),
        (d(2020, 4, 1), 10.0, vec![d(2020, 4, 10)], d(2020, 4, 11)),
        (d(2020, 4, 1), 10.0, vec![d(2020, 4, 11)], d(2020, 4, 10)),
        (d(2020, 4, 6), -2.0, vec![d(2020, 4, 4), d(2020, 4, 5)], d(2020, 4, 3)),
        (d(2020, 4, 2), 1.0, vec![d(2020, 4, 1), d(2020, 4, 3)], d(2020, 4, 2)),
        (d(2020, 4, 2), -1.0, vec![d(2020, 4, 1), d(2020, 4, 3)], d(2020, 4, 2)),
        (d(2020, 4, 2), 2.0, vec![d(2020, 4, 2), d(2020, 4, 3)], d(2020, 4, 5)),
        (d(2020, 4, 3), -2.0, vec![d(2020, 4, 2), d(2020, 4, 3)], d(2020, 3, 31)),
    ];
    for (start, days, holidays, expected) in cases {
        assert_eq!(
            add_business_days(start, days, &closed(&holidays)).unwrap(),
            expected,
            "{start} {days:+} over {holidays:?}"
        );
    }
}

#[test]
fn fractional_counts_round_away_from_zero() {
    let none = BTreeSet::new();
    assert_eq!(add_business_days(d(2020, 4, 1), 0.125, &none).unwrap(), d(2020, 4, 1));
    assert_eq!(add_business_days(d(2020, 4, 1), 1.5, &none).unwrap(), d(2020, 4, 2));
    assert_eq!(add_business_days(d(2020, 4, 10), -1.5, &none).unwrap(), d(2020, 4, 9));
}

#[test]
fn oversized_counts_are_rejected_before_stepping() {
    let none = BTreeSet::new();
    let start = d(2020, 4, 1);
    let limit = MAX_BUSINESS_DAYS as f64;

    assert_eq!(
        add_business_days(start, limit, &none).unwrap(),
        start + Duration::days(MAX_BUSINESS_DAYS - 1)
    );
    for days in [limit + 1.0, -(limit + 1.0), 1e8, 1e300, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(
                add_business_days(start, days, &none),
                Err(ScheduleError::UnsupportedPeriod(_))
            ),
            "{days} should be rejected"
        );
    }
}

#[test]
fn stepping_past_the_last_representable_date_fails() {
    let none = BTreeSet::new();
    assert!(matches!(
        add_business_days(NaiveDate::MAX - Duration::days(2), 10.0, &none),
        Err(ScheduleError::UnsupportedPeriod(_))
    ));
    assert!(matches!(
        add_business_days(NaiveDate::MIN + Duration::days(2), -10.0, &none),
        Err(ScheduleError::UnsupportedPeriod(_))
    ));
}

#[test]
fn days_remaining_in_month_counts_the_date_itself() {
    assert_eq!(days_remaining_in_month(d(2020, 4, 1)), 30);
    assert_eq!(days_remaining_in_month(d(2020, 4, 30)), 1);
    assert_eq!(days_remaining_in_month(d(2020, 2, 28)), 2);
    assert_eq!(days_remaining_in_month(d(2020, 12, 31)), 1);
}

#[test]
fn calendar_closes_weekdays_inside_its_window() {
    let mut cal = WorkCalendar::new(d(2020, 4, 1), d(2020, 5, 15), d(2020, 4, 20), Scale::Daily);
    cal.close_weekday("Saturday");
    cal.close_weekday("Sunday");
    cal.add_closed_date(d(2020, 5, 1));

    assert_eq!(cal.closed_dates().len(), 13);
    assert!(cal.is_closed(d(2020, 4, 4)));
    assert!(cal.is_available(d(2020, 4, 6)));
    assert_eq!(cal.day_count(), 45);
    assert_eq!(cal.offset_days(d(2020, 4, 20)), 19);
    assert_eq!(cal.days().count(), 45);
}

#[test]
fn business_days_are_counted_half_open() {
    let mut cal = WorkCalendar::new(d(2020, 4, 1), d(2020, 4, 30), d(2020, 4, 20), Scale::Daily);
    cal.add_closed_dates([d(2020, 4, 18), d(2020, 4, 19)]);

    assert_eq!(cal.count_business_days_until(d(2020, 4, 17), d(2020, 4, 20)), 1);
    assert_eq!(cal.count_business_days_until(d(2020, 4, 16), d(2020, 4, 20)), 2);
    assert_eq!(cal.count_business_days_until(d(2020, 4, 20), d(2020, 4, 17)), 0);
}

#[test]
fn scale_parses_case_insensitively() {
    assert_eq!("Weekly".parse::<Scale>(), Ok(Scale::Weekly));
    assert_eq!("daily".parse::<Scale>(), Ok(Scale::Daily));
    assert!("monthly".parse::<Scale>().is_err());
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| d(1990, 1, 1) + Duration::days(offset))
}

proptest! {
    #[test]
    fn small_counts_are_identity(
        start in arb_date(),
        days in prop::sample::select(vec![-1.0, 0.0, 1.0]),
        holidays in prop::collection::btree_set(arb_date(), 0..40),
    ) {
        prop_assert_eq!(add_business_days(start, days, &holidays).unwrap(), start);
    }

    #[test]
    fn without_holidays_steps_are_calendar_days(start in arb_date(), n in 2i64..400) {
        let none = BTreeSet::new();
        prop_assert_eq!(
            add_business_days(start, n as f64, &none).unwrap(),
            start + Duration::days(n - 1)
        );
        prop_assert_eq!(
            add_business_days(start, -(n as f64), &none).unwrap(),
            start - Duration::days(n - 1)
        );
    }

    #[test]
    fn result_is_never_a_closed_date(
        start in arb_date(),
        n in 2i64..60,
        holidays in prop::collection::btree_set(arb_date(), 0..200),
    ) {
        let end = add_business_days(start, n as f64, &holidays).unwrap();
        prop_assert!(end >= start);
        prop_assert!(!holidays.contains(&end));
    }
}

use attendance_engine::{
    models::{
        attendance::AttendanceRecord,
        break_record::{Break, BreakType},
    },
    services::time_accounting::{
        classify, day_totals, live_timer, net_worked_seconds, summarize_month,
        WorkClassification, MAX_NORMAL_SECONDS, MIN_NORMAL_SECONDS,
    },
    types::UserId,
    EngineError,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).unwrap()
}

fn completed(user: UserId, d: u32, out_h: u32, out_m: u32) -> AttendanceRecord {
    let mut record = AttendanceRecord::new(user, day(d));
    record.clock_in(at(d, 9, 0)).unwrap();
    record.clock_out(at(d, out_h, out_m)).unwrap();
    record
}

#[test]
fn net_seconds_matches_formula_and_one_class_holds() {
    let check_in = at(3, 9, 0);
    for minutes in (0..=12 * 60).step_by(7) {
        for break_minutes in [0i64, 15, 30, 45] {
            let check_out = check_in + Duration::minutes(minutes);
            let mut b = Break::new(BreakType::Standard, None, check_in);
            b.end_break(check_in + Duration::minutes(break_minutes));
            let net = net_worked_seconds(check_in, check_out, &[b]);
            assert_eq!(net, (minutes * 60 - break_minutes * 60).max(0));

            let class = classify(net);
            let flags = [
                matches!(class, WorkClassification::Low { .. }),
                matches!(class, WorkClassification::Normal),
                matches!(class, WorkClassification::Extra { .. }),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        }
    }
}

#[test]
fn thresholds_are_eight_fifteen_and_eight_thirty() {
    assert_eq!(MIN_NORMAL_SECONDS, 8 * 3600 + 15 * 60);
    assert_eq!(MAX_NORMAL_SECONDS, 8 * 3600 + 30 * 60);
    assert_eq!(classify(0).low_seconds(), MIN_NORMAL_SECONDS);
    assert_eq!(classify(30_601).extra_seconds(), 1);
    assert_eq!(classify(29_699).low_seconds(), 1);
}

#[test]
fn full_day_with_breaks_is_classified() {
    let mut record = AttendanceRecord::new(UserId::new(), day(3));
    record.clock_in(at(3, 9, 0)).unwrap();
    record
        .start_break(BreakType::Standard, None, at(3, 13, 0))
        .unwrap();
    record.end_break(at(3, 13, 30)).unwrap();
    record
        .start_break(BreakType::Extra, Some("bank".into()), at(3, 16, 0))
        .unwrap();
    record.end_break(at(3, 16, 10)).unwrap();
    record.clock_out(at(3, 18, 0)).unwrap();

    let totals = day_totals(&record).unwrap();
    assert_eq!(totals.break_seconds, 40 * 60);
    assert_eq!(totals.net_worked_seconds, 9 * 3600 - 40 * 60);
    assert_eq!(totals.classification, WorkClassification::Normal);
}

#[test]
fn live_timer_is_idempotent_for_same_now() {
    let mut record = AttendanceRecord::new(UserId::new(), day(3));
    record.clock_in(at(3, 9, 0)).unwrap();
    let now = at(3, 11, 30);
    assert_eq!(live_timer(&record, now), live_timer(&record, now));
    assert_eq!(live_timer(&record, now).worked_seconds, 2 * 3600 + 1800);
}

#[test]
fn live_timer_after_checkout_is_frozen() {
    let record = completed(UserId::new(), 3, 17, 30);
    let later = live_timer(&record, at(3, 23, 0));
    assert!(later.is_complete);
    assert_eq!(later.worked_seconds, 8 * 3600 + 1800);
}

#[test]
fn checkout_before_checkin_clamps_on_correction() {
    let mut record = AttendanceRecord::new(UserId::new(), day(3));
    record
        .correct(attendance_engine::models::attendance::AttendanceCorrection {
            check_in: Some(at(3, 18, 0)),
            check_out: Some(at(3, 9, 0)),
            breaks: Vec::new(),
            note: "imported from paper sheet".into(),
        })
        .unwrap();
    assert_eq!(record.total_worked_seconds, Some(0));
    assert_eq!(
        day_totals(&record).unwrap().classification,
        WorkClassification::Low {
            shortage_seconds: MIN_NORMAL_SECONDS
        }
    );
}

#[test]
fn open_break_blocks_a_second_one_until_ended() {
    let mut record = AttendanceRecord::new(UserId::new(), day(3));
    record.clock_in(at(3, 9, 0)).unwrap();
    record
        .start_break(BreakType::Standard, None, at(3, 12, 0))
        .unwrap();
    assert!(matches!(
        record.start_break(BreakType::Extra, Some("x".into()), at(3, 12, 5)),
        Err(EngineError::InvalidState(_))
    ));
    record.end_break(at(3, 12, 30)).unwrap();
    record
        .start_break(BreakType::Extra, Some("x".into()), at(3, 15, 0))
        .unwrap();
    assert_eq!(
        record.start_break(BreakType::Standard, None, at(3, 16, 0)),
        Err(EngineError::InvalidState(
            "A break is already in progress".into()
        ))
    );
}

#[test]
fn summarize_month_counts_completed_days_only() {
    let user = UserId::new();
    let mut open = AttendanceRecord::new(user, day(6));
    open.clock_in(at(6, 9, 0)).unwrap();
    let records = vec![
        completed(user, 3, 17, 30), // 8h30 normal
        completed(user, 4, 19, 0),  // 10h extra
        completed(user, 5, 16, 0),  // 7h low
        open,
    ];

    let summary = summarize_month(&records, 2024, 6);
    assert_eq!(summary.total_work_days, 3);
    assert_eq!(summary.total_work_hours, 25.5);
    assert_eq!(summary.average_daily_hours, 8.5);
    assert_eq!(
        (summary.low_days, summary.normal_days, summary.extra_days),
        (1, 1, 1)
    );
}

#[test]
fn stored_record_with_unreadable_break_start_still_loads() {
    let record: AttendanceRecord = serde_json::from_str(
        r#"{
            "id": "2c8f4e1a-7b3d-4f6e-9a1c-5d2e8b7f4a30",
            "user_id": "6a1d3f9e-4c2b-4e7a-8f5d-1b9c3e7a2d64",
            "date": "2024-06-03",
            "check_in": "2024-06-03T09:00:00",
            "check_out": "2024-06-03T18:00:00",
            "breaks": [
                {"start": "garbage", "end": "2024-06-03T13:30:00", "type": "standard"},
                {"start": "2024-06-03T16:00:00", "end": "2024-06-03T16:30:00", "type": "extra", "reason": "bank"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(record.breaks.len(), 1);
    let totals = day_totals(&record).unwrap();
    assert_eq!(totals.break_seconds, 1800);
    assert_eq!(totals.net_worked_seconds, 8 * 3600 + 1800);
}

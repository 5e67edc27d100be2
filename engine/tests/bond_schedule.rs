use attendance_engine::{
    models::user::{Bond, BondType, Employee},
    services::bond::{bond_schedule, employee_bond_schedule, BondState},
};
use chrono::NaiveDate;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bonds() -> Vec<Bond> {
    vec![
        Bond {
            bond_type: BondType::Internship,
            period_months: 6,
            start_date: None,
            salary: 10_000.0,
        },
        Bond {
            bond_type: BondType::Job,
            period_months: 12,
            start_date: None,
            salary: 30_000.0,
        },
    ]
}

#[test]
fn internship_then_job_seen_mid_september() {
    let schedule = bond_schedule(ymd(2024, 1, 1), &bonds(), ymd(2024, 9, 15)).unwrap();

    let internship = &schedule.bonds[0];
    assert_eq!(internship.end_date, ymd(2024, 7, 1));
    assert_eq!(internship.state, BondState::Expired);
    assert_eq!(internship.display, "Expired 76 days ago");

    let job = schedule.current().unwrap();
    assert_eq!(job.index, 1);
    assert_eq!(job.start_date, ymd(2024, 7, 2));
    assert_eq!(job.end_date, ymd(2025, 7, 2));
    assert_eq!(job.remaining.total_days, 290);
    assert_eq!((job.remaining.months, job.remaining.days), (9, 20));
    assert_eq!(job.display, "9 months, 20 days remaining");

    assert_eq!(schedule.current_salary, 30_000.0);
    assert_eq!(schedule.total_remaining.total_days, 290);
    assert_eq!(schedule.first_completion_date, Some(ymd(2024, 7, 1)));
}

#[test]
fn before_joining_every_bond_is_upcoming() {
    let schedule = bond_schedule(ymd(2024, 1, 1), &bonds(), ymd(2023, 12, 1)).unwrap();

    assert!(schedule.bonds.iter().all(|b| b.state == BondState::Upcoming));
    assert_eq!(schedule.bonds[0].display, "Starts on 01-01-2024");
    assert_eq!(schedule.current_bond, None);
    assert_eq!(schedule.current_salary, 0.0);
}

#[test]
fn after_the_last_bond_nothing_remains() {
    let schedule = bond_schedule(ymd(2024, 1, 1), &bonds(), ymd(2026, 1, 1)).unwrap();

    assert!(schedule.bonds.iter().all(|b| b.is_expired));
    assert_eq!(schedule.total_remaining.total_days, 0);
    assert_eq!(schedule.total_remaining.display, "0 days");
}

#[test]
fn changing_joining_date_rechains_every_bond() {
    let mut employee = Employee::new("Asha", ymd(2024, 1, 1));
    employee.bonds = bonds();
    employee.rechain_bonds().unwrap();
    assert_eq!(employee.bonds[1].start_date, Some(ymd(2024, 7, 2)));

    employee.set_joining_date(ymd(2024, 3, 1)).unwrap();
    assert_eq!(employee.bonds[0].start_date, Some(ymd(2024, 3, 1)));
    assert_eq!(employee.bonds[1].start_date, Some(ymd(2024, 9, 2)));

    let schedule = employee_bond_schedule(&employee, ymd(2024, 9, 15)).unwrap();
    assert_eq!(schedule.current_bond, Some(1));
}

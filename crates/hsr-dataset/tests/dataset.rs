//! Integration tests for dataset lookups and filters.

use chrono::{Datelike, NaiveDate};
use hsr_dataset::{Dataset, DatasetError, ErrorKind};
use hsr_model::{Appointments, Column, ColumnMap, DateRange, FilterSpec, Referrals, Surveys};
use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;

fn frame(columns: &[(&str, Vec<Option<&str>>)]) -> DataFrame {
    DataFrame::new(
        columns
            .iter()
            .map(|(name, values)| Series::new((*name).into(), values.clone()).into_column())
            .collect(),
    )
    .unwrap()
}

fn mapping(pairs: &[(Column, &str)]) -> ColumnMap {
    pairs
        .iter()
        .map(|(column, header)| (*column, (*header).to_string()))
        .collect()
}

/// One appointment on the 15th of every month of 2023.
fn monthly_appointments() -> Dataset<Appointments> {
    let dates: Vec<String> = (1..=12).map(|month| format!("2023-{month:02}-15")).collect();
    let data = frame(&[(
        "Start",
        dates.iter().map(|value| Some(value.as_str())).collect(),
    )]);
    Dataset::new("appointments", data, mapping(&[(Column::Date, "Start")])).unwrap()
}

fn months_of(dataset: &Dataset<Appointments>) -> Vec<u32> {
    dataset
        .date_values()
        .unwrap()
        .into_iter()
        .map(|value| value.unwrap().month())
        .collect()
}

fn appointments() -> Dataset<Appointments> {
    let data = frame(&[
        (
            "Student Email",
            vec![Some("a@x.edu"), Some("b@x.edu"), None, Some("c@x.edu")],
        ),
        (
            "Type",
            vec![Some("Resume Review"), None, Some("Mock Interview"), Some("Drop-in")],
        ),
        (
            "Status",
            vec![Some("completed"), Some(" Cancelled "), Some("APPROVED"), Some("no_show")],
        ),
        (
            "Date",
            vec![
                Some("2022-05-01"),
                Some("2023-01-10"),
                Some("2023-12-31 23:59:59"),
                Some("2024-01-01"),
            ],
        ),
    ]);
    let columns = mapping(&[
        (Column::StudentEmail, "Student Email"),
        (Column::AppointmentType, "Type"),
        (Column::Status, "Status"),
        (Column::Date, "Date"),
    ]);
    Dataset::new("appointments", data, columns).unwrap()
}

#[test]
fn new_rejects_undeclared_columns() {
    let data = frame(&[("Status", vec![Some("completed")])]);
    let err = Dataset::<Surveys>::new("surveys", data, mapping(&[(Column::Status, "Status")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    insta::assert_snapshot!(err.to_string(), @"column 'status' is not declared for survey_results datasets");
}

#[test]
fn lookups_distinguish_unconfigured_from_missing() {
    let data = frame(&[("Email", vec![Some("a@x.edu")])]);
    let columns = mapping(&[
        (Column::StudentEmail, "Email"),
        (Column::StudentMajor, "Major"),
    ]);
    let dataset = Dataset::<Appointments>::new("appointments", data, columns).unwrap();

    assert_eq!(
        dataset.get_column_name(Column::StudentEmail).unwrap(),
        Some("Email")
    );
    assert_eq!(dataset.get_column_name(Column::StudentCollege).unwrap(), None);
    assert!(dataset.get_column(Column::StudentCollege).unwrap().is_none());
    assert!(matches!(
        dataset.get_column_name(Column::UniqueReferral),
        Err(DatasetError::UndeclaredColumn { .. })
    ));

    let err = dataset.get_column(Column::StudentMajor).unwrap_err();
    assert!(matches!(err, DatasetError::MissingHeader { .. }));
    assert_eq!(err.kind(), ErrorKind::Data);

    let err = dataset.require_column_name(Column::Status).unwrap_err();
    assert!(matches!(err, DatasetError::UnconfiguredColumn { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn month_range_keeps_inclusive_span() {
    let mut dataset = monthly_appointments();
    dataset.filter_by_months(&["Jan-Mar"]).unwrap();
    assert_eq!(months_of(&dataset), vec![1, 2, 3]);
}

#[test]
fn month_range_wraps_through_december() {
    let mut dataset = monthly_appointments();
    dataset.filter_by_months(&["November-February"]).unwrap();
    assert_eq!(months_of(&dataset), vec![1, 2, 11, 12]);
}

#[test]
fn month_tokens_are_unioned() {
    let mut dataset = monthly_appointments();
    dataset.filter_by_months(&["june", "Aug", "July"]).unwrap();
    assert_eq!(months_of(&dataset), vec![6, 7, 8]);
}

#[test]
fn invalid_month_is_a_validation_error() {
    let mut dataset = monthly_appointments();
    let err = dataset.filter_by_months(&["Smarch"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(dataset.height(), 12);
}

#[test]
fn year_range_is_inclusive() {
    let mut dataset = appointments();
    dataset.filter_by_years(&["2022-2023"]).unwrap();
    let years: Vec<i32> = dataset
        .date_values()
        .unwrap()
        .into_iter()
        .map(|value| value.unwrap().year())
        .collect();
    assert_eq!(years, vec![2022, 2023, 2023]);
}

#[test]
fn reversed_year_range_is_rejected() {
    let mut dataset = appointments();
    let err = dataset.filter_by_years(&["2023-2022"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    insta::assert_snapshot!(err.to_string(), @"invalid year range '2023-2022': start year must not be after end year");
}

#[test]
fn date_ranges_are_half_open_and_unioned() {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let mut dataset = appointments();
    dataset
        .filter_by_date_ranges(&[
            DateRange::new(date(2022, 1, 1), date(2022, 5, 1)).unwrap(),
            DateRange::new(date(2023, 12, 1), date(2024, 1, 1)).unwrap(),
        ])
        .unwrap();
    assert_eq!(dataset.height(), 1);

    let mut untouched = appointments();
    untouched.filter_by_date_ranges(&[]).unwrap();
    assert_eq!(untouched.height(), 4);
}

#[test]
fn missing_values_can_be_selected_explicitly() {
    let mut dataset = appointments();
    dataset
        .filter_by_column(Column::AppointmentType, &FilterSpec::including(["^None$"]).unwrap())
        .unwrap();
    assert_eq!(dataset.height(), 1);
    assert_eq!(
        dataset.require_string_values(Column::StudentEmail).unwrap(),
        vec![Some("b@x.edu".to_string())]
    );
}

#[test]
fn exclude_wins_over_include() {
    let mut dataset = appointments();
    let spec = FilterSpec::new(["Review", "Interview"], ["Mock"]).unwrap();
    dataset.filter_appointment_type(&spec).unwrap();
    assert_eq!(
        dataset.require_string_values(Column::AppointmentType).unwrap(),
        vec![Some("Resume Review".to_string())]
    );
}

#[test]
fn same_include_and_exclude_removes_everything() {
    let mut dataset = appointments();
    let spec = FilterSpec::new(["@"], ["@"]).unwrap();
    dataset.filter_student_emails(&spec).unwrap();
    assert_eq!(dataset.height(), 0);
}

#[test]
fn unconfigured_column_filter_is_a_no_op() {
    let mut dataset = appointments();
    dataset
        .filter_majors(&FilterSpec::including(["Biology"]).unwrap())
        .unwrap();
    assert_eq!(dataset.height(), 4);
}

#[test]
fn status_filter_keeps_valid_scheduled() {
    let mut dataset = appointments();
    dataset.filter_appointment_status().unwrap();
    assert_eq!(
        dataset.require_string_values(Column::Status).unwrap(),
        vec![Some("completed".to_string()), Some("APPROVED".to_string())]
    );
}

#[test]
fn department_filter_applies_to_referrals() {
    let data = frame(&[(
        "Dept",
        vec![Some("Athletics"), Some("Advising"), None],
    )]);
    let mut dataset = Dataset::<Referrals>::new(
        "referrals",
        data,
        mapping(&[(Column::ReferringDepartment, "Dept")]),
    )
    .unwrap();
    dataset
        .filter_departments(&FilterSpec::new(Vec::<String>::new(), ["Athletics"]).unwrap())
        .unwrap();
    assert_eq!(dataset.height(), 2);
}

#[test]
fn sort_by_date_orders_oldest_first_with_nulls_last() {
    let data = frame(&[
        ("Id", vec![Some("1"), Some("2"), Some("3"), Some("4")]),
        (
            "Date",
            vec![Some("03/01/2024"), None, Some("2024-01-01"), Some("2024-01-01")],
        ),
    ]);
    let mut dataset = Dataset::<Appointments>::new(
        "appointments",
        data,
        mapping(&[(Column::Id, "Id"), (Column::Date, "Date")]),
    )
    .unwrap();
    dataset.sort_by_date().unwrap();
    assert_eq!(
        dataset.require_string_values(Column::Id).unwrap(),
        vec![
            Some("3".to_string()),
            Some("4".to_string()),
            Some("1".to_string()),
            Some("2".to_string()),
        ]
    );
}

#[test]
fn unparseable_date_is_a_data_error() {
    let data = frame(&[("Date", vec![Some("someday")])]);
    let mut dataset =
        Dataset::<Surveys>::new("surveys", data, mapping(&[(Column::Date, "Date")])).unwrap();
    let err = dataset.coerce_dates().unwrap_err();
    assert!(matches!(err, DatasetError::DateParse { .. }));
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn sort_without_date_column_fails() {
    let data = frame(&[("Email", vec![Some("a@x.edu")])]);
    let mut dataset = Dataset::<Surveys>::new(
        "surveys",
        data,
        mapping(&[(Column::StudentEmail, "Email")]),
    )
    .unwrap();
    assert!(matches!(
        dataset.sort_by_date(),
        Err(DatasetError::UnconfiguredColumn { .. })
    ));
}

#[test]
fn deep_copy_is_independent() {
    let original = monthly_appointments();
    let mut copy = original.deep_copy();
    copy.filter_by_months(&["March"]).unwrap();
    assert_eq!(copy.height(), 1);
    assert_eq!(original.height(), 12);
    assert_eq!(months_of(&original), (1..=12).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn match_all_filter_keeps_every_row(values in proptest::collection::vec(proptest::option::of("[a-z@.]{0,10}"), 0..20)) {
        let data = frame(&[(
            "Type",
            values.iter().map(|value| value.as_deref()).collect(),
        )]);
        let mut dataset = Dataset::<Appointments>::new(
            "appointments",
            data,
            mapping(&[(Column::AppointmentType, "Type")]),
        )
        .unwrap();
        dataset.filter_appointment_type(&FilterSpec::match_all()).unwrap();
        prop_assert_eq!(dataset.height(), values.len());
    }
}

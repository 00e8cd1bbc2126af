// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

use super::*;

#[test]
fn plain_field_is_not_quoted() {
    assert_eq!(quote_field("Job Completed"), "Job Completed");
}

#[test]
fn field_with_comma_is_quoted() {
    assert_eq!(quote_field("a, b"), "\"a, b\"");
}

#[test]
fn field_with_quote_is_quoted_and_doubled() {
    assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
}

#[test]
fn split_plain_row() {
    let fields = split_csv_line("2026-01-01 00:00:00,job1,SUCCESS,Job Completed");
    assert_eq!(
        fields,
        vec!["2026-01-01 00:00:00", "job1", "SUCCESS", "Job Completed"]
    );
}

#[test]
fn split_row_with_quoted_comma_field() {
    let fields = split_csv_line("2026-01-01 00:00:00,job1,FAILURE,\"a, b\"");
    assert_eq!(fields[3], "a, b");
}

#[test]
fn split_round_trips_quote_field() {
    let original = "reason with, a comma and \"quotes\"";
    let quoted = quote_field(original);
    let row = format!("ts,job,STATE,{quoted}");
    let fields = split_csv_line(&row);
    assert_eq!(fields[3], original);
}

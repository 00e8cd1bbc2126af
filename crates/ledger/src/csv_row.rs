// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Minimal CSV quoting/splitting for the ledger's four-column rows.
//!
//! The wire format (`spec.md` §6) performs no quoting by default, which
//! Open Question (a) flags as a corruption hazard for reasons containing
//! commas or newlines. Resolved here in the direction of "quote": a field
//! containing a comma, double quote, or newline is wrapped in double
//! quotes with internal quotes doubled, the standard RFC 4180 rule.

pub fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV row into its fields, honoring RFC 4180 quoting.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    fields.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
#[path = "csv_row_tests.rs"]
mod tests;

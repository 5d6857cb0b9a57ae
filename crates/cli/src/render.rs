//! Text and JSON rendering of session state.

use homeval_client::order::parse_timestamp;
use homeval_core::FieldErrors;
use homeval_interchange::PredictionRecord;
use homeval_session::{FormState, HistoryStatus, SessionView, SubmitOutcome};
use serde_json::{json, Value};
use time::OffsetDateTime;

/// Format with comma thousands separators and at most `max_fraction`
/// fractional digits, trailing zeros dropped.
///
/// `1234567.5` → `1,234,567.5`
pub(crate) fn group_number(value: f64, max_fraction: usize) -> String {
    let fixed = format!("{:.*}", max_fraction, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if grouped.chars().all(|c| c == '0' || c == ',') && frac_part.is_empty() {
        ""
    } else {
        sign
    };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

pub(crate) fn price(value: f64) -> String {
    format!("${}", group_number(value, 2))
}

/// Describe how long before `now` the timestamp `raw` was.
///
/// Unparseable timestamps are returned unchanged.
pub(crate) fn relative_time(raw: &str, now: OffsetDateTime) -> String {
    let Some(at) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let elapsed = (now - at).whole_seconds();
    if elapsed < 60 {
        return "just now".to_string();
    }
    let (count, unit) = if elapsed < 3_600 {
        (elapsed / 60, "minute")
    } else if elapsed < 86_400 {
        (elapsed / 3_600, "hour")
    } else {
        (elapsed / 86_400, "day")
    };
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

pub(crate) fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn form(form: &FormState) -> String {
    let mut lines = vec![
        format!("Square footage: {}", group_number(form.input.square_footage, 3)),
        format!("Bedrooms: {}", form.input.bedrooms),
    ];
    if form.is_submitting {
        lines.push("Predicting...".to_string());
    }
    if let Some(p) = form.last_price {
        lines.push(format!("Estimated price: {}", price(p)));
    }
    if let Some(err) = &form.last_error {
        lines.push(format!("Last attempt failed: {}", err));
    }
    if !form.errors.is_empty() {
        lines.push(field_errors(&form.errors));
    }
    lines.join("\n")
}

fn history_row(record: &PredictionRecord, now: OffsetDateTime) -> [String; 4] {
    [
        format!("{} sq ft", group_number(record.square_footage, 3)),
        record.bedrooms.to_string(),
        price(record.predicted_price),
        relative_time(&record.created_at, now),
    ]
}

/// The prediction history as an aligned table, or the matching empty,
/// loading or error message.
pub(crate) fn history(view: &SessionView, now: OffsetDateTime) -> String {
    let mut out = Vec::new();
    match &view.history_status {
        HistoryStatus::Loading if view.history.is_empty() => {
            return "Loading prediction history...".to_string();
        }
        HistoryStatus::Failed(message) => out.push(message.clone()),
        _ => {}
    }
    if view.history.is_empty() {
        if out.is_empty() {
            out.push("No predictions yet. Make a prediction to see it here.".to_string());
        }
        return out.join("\n");
    }

    let header = [
        "Square Footage".to_string(),
        "Bedrooms".to_string(),
        "Predicted Price".to_string(),
        "Time".to_string(),
    ];
    let rows: Vec<[String; 4]> = view.history.iter().map(|r| history_row(r, now)).collect();
    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    for row in std::iter::once(&header).chain(rows.iter()) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push(cells.join("  ").trim_end().to_string());
    }
    out.join("\n")
}

/// The outcome of one submission in text form.
pub(crate) fn outcome(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Succeeded(record) => {
            format!("Estimated price: {}", price(record.predicted_price))
        }
        SubmitOutcome::Rejected(errors) => field_errors(errors),
        SubmitOutcome::Failed(err) => err.to_string(),
        SubmitOutcome::Ignored => "A prediction is already in progress.".to_string(),
        SubmitOutcome::Discarded => "Session closed before the prediction finished.".to_string(),
    }
}

pub(crate) fn outcome_json(outcome: &SubmitOutcome, view: &SessionView) -> Value {
    let result = match outcome {
        SubmitOutcome::Succeeded(record) => json!({"status": "succeeded", "record": record}),
        SubmitOutcome::Rejected(errors) => json!({"status": "rejected", "errors": errors}),
        SubmitOutcome::Failed(err) => json!({
            "status": "failed",
            "error": err,
            "message": err.to_string(),
        }),
        SubmitOutcome::Ignored => json!({"status": "ignored"}),
        SubmitOutcome::Discarded => json!({"status": "discarded"}),
    };
    json!({"outcome": result, "session": view})
}

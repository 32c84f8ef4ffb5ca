use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use santa_core::{AssignmentView, Participant};

pub fn participants_csv(participants: &[Participant]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Name",
        "Employee ID",
        "Email",
        "Preferences",
        "Address",
        "Registered On",
    ])?;
    for p in participants {
        writer.write_record([
            p.name.as_str(),
            p.emp_id.as_str(),
            p.email.as_str(),
            p.preferences.as_str(),
            p.address.as_deref().unwrap_or(""),
            format_millis(p.registered_at).as_str(),
        ])?;
    }
    finish(writer)
}

pub fn assignments_csv(views: &[AssignmentView]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Gifter Name",
        "Gifter Email",
        "Giftee Name",
        "Giftee Email",
        "Giftee Preferences",
        "Reveal Completed",
    ])?;
    for view in views {
        writer.write_record([
            view.gifter.name.as_str(),
            view.gifter.email.as_str(),
            view.giftee.name.as_str(),
            view.giftee.email.as_str(),
            view.giftee.preferences.as_str(),
            if view.revealed { "Yes" } else { "No" },
        ])?;
    }
    finish(writer)
}

pub(crate) fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

fn format_millis(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

//! The input form

use axum::{Router, extract::State, response::Html, routing::get};

use crate::routes::AppError;
use crate::state::AppState;

const PAGE_TITLE: &str = "Talk Calendar Generator";

const FORM_TEMPLATE: &str = include_str!("../../assets/form.html");

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(form_page))
}

/// GET / - Form pre-filled with now and now + 1 hour
async fn form_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (start, end) = state.calendar.form_defaults()?;
    let zone = state.calendar.zone();

    Ok(Html(render_form(&start, &end, zone.tzid(), zone.tzname())))
}

fn render_form(start: &str, end: &str, tzid: &str, tzname: &str) -> String {
    FORM_TEMPLATE
        .replace("{{page_title}}", PAGE_TITLE)
        .replace("{{start}}", start)
        .replace("{{end}}", end)
        .replace("{{tzid}}", tzid)
        .replace("{{tzname}}", tzname)
}

//! Customer information form and its result page

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use mcpbench_common::{
    CustomerSubmission, DeliveryWindow, Error, Size, ValidationError,
};
use tracing::warn;

use super::{escape_html, layout};
use crate::error::{capitalize, status_for};
use crate::request::FormPayload;
use crate::server::SharedState;
use crate::submissions::{lookup, submit, FETCH_FAILED, SAVE_FAILED};

/// Values echoed back into the form after a rejected submit.
#[derive(Debug, Default)]
struct FormValues {
    custname: String,
    custtel: String,
    custemail: String,
    size: String,
    delivery: String,
    comments: String,
}

impl FormValues {
    fn from_payload(payload: &FormPayload) -> Self {
        let text = |name: &str| payload.text(name).unwrap_or_default().to_string();
        Self {
            custname: text("custname"),
            custtel: text("custtel"),
            custemail: text("custemail"),
            size: text("size"),
            delivery: text("delivery"),
            comments: text("comments"),
        }
    }
}

fn field_error(errors: Option<&ValidationError>, field: &str) -> String {
    errors
        .and_then(|e| e.violation(field))
        .map(|v| {
            format!(
                r#"<p class="error" data-testid="{}-error">{}</p>"#,
                field,
                escape_html(&v.message)
            )
        })
        .unwrap_or_default()
}

fn text_input(
    field: &str,
    label: &str,
    input_type: &str,
    placeholder: &str,
    value: &str,
    errors: Option<&ValidationError>,
) -> String {
    format!(
        r#"<div class="field">
<label for="{field}">{label} *</label>
<input id="{field}" name="{field}" type="{input_type}" placeholder="{placeholder}" value="{value}" required data-testid="{field}-input">
{error}</div>
"#,
        field = field,
        label = label,
        input_type = input_type,
        placeholder = placeholder,
        value = escape_html(value),
        error = field_error(errors, field),
    )
}

fn render_form(values: &FormValues, errors: Option<&ValidationError>) -> String {
    let mut size_options = String::from(r#"<option value="">Select size...</option>"#);
    for size in Size::ALL {
        let selected = if values.size == size.as_str() { " selected" } else { "" };
        size_options.push_str(&format!(
            r#"<option value="{0}"{1}>{2}</option>"#,
            size,
            selected,
            capitalize(size.as_str())
        ));
    }

    let mut delivery_radios = String::new();
    for window in DeliveryWindow::ALL {
        let checked = if values.delivery == window.as_str() { " checked" } else { "" };
        delivery_radios.push_str(&format!(
            r#"<label><input type="radio" id="delivery-{0}" name="delivery" value="{0}"{1} data-testid="delivery-{0}-radio"> {2}</label>
"#,
            window,
            checked,
            capitalize(window.as_str())
        ));
    }

    let banner = if errors.is_some() {
        r#"<div class="panel failure" data-testid="form-errors">Please correct the highlighted fields.</div>"#
    } else {
        ""
    };

    let content = format!(
        r#"<h1>Customer Information Form</h1>
{banner}
<form method="post" action="/forms" data-testid="customer-form">
{custname}{custtel}{custemail}<div class="field">
<label for="size">Size *</label>
<select id="size" name="size" required data-testid="size-select">{size_options}</select>
{size_error}</div>
<div class="field">
<label>Delivery Time *</label>
{delivery_radios}{delivery_error}</div>
<div class="field">
<label for="comments">Additional Comments</label>
<textarea id="comments" name="comments" placeholder="Enter any additional comments..." data-testid="comments-textarea">{comments}</textarea>
{comments_error}</div>
<button type="submit" data-testid="submit-button">Submit Form</button>
</form>"#,
        banner = banner,
        custname = text_input("custname", "Customer Name", "text", "Enter your full name", &values.custname, errors),
        custtel = text_input("custtel", "Phone Number", "tel", "123-456-7890", &values.custtel, errors),
        custemail = text_input("custemail", "Email Address", "email", "john.doe@example.com", &values.custemail, errors),
        size_options = size_options,
        size_error = field_error(errors, "size"),
        delivery_radios = delivery_radios,
        delivery_error = field_error(errors, "delivery"),
        comments = escape_html(&values.comments),
        comments_error = field_error(errors, "comments"),
    );
    layout("Customer Information Form", "/forms", &content)
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let content = format!(
        r#"<h1>Form Submission Result</h1>
<div class="panel failure" data-testid="submission-error">{}</div>
<p><a href="/forms">Back to the form</a></p>"#,
        escape_html(message)
    );
    (status, Html(layout("Form Submission Result", "/forms", &content))).into_response()
}

pub async fn form_page_handler() -> Html<String> {
    Html(render_form(&FormValues::default(), None))
}

pub async fn form_submit_handler(State(state): State<SharedState>, payload: FormPayload) -> Response {
    match submit(state.store.as_ref(), &payload.fields) {
        Ok(created) => Redirect::to(&format!("/forms/result/{}", created.id)).into_response(),
        Err(Error::Validation(errors)) => {
            let values = FormValues::from_payload(&payload);
            (StatusCode::BAD_REQUEST, Html(render_form(&values, Some(&errors)))).into_response()
        }
        Err(e) => {
            warn!("{}: {}", SAVE_FAILED, e);
            error_page(status_for(&e), SAVE_FAILED)
        }
    }
}

fn render_result(submission: &CustomerSubmission) -> String {
    let rows = [
        ("Submission ID", submission.id.to_string()),
        ("Customer Name", submission.custname.clone()),
        ("Phone Number", submission.custtel.clone()),
        ("Email Address", submission.custemail.clone()),
        ("Size", submission.size.to_string()),
        ("Delivery Time", submission.delivery.to_string()),
        (
            "Comments",
            submission.comments.clone().unwrap_or_else(|| "None".to_string()),
        ),
        (
            "Submitted At",
            submission.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    ];

    let mut data = String::new();
    for (label, value) in rows {
        data.push_str(&format!(
            "<div><strong>{}:</strong> {}</div>\n",
            label,
            escape_html(&value)
        ));
    }

    let content = format!(
        r#"<h1>Form Submission Successful</h1>
<div class="panel success" data-testid="submission-success">Your form has been submitted.</div>
<h2>Submitted Data</h2>
<div class="panel" data-testid="submission-data" data-submission-id="{id}">
{data}</div>
<p><a href="/forms" data-testid="new-submission-link">Submit another response</a></p>"#,
        id = submission.id,
        data = data,
    );
    layout("Form Submission Result", "/forms", &content)
}

pub async fn form_result_handler(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Response {
    match lookup(state.store.as_ref(), &raw_id) {
        Ok(submission) => Html(render_result(&submission)).into_response(),
        Err(Error::NotFound { .. }) => error_page(StatusCode::NOT_FOUND, "Submission not found"),
        Err(Error::InvalidArgument(message)) => error_page(StatusCode::BAD_REQUEST, &message),
        Err(e) => {
            warn!("{}: {}", FETCH_FAILED, e);
            error_page(status_for(&e), FETCH_FAILED)
        }
    }
}

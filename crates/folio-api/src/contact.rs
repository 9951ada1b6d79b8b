use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::info;

use folio_db::queries::QueuedMail;
use folio_types::api::ContactRequest;

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

const ACKNOWLEDGEMENT_SUBJECT: &str = "Message Received";
const ACKNOWLEDGEMENT: &str = "<p>Thank you for contacting me, your message has been received. \
                               I will get back to you soon.</p>";

/// POST /contact/send: queue the message for the site owner and an
/// acknowledgement for the sender.
pub async fn send(
    State(state): State<AppState>,
    Payload(req): Payload<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_not_blank("name", &req.name);
    errors.check_email("email", &req.email);
    errors.check_not_blank("msg_subject", &req.msg_subject);
    errors.check_not_blank("msg_body", &req.msg_body);
    errors.into_result()?;

    let owner = state.mail.address.clone();
    let notification = render_notification(&req);

    run_db(&state, move |db| {
        db.enqueue_mail(&[
            QueuedMail {
                recipient: &owner,
                subject: &req.msg_subject,
                html: &notification,
            },
            QueuedMail {
                recipient: &req.email,
                subject: ACKNOWLEDGEMENT_SUBJECT,
                html: ACKNOWLEDGEMENT,
            },
        ])
    })
    .await?;

    info!("Contact message queued");
    Ok(Json(json!({ "success": "Message has been sent!" })))
}

fn render_notification(req: &ContactRequest) -> String {
    let contact_type = if req.contact_type == "default" {
        "skipped"
    } else {
        req.contact_type.as_str()
    };

    format!(
        r#"New Contact Message Received:
<hr />
- Name: {}
<br />
- Type of Contact: {}
<br />
- Email: {}
<br />
- Body:
<p style="padding-left: 10px;">{}</p>"#,
        escape_html(&req.name),
        escape_html(contact_type),
        escape_html(&req.email),
        escape_html(&req.msg_body),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(contact_type: &str, body: &str) -> ContactRequest {
        ContactRequest {
            name: "Ada".into(),
            contact_type: contact_type.into(),
            email: "ada@test.com".into(),
            msg_subject: "Hello".into(),
            msg_body: body.into(),
        }
    }

    #[test]
    fn default_contact_type_is_skipped() {
        let html = render_notification(&request("default", "hi"));
        assert!(html.contains("- Type of Contact: skipped"));

        let html = render_notification(&request("Job Offer", "hi"));
        assert!(html.contains("- Type of Contact: Job Offer"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render_notification(&request("default", "<script>alert('x')</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
    }
}

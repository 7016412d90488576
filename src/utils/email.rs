use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

/// Notification sink. All sends are fire-and-forget at the application level:
/// callers log failures but never fail the request that triggered them. The
/// one exception is OTP delivery, where the caller records the failure on the
/// OTP row instead of rolling it back.
pub struct EmailService {
    mailer: SmtpTransport,
    from_address: String,
}

impl EmailService {
    pub fn new() -> Result<Self> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address = env::var("SMTP_FROM_ADDRESS")
            .unwrap_or_else(|_| "noreply@propdesk.local".to_string());

        let mailer = if smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .build()
        } else {
            let creds = Credentials::new(smtp_username, smtp_password);
            SmtpTransport::relay(&smtp_host)?
                .port(smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }

    fn send(&self, to_email: &str, subject: &str, body: String) -> Result<()> {
        if env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true" {
            return Ok(());
        }
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;
        self.mailer.send(&email)?;
        Ok(())
    }

    pub fn send_otp_email(&self, to_email: &str, code: &str, purpose: &str) -> Result<()> {
        let body = format!(
            r#"
Your one-time verification code is:

    {}

The code expires in a few minutes and can be used once.
Purpose: {}

If you did not request this code, you can ignore this message.

---
PropDesk Property Management
"#,
            code, purpose
        );
        self.send(to_email, "Your verification code - PropDesk", body)
    }

    pub fn send_lockout_notice(&self, to_email: &str, minutes: i64) -> Result<()> {
        let body = format!(
            r#"
Your account has been temporarily locked after repeated failed sign-in
attempts. It will unlock automatically in {} minutes.

If this was not you, contact an administrator.

---
PropDesk Property Management
"#,
            minutes
        );
        self.send(to_email, "Account locked - PropDesk", body)
    }

    pub fn send_password_changed_notification(&self, to_email: &str) -> Result<()> {
        let body = format!(
            r#"
Your account password was changed at {}.

If you did not make this change, contact an administrator immediately.

---
PropDesk Property Management
"#,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.send(to_email, "Password changed - PropDesk", body)
    }

    pub fn send_reactivation_submitted_notice(
        &self,
        admin_email: &str,
        request_id: &str,
        requester_email: &str,
    ) -> Result<()> {
        let body = format!(
            r#"
A new account reactivation request is waiting for review.

Request id: {}
Requested by: {}

---
PropDesk Property Management
"#,
            request_id, requester_email
        );
        self.send(
            admin_email,
            "Reactivation request pending review - PropDesk",
            body,
        )
    }

    pub fn send_reactivation_outcome(
        &self,
        to_email: &str,
        approved: bool,
        notes: Option<&str>,
    ) -> Result<()> {
        let outcome = if approved {
            "approved. You can sign in again."
        } else {
            "rejected."
        };
        let notes_line = notes
            .filter(|n| !n.is_empty())
            .map(|n| format!("\nReviewer notes: {}\n", n))
            .unwrap_or_default();
        let body = format!(
            r#"
Your account reactivation request has been {}
{}
---
PropDesk Property Management
"#,
            outcome, notes_line
        );
        self.send(to_email, "Reactivation request reviewed - PropDesk", body)
    }
}

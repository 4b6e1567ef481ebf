use std::fs;

use async_trait::async_trait;
use color_eyre::Result;
use eyre::WrapErr;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::Value;
use tracing::info;

/// Delivers an OTP to an email address. The production implementation goes
/// over SMTP; tests substitute a recording fake.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str) -> Result<()>;
}

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    platform_name: String,
}

impl EmailService {
    pub fn new(
        smtp_host: &str,
        smtp_user: &str,
        smtp_pass: &str,
        platform_name: &str,
    ) -> Result<Self> {
        let creds = Credentials::new(smtp_user.to_string(), smtp_pass.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .wrap_err("Building SMTP transport")?
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from_address: smtp_user.to_string(),
            platform_name: platform_name.to_string(),
        })
    }

    fn load_template(&self, path: &str) -> Result<String> {
        fs::read_to_string(path).wrap_err_with(|| format!("Loading email template {path}"))
    }

    fn render(template: &str, data: &Value) -> String {
        let mut body = template.to_string();
        if let Some(fields) = data.as_object() {
            for (key, value) in fields {
                let placeholder = format!("{{{{{key}}}}}");
                body = body.replace(&placeholder, value.as_str().unwrap_or_default());
            }
        }
        body
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        template_path: &str,
        data: &Value,
    ) -> Result<()> {
        let template = self.load_template(template_path)?;
        let body = Self::render(&template, data);

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.mailer
            .send(email)
            .await
            .wrap_err("Sending email over SMTP")?;

        info!(to, subject, "email sent");
        Ok(())
    }
}

#[async_trait]
impl OtpNotifier for EmailService {
    async fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        let data = serde_json::json!({
            "otp": code,
            "platformName": self.platform_name,
        });

        self.send_email(to, "Verify Your Email", "./templates/otp_email.html", &data)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_every_placeholder() {
        let template = "<p>Hi, your {{platformName}} code is {{otp}}.</p>";
        let data = serde_json::json!({ "otp": "123456", "platformName": "Example" });

        let body = EmailService::render(template, &data);
        assert_eq!(body, "<p>Hi, your Example code is 123456.</p>");
    }

    #[test]
    fn render_leaves_unknown_placeholders_alone() {
        let template = "{{otp}} {{unrelated}}";
        let data = serde_json::json!({ "otp": "654321" });

        let body = EmailService::render(template, &data);
        assert_eq!(body, "654321 {{unrelated}}");
    }
}

use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mathed_config::EmailConfig;
use mathed_core::AppError;
use tracing::{info, instrument};

const SIGNATURE: &str = "Echipa MathEd Romania";

/// An outgoing message before transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Builds and delivers the transactional emails (Romanian copy).
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn consent_link(&self, uid: &str, token: &str) -> String {
        format!(
            "{}/consent/approve?uid={}&token={}",
            self.config.frontend_url, uid, token
        )
    }

    pub fn reset_link(&self, uid: &str, token: &str) -> String {
        format!(
            "{}/reset-password?uid={}&token={}",
            self.config.frontend_url, uid, token
        )
    }

    pub fn consent_request(&self, parent_email: &str, student_name: &str, link: &str) -> OutgoingEmail {
        let text_body = format!(
            "Bună ziua,\n\n\
             {student_name} dorește să-și creeze un cont pe MathEd Romania.\n\n\
             Pentru a aproba crearea contului, accesați link-ul următor:\n\
             {link}\n\n\
             Dacă nu ați solicitat acest lucru, ignorați acest email.\n\n\
             {SIGNATURE}"
        );

        let html_body = html_layout(
            "Consimțământ parental necesar",
            &format!(
                "<p>Bună ziua,</p>\
                 <p><strong>{}</strong> dorește să-și creeze un cont pe MathEd Romania.</p>\
                 <p>Pentru a aproba crearea contului, apăsați butonul de mai jos:</p>",
                escape_html(student_name)
            ),
            "Aprob crearea contului",
            link,
            "Dacă nu ați solicitat acest lucru, ignorați acest email.",
        );

        OutgoingEmail {
            to: parent_email.to_string(),
            subject: "MathEd Romania — Consimțământ parental necesar".to_string(),
            text_body,
            html_body,
        }
    }

    pub fn password_reset(&self, to_email: &str, link: &str) -> OutgoingEmail {
        let text_body = format!(
            "Bună,\n\n\
             Am primit o cerere de resetare a parolei pentru contul tău.\n\n\
             Accesează link-ul următor pentru a seta o parolă nouă:\n\
             {link}\n\n\
             Dacă nu ai solicitat acest lucru, ignoră acest email.\n\n\
             {SIGNATURE}"
        );

        let html_body = html_layout(
            "Resetare parolă",
            "<p>Bună,</p>\
             <p>Am primit o cerere de resetare a parolei pentru contul tău.</p>\
             <p>Apasă butonul de mai jos pentru a seta o parolă nouă:</p>",
            "Setează o parolă nouă",
            link,
            "Dacă nu ai solicitat acest lucru, ignoră acest email.",
        );

        OutgoingEmail {
            to: to_email.to_string(),
            subject: "MathEd Romania — Resetare parolă".to_string(),
            text_body,
            html_body,
        }
    }

    /// Delivers over SMTP, or logs the message when sending is disabled.
    #[instrument(skip(self, email), fields(email.to = %email.to, email.subject = %email.subject))]
    pub async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(body = %email.text_body, "Email delivery disabled, message logged instead");
            return Ok(());
        }

        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(email.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html_body),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        info!("Email sent");
        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_layout(title: &str, intro_html: &str, button: &str, link: &str, footer: &str) -> String {
    let link = escape_html(link);
    format!(
        r#"<!DOCTYPE html>
<html lang="ro">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" align="center" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #2563EB; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 26px;">MathEd Romania</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px 28px; color: #444444; font-size: 16px; line-height: 1.5;">
                <h2 style="margin: 0 0 16px 0; color: #222222;">{title}</h2>
                {intro_html}
                <p style="text-align: center; margin: 28px 0;">
                    <a href="{link}" style="display: inline-block; padding: 12px 32px; background-color: #2563EB; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">{button}</a>
                </p>
                <p style="font-size: 14px;">Sau copiați link-ul în browser:<br><span style="color: #2563EB; word-break: break-all;">{link}</span></p>
                <p style="font-size: 14px;">{footer}</p>
            </td>
        </tr>
        <tr>
            <td style="background-color: #f8f9fa; padding: 16px; text-align: center; color: #999999; font-size: 12px;">
                {SIGNATURE}
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}

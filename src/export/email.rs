//! Email delivery of run reports.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::DeliveryError;
use crate::pipeline::SmtpConfig;

use super::report::{Attachment, RunSummary};

/// Destination for the end-of-run report.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Delivers the report for one run.
    async fn send_results(
        &self,
        summary: &RunSummary,
        attachments: &[Attachment],
    ) -> Result<(), DeliveryError>;
}

/// Sends the report over SMTP with STARTTLS.
///
/// Without credentials the send is skipped with a warning.
#[derive(Debug, Clone)]
pub struct EmailSink {
    config: SmtpConfig,
}

impl EmailSink {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    /// Builds the multipart message: HTML body followed by JSON files.
    pub fn build_message(
        &self,
        summary: &RunSummary,
        attachments: &[Attachment],
    ) -> Result<Message, DeliveryError> {
        let from = self.config.username.as_deref().unwrap_or_default();
        let to = self.config.recipient.as_deref().unwrap_or(from);
        let from = parse_mailbox(from)?;
        let to = parse_mailbox(to)?;

        let json = ContentType::parse("application/json")
            .map_err(|e| DeliveryError::MessageBuild(e.to_string()))?;
        let mut body = MultiPart::mixed().singlepart(SinglePart::html(summary.render_html()?));
        for attachment in attachments {
            body = body.singlepart(
                MailAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), json.clone()),
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(summary.subject())
            .multipart(body)
            .map_err(|e| DeliveryError::MessageBuild(e.to_string()))
    }
}

#[async_trait]
impl ResultSink for EmailSink {
    async fn send_results(
        &self,
        summary: &RunSummary,
        attachments: &[Attachment],
    ) -> Result<(), DeliveryError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            tracing::warn!(task_id = %summary.task_id, "Email credentials not configured, skipping send");
            return Ok(());
        };

        let message = self.build_message(summary, attachments)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
            .map_err(|e| DeliveryError::Transport(format!("Failed to create transport: {}", e)))?
            .port(self.config.port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(format!("Failed to send email: {}", e)))?;

        tracing::info!(
            task_id = %summary.task_id,
            attachments = attachments.len(),
            "Results email sent"
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::report::build_attachments;
    use crate::pipeline::{RunRecord, TaskId};

    fn smtp(username: Option<&str>, recipient: Option<&str>) -> SmtpConfig {
        SmtpConfig {
            username: username.map(str::to_string),
            password: Some("app-password".to_string()),
            recipient: recipient.map(str::to_string),
            ..SmtpConfig::default()
        }
    }

    fn summary_with_tweets() -> (RunSummary, Vec<Attachment>) {
        let mut record = RunRecord::new(TaskId::new("task_20250101_120000"));
        record.set_social_content(
            vec![crate::agents::Tweet {
                id: "tweet_web_1".to_string(),
                content: "hello".to_string(),
                kind: crate::agents::TweetType::WebSearch,
                category: "trends".to_string(),
                source_blog_id: None,
                created_at: chrono::Utc::now(),
            }],
            Vec::new(),
        );
        record.complete().unwrap();
        let attachments = build_attachments(&record).unwrap();
        (RunSummary::new(&record, &attachments), attachments)
    }

    #[test]
    fn test_build_message_has_body_and_attachment() {
        let sink = EmailSink::new(smtp(Some("bot@example.com"), Some("team@example.com")));
        let (summary, attachments) = summary_with_tweets();

        let message = sink.build_message(&summary, &attachments).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Agentic Loop Content Generation - Task task_20250101_120000"));
        assert!(raw.contains("To: team@example.com"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("tweets_task_20250101_120000.json"));
        assert!(raw.contains("application/json"));
    }

    #[test]
    fn test_recipient_defaults_to_sender() {
        let sink = EmailSink::new(smtp(Some("bot@example.com"), None));
        let (summary, attachments) = summary_with_tweets();
        let message = sink.build_message(&summary, &attachments).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("To: bot@example.com"));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let sink = EmailSink::new(smtp(Some("not an address"), Some("team@example.com")));
        let (summary, attachments) = summary_with_tweets();
        let err = sink
            .build_message(&summary, &attachments)
            .expect_err("bad sender");
        assert!(matches!(err, DeliveryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_send() {
        let sink = EmailSink::new(SmtpConfig::default());
        assert!(!sink.is_configured());
        let (summary, attachments) = summary_with_tweets();
        sink.send_results(&summary, &attachments)
            .await
            .expect("skipped send is not an error");
    }
}

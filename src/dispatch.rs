//! Notification side of the contact flow.
//!
//! Once a caller has been admitted, two mails go out: a lead alert to the
//! site owner and an acknowledgement to the visitor. Both are sent at the same
//! time and awaited together; if either fails, every failure is reported.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Lead;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch timed out after {0:?}")]
    Timeout(Duration),

    #[error("{} of 2 mails failed: {}", .0.len(), .0.join("; "))]
    Delivery(Vec<String>),
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, lead: &Lead) -> Result<(), DispatchError>;
}

// Resend style payload, accepted by most HTTP mail APIs
#[derive(Serialize, Debug, Clone)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: String,
    pub admin_to: String,
    pub signature: String,
}

pub struct MailApiDispatcher {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    settings: MailSettings,
}

impl MailApiDispatcher {
    pub fn new(
        client: reqwest::Client,
        api_url: &str,
        api_key: &str,
        settings: MailSettings,
    ) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            settings,
        }
    }

    async fn send(&self, label: &str, mail: &OutgoingMail) -> Result<(), String> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await
            .map_err(|e| format!("{label}: request failed: {e}"))?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let body = res.text().await.unwrap_or_default();
        Err(format!("{label}: mail API answered {status}: {}", body.trim()))
    }
}

#[async_trait]
impl Dispatcher for MailApiDispatcher {
    async fn dispatch(&self, lead: &Lead) -> Result<(), DispatchError> {
        let alert = admin_alert(&self.settings, lead);
        let ack = acknowledgement(&self.settings, lead);

        let (alert_res, ack_res) = tokio::join!(
            self.send("lead alert", &alert),
            self.send("acknowledgement", &ack)
        );

        let failures: Vec<String> = [alert_res, ack_res]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        if failures.is_empty() {
            info!(received_at = %lead.received_at, "Lead mails delivered");
            Ok(())
        } else {
            warn!(failed = failures.len(), "Lead mail delivery failed");
            Err(DispatchError::Delivery(failures))
        }
    }
}

/// Stand-in used when no mail API key is configured.
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn dispatch(&self, lead: &Lead) -> Result<(), DispatchError> {
        info!(
            email = %lead.email,
            received_at = %lead.received_at,
            "New lead (mail delivery disabled)"
        );
        Ok(())
    }
}

pub fn admin_alert(settings: &MailSettings, lead: &Lead) -> OutgoingMail {
    let timestamp = lead.received_at.to_rfc3339();
    let email = escape_html(&lead.email);

    OutgoingMail {
        from: settings.from.clone(),
        to: vec![settings.admin_to.clone()],
        subject: format!("New Portfolio Lead: {}", lead.email),
        text: format!(
            "SYSTEM ALERT // NEW CONNECTION\n\
             ------------------------------\n\
             Source: {}\n\
             Timestamp: {timestamp}\n\n\
             Action Required: Establish Uplink.\n",
            lead.email
        ),
        html: format!(
            "<div style=\"font-family: monospace; background: #000; color: #0f0; \
             padding: 20px;\">\
             <h2>SYSTEM ALERT // NEW CONNECTION</h2>\
             <p style=\"color: #fff;\"><strong>Source:</strong> \
             <a href=\"mailto:{email}\" style=\"color: #fff;\">{email}</a></p>\
             <p style=\"color: #666;\">Timestamp: {timestamp}</p>\
             <p style=\"color: #f00;\">&gt;&gt; ACTION REQUIRED: Establish Uplink.</p>\
             </div>"
        ),
    }
}

pub fn acknowledgement(settings: &MailSettings, lead: &Lead) -> OutgoingMail {
    let signature = escape_html(&settings.signature);

    OutgoingMail {
        from: settings.from.clone(),
        to: vec![lead.email.clone()],
        subject: "Action Required // Complete Your Connection Request".to_string(),
        text: format!(
            "UPLINK ESTABLISHED.\n\n\
             We have received your signal. To route your request, reply to this email with:\n\n\
             1. [ NAME ]            : (Your Name)\n\
             2. [ CONTACT_NO ]      : (Mobile Number)\n\
             3. [ IDENTIFICATION ]  : (Developer or Client?)\n\
             4. [ MESSAGE_PAYLOAD ] : (Your Message)\n\n\
             {}\n",
            settings.signature
        ),
        html: format!(
            "<div style=\"background-color: #050505; color: #e5e5e5; \
             font-family: 'Courier New', monospace; padding: 40px;\">\
             <div style=\"border-bottom: 2px solid #b91c1c; padding-bottom: 10px;\">\
             <span style=\"color: #b91c1c; font-weight: bold; font-size: 24px;\">\
             &gt;&gt; UPLINK ESTABLISHED</span></div>\
             <p>We have received your signal. \
             Please <strong>REPLY</strong> to this transmission with:</p>\
             <ol><li>NAME</li><li>CONTACT_NO</li>\
             <li>IDENTIFICATION (Developer / Client)</li><li>MESSAGE_PAYLOAD</li></ol>\
             <p style=\"font-size: 12px; color: #525252;\">// END_OF_TRANSMISSION</p>\
             <div style=\"font-size: 12px; color: #737373;\">\
             <strong style=\"color: #fff;\">{signature}</strong></div>\
             </div>"
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

use std::time::Duration;

use reqwest::Client;

use super::error::MailerError;
use super::types::{OutboundMail, SendReceipt};

const GATEWAY_URL: &str = "https://mail.dokwerk.nl/v1/send";

/// Send capability consumed by the reminder applier. The applier only ever
/// flips a reminder's sent flag after this resolves successfully, which is
/// what keeps delivery at-most-once across ticks.
pub trait Messenger {
    fn send(
        &self,
        mail: &OutboundMail,
    ) -> impl std::future::Future<Output = Result<SendReceipt, MailerError>> + Send;
}

/// HTTP client for the outbound mail gateway.
pub struct HttpMailer {
    api_key: String,
    client: Client,
    base_url: String,
}

impl HttpMailer {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GATEWAY_URL.to_string())
    }

    /// Create a mailer pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self::with_timeout(api_key, base_url, Duration::from_secs(30))
    }

    /// Create a mailer with a caller-chosen per-message timeout, so one
    /// hanging send cannot stall the rest of a reminder batch.
    pub fn with_timeout(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            client,
            base_url,
        }
    }
}

impl Messenger for HttpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<SendReceipt, MailerError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(mail)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(MailerError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(MailerError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<SendReceipt>().await?;
        Ok(body)
    }
}

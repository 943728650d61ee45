//! Fouttypen voor de mailgateway-client.
//!
//! Definieert [`MailerError`] met varianten voor rate limiting, fouten van
//! de gateway en netwerkfouten. Gebruikt `thiserror` om `Display` en
//! `Error` af te leiden uit de `#[error(...)]`-attributen.

use thiserror::Error;

/// Fouten die kunnen optreden bij het versturen via de mailgateway.
///
/// De varianten dekken de drie gangbaarste faalscenario's:
/// - [`RateLimited`](MailerError::RateLimited) — de gateway gaf HTTP 429
/// - [`ApiError`](MailerError::ApiError) — elke andere HTTP-fout (4xx/5xx)
/// - [`NetworkError`](MailerError::NetworkError) — falen in de netwerklaag
#[derive(Debug, Error)]
pub enum MailerError {
    /// De gateway gaf HTTP 429 (rate limit).
    /// `retry_after_ms` geeft aan hoeveel milliseconden te wachten.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Fout van de gateway (bv. 401 ongeldige sleutel, 500 interne fout).
    #[error("gateway error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Onderliggende netwerkfout (DNS, verbinding geweigerd, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

//! Configuratie van dokwerk, geladen uit `dokwerk.toml`.
//!
//! De struct [`EngineConfig`] bundelt alle instelbare parameters:
//! herinneringstermijnen, SLA-doelen en de mailgateway. Velden die in het
//! bestand ontbreken krijgen verstandige standaardwaarden. De
//! omgevingsvariabele `DOKWERK_MAIL_KEY` heeft voorrang op het bestand.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Termijnen (in dagen) voor herinneringen, opvolging en vervaldatums.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// Eerste betalingsherinnering: dagen na de vervaldatum.
    #[serde(default = "default_reminder1_days")]
    pub reminder1_offset_days: i64,

    /// Tweede betalingsherinnering: dagen na de vervaldatum.
    #[serde(default = "default_reminder2_days")]
    pub reminder2_offset_days: i64,

    /// Waarschuwingsvenster vóór het verlopen van een offerte.
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: i64,

    /// Eerste offerte-opvolging: dagen na versturen.
    #[serde(default = "default_followup1_days")]
    pub followup1_days: i64,

    /// Tweede offerte-opvolging: dagen na versturen.
    #[serde(default = "default_followup2_days")]
    pub followup2_days: i64,

    /// Betaaltermijn voor nieuwe facturen.
    #[serde(default = "default_payment_term_days")]
    pub payment_term_days: i64,
}

// Standaardtermijnen zoals gebruikelijk in de Nederlandse praktijk.
fn default_reminder1_days() -> i64 {
    7
}
fn default_reminder2_days() -> i64 {
    14
}
fn default_expiry_warning_days() -> i64 {
    3
}
fn default_followup1_days() -> i64 {
    7
}
fn default_followup2_days() -> i64 {
    14
}
fn default_payment_term_days() -> i64 {
    14
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            reminder1_offset_days: default_reminder1_days(),
            reminder2_offset_days: default_reminder2_days(),
            expiry_warning_days: default_expiry_warning_days(),
            followup1_days: default_followup1_days(),
            followup2_days: default_followup2_days(),
            payment_term_days: default_payment_term_days(),
        }
    }
}

/// SLA-doelen in uren per meetpunt.
#[derive(Debug, Clone, Deserialize)]
pub struct SlaTargets {
    /// Offerte versturen na aanmaak (reactietijd).
    #[serde(default = "default_quote_response_hours")]
    pub quote_response_hours: f64,

    /// Werkbon aanmaken na goedkeuring van de offerte.
    #[serde(default = "default_quote_to_work_order_hours")]
    pub quote_to_work_order_hours: f64,

    /// Werkbon afronden na aanmaak.
    #[serde(default = "default_work_order_completion_hours")]
    pub work_order_completion_hours: f64,

    /// Factuur betaald na versturen.
    #[serde(default = "default_invoice_payment_hours")]
    pub invoice_payment_hours: f64,
}

fn default_quote_response_hours() -> f64 {
    24.0
}
fn default_quote_to_work_order_hours() -> f64 {
    72.0
}
fn default_work_order_completion_hours() -> f64 {
    168.0
}
fn default_invoice_payment_hours() -> f64 {
    336.0
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            quote_response_hours: default_quote_response_hours(),
            quote_to_work_order_hours: default_quote_to_work_order_hours(),
            work_order_completion_hours: default_work_order_completion_hours(),
            invoice_payment_hours: default_invoice_payment_hours(),
        }
    }
}

/// Instellingen voor de uitgaande mailgateway.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Endpoint van de mailgateway.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// API-sleutel voor de gateway.
    #[serde(default)]
    pub api_key: String,
}

fn default_gateway_url() -> String {
    "https://mail.dokwerk.nl/v1/send".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_key: String::new(),
        }
    }
}

/// Configuratie van bovenste niveau, geladen uit `dokwerk.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reminder: ReminderConfig,

    #[serde(default)]
    pub sla: SlaTargets,

    #[serde(default)]
    pub mail: MailConfig,

    /// Standaard btw-percentage voor documenten zonder eigen regelgegevens.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
}

fn default_vat_rate() -> Decimal {
    Decimal::from(21)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reminder: ReminderConfig::default(),
            sla: SlaTargets::default(),
            mail: MailConfig::default(),
            default_vat_rate: default_vat_rate(),
        }
    }
}

impl EngineConfig {
    /// Laadt de configuratie uit `dokwerk.toml` in de huidige map.
    /// Gebruikt standaardwaarden als het bestand niet bestaat.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("dokwerk.toml"))
    }

    /// Laadt de configuratie uit een specifiek pad.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EngineConfig>(&contents)?
        } else {
            Self::default()
        };

        // De omgevingsvariabele heeft voorrang op het bestand voor de API-sleutel.
        if let Ok(key) = std::env::var("DOKWERK_MAIL_KEY")
            && !key.is_empty()
        {
            config.mail.api_key = key;
        }

        Ok(config)
    }
}

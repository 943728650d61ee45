//! Datatypen voor verzoeken en antwoorden van de mailgateway.
//!
//! Alle structs deriven `Serialize` en `Deserialize` voor JSON-conversie
//! volgens het formaat dat het `v1/send`-endpoint van de gateway verwacht.

use serde::{Deserialize, Serialize};

/// Een uitgaand bericht voor het `/v1/send`-endpoint van de mailgateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMail {
    /// E-mailadres van de ontvanger.
    pub to: String,
    /// Onderwerpregel.
    pub subject: String,
    /// Tekstinhoud van het bericht.
    pub body: String,
}

/// Ontvangstbevestiging van de gateway na een geslaagde verzending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Uniek kenmerk van het geaccepteerde bericht (door de gateway uitgegeven).
    pub id: String,
    /// Verzendstatus (bv. "queued" of "sent").
    pub status: String,
}

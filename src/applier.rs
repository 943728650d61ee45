//! Commits scheduler output: sends reminder mail, flips overdue invoices,
//! expires stale quotes.
//!
//! Payment reminders are the only messages sent here. A reminder's sent
//! flag is flipped strictly after a successful send, so a failed send is
//! retried on the next tick and a flipped flag suppresses the action
//! forever — at-most-once delivery, derived from document state alone.
//! Quote follow-ups and expiry warnings carry no sent flag; they are
//! returned as advisories for the task list instead of being mailed on
//! every tick.
//!
//! The JSON file store offers no per-document versioning, so exactly one
//! process may run the applier at a time: two concurrent appliers could
//! both observe an unset flag and double-send before either write lands.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ReminderConfig;
use crate::error::EngineError;
use crate::lifecycle;
use crate::mailer::{Messenger, OutboundMail};
use crate::model::{Actor, HistoryEntry, Invoice, InvoiceStatus, Quote, QuoteStatus};
use crate::scheduler::{DueActions, InvoiceAction, InvoiceActionKind, QuoteActionKind};

/// One action that could not be committed this tick. The underlying
/// document is left untouched, so the next tick retries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAction {
    pub document_id: String,
    pub description: String,
    pub reason: String,
}

/// Outcome of one applier run over a batch of due actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Reminder mails accepted by the gateway.
    pub sent: usize,
    /// Invoices flipped from `sent` to `overdue`.
    pub flipped_overdue: usize,
    /// Quotes transitioned to `expired`.
    pub expired: usize,
    /// Quote warnings/follow-ups surfaced for the task list, not mailed.
    pub advisories: usize,
    pub failures: Vec<FailedAction>,
}

/// Drives a batch of due actions against the document set.
pub struct ReminderApplier<'a, M: Messenger> {
    messenger: &'a M,
}

impl<'a, M: Messenger> ReminderApplier<'a, M> {
    pub fn new(messenger: &'a M) -> Self {
        Self { messenger }
    }

    /// Applies every action in `actions`, isolating failures: one refused
    /// send never aborts the rest of the batch.
    pub async fn apply(
        &self,
        actions: &DueActions,
        invoices: &mut [Invoice],
        quotes: &mut [Quote],
        config: &ReminderConfig,
        now: DateTime<Utc>,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();
        let system = Actor::system();

        for action in &actions.invoice_actions {
            match action.kind {
                InvoiceActionKind::Reminder1 | InvoiceActionKind::Reminder2 => {
                    self.send_reminder(action, invoices, now, &system, &mut report)
                        .await;
                }
                InvoiceActionKind::MarkOverdue => {
                    match flip_overdue(invoices, &action.invoice_id, config, &system, now) {
                        Ok(()) => report.flipped_overdue += 1,
                        Err(err) => report.failures.push(FailedAction {
                            document_id: action.invoice_id.clone(),
                            description: format!(
                                "Factuur {} op achterstallig zetten",
                                action.invoice_number
                            ),
                            reason: err.to_string(),
                        }),
                    }
                }
            }
        }

        for action in &actions.quote_actions {
            match action.kind {
                QuoteActionKind::Expired => {
                    match expire_quote(quotes, &action.quote_id, &system, now) {
                        Ok(true) => report.expired += 1,
                        Ok(false) => {}
                        Err(err) => report.failures.push(FailedAction {
                            document_id: action.quote_id.clone(),
                            description: format!("Offerte {} laten verlopen", action.quote_id),
                            reason: err.to_string(),
                        }),
                    }
                }
                QuoteActionKind::ExpiryWarning
                | QuoteActionKind::Followup1
                | QuoteActionKind::Followup2 => {
                    report.advisories += 1;
                }
            }
        }

        report
    }

    async fn send_reminder(
        &self,
        action: &InvoiceAction,
        invoices: &mut [Invoice],
        now: DateTime<Utc>,
        system: &Actor,
        report: &mut ApplyReport,
    ) {
        let n = match action.kind {
            InvoiceActionKind::Reminder2 => 2,
            _ => 1,
        };
        let description = format!(
            "Herinnering {n} voor factuur {}",
            action.invoice_number
        );

        let Some(recipient) = action.recipient_email.clone() else {
            report.failures.push(FailedAction {
                document_id: action.invoice_id.clone(),
                description,
                reason: format!("Geen e-mailadres bekend voor klant {}", action.customer_id),
            });
            return;
        };

        let (subject, body) = render_reminder(action, n);
        let mail = OutboundMail {
            to: recipient,
            subject,
            body,
        };

        match self.messenger.send(&mail).await {
            Ok(_) => {
                // The flag flip is strictly after the successful send.
                if let Some(invoice) = invoices.iter_mut().find(|i| i.id == action.invoice_id) {
                    invoice.reminders.mark_sent(n, now);
                    invoice.history.push(HistoryEntry::action(
                        now,
                        system,
                        "reminder_sent",
                        format!("Betalingsherinnering {n} verstuurd"),
                    ));
                }
                report.sent += 1;
            }
            Err(err) => report.failures.push(FailedAction {
                document_id: action.invoice_id.clone(),
                description,
                reason: err.to_string(),
            }),
        }
    }
}

/// Expires every sent quote whose validity has passed, in a single pass.
///
/// Idempotent: the guard checks for `sent`, so a quote expired by an
/// earlier pass is skipped untouched.
pub fn expire_quotes(quotes: &mut [Quote], now: DateTime<Utc>) -> usize {
    let system = Actor::system();
    let today = now.date_naive();
    let mut count = 0;
    for slot in quotes.iter_mut() {
        if slot.status == QuoteStatus::Sent && slot.days_until_expiry(today) < 0 {
            match lifecycle::quote::change_status(slot, QuoteStatus::Expired, &system, now) {
                Ok(expired) => {
                    *slot = expired;
                    count += 1;
                }
                Err(_) => unreachable!("sent → expired is a legal transition"),
            }
        }
    }
    count
}

fn flip_overdue(
    invoices: &mut [Invoice],
    invoice_id: &str,
    config: &ReminderConfig,
    system: &Actor,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    let slot = invoices
        .iter_mut()
        .find(|i| i.id == invoice_id)
        .ok_or_else(|| EngineError::NotFound {
            kind: "invoice",
            id: invoice_id.to_string(),
        })?;
    if slot.status != InvoiceStatus::Sent {
        // Already flipped by an earlier tick.
        return Ok(());
    }
    *slot = lifecycle::invoice::change_status(slot, InvoiceStatus::Overdue, config, system, now)?;
    Ok(())
}

fn expire_quote(
    quotes: &mut [Quote],
    quote_id: &str,
    system: &Actor,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    let slot = quotes
        .iter_mut()
        .find(|q| q.id == quote_id)
        .ok_or_else(|| EngineError::NotFound {
            kind: "quote",
            id: quote_id.to_string(),
        })?;
    if slot.status != QuoteStatus::Sent {
        return Ok(false);
    }
    *slot = lifecycle::quote::change_status(slot, QuoteStatus::Expired, system, now)?;
    Ok(true)
}

// Dutch message templates for the two payment reminders.
fn render_reminder(action: &InvoiceAction, n: u8) -> (String, String) {
    let name = action
        .customer_name
        .clone()
        .unwrap_or_else(|| "heer/mevrouw".to_string());
    let subject = if n == 2 {
        format!(
            "Tweede betalingsherinnering factuur {}",
            action.invoice_number
        )
    } else {
        format!("Betalingsherinnering factuur {}", action.invoice_number)
    };
    let urgency = if n == 2 {
        "Wij verzoeken u dringend het openstaande bedrag binnen 7 dagen te voldoen."
    } else {
        "Wellicht is de betaling aan uw aandacht ontsnapt; wij verzoeken u het bedrag alsnog over te maken."
    };
    let body = format!(
        "Geachte {name},\n\n\
         Volgens onze administratie staat factuur {} van {} nog open. \
         De vervaldatum was {} ({} dagen geleden). {urgency}\n\n\
         Heeft u inmiddels betaald, dan kunt u deze herinnering als niet verzonden beschouwen.\n\n\
         Met vriendelijke groet,\nDokwerk",
        action.invoice_number,
        eur(action.amount),
        action.due_date.format("%d-%m-%Y"),
        action.days_overdue,
    );
    (subject, body)
}

// Bedragen in euronotatie met komma als decimaalteken.
fn eur(amount: Decimal) -> String {
    format!("€ {:.2}", amount).replace('.', ",")
}

//! Terminaluitvoer van dokwerk — spinners en gekleurde rapportages.
//!
//! Gebruikt de crates `indicatif` voor voortgangsspinners en `console`
//! voor kleurstijlen. [`TickProgress`] volgt een schedulerronde visueel;
//! de overige functies renderen actielijsten en het SLA-dashboard.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use dokwerk::applier::ApplyReport;
use dokwerk::scheduler::{DueActions, InvoiceActionKind, QuoteActionKind};
use dokwerk::sla::{SlaReport, SlaStatus};
use dokwerk::store::Dataset;

/// Visuele voortgangsindicator voor een schedulerronde.
pub struct TickProgress {
    // Spinner van indicatif.
    pb: ProgressBar,
    // Groene stijl voor geslaagde acties.
    green: Style,
    // Rode stijl voor mislukte acties.
    red: Style,
    // Gele stijl voor adviezen.
    yellow: Style,
}

impl TickProgress {
    /// Start de spinner voor het verwerken van een actiebatch.
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("{total} acties verwerken..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Rondt de spinner af en toont het resultaat van de ronde.
    pub fn complete(&self, report: &ApplyReport) {
        self.pb.finish_and_clear();
        println!(
            "  {} {} herinneringen verstuurd, {} facturen achterstallig, {} offertes verlopen",
            self.green.apply_to("✓"),
            report.sent,
            report.flipped_overdue,
            report.expired
        );
        if report.advisories > 0 {
            println!(
                "  {} {} opvolgacties voor de takenlijst",
                self.yellow.apply_to("→"),
                report.advisories
            );
        }
        for failure in &report.failures {
            println!(
                "  {} {}: {}",
                self.red.apply_to("✗"),
                failure.description,
                failure.reason
            );
        }
    }
}

/// Toont de berekende actielijst, meest urgente eerst.
pub fn print_actions(actions: &DueActions) {
    if actions.is_empty() {
        println!("Geen acties nodig.");
        return;
    }

    let bold = Style::new().bold();
    if !actions.quote_actions.is_empty() {
        println!("{}", bold.apply_to("Offertes:"));
        for action in &actions.quote_actions {
            let label = match action.kind {
                QuoteActionKind::Expired => "verlopen",
                QuoteActionKind::ExpiryWarning => "verloopt binnenkort",
                QuoteActionKind::Followup2 => "tweede opvolging",
                QuoteActionKind::Followup1 => "eerste opvolging",
            };
            let name = action.customer_name.as_deref().unwrap_or("onbekende klant");
            println!(
                "  {label:<20} {} ({name}, geldig tot {})",
                action.quote_id,
                action.valid_until.format("%d-%m-%Y")
            );
        }
    }
    if !actions.invoice_actions.is_empty() {
        println!("{}", bold.apply_to("Facturen:"));
        for action in &actions.invoice_actions {
            let label = match action.kind {
                InvoiceActionKind::Reminder2 => "herinnering 2",
                InvoiceActionKind::Reminder1 => "herinnering 1",
                InvoiceActionKind::MarkOverdue => "markeer achterstallig",
            };
            let name = action.customer_name.as_deref().unwrap_or("onbekende klant");
            println!(
                "  {label:<20} {} ({name}, {} dagen over tijd)",
                action.invoice_number, action.days_overdue
            );
        }
    }
}

/// Rendert het SLA-dashboard met een kleur per statusklasse.
pub fn print_sla(report: &SlaReport) {
    let bold = Style::new().bold();
    println!("{}", bold.apply_to("─── SLA-dashboard ───"));
    for metric in &report.metrics {
        let style = match metric.status {
            SlaStatus::Excellent | SlaStatus::Good => Style::new().green(),
            SlaStatus::Warning => Style::new().yellow(),
            SlaStatus::Critical => Style::new().red().bold(),
        };
        println!(
            "  {:<24} {:>7.1} u / {:>6.1} u  [{}]  ({} metingen)",
            metric.name,
            metric.actual_hours,
            metric.target_hours,
            style.apply_to(metric.status),
            metric.sample_count
        );
    }
    println!(
        "  Naleving: {:.0}% van de doelen gehaald",
        report.overall_compliance * 100.0
    );
}

/// Toont documentaantallen per status.
pub fn print_status(dataset: &Dataset) {
    println!("Offertes:  {}", dataset.quotes.len());
    for quote in &dataset.quotes {
        println!("  {:<12} {}", quote.status.to_string(), quote.id);
    }
    println!("Facturen:  {}", dataset.invoices.len());
    for invoice in &dataset.invoices {
        println!("  {:<12} {}", invoice.status.to_string(), invoice.invoice_number);
    }
    println!("Werkbonnen: {}", dataset.work_orders.len());
    for order in &dataset.work_orders {
        println!("  {:<12} {}", order.status.to_string(), order.id);
    }
}

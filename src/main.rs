mod cli;
mod ui;

use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use rust_decimal_macros::dec;

use dokwerk::applier::ReminderApplier;
use dokwerk::assign::pick_assignee;
use dokwerk::clock::{Clock, SystemClock};
use dokwerk::config::EngineConfig;
use dokwerk::lifecycle;
use dokwerk::mailer::HttpMailer;
use dokwerk::model::{
    Actor, Customer, Employee, InvoiceStatus, LaborLine, LineItem, QuoteStatus, WorkOrderStatus,
};
use dokwerk::scheduler::compute_due_actions;
use dokwerk::sla::compute_sla_dashboard;
use dokwerk::store::{Dataset, JsonFileStore};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load()?;
    let store = JsonFileStore::new(&cli.data);
    let clock = SystemClock;

    match cli.command {
        Command::Tick { dry_run } => {
            let mut dataset = store.load()?;
            warn_dangling_links(&dataset);

            let now = clock.now();
            let actions = compute_due_actions(
                clock.today(),
                &dataset.invoices,
                &dataset.quotes,
                &dataset.customers,
                &config.reminder,
            );
            ui::print_actions(&actions);
            if dry_run || actions.is_empty() {
                return Ok(());
            }

            let mailer = HttpMailer::with_base_url(
                config.mail.api_key.clone(),
                config.mail.gateway_url.clone(),
            );
            let applier = ReminderApplier::new(&mailer);
            let progress = ui::TickProgress::start(actions.len());
            let report = applier
                .apply(
                    &actions,
                    &mut dataset.invoices,
                    &mut dataset.quotes,
                    &config.reminder,
                    now,
                )
                .await;
            store.save(&dataset)?;
            progress.complete(&report);
        }
        Command::Sla => {
            let dataset = store.load()?;
            let report = compute_sla_dashboard(
                &dataset.quotes,
                &dataset.work_orders,
                &dataset.invoices,
                &config.sla,
            );
            ui::print_sla(&report);
        }
        Command::Assign => {
            let dataset = store.load()?;
            match pick_assignee(&dataset.employees, &dataset.work_orders) {
                Some(id) => {
                    let name = dataset
                        .employees
                        .iter()
                        .find(|e| e.id == id)
                        .map(|e| e.name.as_str())
                        .unwrap_or(id);
                    println!("Voorgestelde medewerker: {name} ({id})");
                }
                None => println!("Geen medewerkers in de administratie."),
            }
        }
        Command::Status => {
            let dataset = store.load()?;
            ui::print_status(&dataset);
        }
        Command::Demo => {
            let dataset = seed_demo(&clock, &config)?;
            store.save(&dataset)?;
            println!(
                "Demo-administratie weggeschreven naar {} ({} offertes, {} facturen, {} werkbonnen).",
                store.path().display(),
                dataset.quotes.len(),
                dataset.invoices.len(),
                dataset.work_orders.len()
            );
        }
    }

    Ok(())
}

// Koppelingen naar verdwenen documenten worden genegeerd, maar wel gemeld.
fn warn_dangling_links(dataset: &Dataset) {
    for quote in &dataset.quotes {
        if let Some(id) = quote.invoice_id.as_deref()
            && dataset.invoice(id).is_none()
        {
            eprintln!("waarschuwing: offerte {} verwijst naar ontbrekende factuur {id}", quote.id);
        }
        if let Some(id) = quote.work_order_id.as_deref()
            && dataset.work_order(id).is_none()
        {
            eprintln!("waarschuwing: offerte {} verwijst naar ontbrekende werkbon {id}", quote.id);
        }
    }
    for invoice in &dataset.invoices {
        if let Some(id) = invoice.work_order_id.as_deref()
            && dataset.work_order(id).is_none()
        {
            eprintln!(
                "waarschuwing: factuur {} verwijst naar ontbrekende werkbon {id}",
                invoice.invoice_number
            );
        }
    }
}

/// Bouwt een kleine maar realistische demo-administratie op via de gewone
/// lifecycle-operaties, met datums rond "nu" zodat een `tick` direct iets
/// te doen heeft.
fn seed_demo(clock: &SystemClock, config: &EngineConfig) -> Result<Dataset> {
    let now = clock.now();
    let actor = Actor {
        user_id: "emp-1".into(),
        user_name: "Joke de Vries".into(),
    };
    let mut dataset = Dataset {
        customers: vec![
            Customer {
                id: "c-1".into(),
                name: "Bakkerij Jansen".into(),
                email: "info@bakkerijjansen.nl".into(),
            },
            Customer {
                id: "c-2".into(),
                name: "Fietsenmaker De Snelle Band".into(),
                email: "post@desnelleband.nl".into(),
            },
        ],
        employees: vec![
            Employee {
                id: "emp-1".into(),
                name: "Joke de Vries".into(),
                available: true,
                on_vacation: false,
            },
            Employee {
                id: "emp-2".into(),
                name: "Pim Bakker".into(),
                available: true,
                on_vacation: false,
            },
        ],
        ..Dataset::default()
    };

    let items = vec![LineItem {
        description: "Kozijn hardhout 120x80".into(),
        quantity: dec!(2),
        unit_price: dec!(385),
        inventory_id: Some("art-12".into()),
    }];
    let labor = vec![LaborLine {
        description: "Montage".into(),
        hours: dec!(6),
        rate: dec!(62.50),
    }];

    // Verlopen offerte: verstuurd, geldigheid al verstreken.
    let created = now - Duration::days(20);
    let quote = lifecycle::quote::create(
        lifecycle::quote::NewQuote {
            customer_id: "c-1".into(),
            items: items.clone(),
            labor: labor.clone(),
            vat_rate: config.default_vat_rate,
            valid_until: (now - Duration::days(5)).date_naive(),
        },
        &actor,
        created,
    );
    let quote = lifecycle::quote::change_status(
        &quote,
        QuoteStatus::Sent,
        &actor,
        created + Duration::hours(4),
    )?;
    dataset.upsert_quote(quote);

    // Offerte die om opvolging vraagt: ruim een week geleden verstuurd.
    let created = now - Duration::days(9);
    let quote = lifecycle::quote::create(
        lifecycle::quote::NewQuote {
            customer_id: "c-2".into(),
            items: items.clone(),
            labor: labor.clone(),
            vat_rate: config.default_vat_rate,
            valid_until: (now + Duration::days(21)).date_naive(),
        },
        &actor,
        created,
    );
    let quote = lifecycle::quote::change_status(
        &quote,
        QuoteStatus::Sent,
        &actor,
        created + Duration::hours(6),
    )?;
    dataset.upsert_quote(quote);

    // Goedgekeurde offerte, omgezet naar een lopende werkbon.
    let created = now - Duration::days(6);
    let quote = lifecycle::quote::create(
        lifecycle::quote::NewQuote {
            customer_id: "c-1".into(),
            items,
            labor,
            vat_rate: config.default_vat_rate,
            valid_until: (now + Duration::days(24)).date_naive(),
        },
        &actor,
        created,
    );
    let quote =
        lifecycle::quote::change_status(&quote, QuoteStatus::Sent, &actor, created + Duration::hours(2))?;
    let quote = lifecycle::quote::change_status(
        &quote,
        QuoteStatus::Approved,
        &actor,
        created + Duration::days(1),
    )?;
    let (quote, order) =
        lifecycle::quote::convert_to_work_order(&quote, None, &actor, created + Duration::days(2))?;
    let mut order = lifecycle::work_order::change_status(
        &order,
        WorkOrderStatus::InProgress,
        &actor,
        created + Duration::days(3),
    )?;
    order.assigned_to = Some("emp-2".into());
    dataset.upsert_quote(quote);
    dataset.upsert_work_order(order);

    // Achterstallige factuur: vervaldatum ruim een week verstreken.
    let created = now - Duration::days(25);
    let invoice = lifecycle::invoice::create(
        lifecycle::invoice::NewInvoice {
            customer_id: "c-2".into(),
            items: vec![LineItem {
                description: "Reparatie rolluik".into(),
                quantity: dec!(1),
                unit_price: dec!(180),
                inventory_id: None,
            }],
            labor: vec![],
            vat_rate: config.default_vat_rate,
        },
        dataset.invoice_numbers().collect::<Vec<_>>(),
        &config.reminder,
        &actor,
        created,
    );
    let invoice = lifecycle::invoice::change_status(
        &invoice,
        InvoiceStatus::Sent,
        &config.reminder,
        &actor,
        created + Duration::hours(1),
    )?;
    dataset.upsert_invoice(invoice);

    Ok(dataset)
}

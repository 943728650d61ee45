//! Opdrachtregelinterface van dokwerk op basis van clap.
//!
//! Definieert de struct [`Cli`] met subcommando's [`Command`] (tick, sla,
//! assign, status, demo) en globale vlaggen (--data, --verbose).

use clap::{Parser, Subcommand};

/// dokwerk — documentlevenscyclus en tijdgestuurde automatisering voor de
/// mkb-administratie.
#[derive(Debug, Parser)]
#[command(name = "dokwerk", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pad naar het JSON-databestand met de administratie.
    #[arg(long, global = true, default_value = "administratie.json")]
    pub data: String,

    /// Toon uitgebreide uitvoer.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draait één schedulerronde: bereken acties, verstuur herinneringen,
    /// laat offertes verlopen.
    Tick {
        /// Toon alleen de berekende acties, zonder iets te versturen of
        /// te wijzigen.
        #[arg(long)]
        dry_run: bool,
    },

    /// Toont het SLA-dashboard over de huidige administratie.
    Sla,

    /// Kiest de minst belaste medewerker voor een nieuwe werkbon.
    Assign,

    /// Toont documentaantallen per status.
    Status,

    /// Vult het databestand met een demo-administratie.
    Demo,
}

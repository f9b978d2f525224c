use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gstledger_cli::{Batch, run};
use gstledger_infra::{
    ConfiguredSequence, Gstr1Writer, InMemoryInvoiceStore, InvoiceLedger, LedgerConfig,
    LogNotifier, PdfInvoiceRenderer,
};

#[derive(Parser)]
#[command(name = "gstledger")]
#[command(about = "GST invoice ledger: issue, render, remind and export GSTR1")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a JSON batch of invoices.
    Run {
        /// Path to the TOML ledger configuration
        #[arg(short, long, env = "GSTLEDGER_CONFIG", default_value = "gstledger.toml")]
        config: PathBuf,

        /// Path to the JSON batch file
        #[arg(short, long)]
        batch: PathBuf,
    },
    /// Load and validate a configuration file, then exit.
    CheckConfig {
        #[arg(short, long, env = "GSTLEDGER_CONFIG", default_value = "gstledger.toml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, batch } => {
            let config = LedgerConfig::from_file(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            gstledger_observability::init(config.logging.format);

            let batch = Batch::from_file(&batch)?;
            tracing::info!(invoices = batch.invoices.len(), seller = %config.seller.name, "starting batch");

            let sequence =
                ConfiguredSequence::from_path(config.numbering.sequence_file.as_deref())?;
            let mut ledger =
                InvoiceLedger::with_parts(config.seller.clone(), InMemoryInvoiceStore::new(), sequence);
            let renderer = PdfInvoiceRenderer::new(&config.output.invoice_dir);
            let writer = Gstr1Writer::new(&config.output.report_path);

            let summary = run(&mut ledger, &batch, &renderer, &LogNotifier, &writer)?;

            for issued in &summary.issued {
                println!(
                    "{}  {:>12.2}  {:<6}  {}",
                    issued.number,
                    issued.grand_total,
                    issued.status,
                    issued.document.display()
                );
            }
            println!("reminders sent: {}", summary.reminders_sent);
            println!("GSTR1 report:   {}", summary.report_path.display());
        }
        Command::CheckConfig { config } => {
            let loaded = LedgerConfig::from_file(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            println!(
                "{}: seller {} ({}), state {}",
                config.display(),
                loaded.seller.name,
                loaded.seller.gstin,
                loaded.seller.state_code()
            );
        }
    }

    Ok(())
}

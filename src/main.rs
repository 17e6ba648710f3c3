use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use identity_forge::{export_tsv, write_tsv_file, AppContext, CancelSignal};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "identity-forge",
    about = "Generate synthetic identity records with real-world postal addresses",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate identity records and write them as tab-separated rows.
    Generate {
        /// Number of records to produce.
        #[arg(long, default_value_t = 20)]
        count: usize,
        /// Country codes to draw from. Defaults to every seeded country.
        #[arg(long, value_delimiter = ',', value_name = "CODES")]
        countries: Vec<String>,
        /// Output file. Rows go to stdout when omitted.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Copy the rows to the system clipboard instead.
        #[cfg(feature = "clipboard")]
        #[arg(long, conflicts_with = "output")]
        clipboard: bool,
    },
    /// Fill the address cache with fresh lookups.
    Prime {
        #[arg(long, value_delimiter = ',', value_name = "CODES", required = true)]
        countries: Vec<String>,
        #[arg(long, default_value_t = 10)]
        per_country: usize,
    },
    /// Print the number of cached addresses per country.
    CacheStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = AppContext::initialize();

    match cli.command {
        Command::Generate {
            count,
            countries,
            output,
            #[cfg(feature = "clipboard")]
            clipboard,
        } => {
            let countries = select_countries(&context, countries)?;
            let generator = context.identity_generator()?;
            let cancel = cancel_on_ctrl_c();
            let records = generator.generate(count, &countries, &cancel).await?;
            #[cfg(feature = "clipboard")]
            if clipboard {
                identity_forge::export::copy_to_clipboard(&records)?;
                return Ok(());
            }
            match output {
                Some(path) => write_tsv_file(&path, &records)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => export_tsv(&records, io::stdout().lock())?,
            }
        }
        Command::Prime {
            countries,
            per_country,
        } => {
            let countries = select_countries(&context, countries)?;
            let resolver = context.resolver()?;
            let cancel = cancel_on_ctrl_c();
            let produced = resolver.prime_cache(&countries, per_country, &cancel).await;
            for (country, addresses) in &produced {
                info!(country = %country, primed = addresses.len(), "priming summary");
            }
            println!("{}", serde_json::to_string_pretty(&produced)?);
        }
        Command::CacheStats => {
            let summary = context.cache().summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn select_countries(context: &AppContext, requested: Vec<String>) -> Result<Vec<String>> {
    let seeds = context.seeds();
    if requested.is_empty() {
        return Ok(seeds
            .country_codes()
            .into_iter()
            .map(str::to_string)
            .collect());
    }

    let mut countries = Vec::with_capacity(requested.len());
    for code in requested {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            continue;
        }
        if seeds.seed(&code).is_none() {
            warn!(country = %code, "no geo seeds for country; records will lack addresses");
        }
        countries.push(code);
    }
    if countries.is_empty() {
        bail!("no country codes given");
    }
    Ok(countries)
}

fn cancel_on_ctrl_c() -> CancelSignal {
    let cancel = CancelSignal::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling run");
            trigger.cancel();
        }
    });
    cancel
}

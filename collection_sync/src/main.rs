//! Collection Sync - MTG collection manager
//!
//! Command line front end for the collection stored as CSV in a GitHub
//! repository: browsing, statistics, imports and manual edits.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use collection_sync::analysis::{set_map, top_valuable};
use collection_sync::api::{fetch_usd_to_brl, ScryfallClient};
use collection_sync::{
    enrich_file, format_card_check, format_gallery, format_outcome, format_stats,
    prepare_for_display, AppContext, CardFilter, CardRecord, CollectionStats, Config, SortOrder,
    WriteOutcome,
};
use mtg_common::CardIdentifier;

/// Keeps an MTG card collection enriched and stored in a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "collection_sync")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    remote: RemoteArgs,

    /// Edit password, checked against --edit-password
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Repository holding the collection, as owner/name
    #[arg(long, env = "COLLECTION_REPO", default_value = "", global = true)]
    repo: String,

    /// Path of the collection file inside the repository
    #[arg(long, env = "COLLECTION_PATH", default_value = collection_sync::config::DEFAULT_PATH, global = true)]
    path: String,

    #[arg(long, env = "COLLECTION_BRANCH", default_value = "main", global = true)]
    branch: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Password required for edits; editing is open when unset
    #[arg(long, env = "COLLECTION_PASSWORD", hide_env_values = true, global = true)]
    edit_password: Option<String>,

    #[arg(long, default_value = collection_sync::api::scryfall::SCRYFALL_URL, global = true)]
    scryfall_url: String,

    #[arg(long, default_value = collection_sync::api::github::GITHUB_API_URL, global = true)]
    github_url: String,

    #[arg(long, default_value = collection_sync::api::currency::RATE_URL, global = true)]
    rate_url: String,
}

impl RemoteArgs {
    fn into_config(self) -> Config {
        Config {
            repo: self.repo,
            path: self.path,
            branch: self.branch,
            token: self.token,
            edit_password: self.edit_password,
            scryfall_url: self.scryfall_url,
            github_url: self.github_url,
            rate_url: self.rate_url,
            ..Config::default()
        }
    }
}

#[derive(Args, Debug)]
struct CardArgs {
    /// Set code, e.g. blb
    #[arg(long = "set")]
    set_code: String,

    /// Collector number, e.g. 123 or 45a
    #[arg(long = "number")]
    collector_number: String,
}

impl CardArgs {
    fn identifier(&self) -> CardIdentifier {
        CardIdentifier::new(&self.set_code, &self.collector_number)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Name,
    Price,
    Set,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::ByName,
            SortArg::Price => SortOrder::ByPrice,
            SortArg::Set => SortOrder::BySet,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the collection
    List {
        /// Only these set codes (repeatable)
        #[arg(long = "set")]
        sets: Vec<String>,

        /// Only cards with any of these color symbols (W, U, B, R, G, C, L)
        #[arg(long = "color")]
        colors: Vec<String>,

        /// Name substring, case-insensitive
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
    },
    /// Show collection statistics
    Stats {
        /// Number of most valuable cards to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Add a card, validated against Scryfall
    Add {
        #[command(flatten)]
        card: CardArgs,

        #[arg(long, default_value_t = 1)]
        regular: u32,

        #[arg(long, default_value_t = 0)]
        foil: u32,

        /// Skip the Scryfall lookup and add the bare row
        #[arg(long)]
        no_lookup: bool,
    },
    /// Import a CSV file into the remote collection
    Import { file: PathBuf },
    /// Set the owned quantities of a card
    Edit {
        #[command(flatten)]
        card: CardArgs,

        #[arg(long)]
        regular: u32,

        #[arg(long)]
        foil: u32,
    },
    /// Delete a card from the collection
    Delete {
        #[command(flatten)]
        card: CardArgs,
    },
    /// Re-enrich every card with current prices
    Refresh,
    /// Check that a card exists on Scryfall
    Check {
        #[command(flatten)]
        card: CardArgs,
    },
    /// Enrich a local file without touching the remote collection
    EnrichFile {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.remote.into_config();

    if let Err(e) = run(cli.command, config, cli.password) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: Config, password: Option<String>) -> collection_sync::Result<()> {
    match command {
        Command::Check { card } => {
            let client = ScryfallClient::new(&config.scryfall_url);
            let found = client.fetch_card(&card.set_code, &card.collector_number)?;
            println!("{}", format_card_check(&found));
            Ok(())
        }
        Command::EnrichFile { input, output } => {
            let client = ScryfallClient::new(&config.scryfall_url);
            let rate = fetch_usd_to_brl(&reqwest::blocking::Client::new(), &config.rate_url);
            let rows = enrich_file(&client, &input, &output, rate)?;
            println!("Wrote {} rows to {}", rows.len(), output.display());
            Ok(())
        }
        command => {
            let mut ctx = AppContext::new(config)?;
            ctx.authorize(password.as_deref());
            run_remote(&mut ctx, command)
        }
    }
}

fn report(outcome: WriteOutcome) -> collection_sync::Result<()> {
    println!("{}", format_outcome(&outcome));
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_remote(ctx: &mut AppContext, command: Command) -> collection_sync::Result<()> {
    match command {
        Command::List {
            sets,
            colors,
            name,
            sort,
        } => {
            let records = ctx.table()?;
            let known_sets = set_map(records);
            for set in &sets {
                if !known_sets.contains_key(&set.to_lowercase()) {
                    log::warn!("Set {} is not in the collection", set);
                }
            }
            let filter = CardFilter { sets, colors, name };
            let cards = filter.apply(prepare_for_display(records), sort.into());
            print!("{}", format_gallery(&cards));
            Ok(())
        }
        Command::Stats { top } => {
            let cards = prepare_for_display(ctx.table()?);
            let stats = CollectionStats::from_cards(&cards);
            print!("{}", format_stats(&stats, &top_valuable(&cards, top)));
            Ok(())
        }
        Command::Add {
            card,
            regular,
            foil,
            no_lookup,
        } => {
            let outcome = if no_lookup {
                ctx.add_manual(CardRecord::new(
                    &card.set_code,
                    &card.collector_number,
                    regular,
                    foil,
                ))?
            } else {
                ctx.add_card(&card.set_code, &card.collector_number, regular, foil)?
            };
            report(outcome)
        }
        Command::Import { file } => {
            let rows = collection_sync::io::read_import_file(&file)?;
            report(ctx.import_rows(rows)?)
        }
        Command::Edit {
            card,
            regular,
            foil,
        } => report(ctx.edit_card(&card.identifier(), regular, foil)?),
        Command::Delete { card } => report(ctx.delete_card(&card.identifier())?),
        Command::Refresh => report(ctx.refresh_prices()?),
        Command::Check { .. } | Command::EnrichFile { .. } => Ok(()),
    }
}

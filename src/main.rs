use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use shoplist::error::ErrorCode;
use shoplist::llm::LlmClient;
use shoplist::services::import::{ImportError, ImportPhase, ImportSession};
use shoplist::services::recipe::{ExtractError, RecipeExtractor};
use shoplist::state::settings::{InvalidDate, parse_shopping_date};
use shoplist::state::summary::SUPPORTED_CURRENCIES;
use shoplist::state::theme::UnknownTheme;
use shoplist::state::{ItemPatch, RootContext, SettingsManager, ShoppingList, Theme, format_currency};
use shoplist::store::{FileStore, KeyValueStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no item matches '{0}'")]
    UnknownItem(String),
    #[error("invalid price {0}: must be a non-negative number")]
    InvalidPrice(f64),
    #[error("{0}")]
    Import(#[from] ImportError),
    #[error("{0}")]
    Extract(#[from] ExtractError),
    #[error("{0}")]
    ImportFailed(String),
    #[error(transparent)]
    InvalidDate(#[from] InvalidDate),
    #[error(transparent)]
    UnknownTheme(#[from] UnknownTheme),
    #[error("failed to read recipe: {0}")]
    Io(#[from] io::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownItem(_) => "E_UNKNOWN_ITEM",
            Self::InvalidPrice(_) => "E_INVALID_PRICE",
            Self::Import(e) => e.error_code(),
            Self::Extract(e) => e.error_code(),
            Self::ImportFailed(_) => "E_IMPORT_FAILED",
            Self::InvalidDate(_) => "E_INVALID_DATE",
            Self::UnknownTheme(_) => "E_UNKNOWN_THEME",
            Self::Io(_) => "E_IO",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Extract(e) if e.retryable())
    }
}

#[derive(Parser, Debug)]
#[command(name = "shoplist", about = "Shopping list with AI recipe import")]
struct Cli {
    /// Directory holding the list and settings documents.
    #[arg(long, env = "SHOPLIST_DATA_DIR", default_value = ".shoplist")]
    data_dir: PathBuf,

    /// Log progress to stderr (repeat for debug output).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the list with progress and total cost.
    List,
    /// Add an item to the top of the list.
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        quantity: String,
    },
    /// Mark an item purchased at a price (also edits the price).
    Check {
        item: String,
        #[arg(short, long)]
        price: f64,
    },
    /// Mark an item not purchased and drop its price.
    Uncheck { item: String },
    /// Rename an item or change its quantity.
    Edit {
        item: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        quantity: Option<String>,
    },
    /// Remove one item.
    Remove { item: String },
    /// Remove every item.
    Clear,
    /// Extract ingredients from a recipe and add them.
    Import(ImportArgs),
    /// Show or change settings.
    Settings(SettingsCommand),
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Read the recipe from a file instead of stdin.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Show the extracted ingredients without adding them.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: Option<SettingsSubcommand>,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    /// Set the color theme (indigo, emerald, rose).
    Theme { theme: String },
    /// Set the shopping date (YYYY-MM-DD) or `none` to clear it.
    Date { date: String },
    /// Set the display currency code.
    Currency { code: String },
    /// List the currencies offered by the picker.
    Currencies,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.error_code());
            if e.retryable() {
                eprintln!("(this may succeed if you try again)");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = FileStore::new(cli.data_dir);
    let mut settings = SettingsManager::load(store.clone(), RootContext::default());
    let mut list = ShoppingList::load(store);

    match cli.command {
        Command::List => print_list(&list, settings.currency()),
        Command::Add { name, quantity } => match list.add_item(&name, &quantity) {
            Some(_) => print_list(&list, settings.currency()),
            None => eprintln!("nothing added: item name is empty"),
        },
        Command::Check { item, price } => {
            let id = resolve_item(&list, &item)?;
            if !list.mark_purchased(&id, price) {
                return Err(CliError::InvalidPrice(price));
            }
            print_list(&list, settings.currency());
        }
        Command::Uncheck { item } => {
            let id = resolve_item(&list, &item)?;
            list.unmark_purchased(&id);
            print_list(&list, settings.currency());
        }
        Command::Edit { item, name, quantity } => {
            let id = resolve_item(&list, &item)?;
            let patch = ItemPatch { name, quantity, ..ItemPatch::default() };
            list.update_item(&id, &patch);
            print_list(&list, settings.currency());
        }
        Command::Remove { item } => {
            let id = resolve_item(&list, &item)?;
            list.remove_item(&id);
            print_list(&list, settings.currency());
        }
        Command::Clear => {
            list.clear_list();
            println!("List cleared.");
        }
        Command::Import(args) => import_recipe(&mut list, args, settings.currency()).await?,
        Command::Settings(cmd) => {
            match cmd.command {
                None => {}
                Some(SettingsSubcommand::Theme { theme }) => settings.set_theme(theme.parse::<Theme>()?),
                Some(SettingsSubcommand::Date { date }) => {
                    let date = if date.trim().eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(parse_shopping_date(&date)?)
                    };
                    settings.set_shopping_date(date);
                }
                Some(SettingsSubcommand::Currency { code }) => settings.set_currency(&code),
                Some(SettingsSubcommand::Currencies) => {
                    for c in &SUPPORTED_CURRENCIES {
                        let marker = if c.code == settings.currency() { "*" } else { " " };
                        println!("{marker} {} {:<4} {}", c.code, c.symbol, c.name);
                    }
                    return Ok(());
                }
            }
            let current = settings.settings();
            println!("theme:    {} ({})", current.theme, settings.root().class().unwrap_or("default palette"));
            println!("date:     {}", current.shopping_date.as_deref().unwrap_or("not set"));
            println!("currency: {}", current.currency);
        }
    }
    Ok(())
}

async fn import_recipe<S: KeyValueStore>(
    list: &mut ShoppingList<S>,
    args: ImportArgs,
    currency: &str,
) -> Result<(), CliError> {
    let text = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Paste the recipe, then press Ctrl-D:");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut session = ImportSession::new();
    session.set_text(text);
    let ticket = session.begin_extract()?;

    let client = LlmClient::from_env().map_err(ExtractError::from)?;
    tracing::info!(model = client.model(), "LLM client initialized");
    let max_tokens = client.max_tokens();
    let extractor = RecipeExtractor::new(Arc::new(client)).with_max_tokens(max_tokens);

    eprintln!("Extracting ingredients…");
    let recipe = session.text().to_string();
    tokio::select! {
        result = extractor.extract(&recipe) => {
            session.finish_extract(ticket, result);
        }
        _ = tokio::signal::ctrl_c() => {
            session.close();
            eprintln!("Import cancelled.");
            return Ok(());
        }
    }

    let drafts = match session.phase() {
        ImportPhase::Review(drafts) => drafts.clone(),
        ImportPhase::Failed(message) => return Err(CliError::ImportFailed(message.clone())),
        _ => return Ok(()),
    };
    if drafts.is_empty() {
        println!("No ingredients found in that recipe.");
        session.close();
        return Ok(());
    }

    println!("Found {} ingredient(s):", drafts.len());
    for draft in &drafts {
        println!("  - {} ({})", draft.name, draft.quantity);
    }
    if args.dry_run {
        session.close();
        return Ok(());
    }

    session.add_all(list);
    println!();
    print_list(list, currency);
    Ok(())
}

fn resolve_item<S: KeyValueStore>(list: &ShoppingList<S>, selector: &str) -> Result<String, CliError> {
    let selector = selector.trim();
    if let Ok(position) = selector.parse::<usize>() {
        if let Some(item) = position.checked_sub(1).and_then(|i| list.items().get(i)) {
            return Ok(item.id.clone());
        }
    }
    if let Some(item) = list.get(selector) {
        return Ok(item.id.clone());
    }
    let mut prefixed = list
        .items()
        .iter()
        .filter(|item| selector.len() >= 4 && item.id.starts_with(selector));
    match (prefixed.next(), prefixed.next()) {
        (Some(item), None) => Ok(item.id.clone()),
        _ => Err(CliError::UnknownItem(selector.to_string())),
    }
}

fn print_list<S: KeyValueStore>(list: &ShoppingList<S>, currency: &str) {
    if list.is_empty() {
        println!("Your list is empty. Add an item or import a recipe.");
        return;
    }
    for (index, item) in list.items().iter().enumerate() {
        let mark = if item.purchased { "x" } else { " " };
        let price = item
            .price
            .filter(|_| item.purchased)
            .map(|p| format!("  {}", format_currency(p, currency)))
            .unwrap_or_default();
        let short_id = item.id.get(..8).unwrap_or(&item.id);
        println!("{:>3}. [{mark}] {} ({}){price}  #{short_id}", index + 1, item.name, item.quantity);
    }
    let summary = list.summary();
    println!();
    println!(
        "{}/{} purchased ({:.0}%) · total {}",
        summary.purchased,
        summary.total,
        summary.progress_percent,
        format_currency(summary.total_cost, currency)
    );
    if summary.all_purchased() {
        println!("All items purchased!");
    }
}

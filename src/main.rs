use accounting::{AccountingEngine, TradeRequest};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::{AssetClass, Role, TradeSide, normalize_currency_code};
// Import storage types directly from the ledger-store crate
use ledger_store::connection::{connect, run_migrations};
use ledger_store::repository::LedgerStore;
use market_data::HttpMarketData;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// The main entry point for the Cross-P paper trading application.
#[tokio::main]
async fn main() {
    // Load environment variables from an optional .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = configuration::load_config().expect("Failed to load configuration");

    // Initialize the database connection and run migrations
    let db_pool = connect(&settings.database.url)
        .await
        .expect("Failed to connect to the ledger database");
    run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let store = LedgerStore::new(db_pool);
    let market = Arc::new(
        HttpMarketData::new(settings.market_data.clone())
            .expect("Failed to build the market data client"),
    );
    let engine = AccountingEngine::new(
        store.clone(),
        market.clone(),
        market,
        Duration::from_secs(settings.market_data.quote_timeout_secs),
    );

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let outcome = match cli.command {
        Commands::Signup(args) => handle_signup(args, &engine, &settings).await,
        Commands::Trade(args) => handle_trade(args, &engine).await,
        Commands::Portfolio(args) => handle_portfolio(args, &engine).await,
        Commands::History(args) => handle_history(args, &engine).await,
        Commands::Watch(args) => handle_watch(args, &store).await,
        Commands::SetCurrency(args) => handle_set_currency(args, &store).await,
        Commands::SetRole(args) => handle_set_role(args, &store).await,
    };
    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A multi-currency paper trading portfolio tracker.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account seeded with the demo starting balance.
    Signup(SignupArgs),
    /// Buy or sell an instrument at the live quote or a supplied price.
    Trade(TradeArgs),
    /// Show cash balances and open holdings.
    Portfolio(AccountArg),
    /// Show the transaction ledger, newest first.
    History(AccountArg),
    /// Manage the symbol watchlist.
    Watch(WatchArgs),
    /// Change an account's preferred settlement currency.
    SetCurrency(SetCurrencyArgs),
    /// Change an account's role.
    SetRole(SetRoleArgs),
}

#[derive(Parser)]
struct SignupArgs {
    /// Display name for the new account.
    #[arg(long)]
    name: String,

    /// Preferred settlement currency (defaults to the configured one).
    #[arg(long)]
    currency: Option<String>,

    /// Account role (user, trader, admin, observer).
    #[arg(long, default_value = "user")]
    role: Role,
}

#[derive(Parser)]
struct TradeArgs {
    /// The account placing the order.
    #[arg(long)]
    account: Uuid,

    /// The instrument symbol (e.g. "AAPL", "BTC/USDT", "GC=F").
    #[arg(long)]
    symbol: String,

    /// The asset class (stock, crypto, forex, commodity, index).
    #[arg(long)]
    class: AssetClass,

    /// BUY or SELL.
    #[arg(long)]
    side: TradeSide,

    /// Number of units to trade.
    #[arg(long)]
    quantity: Decimal,

    /// Execution price per unit; omit to trade at the live quote.
    #[arg(long)]
    price: Option<Decimal>,

    /// Currency of --price (defaults to the account's preferred currency).
    #[arg(long)]
    currency: Option<String>,
}

#[derive(Parser)]
struct AccountArg {
    /// The account to inspect.
    #[arg(long)]
    account: Uuid,
}

#[derive(Parser)]
struct WatchArgs {
    #[command(subcommand)]
    action: WatchAction,
}

#[derive(Subcommand)]
enum WatchAction {
    /// Add a symbol to the watchlist.
    Add(WatchEntryArgs),
    /// Remove a symbol from the watchlist.
    Remove(WatchEntryArgs),
    /// List the watchlist.
    List(AccountArg),
}

#[derive(Parser)]
struct WatchEntryArgs {
    #[arg(long)]
    account: Uuid,

    #[arg(long)]
    symbol: String,

    #[arg(long)]
    class: AssetClass,
}

#[derive(Parser)]
struct SetCurrencyArgs {
    #[arg(long)]
    account: Uuid,

    /// The new preferred settlement currency.
    #[arg(long)]
    currency: String,
}

#[derive(Parser)]
struct SetRoleArgs {
    #[arg(long)]
    account: Uuid,

    /// The new role (user, trader, admin, observer).
    #[arg(long)]
    role: Role,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_signup(
    args: SignupArgs,
    engine: &AccountingEngine,
    settings: &configuration::Settings,
) -> anyhow::Result<()> {
    let currency = args
        .currency
        .unwrap_or_else(|| settings.account.default_currency.clone());
    let account = engine
        .create_account(
            &args.name,
            &currency,
            args.role,
            settings.account.starting_balance,
            &settings.account.default_currency,
        )
        .await?;
    println!(
        "Account created: {} ({}) — seeded with {} {}",
        account.id, account.name, settings.account.starting_balance, settings.account.default_currency
    );
    Ok(())
}

async fn handle_trade(args: TradeArgs, engine: &AccountingEngine) -> anyhow::Result<()> {
    // Role/permission gate; the engine itself does not do auth.
    let account = engine.account(args.account).await?;
    if !account.role.can_trade() {
        anyhow::bail!(
            "account role '{}' does not permit trading",
            account.role
        );
    }

    let receipt = engine
        .execute_trade(TradeRequest {
            account_id: args.account,
            symbol: args.symbol,
            asset_class: args.class,
            side: args.side,
            quantity: args.quantity,
            quoted_price: args.price,
            quote_currency: args.currency,
        })
        .await?;

    let tx = &receipt.transaction;
    let action = match tx.side {
        TradeSide::Buy => "Bought",
        TradeSide::Sell => "Sold",
    };
    println!(
        "{action} {} {} @ {} {}",
        tx.quantity, tx.symbol, tx.price, tx.currency
    );
    if let Some(warning) = &receipt.warning {
        println!("Warning: {warning}");
    }
    println!(
        "Remaining balance: {} {}",
        receipt.post_balance, account.preferred_currency
    );
    Ok(())
}

async fn handle_portfolio(args: AccountArg, engine: &AccountingEngine) -> anyhow::Result<()> {
    let balances = engine.balances(args.account).await?;
    let holdings = engine.holdings(args.account).await?;

    let mut balance_table = Table::new();
    balance_table.set_header(vec!["Currency", "Amount"]);
    for balance in &balances {
        balance_table.add_row(vec![balance.currency.clone(), balance.amount.to_string()]);
    }
    println!("Balances:\n{balance_table}");

    let mut holdings_table = Table::new();
    holdings_table.set_header(vec!["Symbol", "Class", "Quantity", "Avg Price"]);
    for holding in &holdings {
        holdings_table.add_row(vec![
            holding.symbol.clone(),
            holding.asset_class.to_string(),
            holding.quantity.to_string(),
            holding.avg_price.round_dp(4).to_string(),
        ]);
    }
    println!("Holdings:\n{holdings_table}");
    Ok(())
}

async fn handle_history(args: AccountArg, engine: &AccountingEngine) -> anyhow::Result<()> {
    let transactions = engine.transactions(args.account).await?;

    let mut table = Table::new();
    table.set_header(vec![
        "Time", "Side", "Symbol", "Class", "Quantity", "Price", "Currency",
    ]);
    for tx in &transactions {
        table.add_row(vec![
            tx.timestamp.to_rfc3339(),
            tx.side.to_string(),
            tx.symbol.clone(),
            tx.asset_class.to_string(),
            tx.quantity.to_string(),
            tx.price.to_string(),
            tx.currency.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn handle_watch(args: WatchArgs, store: &LedgerStore) -> anyhow::Result<()> {
    match args.action {
        WatchAction::Add(entry) => {
            store.add_watch(entry.account, &entry.symbol, entry.class).await?;
            println!("Watching {} ({})", entry.symbol, entry.class);
        }
        WatchAction::Remove(entry) => {
            store.remove_watch(entry.account, &entry.symbol, entry.class).await?;
            println!("Stopped watching {} ({})", entry.symbol, entry.class);
        }
        WatchAction::List(account) => {
            let entries = store.watchlist(account.account).await?;
            let mut table = Table::new();
            table.set_header(vec!["Symbol", "Class", "Added"]);
            for entry in &entries {
                table.add_row(vec![
                    entry.symbol.clone(),
                    entry.asset_class.to_string(),
                    entry.added_at.to_rfc3339(),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

async fn handle_set_currency(args: SetCurrencyArgs, store: &LedgerStore) -> anyhow::Result<()> {
    let currency = normalize_currency_code(&args.currency)?;
    store.set_preferred_currency(args.account, &currency).await?;
    println!("Preferred currency set to {currency}");
    Ok(())
}

async fn handle_set_role(args: SetRoleArgs, store: &LedgerStore) -> anyhow::Result<()> {
    store.set_role(args.account, args.role).await?;
    println!("Role set to {}", args.role);
    Ok(())
}

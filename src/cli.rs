//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_import;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::flat_file_adapter::FlatFileStore;
use crate::domain::catalog::{CatalogSort, Instrument, PriceFilter, UpsertOutcome};
use crate::domain::engine::{HoldingSort, PortfolioEngine, PositionReport};
use crate::domain::error::StockfolioError;
use crate::domain::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Instrument catalog and portfolio tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Catalog listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogOrder {
    Table,
    Price,
    Sector,
}

impl From<CatalogOrder> for CatalogSort {
    fn from(order: CatalogOrder) -> Self {
        match order {
            CatalogOrder::Table => CatalogSort::Table,
            CatalogOrder::Price => CatalogSort::Price,
            CatalogOrder::Sector => CatalogSort::Sector,
        }
    }
}

/// Portfolio report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PortfolioOrder {
    Table,
    Price,
    Sector,
    Profit,
}

impl From<PortfolioOrder> for HoldingSort {
    fn from(order: PortfolioOrder) -> Self {
        match order {
            PortfolioOrder::Table => HoldingSort::Table,
            PortfolioOrder::Price => HoldingSort::Price,
            PortfolioOrder::Sector => HoldingSort::Sector,
            PortfolioOrder::Profit => HoldingSort::Profit,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add an instrument to the catalog, or update its sector and price
    Add {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        sector: String,
        #[arg(long)]
        price: f64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Record a purchase against the portfolio
    Buy {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        price: f64,
        /// Purchase timestamp, e.g. 2024-06-01_09:30; current time when omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Sell from a holding at the current catalog price
    Sell {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        quantity: u32,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the instrument catalog
    List {
        #[arg(long, value_enum, default_value_t = CatalogOrder::Table)]
        sort: CatalogOrder,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Look up an instrument by symbol, exactly or by prefix
    Search {
        query: String,
        /// Match any symbol starting with the query
        #[arg(long)]
        prefix: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List instruments priced at or above a threshold
    FilterPrice {
        threshold: f64,
        /// Match prices at or below the threshold instead
        #[arg(long)]
        at_most: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List instruments in a sector
    FilterSector {
        sector: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Catalog-wide price and sector statistics
    MarketStats {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show holdings with cost basis and unrealized profit
    Portfolio {
        #[arg(long, value_enum, default_value_t = PortfolioOrder::Table)]
        sort: PortfolioOrder,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show recorded trades, oldest first
    History {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Portfolio statistics: investment, value, ROI, best and worst
    Stats {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Bulk-load catalog instruments from a CSV file
    Import {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Add {
            symbol,
            sector,
            price,
            config,
        } => run_add(&symbol, &sector, price, config.as_ref()),
        Command::Buy {
            symbol,
            quantity,
            price,
            date,
            config,
        } => run_buy(&symbol, quantity, price, date.as_deref(), config.as_ref()),
        Command::Sell {
            symbol,
            quantity,
            config,
        } => run_sell(&symbol, quantity, config.as_ref()),
        Command::List { sort, config } => run_list(sort, config.as_ref()),
        Command::Search {
            query,
            prefix,
            config,
        } => run_search(&query, prefix, config.as_ref()),
        Command::FilterPrice {
            threshold,
            at_most,
            config,
        } => run_filter_price(threshold, at_most, config.as_ref()),
        Command::FilterSector { sector, config } => run_filter_sector(&sector, config.as_ref()),
        Command::MarketStats { config } => run_market_stats(config.as_ref()),
        Command::Portfolio { sort, config } => run_portfolio(sort, config.as_ref()),
        Command::History { config } => run_history(config.as_ref()),
        Command::Stats { config } => run_stats(config.as_ref()),
        Command::Import { file, config } => run_import(&file, config.as_ref()),
    }
}

/// Settings from the given INI file, or defaults when no file is named.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<Settings, ExitCode> {
    let path = match config_path {
        Some(path) => path,
        None => return Ok(Settings::default()),
    };

    let adapter = FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StockfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })?;

    Settings::from_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn open_engine(
    config_path: Option<&PathBuf>,
) -> Result<(PortfolioEngine, FlatFileStore), ExitCode> {
    let settings = load_settings(config_path)?;
    let store = FlatFileStore::new(&settings);
    let engine = PortfolioEngine::open(&settings, &store).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok((engine, store))
}

fn run_add(symbol: &str, sector: &str, price: f64, config_path: Option<&PathBuf>) -> ExitCode {
    let (mut engine, store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    match engine.upsert_instrument(&store, symbol, sector, price) {
        Ok(outcome) => {
            let verb = match outcome {
                UpsertOutcome::Added => "Added",
                UpsertOutcome::Updated => "Updated",
            };
            eprintln!("{verb} {} at {:.2}", symbol.trim().to_ascii_uppercase(), price);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_buy(
    symbol: &str,
    quantity: u32,
    price: f64,
    date: Option<&str>,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let (mut engine, store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    match engine.buy(&store, symbol, quantity, price, date) {
        Ok(receipt) => {
            if receipt.opened {
                eprintln!(
                    "Opened {}: {} @ {:.2}",
                    receipt.symbol, receipt.quantity, receipt.unit_price
                );
            } else {
                eprintln!(
                    "Bought {} {} @ {:.2}",
                    receipt.quantity, receipt.symbol, receipt.unit_price
                );
            }
            eprintln!(
                "Holding: {} units, average cost {:.2}",
                receipt.total_quantity, receipt.average_cost
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_sell(symbol: &str, quantity: u32, config_path: Option<&PathBuf>) -> ExitCode {
    let (mut engine, store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    match engine.sell(&store, symbol, quantity) {
        Ok(receipt) => {
            eprintln!(
                "Sold {} {} @ {:.2}",
                receipt.quantity, receipt.symbol, receipt.market_price
            );
            if receipt.profit >= 0.0 {
                eprintln!("Realized profit: {:.2}", receipt.profit);
            } else {
                eprintln!("Realized loss: {:.2}", receipt.profit.abs());
            }
            if receipt.remaining_quantity == 0 {
                eprintln!("Position closed");
            } else {
                eprintln!(
                    "Remaining: {} units, average cost {:.2}",
                    receipt.remaining_quantity, receipt.average_cost
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list(sort: CatalogOrder, config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let rows = engine.catalog().listing(sort.into());
    if rows.is_empty() {
        eprintln!("Catalog is empty");
        return ExitCode::SUCCESS;
    }
    print_instruments(&rows);
    eprintln!("{} instruments", rows.len());
    ExitCode::SUCCESS
}

fn run_search(query: &str, prefix: bool, config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    if prefix {
        let rows = engine.catalog().prefix_search(query);
        if rows.is_empty() {
            eprintln!("No symbols start with {}", query.trim().to_ascii_uppercase());
            return ExitCode::SUCCESS;
        }
        print_instruments(&rows);
        return ExitCode::SUCCESS;
    }

    match engine.catalog().lookup(query) {
        Some(instrument) => {
            print_instruments(&[instrument]);
            ExitCode::SUCCESS
        }
        None => {
            let err = StockfolioError::NotFound {
                symbol: query.trim().to_ascii_uppercase(),
                store: "catalog".to_string(),
            };
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn run_filter_price(threshold: f64, at_most: bool, config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let filter = if at_most {
        PriceFilter::AtMost
    } else {
        PriceFilter::AtLeast
    };
    let rows = engine.catalog().in_price_range(filter, threshold);
    if rows.is_empty() {
        eprintln!("No instruments match");
        return ExitCode::SUCCESS;
    }
    print_instruments(&rows);
    eprintln!("{} instruments", rows.len());
    ExitCode::SUCCESS
}

fn run_filter_sector(sector: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let rows = engine.catalog().in_sector(sector);
    if rows.is_empty() {
        eprintln!("No instruments in sector {}", sector.trim().to_ascii_uppercase());
        return ExitCode::SUCCESS;
    }
    print_instruments(&rows);
    eprintln!("{} instruments", rows.len());
    ExitCode::SUCCESS
}

fn run_market_stats(config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let stats = engine.catalog().statistics();
    if stats.count == 0 {
        eprintln!("Catalog is empty");
        return ExitCode::SUCCESS;
    }
    println!("Instruments:   {}", stats.count);
    println!("Mean price:    {:.2}", stats.mean_price);
    println!("Lowest price:  {:.2}", stats.min_price);
    println!("Highest price: {:.2}", stats.max_price);
    println!("Sectors:       {}", stats.sectors.join(", "));
    ExitCode::SUCCESS
}

fn run_portfolio(sort: PortfolioOrder, config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let report = engine.position_report(sort.into());
    if report.rows.is_empty() {
        eprintln!("No holdings");
        return ExitCode::SUCCESS;
    }
    print_report(&report);
    ExitCode::SUCCESS
}

fn run_history(config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let records = engine.ledger().records();
    if records.is_empty() {
        eprintln!("No transactions recorded");
        return ExitCode::SUCCESS;
    }
    for record in records {
        println!(
            "{:<5} {:<10} {:>8} {:>12.2}  {}",
            record.kind.label(),
            record.symbol,
            record.quantity,
            record.price,
            record.timestamp
        );
    }
    eprintln!("{} transactions", records.len());
    ExitCode::SUCCESS
}

fn run_stats(config_path: Option<&PathBuf>) -> ExitCode {
    let (engine, _store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let stats = engine.portfolio_statistics();
    if stats.holdings == 0 {
        eprintln!("No holdings");
        return ExitCode::SUCCESS;
    }
    println!("Holdings:     {}", stats.holdings);
    println!("Investment:   {:.2}", stats.total_investment);
    println!("Value:        {:.2}", stats.current_value);
    println!("Net P/L:      {:.2}", stats.net_profit);
    match stats.roi {
        Some(roi) => println!("ROI:          {:.2}%", roi * 100.0),
        None => println!("ROI:          n/a"),
    }
    if let Some(best) = &stats.best {
        println!("Best:         {} ({:+.2})", best.symbol, best.profit);
    }
    if let Some(worst) = &stats.worst {
        println!("Worst:        {} ({:+.2})", worst.symbol, worst.profit);
    }
    ExitCode::SUCCESS
}

fn run_import(file: &Path, config_path: Option<&PathBuf>) -> ExitCode {
    let (mut engine, store) = match open_engine(config_path) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    eprintln!("Importing instruments from {}", file.display());
    let rows = match csv_import::read_instruments(file) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match engine.import_instruments(&store, &rows) {
        Ok(outcome) => {
            eprintln!(
                "Imported {} instruments ({} added, {} updated)",
                outcome.added + outcome.updated,
                outcome.added,
                outcome.updated
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_instruments(rows: &[&Instrument]) {
    for instrument in rows {
        println!(
            "{:<10} {:<12} {:>12.2}",
            instrument.symbol, instrument.sector, instrument.price
        );
    }
}

fn print_report(report: &PositionReport) {
    for row in &report.rows {
        let price = match row.market_price {
            Some(price) => format!("{price:>10.2}"),
            None => format!("{:>10}", "-"),
        };
        println!(
            "{:<10} {:<12} {:>8} {:>12.2} {} {:>12.2}  {}",
            row.symbol,
            row.sector,
            row.quantity,
            row.average_cost,
            price,
            row.profit,
            row.last_acquired
        );
    }
    println!(
        "Investment: {:.2}  Value: {:.2}  Net: {:.2}",
        report.total_investment, report.current_value, report.net_profit
    );
}

//! These structs provide the CLI interface for the xmoney CLI.

use crate::ledger::{Locale, SheetOrder};
use crate::model::{Amount, Theme, TransactionType};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// xmoney: record, summarize, back up and restore your finance ledger.
///
/// Transactions live in a hosted table (a PostgREST-style API). This program reads and writes
/// them directly, shows monthly summaries, and exports the whole ledger to a spreadsheet with one
/// sheet per month. An exported spreadsheet can be edited and imported back: rows that came from
/// the export update the record they came from, any other row is added as a new record.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need the URL of your hosted project and a
    /// credentials file holding the project API key, your access token and your user id:
    ///
    ///   {"api_key": "...", "access_token": "...", "user_id": "..."}
    ///
    /// The credentials file is moved into $XMONEY_HOME/.secrets.
    Init(InitArgs),
    /// List transactions, newest first.
    List(ListArgs),
    /// Record a new transaction.
    Insert(InsertArgs),
    /// Change fields of an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// Show income, expenses, balance and spending by category for one month.
    Summary(SummaryArgs),
    /// Write every transaction to a spreadsheet, one sheet per month.
    Export(ExportArgs),
    /// Restore transactions from an exported spreadsheet.
    ///
    /// Each row carries a hidden RAW_DATA column with the record it was exported from. Rows with
    /// that column overwrite the record with the same id; rows without it are added as new
    /// records. If a spreadsheet tool drops or changes that column, edited rows are added as
    /// duplicates instead of updating the original. The current records are saved to
    /// $XMONEY_HOME/.backups before anything is written.
    Import(ImportArgs),
    /// Write a one-sheet report of the transactions that match the list filters.
    ///
    /// With --month and --year the report is a monthly statement. The report has no RAW_DATA
    /// column, so importing it adds every row as a new transaction.
    Report(ReportArgs),
    /// Show or change preferences.
    Settings(SettingsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where xmoney data and configuration is held. Defaults to ~/xmoney
    #[arg(long, env = "XMONEY_HOME", default_value_t = default_xmoney_home())]
    xmoney_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, xmoney_home: PathBuf) -> Self {
        Self {
            log_level,
            xmoney_home: xmoney_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn xmoney_home(&self) -> &DisplayPath {
        &self.xmoney_home
    }
}

/// Args for the `xmoney init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of your hosted project, e.g. https://abcdefghijklmnop.supabase.co
    #[arg(long)]
    api_url: String,

    /// The path to your credentials file. It is moved into $XMONEY_HOME/.secrets.
    #[arg(long)]
    credentials: PathBuf,

    /// The language of exported spreadsheets: pt-br or en.
    #[arg(long, default_value_t = Locale::default())]
    locale: Locale,

    /// The order of month sheets in an export: chronological (newest first) or lexical.
    #[arg(long, default_value_t = SheetOrder::default())]
    sheet_order: SheetOrder,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>, credentials: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            credentials: credentials.into(),
            locale: Locale::default(),
            sheet_order: SheetOrder::default(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn credentials(&self) -> &Path {
        &self.credentials
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn sheet_order(&self) -> SheetOrder {
        self.sheet_order
    }
}

/// A transaction type as typed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(EntryType);

impl From<EntryType> for TransactionType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Income => TransactionType::Income,
            EntryType::Expense => TransactionType::Expense,
        }
    }
}

/// Which transaction types `list` shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TypeFilter);

impl TypeFilter {
    pub fn matches(&self, r#type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => r#type == TransactionType::Income,
            TypeFilter::Expense => r#type == TransactionType::Expense,
        }
    }
}

/// Args for the `xmoney list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only show transactions whose description or category contains this text (any case).
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long = "type", value_enum, default_value_t = TypeFilter::All)]
    pub r#type: TypeFilter,

    /// Only show this month (1-12). Requires --year.
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Only show this year.
    #[arg(long)]
    pub year: Option<i32>,
}

/// Args for the `xmoney insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// The amount, e.g. 50, 1234.56 or "R$ 1.234,56". Always positive; use --type for direction.
    #[arg(long)]
    pub amount: Amount,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Defaults to Alimentação.
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "type", value_enum, default_value_t = EntryType::Expense)]
    pub r#type: EntryType,

    /// Record the transaction as not yet paid.
    #[arg(long)]
    pub pending: bool,
}

/// Args for the `xmoney update` command. Fields that are not given keep their current value.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateArgs {
    /// The id of the transaction to change.
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub amount: Option<Amount>,

    /// The date as YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "type", value_enum)]
    pub r#type: Option<EntryType>,

    /// true if the transaction is settled, false if it is pending.
    #[arg(long)]
    pub paid: Option<bool>,
}

/// Args for the `xmoney delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    #[arg(long)]
    pub id: String,
}

/// Args for the `xmoney summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// The month (1-12). Defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,
}

/// Args for the `xmoney export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Where to write the spreadsheet. A directory gets a file named
    /// XMONEY_BACKUP_DD-MM-YYYY.xlsx. Defaults to $XMONEY_HOME.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Args for the `xmoney report` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filter: ListArgs,

    /// Where to write the report. A directory gets XMoney_Extrato_M_YYYY.xlsx for a monthly
    /// statement and Relatorio_XMoney_Full.xlsx otherwise. Defaults to $XMONEY_HOME.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Args for the `xmoney import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The spreadsheet to import (.xlsx, .xls or .ods).
    #[arg(long)]
    pub file: PathBuf,
}

/// Args for the `xmoney settings` command.
#[derive(Debug, Parser, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

impl SettingsArgs {
    pub fn new(command: SettingsCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &SettingsCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current preferences.
    Show,
    /// Change one or more preferences.
    Set(SettingsSetArgs),
    /// Add a category to the list offered when recording transactions.
    AddCategory(CategoryArgs),
    /// Remove a category from the list. Existing transactions keep it.
    RemoveCategory(CategoryArgs),
}

#[derive(Debug, Parser, Clone, Default)]
pub struct SettingsSetArgs {
    /// system, light or dark.
    #[arg(long)]
    pub theme: Option<Theme>,

    /// A three letter currency code such as BRL, USD or EUR.
    #[arg(long)]
    pub currency: Option<String>,

    /// The monthly spending goal.
    #[arg(long, conflicts_with = "clear_budget_goal")]
    pub budget_goal: Option<Amount>,

    /// Remove the monthly spending goal.
    #[arg(long)]
    pub clear_budget_goal: bool,

    /// The day (1-28) on which a budget month starts.
    #[arg(long)]
    pub month_start_day: Option<u8>,
}

#[derive(Debug, Parser, Clone)]
pub struct CategoryArgs {
    pub name: String,
}

fn default_xmoney_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("xmoney"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --xmoney-home or XMONEY_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("xmoney")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["xmoney", "--xmoney-home", "/tmp/xm"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_init() {
        let args = parse(&[
            "init",
            "--api-url",
            "https://abc.supabase.co",
            "--credentials",
            "c.json",
            "--locale",
            "en",
            "--sheet-order",
            "lexical",
        ]);
        assert_eq!(args.common().xmoney_home().path(), Path::new("/tmp/xm"));
        match args.command() {
            Command::Init(init) => {
                assert_eq!(init.api_url(), "https://abc.supabase.co");
                assert_eq!(init.locale(), Locale::En);
                assert_eq!(init.sheet_order(), SheetOrder::Lexical);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_insert_defaults() {
        let args = parse(&["insert", "--amount", "R$ 12,50"]);
        match args.command() {
            Command::Insert(insert) => {
                assert_eq!(insert.amount, Amount::from_str("12.5").unwrap());
                assert_eq!(insert.r#type, EntryType::Expense);
                assert!(!insert.pending);
                assert!(insert.date.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let args = parse(&["list", "--type", "income", "--month", "3", "--year", "2024"]);
        match args.command() {
            Command::List(list) => {
                assert_eq!(list.r#type, TypeFilter::Income);
                assert_eq!(list.month, Some(3));
            }
            other => panic!("unexpected {other:?}"),
        }
        let argv = ["xmoney", "list", "--month", "13", "--year", "2024"];
        assert!(Args::try_parse_from(argv).is_err());
        let argv = ["xmoney", "list", "--month", "3"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_parse_report() {
        let args = parse(&["report", "--month", "3", "--year", "2024", "--output", "/tmp"]);
        match args.command() {
            Command::Report(report) => {
                assert_eq!(report.filter.month, Some(3));
                assert_eq!(report.filter.year, Some(2024));
                assert_eq!(report.filter.r#type, TypeFilter::All);
                assert_eq!(report.output, Some(PathBuf::from("/tmp")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_settings() {
        let args = parse(&["settings", "set", "--theme", "dark", "--budget-goal", "1500"]);
        match args.command() {
            Command::Settings(settings) => match settings.command() {
                SettingsCommand::Set(set) => {
                    assert_eq!(set.theme, Some(Theme::Dark));
                    assert_eq!(set.budget_goal, Some(Amount::from_str("1500").unwrap()));
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
        let args = parse(&["settings", "add-category", "Pets"]);
        assert!(matches!(
            args.command(),
            Command::Settings(s) if matches!(s.command(), SettingsCommand::AddCategory(c) if c.name == "Pets")
        ));
    }

    #[test]
    fn test_type_filter() {
        assert!(TypeFilter::All.matches(TransactionType::Income));
        assert!(TypeFilter::Expense.matches(TransactionType::Expense));
        assert!(!TypeFilter::Income.matches(TransactionType::Expense));
    }
}

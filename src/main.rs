use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use xmoney::args::{Args, Command, SettingsCommand};
use xmoney::{commands, Config, Mode, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().xmoney_home().path();

    // When XMONEY_IN_TEST_MODE is set and non-empty the mode is Mode::Testing and no request
    // leaves the process. Otherwise it is Mode::Remote.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(config, mode, list_args.clone())
                .await?
                .print()
        }

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert(config, mode, insert_args.clone())
                .await?
                .print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update(config, mode, update_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, mode, delete_args.clone())
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, mode, summary_args.clone())
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, mode, export_args.clone())
                .await?
                .print()
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(config, mode, import_args.clone())
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, mode, report_args.clone())
                .await?
                .print()
        }

        Command::Settings(settings_args) => {
            let config = Config::load(home).await?;
            match settings_args.command() {
                SettingsCommand::Show => commands::settings_show(config).await?.print(),
                SettingsCommand::Set(set_args) => commands::settings_set(config, set_args.clone())
                    .await?
                    .print(),
                SettingsCommand::AddCategory(category) => {
                    commands::settings_add_category(config, &category.name)
                        .await?
                        .print()
                }
                SettingsCommand::RemoveCategory(category) => {
                    commands::settings_remove_category(config, &category.name)
                        .await?
                        .print()
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this crate logs, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

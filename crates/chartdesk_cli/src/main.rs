//! CLI entry point over the ChartDesk record store.
//!
//! # Responsibility
//! - Wire config, logging, store context and demo seeding the way a host app does.
//! - List (optionally filtered) or delete stored records from a terminal.
//!
//! Usage: `chartdesk_cli [list [QUERY...] | delete KEY]`, with
//! `CHARTDESK_DB_PATH` set.

use chartdesk_core::{
    filter_records, init_logging_from_config, CoreConfig, DemoSeeder, RecordKey, RecordStore,
    SeedOutcome, StoreContext,
};
use log::warn;
use std::process::ExitCode;

enum Command {
    List(String),
    Delete(RecordKey),
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        None => Ok(Command::List(String::new())),
        Some("list") => Ok(Command::List(args[1..].join(" "))),
        Some("delete") => match args.get(1) {
            Some(key) if args.len() == 2 => Ok(Command::Delete(RecordKey::new(key.as_str()))),
            _ => Err("usage: chartdesk_cli delete KEY".to_string()),
        },
        Some(other) => Err(format!("unknown command `{other}`; expected list|delete")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let context = StoreContext::new(&config);
    if let Err(err) = context.init().await {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    let store = RecordStore::new(context);

    match DemoSeeder::new(store.clone()).seed_if_needed().await {
        Ok(SeedOutcome::Partial { failure, .. }) => eprintln!("demo seeding incomplete: {failure}"),
        Ok(_) => {}
        Err(err) => {
            warn!("event=demo_seed module=cli status=error error={err}");
            eprintln!("demo seeding skipped: {err}");
        }
    }

    match command {
        Command::List(query) => match store.list_all().await {
            Ok(listing) => {
                for stored in filter_records(&query, listing) {
                    let record = &stored.record;
                    println!(
                        "{}\t{}\t{}\t{}",
                        stored.key().map(RecordKey::as_str).unwrap_or("-"),
                        record.personal_information.medical_record_number,
                        record.display_name(),
                        record.diagnosis.join("; ")
                    );
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        },
        Command::Delete(key) => match store.delete(&key).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        },
    }
}

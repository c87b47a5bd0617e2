use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;

use libsql_tenancy::prelude::*;
use libsql_tenancy::runner::TenantListing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Provision and inspect per-tenant libsql databases")]
struct Args {
    /// Load variables from this .env file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved connection mode
    Mode,
    /// Create databases for the given tenants
    Create { tenants: Vec<String> },
    /// Delete databases of the given tenants
    Delete { tenants: Vec<String> },
    /// Check whether a tenant database exists
    Exists { database: String },
    /// Print the connection settings a tenant would use
    Config { tenant: String },
    /// List tenants with their database names
    List { tenants: Vec<String> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool, TenancyError> {
    let config = match &args.env_file {
        Some(path) => TenancyConfig::from_env_file(path)?,
        None => TenancyConfig::from_env()?,
    };

    if let Command::Mode = args.command {
        println!("{}", ConnectionMode::parse(&config.connection));
        return Ok(true);
    }

    let platform = Arc::new(PlatformClient::from_settings(&config.platform));
    let base = config.connection.clone();
    let settings = config.settings.clone();
    let manager = TenantDatabaseManager::new(config, platform)?;

    match args.command {
        Command::Mode => Ok(true),
        Command::Create { tenants } => {
            let mut ok = true;
            for id in tenants {
                let created = manager.create_database(&Tenant::new(id.as_str())).await;
                println!("{id}\t{}", if created { "created" } else { "failed" });
                ok &= created;
            }
            Ok(ok)
        }
        Command::Delete { tenants } => {
            let mut ok = true;
            for id in tenants {
                let deleted = manager.delete_database(&Tenant::new(id.as_str())).await;
                println!("{id}\t{}", if deleted { "deleted" } else { "failed" });
                ok &= deleted;
            }
            Ok(ok)
        }
        Command::Exists { database } => {
            println!("{}", manager.database_exists(&database).await);
            Ok(true)
        }
        Command::Config { tenant } => {
            let name = manager.database_name(&Tenant::new(tenant));
            let derived = manager.make_connection_config(&base, name.as_str())?;
            let json = serde_json::to_string_pretty(&derived.redacted())?;
            println!("{json}");
            Ok(true)
        }
        Command::List { tenants } => {
            println!("Tenant ID\tDatabase\tCredentials");
            for id in tenants {
                let tenant = Tenant::new(id);
                let row = TenantListing::for_tenant(&settings, &tenant);
                let stored = match manager.mode() {
                    ConnectionMode::Remote => manager.credential_path(&tenant).is_file(),
                    _ => manager.tenant_path(&tenant).is_file(),
                };
                println!("{}\t{}\t{}", row.id, row.database, if stored { "yes" } else { "no" });
            }
            Ok(true)
        }
    }
}

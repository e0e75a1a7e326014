use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::Estado;
use shared::sample::sample_repairs;
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/taller.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the sample repairs.
    Seed,
    List {
        /// Only show repairs in this stage.
        #[arg(long)]
        estado: Option<Estado>,
    },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            let created = storage.insert_repairs(&sample_repairs()).await?;
            for record in &created {
                println!("created repair id={} modelo={}", record.id, record.modelo);
            }
            info!(count = created.len(), database_url = %cli.database_url, "seeded sample repairs");
        }
        Command::List { estado } => {
            let records = storage.list_repairs().await?;
            let mut shown = 0usize;
            for record in records
                .iter()
                .filter(|r| estado.map_or(true, |e| r.estado == e))
            {
                shown += 1;
                println!(
                    "{:>4}  {:<11} {:<24} {:<20} {}",
                    record.id.0,
                    record.estado,
                    record.modelo,
                    record.duenio,
                    record.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("{shown} reparaciones");
        }
        Command::Clear => {
            let removed = storage.clear_repairs().await?;
            info!(removed, database_url = %cli.database_url, "cleared reparaciones");
            println!("removed {removed} repairs");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_accepts_stage_filter() {
        let cli = Cli::parse_from(["tools", "list", "--estado", "progreso"]);
        match cli.command {
            Command::List { estado } => assert_eq!(estado, Some(Estado::Progreso)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn database_url_defaults_to_local_file() {
        let cli = Cli::parse_from(["tools", "seed"]);
        assert_eq!(cli.database_url, "sqlite://./data/taller.db");
    }
}

use clap::Parser;

use escrow_engine::{AccountId, Command, EngineConfig, EscrowEngine, ReservationPolicy};

/// A cli interface to the conditional escrow engine
///
/// Replays a CSV command script against a fresh engine and prints
/// the resulting accounts as CSV.
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the command CSV file
    filename: std::path::PathBuf,
    /// The account deploying the engine, which becomes the initial admin
    #[clap(long, default_value = "0")]
    admin: u32,
    /// How funds are secured between creation and execution (`recheck` or `escrow`)
    #[clap(long, default_value = "recheck")]
    reservation: ReservationPolicy,
    /// The most verbose log level written to stderr
    #[clap(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&args.filename)?;
    let config = EngineConfig::new(AccountId::from(args.admin)).with_reservation(args.reservation);
    let mut engine = EscrowEngine::new(config);

    for (line, command) in reader.deserialize::<Command>().enumerate() {
        let command = command?;
        let command_type = command.command_type();
        // failed commands are skipped
        if let Err(err) = engine.handle_command(command) {
            tracing::warn!(line = line + 1, ?command_type, %err, "command failed");
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(std::io::stdout());

    for account in engine.accounts() {
        writer.serialize(account)?;
    }
    writer.flush()?;

    Ok(())
}

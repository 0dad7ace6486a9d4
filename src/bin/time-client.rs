use std::path::PathBuf;

use clap::Parser;

use time_server::client::{run_interactive, ClientSession};
use time_server::config::{load_or_default, validate_config, ConfigError};
use time_server::net::HostnamePolicy;
use time_server::observability::{init_logging, LogDefaults};
use time_server::protocol::Framing;
use time_server::timezone::TimezoneTable;

#[derive(Parser)]
#[command(name = "time-client")]
#[command(about = "Interactive client for the TLS time server", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address, e.g. 127.0.0.1:12345
    #[arg(short, long)]
    server: Option<String>,

    /// Name expected in the server certificate
    #[arg(long)]
    server_name: Option<String>,

    /// CA certificate used to validate the server (PEM)
    #[arg(long)]
    ca_cert: Option<String>,

    /// Accept a server certificate issued for a different host name.
    /// The chain is still validated against the CA.
    #[arg(long)]
    insecure_skip_hostname_verification: bool,

    /// Wire framing: length_prefixed or raw
    #[arg(long)]
    framing: Option<Framing>,

    /// Diagnostics level, written to stderr.
    /// Defaults to `observability.log_level` from the config file, else warn.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.client.server_address = server;
    }
    if let Some(name) = cli.server_name {
        config.client.server_name = name;
    }
    if let Some(ca_cert) = cli.ca_cert {
        config.tls.ca_cert_path = ca_cert;
    }
    if cli.insecure_skip_hostname_verification {
        config.client.hostname_verification = HostnamePolicy::Skip;
    }
    if let Some(framing) = cli.framing {
        config.protocol.framing = framing;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = Some(level);
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability, LogDefaults::CLIENT)?;

    let mut session = ClientSession::connect(&config).await?;
    let table = TimezoneTable::standard();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = run_interactive(&mut session, table.entries(), stdin, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => {},
    }

    println!();
    println!("Client shutting down.");
    let _ = session.close().await;
    // The blocking stdin reader cannot be cancelled and would hold the runtime open.
    std::process::exit(0);
}

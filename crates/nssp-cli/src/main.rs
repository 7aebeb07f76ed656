//! nssp - command-line access to the NSSP API
//!
//! Every request is authorized with a token that is sealed in memory as soon
//! as it is read. Non-200 responses are reported and produce no output.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;

use nssp_client::{
    ClientError, DEFAULT_ENCODING, DEFAULT_GRAPH_EXT, DEFAULT_SNAPSHOT_EXT, DataFormat,
    TabularOptions, TokenClient,
};

mod display;
mod profile;

use profile::Profile;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API token (or set the variable named by `token_env`, NSSP_TOKEN by default)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Authorization scheme, e.g. Bearer or Basic (overrides the profile)
    #[arg(long, global = true)]
    auth_scheme: Option<String>,

    /// Path to a TOML profile (default: ~/.config/nssp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load the client from a snapshot instead of a token
    #[arg(long, global = true, conflicts_with = "token")]
    from_snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a URL and show status, headers and body size
    Raw { url: String },

    /// Fetch a URL and pretty-print its JSON body
    Json { url: String },

    /// Fetch a URL and print its delimited-text body as a table
    Table {
        url: String,

        /// Text encoding of the body
        #[arg(long, default_value = DEFAULT_ENCODING)]
        encoding: String,

        /// Field delimiter
        #[arg(long)]
        delimiter: Option<char>,

        /// Treat the first row as data
        #[arg(long)]
        no_headers: bool,

        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch a URL into a temporary file and print its path
    Graph {
        url: String,

        /// File extension, including the dot
        #[arg(long, default_value = DEFAULT_GRAPH_EXT)]
        ext: String,
    },

    /// Save the client, sealed token and key included, to a file
    Snapshot {
        /// Output path (default: tokenProfile<ext> in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Extension used for the default output name
        #[arg(long, default_value = DEFAULT_SNAPSHOT_EXT)]
        ext: String,
    },
}

impl Command {
    fn tabular_options(delimiter: Option<char>, no_headers: bool) -> TabularOptions {
        let mut options = TabularOptions::new();
        if let Some(delimiter) = delimiter {
            options.insert("delimiter", delimiter.to_string());
        }
        if no_headers {
            options.insert("has_headers", false);
        }
        options
    }
}

fn build_client(args: &Args) -> Result<TokenClient> {
    let profile = Profile::load(args.config.as_deref())?;

    let mut client = if let Some(path) = &args.from_snapshot {
        debug!("Restoring client from {}", path.display());
        let mut client = TokenClient::restore(path)
            .with_context(|| format!("Failed to restore {}", path.display()))?;
        if let Some(dir) = &profile.client.graph_dir {
            client = client.with_graph_dir(dir);
        }
        client
    } else {
        let token = profile.resolve_token(args.token.clone(), |name| std::env::var(name).ok())?;
        TokenClient::from_config(&token, &profile.client)?
    };

    if let Some(scheme) = &args.auth_scheme {
        client.set_auth_scheme(scheme.as_str());
    }
    Ok(client)
}

async fn run(args: Args) -> Result<()> {
    let client = build_client(&args)?;

    match args.command {
        Command::Raw { url } => match client.fetch_raw(&url).await? {
            Some(response) => display::print_response(&response),
            None => display::print_absent(&url),
        },
        Command::Json { url } => {
            let data = client.fetch_data(&url, &DataFormat::Json).await?;
            if let Some(json) = data.as_json() {
                println!("{}", serde_json::to_string_pretty(json)?);
            }
        }
        Command::Table {
            url,
            encoding,
            delimiter,
            no_headers,
            limit,
        } => {
            let options = Command::tabular_options(delimiter, no_headers);
            let table = client.fetch_table(&url, &encoding, &options).await?;
            print!("{}", display::render_table(&table, limit));
        }
        Command::Graph { url, ext } => {
            let graph = client.fetch_graph(&url, &ext).await?;
            println!("{}", graph.path.display());
        }
        Command::Snapshot { out, ext } => {
            let path = client.snapshot(out.as_deref(), &ext)?;
            println!("{} {}", "snapshot written to".green(), path.display());
            eprintln!(
                "{}",
                "warning: the snapshot contains the decryption key; keep it private".yellow()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args).await {
        Err(e) if e.downcast_ref::<ClientError>().is_some_and(ClientError::is_no_data) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(2);
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_table_command() {
        let args = Args::try_parse_from([
            "nssp",
            "table",
            "https://api.test/x.csv",
            "--delimiter",
            ";",
            "--no-headers",
        ])
        .unwrap();

        let Command::Table {
            encoding,
            delimiter,
            no_headers,
            ..
        } = args.command
        else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(encoding, DEFAULT_ENCODING);
        assert_eq!(delimiter, Some(';'));
        assert!(no_headers);

        let options = Command::tabular_options(delimiter, no_headers);
        assert_eq!(options.get_str("delimiter"), Some(";"));
        assert_eq!(options.get_bool("has_headers"), Some(false));
    }

    #[test]
    fn test_graph_defaults_to_png() {
        let args = Args::try_parse_from(["nssp", "graph", "https://api.test/chart"]).unwrap();
        let Command::Graph { ext, .. } = args.command else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(ext, ".png");
    }

    #[test]
    fn test_snapshot_conflicts_with_token() {
        let result = Args::try_parse_from([
            "nssp",
            "--token",
            "abc123",
            "--from-snapshot",
            "tokenProfile.pkl",
            "raw",
            "https://api.test/x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_client_with_scheme_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "auth_scheme = \"Basic\"\n").unwrap();

        let args = Args::try_parse_from([
            "nssp",
            "--token",
            "abc123",
            "--config",
            config.to_str().unwrap(),
            "--auth-scheme",
            "Token",
            "raw",
            "https://api.test/x",
        ])
        .unwrap();

        let client = build_client(&args).unwrap();
        assert_eq!(client.auth_scheme().as_str(), "Token");
    }

    #[test]
    fn test_build_client_from_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = dir.path().join("client.pkl");
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();

        TokenClient::new("abc123")
            .unwrap()
            .with_auth_scheme("Basic")
            .snapshot(Some(&snapshot), DEFAULT_SNAPSHOT_EXT)
            .unwrap();

        let args = Args::try_parse_from([
            "nssp",
            "--config",
            config.to_str().unwrap(),
            "--from-snapshot",
            snapshot.to_str().unwrap(),
            "raw",
            "https://api.test/x",
        ])
        .unwrap();

        let client = build_client(&args).unwrap();
        assert_eq!(client.auth_scheme().as_str(), "Basic");
    }
}

// kle-cache command line.
// Fetches a layout document or lists the authenticated user's layout gists.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use kle_cache::{
    Config, Credential, DocumentListing, FetchOutcome, GistError, GistFetcher, GitHubClient,
};

#[derive(Parser, Debug)]
#[command(name = "kle-cache")]
#[command(about = "Fetch keyboard-layout gists through a local cache")]
#[command(version)]
struct Cli {
    /// GitHub access token, forwarded as `access_token`
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Cache directory (default: $KLE_CACHE_DIR or the platform cache dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Seconds a cached layout is served without revalidation
    #[arg(long, value_name = "SECONDS")]
    cache_time: Option<u64>,

    /// GitHub API root
    #[arg(long)]
    api_root: Option<String>,

    /// Log cache and request decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the layout document of a gist
    Fetch {
        /// Gist id
        id: String,
    },
    /// List your gists that contain a layout file
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(GistError::ListingUnavailable) => {
            eprintln!("Listing gists requires a GitHub token: pass --token or set GITHUB_TOKEN");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kle_cache=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> kle_cache::Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(dir) = &cli.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if let Some(secs) = cli.cache_time {
        config = config.with_freshness(Duration::from_secs(secs));
    }
    if let Some(root) = &cli.api_root {
        config = config.with_api_root(root.as_str())?;
    }

    Ok(config)
}

async fn run(cli: Cli) -> kle_cache::Result<ExitCode> {
    let config = build_config(&cli)?;
    let credential = Credential::from_optional(cli.token);
    let client = GitHubClient::new(&config)?;
    let mut fetcher = GistFetcher::new(client, &config);

    match cli.command {
        Command::Fetch { id } => match fetcher.fetch_document(&id, credential.as_ref()).await? {
            FetchOutcome::Found { content, .. } => {
                println!("{content}");
                Ok(ExitCode::SUCCESS)
            }
            FetchOutcome::NotFound => {
                eprintln!("Gist {id} has no {} file", config.document_suffix);
                Ok(ExitCode::from(3))
            }
        },
        Command::List { page, json } => {
            let listing = fetcher.list_documents(credential.as_ref(), page).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_listing(&listing);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_listing(listing: &DocumentListing) {
    for gist in &listing.gists {
        println!(
            "{}\t{}\t{}",
            gist.id,
            gist.description.as_deref().unwrap_or(""),
            gist.html_url.as_deref().unwrap_or("")
        );
    }

    let pagination = &listing.pagination;
    match pagination.total_pages() {
        Some(total) => eprintln!("page {} of {}", listing.page, total),
        None => eprintln!("page {}", listing.page),
    }
    if let Some(next) = pagination.next() {
        eprintln!("next: --page {next}");
    }
}

use clap::Parser;
use std::path::PathBuf;

use previews_engine::config::DEFAULT_CACHE_TTL_SECONDS;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    author = "hua0512 <https://github.com/hua0512>",
    version,
    about = "Collect the social preview images of a GitHub account's repositories",
    long_about = "Fetches the preview (Open Graph) image advertised by every repository\n\
                  of a GitHub account and writes them to a directory.\n\
                  \n\
                  Downloads run on a bounded worker pool and go through a persistent\n\
                  disk cache with ETag revalidation, so repeated runs only transfer\n\
                  images that actually changed."
)]
pub struct CliArgs {
    /// Account whose repository previews are collected
    #[arg(env = "GITHUB_USER", help = "GitHub account (login) whose repositories are scanned")]
    pub owner: String,

    /// API token for the listing endpoint
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "API token attached to listing requests (raises rate limits, allows private listings)"
    )]
    pub token: Option<String>,

    /// Output directory for collected previews
    #[arg(
        short,
        long,
        default_value = "previews",
        help = "Directory where preview images will be saved"
    )]
    pub output_dir: PathBuf,

    /// Worker pool size
    #[arg(
        short = 'w',
        long,
        default_value_t = 8,
        help = "Number of concurrent fetch workers"
    )]
    pub workers: usize,

    /// Disable the disk cache entirely
    #[arg(long, help = "Fetch everything fresh, neither reading nor writing the disk cache")]
    pub no_cache: bool,

    /// Cache directory
    #[arg(
        long,
        default_value = ".repo-preview-cache",
        help = "Directory holding cached payloads and their metadata"
    )]
    pub cache_dir: PathBuf,

    /// Cache time-to-live in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CACHE_TTL_SECONDS,
        help = "Remove cache entries older than this many seconds before fetching; 0 keeps everything"
    )]
    pub cache_ttl: i64,

    /// Per-request timeout in seconds
    #[arg(
        short,
        long,
        default_value_t = 15,
        help = "Overall timeout for each HTTP request, in seconds"
    )]
    pub timeout: u64,

    /// Keep generic branding previews
    #[arg(
        long,
        help = "Keep previews that look like GitHub's default branding images instead of discarding them"
    )]
    pub keep_default_previews: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,
}

use clap::{Parser, Subcommand};
use frscope_cli::cli::chart_cmd::ChartFormat;
use frscope_cli::cli::output::{self, Styled};
use frscope_cli::cli::{chart_cmd, delete_cmd, export_cmd, extract_cmd, inspect_cmd, list_cmd, view_cmd};
use frscope_cli::config::{Config, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "frscope", version, about = "Extract, align and chart frequency-response curves")]
struct Cli {
    /// Machine-readable JSON output on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Only print essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Session database path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory for exported files
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Site host used for product-name URL patterns
    #[arg(long, global = true)]
    site_host: Option<String>,

    /// Site label used for product-name title patterns
    #[arg(long, global = true)]
    site_label: Option<String>,

    /// Chart width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Chart height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a curve from an HTML file, store it and open its view
    Extract {
        /// HTML file, or `-` for stdin
        input: PathBuf,
        /// Page URL used to derive product name and channel
        #[arg(long)]
        url: Option<String>,
    },
    /// Run extraction without storing anything
    Inspect {
        input: PathBuf,
        #[arg(long)]
        url: Option<String>,
    },
    /// Open the view of a stored session
    View {
        id: String,
        /// Directory for the rendered chart files
        #[arg(long)]
        charts: Option<PathBuf>,
    },
    /// Save a stored session's CSV
    Export {
        id: String,
        /// Target directory (defaults to the export directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a stored session's chart
    Chart {
        id: String,
        #[arg(long, value_enum, default_value = "svg")]
        format: ChartFormat,
        /// Output file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List stored sessions
    List,
    /// Remove a stored session
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Expose global flags to the output helpers.
    if cli.json {
        std::env::set_var(output::ENV_JSON, "1");
    }
    if cli.quiet {
        std::env::set_var(output::ENV_QUIET, "1");
    }
    if cli.no_color {
        std::env::set_var(output::ENV_NO_COLOR, "1");
    }

    let level = if cli.verbose { "frscope=debug" } else { "frscope=info" };
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = level.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(output::color_enabled())
        .init();

    let overrides = Overrides {
        store_path: cli.store,
        export_dir: cli.export_dir,
        site_host: cli.site_host,
        site_label: cli.site_label,
        chart_width: cli.width,
        chart_height: cli.height,
    };

    if let Err(e) = run(cli.command, &overrides).await {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": format!("{e:#}"),
            }));
        } else {
            let s = Styled::new();
            output::print_status(s.fail_sym(), &format!("{e:#}"));
        }
        std::process::exit(1);
    }
}

async fn run(command: Command, overrides: &Overrides) -> anyhow::Result<()> {
    let config = Config::load(overrides)?;
    tracing::debug!("config: {config:?}");

    match command {
        Command::Extract { input, url } => extract_cmd::run(&config, &input, url.as_deref()).await,
        Command::Inspect { input, url } => inspect_cmd::run(&config, &input, url.as_deref()),
        Command::View { id, charts } => view_cmd::run(&config, &id, charts).await,
        Command::Export { id, out } => export_cmd::run(&config, &id, out).await,
        Command::Chart { id, format, out } => chart_cmd::run(&config, &id, format, out).await,
        Command::List => list_cmd::run(&config),
        Command::Delete { id } => delete_cmd::run(&config, &id),
    }
}

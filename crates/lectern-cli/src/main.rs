use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "lectern", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/lectern/lectern.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Procedure manifest with extra contracts
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Per-author post statistics
    ///
    /// Calls the `author_post_stats` procedure and prints one row per author,
    /// busiest first. Authors without posts are listed with zero totals.
    Stats,
    /// An author's most viewed post
    ///
    /// Calls the `most_popular_post` procedure. Ties on views go to the
    /// earliest published post.
    Popular {
        /// Exact author name
        author: String,
    },
    /// Call any registered procedure with text arguments
    ///
    /// Arguments are bound positionally. The result rows are validated
    /// against the procedure's declared columns before printing.
    Call {
        /// Procedure name
        name: String,
        /// Positional arguments
        args: Vec<String>,
    },
    /// List procedure contracts and deployed bodies
    Procedures,
    /// Find posts with embeddings close to a query vector
    Search {
        /// Comma-separated query vector, e.g. "0.1,0.2,0.3"
        #[arg(long)]
        vector: String,
        /// Maximum number of hits
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Store a post's embedding
    Embed {
        /// Post id
        post_id: String,
        /// Comma-separated vector
        #[arg(long)]
        vector: String,
    },
    /// Manage authors
    #[command(subcommand)]
    Author(AuthorCommand),
    /// Manage posts
    #[command(subcommand)]
    Post(PostCommand),
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, clap::Subcommand)]
enum AuthorCommand {
    /// Add an author
    Add {
        name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// List authors
    List,
}

#[derive(Debug, clap::Subcommand)]
enum PostCommand {
    /// Add a post
    Add {
        /// Existing author name
        #[arg(long)]
        author: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long, default_value_t = 0)]
        views: u64,
        /// Publication time (RFC 3339), or "now"
        #[arg(long)]
        published: Option<String>,
    },
    /// List an author's posts
    List {
        author: String,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create the config file with commented defaults
    Init,
    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli.db.clone(), cli.manifest.clone());
    logging::init(&config.logging, cli.verbose)?;

    let output = commands::Output::from_flag(cli.json);

    match cli.command {
        Commands::Config(cmd) => match cmd {
            ConfigCommand::Show => commands::config::show_config(&config)?,
            ConfigCommand::Init => commands::config::init_config()?,
            ConfigCommand::Path => commands::config::show_path(),
        },
        command => {
            // Ensure database directory exists
            if let Some(parent) = config.database_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            run(command, &config, output)?;
        }
    }

    Ok(())
}

fn run(command: Commands, config: &Config, output: commands::Output) -> Result<()> {
    match command {
        Commands::Stats => commands::stats::show_stats(config, output),
        Commands::Popular { author } => commands::stats::show_popular(config, &author, output),
        Commands::Call { name, args } => commands::call::call_procedure(config, &name, &args),
        Commands::Procedures => commands::procedures::list_procedures(config, output),
        Commands::Search { vector, limit } => {
            commands::search::search(config, &vector, limit, output)
        }
        Commands::Embed { post_id, vector } => {
            commands::search::embed(config, &post_id, &vector)
        }
        Commands::Author(AuthorCommand::Add { name, bio }) => {
            commands::post::add_author(config, name, bio)
        }
        Commands::Author(AuthorCommand::List) => commands::post::list_authors(config, output),
        Commands::Post(PostCommand::Add {
            author,
            title,
            body,
            summary,
            views,
            published,
        }) => commands::post::add_post(
            config,
            &commands::post::NewPost {
                author,
                title,
                body,
                summary,
                views,
                published,
            },
        ),
        Commands::Post(PostCommand::List { author }) => {
            commands::post::list_posts(config, &author, output)
        }
        Commands::Config(_) => Ok(()),
    }
}

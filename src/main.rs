//! CLI entry point for siteblog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "siteblog")]
#[command(version)]
#[command(about = "Marketing site server with a file-backed Markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Title of the new post
        title: String,

        /// Create a static page instead of a blog post
        #[arg(long)]
        page: bool,

        /// File name to use instead of the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List site content
    List {
        /// Type of content to list (post, page, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Export the site as static files
    #[command(alias = "g")]
    Generate,

    /// Delete the exported files
    Clean,

    /// Start the web server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "siteblog=debug,info"
    } else {
        "siteblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            siteblog::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            title,
            page,
            slug,
            tags,
        } => {
            let site = siteblog::Site::new(&base_dir)?;
            let kind = if page { "page" } else { "post" };
            tracing::info!("Creating new {} with title: {}", kind, title);
            siteblog::commands::new::create_post(&site, &title, page, slug.as_deref(), &tags)?;
        }

        Commands::List { r#type } => {
            let site = siteblog::Site::new(&base_dir)?;
            siteblog::commands::list::run(&site, &r#type)?;
        }

        Commands::Generate => {
            let site = siteblog::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            site.generate()?;
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let site = siteblog::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Server { port, ip, open } => {
            let site = siteblog::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            siteblog::server::start(&site, &ip, port, open).await?;
        }

        Commands::Version => {
            println!("siteblog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

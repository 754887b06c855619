use anyhow::Result;
use clap::{CommandFactory, Parser};
use color_eyre::config::HookBuilder;
use quickwp_core::{BulkAction, ConfigLoader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod args;
mod handlers;
mod output;
mod wizard;

use args::{FieldArgs, ListArgs, MediaArgs, MenuItemArgs, TermArgs};
use handlers::Context;

/// quickwp - WordPress content from your terminal
#[derive(Parser, Debug)]
#[command(name = "quickwp")]
#[command(version)]
#[command(about = "Manage WordPress posts, pages, media, terms and menus over the REST API", long_about = None)]
struct Cli {
    /// Site key from quick-sites.toml (falls back to the default site)
    #[arg(short, long, global = true, env = "QUICKWP_SITE")]
    site: Option<String>,

    /// Directory holding quick-config.toml and quick-sites.toml
    #[arg(long, global = true, env = "QUICKWP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// WordPress username (overrides the configured one)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Application Password (overrides the configured one)
    #[arg(long, global = true, env = "QUICKWP_APP_PASSWORD", hide_env_values = true)]
    app_password: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log HTTP traffic to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Initial setup (interactive wizard)
    Init,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage posts
    Posts {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage pages
    Pages {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage items of a custom post type
    Cpt {
        /// Post type slug (e.g. product)
        slug: String,
        /// Full collection URL, for types outside wp/v2
        #[arg(long)]
        endpoint: Option<String>,
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage the media library
    Media {
        #[command(subcommand)]
        action: MediaAction,
    },

    /// Manage taxonomy terms
    Terms {
        #[command(subcommand)]
        action: TermAction,
    },

    /// Manage navigation menus
    Menus {
        #[command(subcommand)]
        action: MenuAction,
    },

    /// List the templates available to pages or posts
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Apply one action to many posts or pages
    Bulk {
        /// Collection to act on
        #[arg(value_enum)]
        kind: BulkKind,
        /// trash, delete, publish or draft
        action: BulkAction,
        /// Item IDs (space or comma separated)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Shell completion
    Completion {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: String,
    },

    /// Diagnostics
    Doctor {
        #[command(subcommand)]
        action: DoctorAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved site configuration
    Show,
    /// Validate the configuration and the credentials
    Validate,
    /// List the configured sites
    Sites,
}

#[derive(clap::Subcommand, Debug)]
pub enum ContentAction {
    /// Create an item
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update an item
    Update {
        id: u64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show one item
    Get { id: u64 },
    /// List items
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Trash an item, or delete it permanently with --force
    Delete {
        id: u64,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum MediaAction {
    /// Upload a local file
    Upload {
        /// File to upload
        file: PathBuf,
        /// File name reported to WordPress
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: MediaArgs,
    },
    /// Show one media item
    Get { id: u64 },
    /// List media items
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update media metadata
    Update {
        id: u64,
        #[command(flatten)]
        fields: MediaArgs,
    },
    /// Delete a media item
    Delete {
        id: u64,
        /// Permanent deletion (media cannot be trashed)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        force: bool,
    },
    /// Set the featured image of a post
    Featured { post_id: u64, media_id: u64 },
}

#[derive(clap::Subcommand, Debug)]
pub enum TermAction {
    /// Create a term
    Create {
        /// Taxonomy (categories, tags or a custom one)
        taxonomy: String,
        #[command(flatten)]
        fields: TermArgs,
    },
    /// Update a term
    Update {
        taxonomy: String,
        id: u64,
        #[command(flatten)]
        fields: TermArgs,
    },
    /// Show one term
    Get { taxonomy: String, id: u64 },
    /// List terms
    List {
        taxonomy: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Delete a term
    Delete {
        taxonomy: String,
        id: u64,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        force: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum MenuAction {
    /// List theme menu locations
    Locations,
    /// Show one menu location
    Location { name: String },
    /// List navigation menus
    List,
    /// Show one navigation menu
    Get { id: u64 },
    /// List the items of a menu
    Items { menu_id: u64 },
    /// Create a navigation menu
    CreateMenu {
        name: String,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete a navigation menu
    DeleteMenu {
        id: u64,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        force: bool,
    },
    /// Add an item to a menu
    AddItem {
        menu_id: u64,
        #[command(flatten)]
        fields: MenuItemArgs,
    },
    /// Update a menu item; fields are sent as given
    UpdateItem {
        id: u64,
        #[command(flatten)]
        fields: MenuItemArgs,
    },
    /// Delete a menu item
    DeleteItem {
        id: u64,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        force: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum TemplateAction {
    /// Page templates
    Pages,
    /// Post templates
    Posts,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkKind {
    Posts,
    Pages,
}

#[derive(clap::Subcommand, Debug)]
pub enum DoctorAction {
    /// Check the installation and configuration
    Check,
    /// Test the connection to WordPress
    TestConnection,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::new(dir),
        None => ConfigLoader::from_default_dir()?,
    };
    init_tracing(cli.verbose || site_wants_debug(&loader, cli.site.as_deref()));

    let ctx = Context::new(loader, cli.site, cli.user, cli.app_password, cli.output);

    match cli.command {
        Commands::Init => handlers::handle_init(&ctx).await,
        Commands::Config { action } => handlers::handle_config(&ctx, action).await,
        Commands::Posts { action } => handlers::handle_posts(&ctx, action).await,
        Commands::Pages { action } => handlers::handle_pages(&ctx, action).await,
        Commands::Cpt { slug, endpoint, action } => {
            handlers::handle_cpt(&ctx, &slug, endpoint.as_deref(), action).await
        }
        Commands::Media { action } => handlers::handle_media(&ctx, action).await,
        Commands::Terms { action } => handlers::handle_terms(&ctx, action).await,
        Commands::Menus { action } => handlers::handle_menus(&ctx, action).await,
        Commands::Templates { action } => handlers::handle_templates(&ctx, action).await,
        Commands::Bulk { kind, action, ids } => handlers::handle_bulk(&ctx, kind, action, &ids).await,
        Commands::Completion { shell } => {
            handlers::handle_completion(&shell, &mut Cli::command()).await
        }
        Commands::Doctor { action } => handlers::handle_doctor(&ctx, action).await,
    }
}

/// `debug_http = true` on the selected site turns on HTTP logging.
fn site_wants_debug(loader: &ConfigLoader, site: Option<&str>) -> bool {
    loader
        .resolve_site_key(site)
        .and_then(|key| loader.site_config(&key))
        .map(|config| config.debug_http())
        .unwrap_or(false)
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "warn,quickwp=debug,quickwp_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

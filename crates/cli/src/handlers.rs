//! Command handlers for quickwp CLI

use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, Shell as ClapShell};
use indicatif::{ProgressBar, ProgressStyle};
use quickwp_core::{
    error_message, parse_id_list, run_bulk_with, validate_site_config, BulkAction, ConfigLoader,
    ContentOps, ListParams, QuickWp, DEFAULT_TEMPLATE_LABEL,
};
use serde_json::json;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::warn;

use crate::args::join_ids;
use crate::output::{
    content_rows, location_rows, media_rows, menu_item_rows, menu_rows, print_deleted, print_item,
    print_json, print_list, print_saved, require_success, term_rows,
};
use crate::wizard::run_init_wizard;
use crate::{
    BulkKind, ConfigAction, ContentAction, DoctorAction, MediaAction, MenuAction, OutputFormat,
    TemplateAction, TermAction,
};

const CONTENT_KEYS: [&str; 10] = [
    "id", "title", "status", "type", "slug", "date", "modified", "link", "template", "parent",
];
const MEDIA_KEYS: [&str; 8] = [
    "id", "title", "media_type", "mime_type", "alt_text", "caption", "post", "source_url",
];
const TERM_KEYS: [&str; 7] = ["id", "name", "slug", "taxonomy", "description", "parent", "count"];
const MENU_ITEM_KEYS: [&str; 8] = ["id", "title", "url", "type", "object", "object_id", "parent", "menu_order"];

/// Global options shared by every command
pub struct Context {
    loader: ConfigLoader,
    site: Option<String>,
    user: Option<String>,
    app_password: Option<String>,
    output: OutputFormat,
}

impl Context {
    pub fn new(
        loader: ConfigLoader,
        site: Option<String>,
        user: Option<String>,
        app_password: Option<String>,
        output: OutputFormat,
    ) -> Self {
        Self {
            loader,
            site,
            user,
            app_password,
            output,
        }
    }

    /// The selected site with command line credentials applied.
    pub fn open(&self) -> Result<QuickWp> {
        let site = QuickWp::from_loader(&self.loader, self.site.as_deref())?;
        Ok(site.with_credentials(self.user.as_deref(), self.app_password.as_deref()))
    }
}

/// Handle init command
pub async fn handle_init(ctx: &Context) -> Result<()> {
    run_init_wizard(&ctx.loader).await
}

/// Handle config commands
pub async fn handle_config(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let site = ctx.open()?;
            let config = site.config();

            if ctx.output == OutputFormat::Json {
                return print_json(&json!({
                    "site": site.key(),
                    "label": config.label(),
                    "posts_endpoint": config.posts_endpoint(),
                    "pages_endpoint": config.pages_endpoint(),
                    "media_endpoint": config.media_endpoint(),
                    "categories_endpoint": config.categories_endpoint(),
                    "tags_endpoint": config.tags_endpoint(),
                    "wp_username": config.username(),
                    "verify_ssl": config.verify_ssl(),
                    "debug_http": config.debug_http(),
                    "access_mode": config.access_mode().as_str(),
                    "cpt_default_slug": config.cpt_default_slug(),
                }));
            }

            println!("Current configuration:");
            println!();
            if site.key().is_empty() {
                println!("Site: (base configuration)");
            } else {
                println!("Site: {} ({})", site.key(), ctx.loader.site_label(site.key())?);
            }
            println!("  Files: {}", ctx.loader.base_dir().display());
            println!();
            println!("Endpoints:");
            println!("  Posts:      {}", or_unset(config.posts_endpoint()));
            println!("  Pages:      {}", or_unset(config.pages_endpoint()));
            println!("  Media:      {}", or_unset(&config.media_endpoint()));
            println!("  Categories: {}", or_unset(&config.categories_endpoint()));
            println!("  Tags:       {}", or_unset(&config.tags_endpoint()));
            println!();
            println!("Auth:");
            println!("  Username:     {}", or_unset(config.username()));
            println!(
                "  App password: {}",
                if config.app_password().is_empty() { "(not set)" } else { "********" }
            );
            println!("  Verify SSL:   {}", config.verify_ssl());
            println!("  Access gate:  {}", config.access_mode());
            println!();
            println!("Default post type: {}", config.cpt_default_slug());

            Ok(())
        }
        ConfigAction::Validate => {
            println!("Validating configuration...");

            let site = ctx.open()?;
            validate_site_config(site.config())?;
            println!("  ✅ Valid configuration format");

            println!("  Testing WordPress credentials...");
            let response = require_success(
                site.posts().list(&ListParams::new().per_page(1).status("any")).await,
            )?;
            println!("  ✅ Credentials accepted (HTTP {})", response.status);

            Ok(())
        }
        ConfigAction::Sites => {
            let sites = ctx.loader.sites()?;
            if sites.is_empty() {
                println!("No sites configured in {}", ctx.loader.sites_config_path().display());
                return Ok(());
            }
            let default_key = ctx.loader.default_site_key()?;

            #[derive(Tabled)]
            struct SiteRow {
                key: String,
                label: String,
                posts_endpoint: String,
                default: String,
            }

            let mut rows = Vec::new();
            for key in sites.keys() {
                rows.push(SiteRow {
                    key: key.clone(),
                    label: ctx.loader.site_label(key)?,
                    posts_endpoint: ctx.loader.site_config(key)?.posts_endpoint().to_string(),
                    default: if *key == default_key { "*".to_string() } else { String::new() },
                });
            }

            if ctx.output == OutputFormat::Json {
                let list: Vec<_> = rows
                    .iter()
                    .map(|r| json!({"key": r.key, "label": r.label, "posts_endpoint": r.posts_endpoint, "default": !r.default.is_empty()}))
                    .collect();
                return print_json(&json!(list));
            }
            println!("{}", Table::new(rows));

            Ok(())
        }
    }
}

/// Handle posts commands
pub async fn handle_posts(ctx: &Context, action: ContentAction) -> Result<()> {
    let site = ctx.open()?;
    handle_content(ctx.output, &site.posts(), action).await
}

/// Handle pages commands
pub async fn handle_pages(ctx: &Context, action: ContentAction) -> Result<()> {
    let site = ctx.open()?;
    handle_content(ctx.output, &site.pages(), action).await
}

/// Handle custom post type commands
pub async fn handle_cpt(
    ctx: &Context,
    slug: &str,
    endpoint: Option<&str>,
    action: ContentAction,
) -> Result<()> {
    let site = ctx.open()?;
    handle_content(ctx.output, &site.cpt().items(slug, endpoint), action).await
}

async fn handle_content<O: ContentOps + ?Sized>(
    format: OutputFormat,
    ops: &O,
    action: ContentAction,
) -> Result<()> {
    match action {
        ContentAction::Create { fields } => {
            let response = require_success(ops.create(&fields.to_fields()?).await)?;
            print_saved(format, "Created", &response)
        }
        ContentAction::Update { id, fields } => {
            let response = require_success(ops.update(id, &fields.to_fields()?).await)?;
            print_saved(format, "Updated", &response)
        }
        ContentAction::Get { id } => {
            let response = require_success(ops.get(id).await)?;
            print_item(format, &response, &CONTENT_KEYS)
        }
        ContentAction::List { list } => {
            let response = require_success(ops.list(&list.to_params()?).await)?;
            print_list(format, &response, content_rows)
        }
        ContentAction::Delete { id, force } => {
            let response = require_success(ops.delete(id, force).await)?;
            let verb = if force { "Deleted" } else { "Trashed" };
            print_deleted(format, &response, &format!("{} #{}", verb, id))
        }
    }
}

/// Handle media commands
pub async fn handle_media(ctx: &Context, action: MediaAction) -> Result<()> {
    let site = ctx.open()?;
    let media = site.media();

    match action {
        MediaAction::Upload { file, name, fields } => {
            let upload = site.client().uploads().stage(&file, name.as_deref())?;

            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Uploading {} ({})...", upload.name, upload.mime));

            let result = media.upload(&upload, &fields.to_fields()).await;
            pb.finish_and_clear();

            if let Err(e) = site.client().uploads().release(&upload) {
                warn!(error = %e, "failed to remove staged upload");
            }

            let response = require_success(result)?;
            print_saved(ctx.output, "Uploaded", &response)
        }
        MediaAction::Get { id } => {
            let response = require_success(media.get(id).await)?;
            print_item(ctx.output, &response, &MEDIA_KEYS)
        }
        MediaAction::List { list } => {
            let response = require_success(media.list(&list.to_params()?).await)?;
            print_list(ctx.output, &response, media_rows)
        }
        MediaAction::Update { id, fields } => {
            let response = require_success(media.update(id, &fields.to_fields()).await)?;
            print_saved(ctx.output, "Updated", &response)
        }
        MediaAction::Delete { id, force } => {
            let response = require_success(media.delete(id, force).await)?;
            print_deleted(ctx.output, &response, &format!("Media #{} deleted", id))
        }
        MediaAction::Featured { post_id, media_id } => {
            require_success(media.set_featured_image(post_id, media_id).await)?;
            println!("  ✅ Featured image of post #{} set to media #{}", post_id, media_id);
            Ok(())
        }
    }
}

/// Handle taxonomy term commands
pub async fn handle_terms(ctx: &Context, action: TermAction) -> Result<()> {
    let site = ctx.open()?;
    let terms = site.taxonomy();

    match action {
        TermAction::Create { taxonomy, fields } => {
            let response = require_success(terms.create(&taxonomy, &fields.to_fields()?).await)?;
            print_saved(ctx.output, "Created", &response)
        }
        TermAction::Update { taxonomy, id, fields } => {
            let response =
                require_success(terms.update(&taxonomy, id, &fields.to_fields()?).await)?;
            print_saved(ctx.output, "Updated", &response)
        }
        TermAction::Get { taxonomy, id } => {
            let response = require_success(terms.get(&taxonomy, id).await)?;
            print_item(ctx.output, &response, &TERM_KEYS)
        }
        TermAction::List { taxonomy, list } => {
            let response = require_success(terms.list(&taxonomy, &list.to_params()?).await)?;
            print_list(ctx.output, &response, term_rows)
        }
        TermAction::Delete { taxonomy, id, force } => {
            let response = require_success(terms.delete(&taxonomy, id, force).await)?;
            print_deleted(ctx.output, &response, &format!("Term #{} deleted from {}", id, taxonomy))
        }
    }
}

/// Handle navigation menu commands
pub async fn handle_menus(ctx: &Context, action: MenuAction) -> Result<()> {
    let site = ctx.open()?;
    let menus = site.menus();

    match action {
        MenuAction::Locations => {
            let response = require_success(menus.menu_locations().await)?;
            let body = response.body.unwrap_or_default();
            if ctx.output == OutputFormat::Json {
                return print_json(&body);
            }
            let rows = location_rows(&body);
            if rows.is_empty() {
                println!("  (no menu locations registered by the theme)");
            } else {
                println!("{}", Table::new(rows));
            }
            Ok(())
        }
        MenuAction::Location { name } => {
            let response = require_success(menus.menu_location(&name).await)?;
            print_item(ctx.output, &response, &["name", "description", "menu"])
        }
        MenuAction::List => {
            let response = require_success(menus.nav_menus().await)?;
            print_list(ctx.output, &response, menu_rows)
        }
        MenuAction::Get { id } => {
            let response = require_success(menus.nav_menu(id).await)?;
            print_item(ctx.output, &response, &["id", "name", "slug", "description", "count"])
        }
        MenuAction::Items { menu_id } => {
            let response = require_success(menus.menu_items(menu_id).await)?;
            print_list(ctx.output, &response, menu_item_rows)
        }
        MenuAction::CreateMenu { name, slug } => {
            let response = require_success(menus.create_nav_menu(&name, slug.as_deref()).await)?;
            print_saved(ctx.output, "Created menu", &response)
        }
        MenuAction::DeleteMenu { id, force } => {
            let response = require_success(menus.delete_nav_menu(id, force).await)?;
            print_deleted(ctx.output, &response, &format!("Menu #{} deleted", id))
        }
        MenuAction::AddItem { menu_id, fields } => {
            let response =
                require_success(menus.create_menu_item(menu_id, &fields.to_fields()?).await)?;
            print_saved(ctx.output, "Added menu item", &response)
        }
        MenuAction::UpdateItem { id, fields } => {
            let response = require_success(menus.update_menu_item(id, &fields.to_fields()?).await)?;
            print_item(ctx.output, &response, &MENU_ITEM_KEYS)
        }
        MenuAction::DeleteItem { id, force } => {
            let response = require_success(menus.delete_menu_item(id, force).await)?;
            print_deleted(ctx.output, &response, &format!("Menu item #{} deleted", id))
        }
    }
}

/// Handle template listing
pub async fn handle_templates(ctx: &Context, action: TemplateAction) -> Result<()> {
    let site = ctx.open()?;
    let resolver = site.templates();
    let templates = match action {
        TemplateAction::Pages => resolver.page_templates().await,
        TemplateAction::Posts => resolver.post_templates().await,
    };

    if ctx.output == OutputFormat::Json {
        return print_json(&serde_json::to_value(&templates)?);
    }

    #[derive(Tabled)]
    struct TemplateRow {
        file: String,
        label: String,
    }

    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|(file, label)| TemplateRow {
            file: if file.is_empty() { "(default)".to_string() } else { file.clone() },
            label: label.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));

    if templates.len() == 1 && templates.get("").map(String::as_str) == Some(DEFAULT_TEMPLATE_LABEL) {
        println!("  Only the default template is available for this site.");
    }
    Ok(())
}

/// Handle bulk actions
pub async fn handle_bulk(
    ctx: &Context,
    kind: BulkKind,
    action: BulkAction,
    ids: &[String],
) -> Result<()> {
    let ids = parse_id_list(&join_ids(ids));
    if ids.is_empty() {
        return Err(anyhow!("No valid IDs given"));
    }

    let site = ctx.open()?;
    match kind {
        BulkKind::Posts => bulk_on(ctx.output, &site.posts(), action, &ids).await,
        BulkKind::Pages => bulk_on(ctx.output, &site.pages(), action, &ids).await,
    }
}

async fn bulk_on<O: ContentOps + ?Sized>(
    format: OutputFormat,
    ops: &O,
    action: BulkAction,
    ids: &[u64],
) -> Result<()> {
    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("{}...", action));

    let mut failures = Vec::new();
    let tally = run_bulk_with(ops, action, ids, |id, result| {
        pb.inc(1);
        if result.is_err() {
            failures.push((id, error_message(result)));
        }
    })
    .await;
    pb.finish_and_clear();

    if format == OutputFormat::Json {
        print_json(&json!({
            "action": action.as_str(),
            "success": tally.success,
            "failed": tally.failed,
            "errors": failures
                .iter()
                .map(|(id, message)| json!({"id": id, "message": message}))
                .collect::<Vec<_>>(),
        }))?;
    } else {
        println!("  ✅ {} item(s) {}", tally.success, action.past_tense());
        for (id, message) in &failures {
            println!("  ❌ #{}: {}", id, message);
        }
    }

    if tally.failed > 0 {
        return Err(anyhow!("{} of {} item(s) failed", tally.failed, tally.attempted()));
    }
    Ok(())
}

/// Handle doctor commands
pub async fn handle_doctor(ctx: &Context, action: DoctorAction) -> Result<()> {
    match action {
        DoctorAction::Check => {
            println!("Checking quickwp installation...");

            println!("  ✅ quickwp is installed");
            println!("  Version: {}", env!("CARGO_PKG_VERSION"));
            println!("  Config directory: {}", ctx.loader.base_dir().display());

            if ctx.loader.base_config_exists() {
                println!("  ✅ Base configuration found");
            } else {
                println!("  ⚠️  Base configuration not found (run 'quickwp init')");
            }

            let sites = ctx.loader.sites()?;
            if !sites.is_empty() {
                println!("  ✅ {} site(s) configured", sites.len());
            }

            let site = ctx.open()?;
            match validate_site_config(site.config()) {
                Ok(()) => println!("  ✅ Configuration valid"),
                Err(e) => println!("  ⚠️  {}", e),
            }
            if !site.config().verify_ssl() {
                println!("  ⚠️  TLS certificate verification is disabled");
            }

            Ok(())
        }
        DoctorAction::TestConnection => {
            println!("Testing WordPress connection...");

            let site = ctx.open()?;
            validate_site_config(site.config())?;

            let probe = ListParams::new().per_page(1);
            let posts = require_success(site.posts().list(&probe).await)?;
            println!(
                "  ✅ Posts endpoint OK ({} post(s))",
                posts.total().map(|t| t.to_string()).unwrap_or_else(|| "?".to_string())
            );

            match site.pages().list(&probe).await {
                Ok(_) => println!("  ✅ Pages endpoint OK"),
                Err(e) => println!("  ⚠️  Pages endpoint: {}", error_message(&Err(e))),
            }
            match site.media().list(&probe).await {
                Ok(_) => println!("  ✅ Media endpoint OK"),
                Err(e) => println!("  ⚠️  Media endpoint: {}", error_message(&Err(e))),
            }

            println!();
            println!("  ✅ WordPress is reachable!");

            Ok(())
        }
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Handle shell completion generation
pub async fn handle_completion(shell: &str, cmd: &mut Command) -> Result<()> {
    use std::io;

    let clap_shell = match shell {
        "bash" => ClapShell::Bash,
        "zsh" => ClapShell::Zsh,
        "fish" => ClapShell::Fish,
        "elvish" => ClapShell::Elvish,
        "powershell" | "pwsh" => ClapShell::PowerShell,
        _ => {
            return Err(anyhow!(
                "Unsupported shell: {}\nSupported shells: bash, zsh, fish, elvish, powershell",
                shell
            ));
        }
    };

    generate(clap_shell, cmd, "quickwp", &mut io::stdout());

    eprintln!();
    eprintln!("Installation:");
    match shell {
        "bash" => eprintln!("  quickwp completion bash > ~/.local/share/bash-completion/completions/quickwp"),
        "zsh" => eprintln!("  quickwp completion zsh > ~/.zsh/completion/_quickwp"),
        "fish" => eprintln!("  quickwp completion fish > ~/.config/fish/completions/quickwp.fish"),
        "elvish" => eprintln!("  quickwp completion elvish > ~/.elvish/lib/quickwp.elv"),
        _ => eprintln!("  quickwp completion powershell > $PROFILE"),
    }

    Ok(())
}

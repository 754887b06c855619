//! Interactive setup wizard for quickwp configuration

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use quickwp_core::{error_message, ConfigLoader, ContentOps, ListParams, QuickWp, RestClient, SiteConfig};
use std::time::Duration;

/// Run the interactive setup wizard
pub async fn run_init_wizard(loader: &ConfigLoader) -> Result<()> {
    println!("🚀 Welcome to quickwp setup!\n");

    println!("This wizard writes {}.", loader.base_config_path().display());
    println!("You will need:");
    println!("  1. The posts endpoint of your site (https://example.com/wp-json/wp/v2/posts)");
    println!("  2. A WordPress username");
    println!("  3. An Application Password (Users > Profile > Application Passwords)\n");

    if loader.base_config_exists() {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("A configuration already exists. Overwrite it?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("❌ Configuration cancelled");
            return Ok(());
        }
    }

    let posts_endpoint = prompt_posts_endpoint()?;
    let username = prompt_username()?;
    let app_password = prompt_app_password()?;

    let verify_ssl = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Verify TLS certificates?")
        .default(true)
        .interact()?;

    let label: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Site label (optional)")
        .allow_empty(true)
        .interact_text()?;

    let config = build_config(&posts_endpoint, &username, &app_password, verify_ssl, &label);

    // Summary
    println!("\n📋 Configuration summary:");
    println!("  Posts endpoint: {}", config.posts_endpoint());
    println!("  Pages endpoint: {}", config.pages_endpoint());
    println!("  Media endpoint: {}", config.media_endpoint());
    println!("  Username: {}", config.username());
    println!("  Verify SSL: {}", config.verify_ssl());

    let test = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Test the connection before saving?")
        .default(true)
        .interact()?;
    if test {
        test_connection(&config).await?;
    }

    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save this configuration?")
        .default(false)
        .interact()?;

    if !confirm {
        println!("❌ Configuration cancelled");
        return Ok(());
    }

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Saving configuration...");

    let path = loader.write_base_config(&config)?;

    pb.inc(1);
    pb.finish_with_message("✅ Configuration saved!");

    println!("\n🎉 Setup complete!");
    println!("\nConfiguration saved to: {}", path.display());
    println!("\nYou can now use quickwp:");
    println!("  $ quickwp posts list");
    println!("  $ quickwp pages create --title \"About\" --status draft");
    println!("  $ quickwp config show");

    Ok(())
}

/// The site configuration collected by the wizard
fn build_config(
    posts_endpoint: &str,
    username: &str,
    app_password: &str,
    verify_ssl: bool,
    label: &str,
) -> SiteConfig {
    let config = SiteConfig::new(posts_endpoint.trim())
        .with_credentials(Some(username.trim()), Some(app_password.trim()))
        .with_verify_ssl(verify_ssl);
    if label.trim().is_empty() {
        config
    } else {
        config.with_label(label.trim())
    }
}

async fn test_connection(config: &SiteConfig) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Contacting WordPress...");

    let site = QuickWp::new(config.clone(), RestClient::new()?);
    let result = site.posts().list(&ListParams::new().per_page(1)).await;
    pb.finish_and_clear();

    match &result {
        Ok(response) => println!("  ✅ Connected (HTTP {})", response.status),
        Err(_) => println!("  ⚠️  Warning: {}", error_message(&result)),
    }
    Ok(())
}

/// Prompt for the posts endpoint
fn prompt_posts_endpoint() -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Posts endpoint")
        .validate_with(|input: &String| -> Result<(), &str> {
            let input = input.trim();
            if input.is_empty() {
                Err("Posts endpoint cannot be empty")
            } else if !input.starts_with("http://") && !input.starts_with("https://") {
                Err("Posts endpoint must start with http:// or https://")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get posts endpoint: {}", e))
}

/// Prompt for the WordPress username
fn prompt_username() -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt("WordPress username")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Username cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get username: {}", e))
}

/// Prompt for the Application Password
fn prompt_app_password() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Application Password")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Application Password cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to get Application Password: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_config_derives_endpoints() {
        let config = build_config(
            " https://x.test/wp-json/wp/v2/posts ",
            "editor",
            "abcd efgh",
            false,
            "",
        );

        assert_eq!(config.posts_endpoint(), "https://x.test/wp-json/wp/v2/posts");
        assert_eq!(config.pages_endpoint(), "https://x.test/wp-json/wp/v2/pages");
        assert_eq!(config.username(), "editor");
        assert_eq!(config.app_password(), "abcd efgh");
        assert!(!config.verify_ssl());
    }

    #[test]
    fn test_wizard_config_round_trips_through_loader() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(dir.path());
        let config = build_config("https://x.test/wp-json/wp/v2/posts", "editor", "pw", true, "Blog");

        loader.write_base_config(&config).unwrap();
        let loaded = loader.site_config("").unwrap();

        assert_eq!(loaded.label(), "Blog");
        assert_eq!(loaded.posts_endpoint(), config.posts_endpoint());
        assert!(loaded.has_credentials());
    }
}

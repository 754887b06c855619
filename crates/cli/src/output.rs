//! Rendering of WordPress REST items for the terminal

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use console::style;
use quickwp_core::{error_message, RequestResult, RestResponse};
use serde_json::Value;
use tabled::{Table, Tabled};

use crate::OutputFormat;

const MAX_CELL: usize = 60;

/// The response of a successful call, or its error message.
pub fn require_success(result: RequestResult) -> Result<RestResponse> {
    match result {
        Ok(response) => Ok(response),
        Err(error) => Err(anyhow!(error_message(&Err(error)))),
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `body` as JSON, or as a table built by `rows` with an optional
/// pagination footer.
pub fn print_list<R: Tabled>(
    format: OutputFormat,
    response: &RestResponse,
    rows: impl Fn(&[Value]) -> Vec<R>,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(response.body.as_ref().unwrap_or(&Value::Null));
    }

    let items = response.items();
    if items.is_empty() {
        println!("  (no items)");
        return Ok(());
    }
    println!("{}", Table::new(rows(items)));

    if let Some(total) = response.total() {
        let pages = response.total_pages().unwrap_or(1);
        println!("  {} item(s) on {} page(s)", total, pages);
    }
    Ok(())
}

/// Print the created or updated resource: its ID and link, or the JSON body.
pub fn print_saved(format: OutputFormat, verb: &str, response: &RestResponse) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(response.body.as_ref().unwrap_or(&Value::Null));
    }

    match response.id() {
        Some(id) => println!("  ✅ {} #{}", verb, id),
        None => println!("  ✅ {}", verb),
    }
    if let Some(link) = response.link() {
        println!("  {}", style(link).cyan());
    }
    Ok(())
}

/// Confirmation of a deletion: the reply body as JSON, or `message`.
pub fn render_deleted(format: OutputFormat, response: &RestResponse, message: &str) -> Result<String> {
    if format == OutputFormat::Json {
        let body = response.body.as_ref().unwrap_or(&Value::Null);
        return Ok(serde_json::to_string_pretty(body)?);
    }
    Ok(format!("  ✅ {}", message))
}

pub fn print_deleted(format: OutputFormat, response: &RestResponse, message: &str) -> Result<()> {
    println!("{}", render_deleted(format, response, message)?);
    Ok(())
}

/// Print one resource as `key: value` lines.
pub fn print_item(format: OutputFormat, response: &RestResponse, keys: &[&str]) -> Result<()> {
    let body = response.body.as_ref().unwrap_or(&Value::Null);
    if format == OutputFormat::Json {
        return print_json(body);
    }

    for key in keys {
        let value = text(body, key);
        if !value.is_empty() {
            println!("  {:<16} {}", format!("{}:", key), value);
        }
    }
    Ok(())
}

/// `item[key].rendered` for WordPress rendered fields, else `item[key]` as text.
pub fn text(item: &Value, key: &str) -> String {
    let value = match item.get(key) {
        Some(value) => value,
        None => return String::new(),
    };
    let value = value.get("rendered").unwrap_or(value);
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell(item: &Value, key: &str) -> String {
    let value = text(item, key);
    if value.chars().count() > MAX_CELL {
        let cut: String = value.chars().take(MAX_CELL - 1).collect();
        format!("{}…", cut)
    } else {
        value
    }
}

/// WordPress site-local dates (`2024-03-01T09:30:00`) as `2024-03-01 09:30`.
fn short_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Tabled)]
pub struct ContentRow {
    id: String,
    title: String,
    status: String,
    date: String,
}

pub fn content_rows(items: &[Value]) -> Vec<ContentRow> {
    items
        .iter()
        .map(|item| ContentRow {
            id: text(item, "id"),
            title: cell(item, "title"),
            status: text(item, "status"),
            date: short_date(&text(item, "date")),
        })
        .collect()
}

#[derive(Tabled)]
pub struct MediaRow {
    id: String,
    title: String,
    mime_type: String,
    source_url: String,
}

pub fn media_rows(items: &[Value]) -> Vec<MediaRow> {
    items
        .iter()
        .map(|item| MediaRow {
            id: text(item, "id"),
            title: cell(item, "title"),
            mime_type: text(item, "mime_type"),
            source_url: cell(item, "source_url"),
        })
        .collect()
}

#[derive(Tabled)]
pub struct TermRow {
    id: String,
    name: String,
    slug: String,
    parent: String,
    count: String,
}

pub fn term_rows(items: &[Value]) -> Vec<TermRow> {
    items
        .iter()
        .map(|item| TermRow {
            id: text(item, "id"),
            name: cell(item, "name"),
            slug: text(item, "slug"),
            parent: text(item, "parent"),
            count: text(item, "count"),
        })
        .collect()
}

#[derive(Tabled)]
pub struct MenuRow {
    id: String,
    name: String,
    slug: String,
    locations: String,
}

pub fn menu_rows(items: &[Value]) -> Vec<MenuRow> {
    items
        .iter()
        .map(|item| MenuRow {
            id: text(item, "id"),
            name: cell(item, "name"),
            slug: text(item, "slug"),
            locations: item
                .get("locations")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Tabled)]
pub struct MenuItemRow {
    id: String,
    title: String,
    url: String,
    parent: String,
    order: String,
}

pub fn menu_item_rows(items: &[Value]) -> Vec<MenuItemRow> {
    items
        .iter()
        .map(|item| MenuItemRow {
            id: text(item, "id"),
            title: cell(item, "title"),
            url: cell(item, "url"),
            parent: text(item, "parent"),
            order: text(item, "menu_order"),
        })
        .collect()
}

#[derive(Tabled)]
pub struct LocationRow {
    name: String,
    description: String,
    menu: String,
}

/// Menu locations come back as an object keyed by location name.
pub fn location_rows(body: &Value) -> Vec<LocationRow> {
    let Some(locations) = body.as_object() else {
        return Vec::new();
    };
    locations
        .iter()
        .map(|(name, location)| LocationRow {
            name: name.clone(),
            description: text(location, "description"),
            menu: text(location, "menu"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reads_rendered_fields() {
        let item = json!({"id": 5, "title": {"rendered": "Hello"}, "slug": "hello", "sticky": false});
        assert_eq!(text(&item, "id"), "5");
        assert_eq!(text(&item, "title"), "Hello");
        assert_eq!(text(&item, "slug"), "hello");
        assert_eq!(text(&item, "sticky"), "false");
        assert_eq!(text(&item, "missing"), "");
    }

    #[test]
    fn test_deleted_json_is_the_reply_body() {
        let response = RestResponse::new(
            200,
            r#"{"deleted":true,"previous":{"id":7}}"#.to_string(),
            Default::default(),
        );

        let json_out = render_deleted(OutputFormat::Json, &response, "Media #7 deleted").unwrap();
        assert!(!json_out.contains("✅"));
        let parsed: Value = serde_json::from_str(&json_out).unwrap();
        assert_eq!(parsed["deleted"], Value::Bool(true));
        assert_eq!(parsed["previous"]["id"], 7);

        let text_out = render_deleted(OutputFormat::Table, &response, "Media #7 deleted").unwrap();
        assert_eq!(text_out, "  ✅ Media #7 deleted");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2024-03-01T09:30:00"), "2024-03-01 09:30");
        assert_eq!(short_date("yesterday"), "yesterday");
        assert_eq!(short_date(""), "");
    }

    #[test]
    fn test_long_cells_are_cut() {
        let long = "x".repeat(100);
        let item = json!({"title": long});
        let value = cell(&item, "title");
        assert_eq!(value.chars().count(), MAX_CELL);
        assert!(value.ends_with('…'));
    }

    #[test]
    fn test_location_rows() {
        let body = json!({
            "primary": {"name": "primary", "description": "Main menu", "menu": 3},
            "footer": {"name": "footer", "description": "Footer", "menu": 0}
        });
        let rows = location_rows(&body);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.name == "primary" && r.menu == "3"));
        assert!(location_rows(&json!([])).is_empty());
    }

    #[test]
    fn test_require_success_reports_message() {
        let result: RequestResult = Err(quickwp_core::RequestError::config("Posts endpoint not configured."));
        let err = require_success(result).unwrap_err();
        assert_eq!(err.to_string(), "Posts endpoint not configured.");
    }

    #[test]
    fn test_menu_rows_join_locations() {
        let items = vec![json!({"id": 2, "name": "Main", "slug": "main", "locations": ["primary", "mobile"]})];
        let rows = menu_rows(&items);
        assert_eq!(rows[0].locations, "primary, mobile");
    }
}

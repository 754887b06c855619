//! Command line arguments turned into request fields and list parameters

use anyhow::{anyhow, Result};
use clap::Args;
use quickwp_core::{Fields, ListParams};
use serde_json::{Map, Value};

/// Fields shared by posts, pages and custom post types
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    /// publish, draft, pending, private or future
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    /// Publication date (ISO 8601)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub author: Option<u64>,
    #[arg(long)]
    pub featured_media: Option<u64>,
    /// Category IDs, comma separated
    #[arg(long)]
    pub categories: Option<String>,
    /// Tag IDs, comma separated
    #[arg(long)]
    pub tags: Option<String>,
    /// Template file name
    #[arg(long)]
    pub template: Option<String>,
    /// Parent page ID (pages)
    #[arg(long)]
    pub parent: Option<u64>,
    /// Menu order (pages)
    #[arg(long)]
    pub menu_order: Option<i64>,
    /// Meta entry as key=value, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
    /// Any other field as key=value, repeatable; JSON values are decoded
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub extra: Vec<String>,
}

impl FieldArgs {
    pub fn to_fields(&self) -> Result<Fields> {
        let mut fields = Fields::new();
        apply_extra(&mut fields, &self.extra)?;

        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "content", &self.content);
        put_str(&mut fields, "excerpt", &self.excerpt);
        put_str(&mut fields, "status", &self.status);
        put_str(&mut fields, "slug", &self.slug);
        put_str(&mut fields, "date", &self.date);
        put_str(&mut fields, "categories", &self.categories);
        put_str(&mut fields, "tags", &self.tags);
        put_str(&mut fields, "template", &self.template);
        put_num(&mut fields, "author", self.author);
        put_num(&mut fields, "featured_media", self.featured_media);
        put_num(&mut fields, "parent", self.parent);
        if let Some(order) = self.menu_order {
            fields.insert("menu_order".to_string(), Value::from(order));
        }

        if !self.meta.is_empty() {
            let mut meta = Map::new();
            for entry in &self.meta {
                let (key, value) = parse_key_value(entry)?;
                meta.insert(key, value);
            }
            fields.insert("meta".to_string(), Value::Object(meta));
        }

        Ok(fields)
    }
}

/// Paging and filtering for list commands
#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Any other query parameter as key=value, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl ListArgs {
    pub fn to_params(&self) -> Result<ListParams> {
        let mut params = ListParams::new();
        if let Some(per_page) = self.per_page {
            params = params.per_page(per_page);
        }
        if let Some(page) = self.page {
            params = params.page(page);
        }
        if let Some(search) = &self.search {
            params = params.search(search.as_str());
        }
        if let Some(status) = &self.status {
            params = params.status(status.as_str());
        }
        for entry in &self.params {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected key=value, got '{}'", entry))?;
            params = params.set(key.trim(), value.trim());
        }
        Ok(params)
    }
}

/// Media metadata
#[derive(Args, Debug, Default, Clone)]
pub struct MediaArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub alt_text: Option<String>,
    #[arg(long)]
    pub caption: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Attach to this post ID
    #[arg(long)]
    pub post: Option<u64>,
}

impl MediaArgs {
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "alt_text", &self.alt_text);
        put_str(&mut fields, "caption", &self.caption);
        put_str(&mut fields, "description", &self.description);
        put_num(&mut fields, "post", self.post);
        fields
    }
}

/// Term fields
#[derive(Args, Debug, Default, Clone)]
pub struct TermArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Parent term ID (hierarchical taxonomies)
    #[arg(long)]
    pub parent: Option<u64>,
    /// Meta entry as key=value, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

impl TermArgs {
    pub fn to_fields(&self) -> Result<Fields> {
        let mut fields = Fields::new();
        put_str(&mut fields, "name", &self.name);
        put_str(&mut fields, "slug", &self.slug);
        put_str(&mut fields, "description", &self.description);
        put_num(&mut fields, "parent", self.parent);
        if !self.meta.is_empty() {
            let mut meta = Map::new();
            for entry in &self.meta {
                let (key, value) = parse_key_value(entry)?;
                meta.insert(key, value);
            }
            fields.insert("meta".to_string(), Value::Object(meta));
        }
        Ok(fields)
    }
}

/// Menu item fields
#[derive(Args, Debug, Default, Clone)]
pub struct MenuItemArgs {
    #[arg(long)]
    pub title: Option<String>,
    /// Custom link target; sets the item type to custom
    #[arg(long)]
    pub url: Option<String>,
    /// post_type, taxonomy or custom
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Linked object (page, post, category...)
    #[arg(long)]
    pub object: Option<String>,
    #[arg(long)]
    pub object_id: Option<u64>,
    #[arg(long)]
    pub parent: Option<u64>,
    #[arg(long)]
    pub menu_order: Option<i64>,
    /// Link target, e.g. _blank
    #[arg(long)]
    pub target: Option<String>,
    /// Any other field as key=value, repeatable; JSON values are decoded
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub extra: Vec<String>,
}

impl MenuItemArgs {
    pub fn to_fields(&self) -> Result<Fields> {
        let mut fields = Fields::new();
        apply_extra(&mut fields, &self.extra)?;
        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "url", &self.url);
        put_str(&mut fields, "type", &self.kind);
        put_str(&mut fields, "object", &self.object);
        put_str(&mut fields, "target", &self.target);
        put_num(&mut fields, "object_id", self.object_id);
        put_num(&mut fields, "parent", self.parent);
        if let Some(order) = self.menu_order {
            fields.insert("menu_order".to_string(), Value::from(order));
        }
        Ok(fields)
    }
}

/// Split `key=value`; the value is decoded as JSON when it parses, else kept
/// as a string.
pub fn parse_key_value(entry: &str) -> Result<(String, Value)> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected key=value, got '{}'", entry))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Empty key in '{}'", entry));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw));
    Ok((key.to_string(), value))
}

/// Join positional ID arguments into one list; `"3,4" 5` gives `[3, 4, 5]`.
pub fn join_ids(ids: &[String]) -> Value {
    Value::from(ids.join(","))
}

fn apply_extra(fields: &mut Fields, extra: &[String]) -> Result<()> {
    for entry in extra {
        let (key, value) = parse_key_value(entry)?;
        fields.insert(key, value);
    }
    Ok(())
}

fn put_str(fields: &mut Fields, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::from(value.as_str()));
    }
}

fn put_num(fields: &mut Fields, key: &str, value: Option<u64>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickwp_core::parse_id_list;
    use serde_json::json;

    #[test]
    fn test_field_args_to_fields() {
        let args = FieldArgs {
            title: Some("Hello".to_string()),
            status: Some("draft".to_string()),
            categories: Some("1,2".to_string()),
            parent: Some(4),
            meta: vec!["seo_title=Hi".to_string(), "views=12".to_string()],
            extra: vec!["sticky=true".to_string()],
            ..Default::default()
        };

        let fields = args.to_fields().unwrap();

        assert_eq!(
            Value::Object(fields),
            json!({
                "sticky": true,
                "title": "Hello",
                "status": "draft",
                "categories": "1,2",
                "parent": 4,
                "meta": {"seo_title": "Hi", "views": 12}
            })
        );
    }

    #[test]
    fn test_named_flags_win_over_extra_fields() {
        let args = FieldArgs {
            title: Some("Flag".to_string()),
            extra: vec!["title=Extra".to_string()],
            ..Default::default()
        };

        assert_eq!(args.to_fields().unwrap()["title"], json!("Flag"));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("genre=[7,8]").unwrap(), ("genre".to_string(), json!([7, 8])));
        assert_eq!(parse_key_value("note=plain text").unwrap(), ("note".to_string(), json!("plain text")));
        assert_eq!(parse_key_value("url=a=b").unwrap(), ("url".to_string(), json!("a=b")));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_list_args_to_params() {
        let args = ListArgs {
            per_page: Some(5),
            search: Some("news".to_string()),
            params: vec!["orderby=title".to_string()],
            ..Default::default()
        };

        let params = args.to_params().unwrap();

        assert_eq!(
            params.as_slice(),
            &[
                ("per_page".to_string(), "5".to_string()),
                ("search".to_string(), "news".to_string()),
                ("orderby".to_string(), "title".to_string()),
            ]
        );
    }

    #[test]
    fn test_join_ids() {
        let ids = vec!["3,4".to_string(), "5".to_string(), "x".to_string()];
        assert_eq!(parse_id_list(&join_ids(&ids)), vec![3, 4, 5]);
    }

    #[test]
    fn test_media_and_menu_fields() {
        let media = MediaArgs {
            alt_text: Some("Hero".to_string()),
            post: Some(12),
            ..Default::default()
        };
        assert_eq!(Value::Object(media.to_fields()), json!({"alt_text": "Hero", "post": 12}));

        let item = MenuItemArgs {
            title: Some("Home".to_string()),
            url: Some("https://x.test/".to_string()),
            menu_order: Some(1),
            ..Default::default()
        };
        assert_eq!(
            Value::Object(item.to_fields().unwrap()),
            json!({"title": "Home", "url": "https://x.test/", "menu_order": 1})
        );
    }
}

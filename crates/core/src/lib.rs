//! quickwp-core - Core library for the quickwp WordPress tools
//!
//! This library derives WordPress REST endpoints from a single configured
//! posts endpoint, sends authenticated requests with Application Passwords,
//! and exposes posts, pages, custom post types, media, taxonomy terms and
//! navigation menus as small services that all report a [`RequestResult`].

pub mod access;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod rest;
pub mod result;
pub mod services;
pub mod site;
pub mod upload;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use access::{AccessControl, AccessMode, Challenge, Presented};
pub use config::{
    default_config_dir, validate_site_config, ConfigLoader, SiteConfig, SitesFile, TemplateMap,
};
pub use endpoint::{base_api_root, derive_endpoint, item_url, with_query};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpReply, HttpRequest, HttpSend, ReqwestSender, Timeouts};
pub use rest::{Credentials, RestClient};
pub use result::{
    created_id, created_link, error_message, is_success, Headers, RequestError, RequestResult,
    RestResponse,
};
pub use services::bulk::{run_bulk, run_bulk_with, BulkAction, BulkTally};
pub use services::cpt::{CptItems, CptService};
pub use services::media::MediaService;
pub use services::menu::MenuService;
pub use services::page::PageService;
pub use services::post::PostService;
pub use services::taxonomy::TaxonomyService;
pub use services::template::{
    format_template_name, TemplateCache, TemplateResolver, DEFAULT_TEMPLATE_LABEL,
};
pub use services::{parse_id_list, ContentOps, Fields, ListParams};
pub use site::QuickWp;
pub use upload::{FileUpload, UploadRegistry};

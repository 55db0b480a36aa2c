// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::http_client::HttpResponse;

/// Pulls anti-forgery tokens out of login pages.
pub struct CsrfExtractor;

impl CsrfExtractor {
    /// Value of the first `<input>` whose `name` equals `field`.
    ///
    /// Returns `None` when the field is missing; the login attempt then goes
    /// ahead without a token.
    pub fn extract(response: &HttpResponse, field: &str) -> Option<String> {
        let document = Html::parse_document(&response.body);
        let input_selector = Selector::parse("input").ok()?;

        // Attribute comparison instead of a [name=..] selector: field names
        // such as `user[token]` are not valid CSS
        let token = document
            .select(&input_selector)
            .find(|input| input.value().attr("name") == Some(field))
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string);

        match token {
            Some(ref value) => {
                debug!("[Csrf] {} = {} ({})", field, value, response.url);
            }
            None if !document.errors.is_empty() => {
                warn!(
                    "[Csrf] '{}' not found in {} ({} HTML parse errors)",
                    field,
                    response.url,
                    document.errors.len()
                );
            }
            None => {
                warn!("[Csrf] '{}' not found in {}", field, response.url);
            }
        }

        token
    }
}

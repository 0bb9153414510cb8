use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("link selector"));

static WORKING_GROUP_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".shingi_block ul li a").expect("working group link selector")
});

static WORKING_GROUP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"chukyo3/(\d{3})/index.htm").expect("working group id pattern"));

/// Link text of the per-group archive of past meetings
pub const MINUTES_LIST_TEXT: &str = "これまでの議事要旨・議事録・配付資料の一覧はこちら";
/// Exact link text of one transcript in the archive
pub const MINUTES_TEXT: &str = "議事録";
/// Substring of roster link texts
pub const MEMBER_LIST_TEXT: &str = "委員名簿";

fn link_text(link: ElementRef<'_>) -> String {
    link.text().collect::<String>().trim().to_string()
}

fn links<'a>(document: &'a Html) -> impl Iterator<Item = (String, &'a str)> + 'a {
    document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href").map(|href| (link_text(a), href)))
}

/// Resolve `href` against the page it was found on
pub fn resolve_url(base: &str, href: &str) -> Result<String> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: href.to_string(),
        reason,
    };
    let base = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    let url = base.join(href).map_err(|e| invalid(e.to_string()))?;
    Ok(url.to_string())
}

/// Three-digit identifier of a working group, from its page URL
pub fn working_group_id(url: &str) -> Option<String> {
    WORKING_GROUP_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `(name, href)` of every working group on the council's index page, in page order
pub fn working_group_links(markup: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(markup);
    document
        .select(&WORKING_GROUP_LINK)
        .map(|a| {
            let href = a.value().attr("href").unwrap_or_default();
            (link_text(a), href.to_string())
        })
        .collect()
}

/// The archive link on a working group's page
pub fn minutes_list_link(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    links(&document)
        .find(|(text, _)| text.contains(MINUTES_LIST_TEXT))
        .map(|(_, href)| href.to_string())
}

/// Transcript links in an archive page, in page order
pub fn minutes_links(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    links(&document)
        .filter(|(text, _)| text == MINUTES_TEXT)
        .map(|(_, href)| href.to_string())
        .collect()
}

/// Roster links on a working group's page, in page order
pub fn member_list_links(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    links(&document)
        .filter(|(text, _)| text.contains(MEMBER_LIST_TEXT))
        .map(|(_, href)| href.to_string())
        .collect()
}

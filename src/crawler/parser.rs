//! HTML parser for extracting the page title and outbound links
//!
//! Only absolute links are kept. Nothing is resolved against the page URL, so
//! relative hrefs never produce fetch attempts.

use crate::url::is_absolute_url;
use crate::ParseError;
use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Text of the first `<title>` element as written, empty when there is none
    pub title: String,

    /// Absolute hrefs of every anchor, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and absolute links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` whose value has both a scheme and a host
///
/// **Exclude (silently):**
/// - Relative paths and fragment-only references
/// - Hostless schemes (`mailto:`, `javascript:`, `data:`)
/// - Hrefs that do not parse as URLs
///
/// Hrefs are kept verbatim and duplicates are not removed.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// * `Ok(Page)` - Successfully parsed page
/// * `Err(ParseError)` - A selector could not be built
///
/// # Example
///
/// ```
/// use depth_crawler::crawler::parse_page;
///
/// let html = r#"<html><head><title>Test</title></head><body>
///     <a href="https://example.com/a">A</a><a href="/b">B</a>
/// </body></html>"#;
/// let page = parse_page(html).unwrap();
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.links, vec!["https://example.com/a".to_string()]);
/// ```
pub fn parse_page(html: &str) -> Result<Page, ParseError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let links = extract_links(&document)?;

    Ok(Page { title, links })
}

fn selector(source: &str) -> Result<Selector, ParseError> {
    Selector::parse(source).map_err(|e| ParseError::Selector {
        selector: source.to_string(),
        message: e.to_string(),
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Result<String, ParseError> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default())
}

/// Extracts every absolute anchor href from the HTML document
fn extract_links(document: &Html) -> Result<Vec<String>, ParseError> {
    let a_selector = selector("a[href]")?;

    Ok(document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| is_absolute_url(href))
        .map(str::to_string)
        .collect())
}

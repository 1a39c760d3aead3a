//! Field extraction from catalogue markup
//!
//! Two extractors share one rule: every field is read independently, and a
//! missing element yields a sentinel for that field instead of failing the
//! record.
//!
//! # List pages
//!
//! Each `article.product_pod` is one catalogue entry:
//!
//! | Field | Source | Sentinel |
//! |-------|--------|----------|
//! | title | `h3 a[title]` (text as fallback) | `Unknown Title` |
//! | price | `.price_color` | `Unknown Price` |
//! | stock | `.availability` contains "In stock" | `OutOfStock` |
//! | rate | second class of `.star-rating` | `No Rating` |
//! | link | `h3 a[href]`, as found | empty |
//! | thumbnail | `.image_container img[src]`, as found | `None` |
//!
//! # Detail pages
//!
//! Fields come from `.product_main`, the breadcrumb, the product
//! information table and the paragraph after `#product_description`.
//! URLs are returned exactly as found; resolution happens in the scrapers.

use crate::records::{
    now_timestamp, DetailRecord, StockInfo, StockStatus, SummaryRecord, NO_DESCRIPTION,
    NO_RATING, OUT_OF_STOCK, UNKNOWN_CATEGORY, UNKNOWN_PRICE, UNKNOWN_TITLE,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Substring marking an item as available
const IN_STOCK_MARKER: &str = "In stock";

/// Extracts every catalogue entry on a list page
///
/// Zero matching entries yields an empty vector, which is a valid result
/// and not an error.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use shelf_crawler::crawler::extract_summaries;
///
/// let html = Html::parse_document(r#"
///     <article class="product_pod">
///       <h3><a href="soumission_998/index.html" title="Soumission">Soumission</a></h3>
///       <p class="star-rating One"></p>
///       <div class="product_price"><p class="price_color">£50.10</p>
///       <p class="instock availability">In stock</p></div>
///     </article>"#);
/// let summaries = extract_summaries(&html);
/// assert_eq!(summaries[0].title, "Soumission");
/// assert_eq!(summaries[0].rate, "One");
/// ```
pub fn extract_summaries(document: &Html) -> Vec<SummaryRecord> {
    let Ok(entry_selector) = Selector::parse("article.product_pod") else {
        return Vec::new();
    };

    document
        .select(&entry_selector)
        .map(extract_summary)
        .collect()
}

/// Extracts one catalogue entry
fn extract_summary(entry: ElementRef<'_>) -> SummaryRecord {
    let title = first_attr(entry, "h3 a", "title")
        .or_else(|| first_text(entry, "h3 a"))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let price = first_text(entry, ".price_color").unwrap_or_else(|| UNKNOWN_PRICE.to_string());

    let stock = match first_text(entry, ".availability") {
        Some(text) if text.contains(IN_STOCK_MARKER) => StockStatus::InStock,
        _ => StockStatus::OutOfStock,
    };

    let rate = star_rating(entry).unwrap_or_else(|| NO_RATING.to_string());

    let link = first_attr(entry, "h3 a", "href").unwrap_or_default();

    let thumbnail = first_attr(entry, ".image_container img", "src");

    SummaryRecord {
        title,
        price,
        stock,
        rate,
        link,
        thumbnail,
    }
}

/// Extracts the full record of a detail page
///
/// The thumbnail is returned as found (typically `../../media/...`).
pub fn extract_detail(document: &Html) -> DetailRecord {
    let root = document.root_element();

    let main = select_first(root, ".product_main").unwrap_or(root);

    let title = first_text(main, "h1").unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let price = first_text(main, ".price_color").unwrap_or_else(|| UNKNOWN_PRICE.to_string());

    let availability = first_text(main, ".availability").unwrap_or_default();
    let stock_info = parse_availability(&availability);

    let rate = star_rating(main).unwrap_or_else(|| NO_RATING.to_string());

    let category = breadcrumb_category(root).unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

    let product_info = product_table(root);

    let description = first_text(root, "#product_description + p")
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let thumbnail = first_attr(root, "#product_gallery img", "src")
        .or_else(|| first_attr(root, ".item.active img", "src"));

    DetailRecord {
        thumbnail,
        title,
        price,
        stock_info,
        rate,
        category,
        product_info,
        description,
        scraped_at: now_timestamp(),
    }
}

/// Splits availability text into the stock flag and quantity
///
/// Text containing "In stock" is available and its quantity is the text's
/// digits (`"In stock (22 available)"` → `"22"`). Anything else is out of
/// stock with the literal quantity `"Out of Stock"`.
pub fn parse_availability(availability: &str) -> StockInfo {
    let in_stock = availability.contains(IN_STOCK_MARKER);
    let quantity = if in_stock {
        availability.chars().filter(|c| c.is_ascii_digit()).collect()
    } else {
        OUT_OF_STOCK.to_string()
    };

    StockInfo {
        in_stock,
        quantity,
        availability: availability.to_string(),
    }
}

/// Third breadcrumb entry (Home › Books › Category › Title)
fn breadcrumb_category(root: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse(".breadcrumb li").ok()?;
    let crumb = root.select(&selector).nth(2)?;
    first_text(crumb, "a").or_else(|| non_empty(element_text(crumb)))
}

/// Key/value rows of the product information table
///
/// Only rows carrying both a header and a data cell contribute an entry.
/// An empty cell still counts; its text is stored as `""`.
fn product_table(root: ElementRef<'_>) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();

    let Ok(row_selector) = Selector::parse("table.table-striped tr") else {
        return info;
    };

    for row in root.select(&row_selector) {
        if let (Some(th), Some(td)) = (select_first(row, "th"), select_first(row, "td")) {
            info.insert(element_text(th), element_text(td));
        }
    }

    info
}

/// Rating word from a `star-rating <Word>` class list
fn star_rating(scope: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse(".star-rating").ok()?;
    let element = scope.select(&selector).next()?;
    element
        .value()
        .classes()
        .find(|class| *class != "star-rating")
        .map(str::to_string)
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Whitespace-collapsed text of the first match, if non-empty
fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css).and_then(|element| non_empty(element_text(element)))
}

/// Trimmed attribute of the first match, if non-empty
fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_first(scope, css)
        .and_then(|element| element.value().attr(attr))
        .and_then(|value| non_empty(value.trim().to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

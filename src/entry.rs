//! Google Play detail-page fetcher and field extractor.
//!
//! One [`AppEntry`] covers one package identifier. The detail page is
//! fetched lazily and cached for the lifetime of the instance, so the four
//! field accessors share a single network round trip.
//!
//! # URL Pattern
//!
//! Detail pages live at
//! `https://play.google.com/store/apps/details?id=<package>&hl=en`.
//!
//! Each accessor is deliberately independent: the storefront shifts markup
//! per field, and a missing rating must not take the download count down
//! with it. The caller picks the fallback policy (here: the record store
//! nulls the whole row on any failure).

use crate::error::ScrapeError;
use crate::models::AppFields;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub(crate) static STORE_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://play.google.com").unwrap());

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static AGGREGATE_RATING: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[itemprop="aggregateRating"]"#).unwrap());
static RATING_VALUE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[itemprop="ratingValue"]"#).unwrap());
static RATING_COUNT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[itemprop="ratingCount"]"#).unwrap());
static DOWNLOADS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[itemprop="numDownloads"]"#).unwrap());
static CATEGORY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[itemprop="genre"]"#).unwrap());
static APP_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.id-app-title").unwrap());

/// One app's detail page, fetched lazily and parsed at most once.
pub struct AppEntry {
    package: String,
    url: Url,
    client: Client,
    document: Option<Html>,
}

impl AppEntry {
    /// Entry for a package on the public Play store.
    pub fn new(package: &str) -> Result<Self, ScrapeError> {
        Self::with_base_url(package, &STORE_BASE)
    }

    /// Entry with an explicit base URL. Lets tests point at an unroutable
    /// address instead of the live storefront.
    pub fn with_base_url(package: &str, base: &Url) -> Result<Self, ScrapeError> {
        let mut url = base.clone();
        url.set_path("/store/apps/details");
        url.query_pairs_mut()
            .append_pair("id", package)
            .append_pair("hl", "en");
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(AppEntry {
            package: package.to_string(),
            url,
            client,
            document: None,
        })
    }

    /// Fetch the detail page and parse it into a queryable document.
    ///
    /// Idempotent per instance: the first call performs the GET, later
    /// calls return the cached document without touching the network.
    pub fn fetch_and_parse(&mut self) -> Result<&Html, ScrapeError> {
        if self.document.is_none() {
            debug!(package = %self.package, url = %self.url, "Fetching store page");
            let body = self
                .client
                .get(self.url.clone())
                .send()?
                .error_for_status()?
                .text()?;
            self.document = Some(Html::parse_document(&body));
        }
        Ok(self.document.as_ref().expect("document cached above"))
    }

    /// Aggregate rating value and rating count.
    ///
    /// The aggregate-rating container must be present; the value and count
    /// metadata nodes are then looked up across the document, matching how
    /// the storefront nests them.
    pub fn get_rating(&mut self) -> Result<(f32, u64), ScrapeError> {
        let document = self.fetch_and_parse()?;
        document
            .select(&AGGREGATE_RATING)
            .next()
            .ok_or(ScrapeError::Extraction {
                field: "aggregateRating",
            })?;
        let value = meta_content(document, &RATING_VALUE, "ratingValue")?;
        let count = meta_content(document, &RATING_COUNT, "ratingCount")?;
        let value = value.parse::<f32>().map_err(|_| ScrapeError::Parse {
            field: "ratingValue",
            value: value.to_string(),
        })?;
        let count = count.parse::<u64>().map_err(|_| ScrapeError::Parse {
            field: "ratingCount",
            value: count.to_string(),
        })?;
        Ok((value, count))
    }

    /// Download-range label, e.g. `"1,000,000+"`.
    pub fn get_downloads(&mut self) -> Result<String, ScrapeError> {
        let document = self.fetch_and_parse()?;
        element_text(document, &DOWNLOADS, "numDownloads")
    }

    /// Store category of the app.
    pub fn get_category(&mut self) -> Result<String, ScrapeError> {
        let document = self.fetch_and_parse()?;
        element_text(document, &CATEGORY, "genre")
    }

    /// Display name of the app.
    pub fn get_name(&mut self) -> Result<String, ScrapeError> {
        let document = self.fetch_and_parse()?;
        element_text(document, &APP_TITLE, "app title")
    }

    /// Run every accessor and return the combined result.
    ///
    /// The first failure of any kind aborts the pass; callers get either a
    /// complete set of fields or one error. This keeps the all-or-null row
    /// policy visible in the signature instead of buried in a catch-all.
    #[instrument(level = "debug", skip(self), fields(package = %self.package))]
    pub fn collect_fields(&mut self) -> Result<AppFields, ScrapeError> {
        let (rating_value, rating_count) = self.get_rating()?;
        let downloads = self.get_downloads()?;
        let category = self.get_category()?;
        let name = self.get_name()?;
        Ok(AppFields {
            rating_value,
            rating_count,
            downloads,
            category,
            name,
        })
    }

    #[cfg(test)]
    fn from_html(package: &str, html: &str) -> Self {
        let mut entry = Self::new(package).unwrap();
        entry.document = Some(Html::parse_document(html));
        entry
    }
}

/// `content` attribute of the first node matching `selector`.
fn meta_content<'a>(
    document: &'a Html,
    selector: &Selector,
    field: &'static str,
) -> Result<&'a str, ScrapeError> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .ok_or(ScrapeError::Extraction { field })
}

/// Trimmed text content of the first node matching `selector`.
fn element_text(
    document: &Html,
    selector: &Selector,
    field: &'static str,
) -> Result<String, ScrapeError> {
    let element = document
        .select(selector)
        .next()
        .ok_or(ScrapeError::Extraction { field })?;
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::Extraction { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_PAGE: &str = r#"
        <html><body>
          <div class="id-app-title">NewsBlur</div>
          <div itemprop="aggregateRating">
            <meta itemprop="ratingValue" content="4.5">
            <meta itemprop="ratingCount" content="1000">
          </div>
          <div itemprop="numDownloads"> 1,000,000+ </div>
          <span itemprop="genre">News &amp; Magazines</span>
        </body></html>"#;

    #[test]
    fn test_get_rating() {
        let mut entry = AppEntry::from_html("com.newsblur", APP_PAGE);
        assert_eq!(entry.get_rating().unwrap(), (4.5, 1000));
    }

    #[test]
    fn test_get_downloads_trims_text() {
        let mut entry = AppEntry::from_html("com.newsblur", APP_PAGE);
        assert_eq!(entry.get_downloads().unwrap(), "1,000,000+");
    }

    #[test]
    fn test_get_category_decodes_entities() {
        let mut entry = AppEntry::from_html("com.newsblur", APP_PAGE);
        assert_eq!(entry.get_category().unwrap(), "News & Magazines");
    }

    #[test]
    fn test_get_name() {
        let mut entry = AppEntry::from_html("com.newsblur", APP_PAGE);
        assert_eq!(entry.get_name().unwrap(), "NewsBlur");
    }

    #[test]
    fn test_collect_fields_complete_page() {
        let mut entry = AppEntry::from_html("com.newsblur", APP_PAGE);
        let fields = entry.collect_fields().unwrap();
        assert_eq!(fields.rating_value, 4.5);
        assert_eq!(fields.rating_count, 1000);
        assert_eq!(fields.downloads, "1,000,000+");
        assert_eq!(fields.category, "News & Magazines");
        assert_eq!(fields.name, "NewsBlur");
    }

    #[test]
    fn test_missing_aggregate_rating_is_extraction_error() {
        let mut entry = AppEntry::from_html("com.example", "<html><body></body></html>");
        assert!(matches!(
            entry.get_rating(),
            Err(ScrapeError::Extraction {
                field: "aggregateRating"
            })
        ));
    }

    #[test]
    fn test_missing_rating_value_is_extraction_error() {
        let page = r#"<div itemprop="aggregateRating"></div>"#;
        let mut entry = AppEntry::from_html("com.example", page);
        assert!(matches!(
            entry.get_rating(),
            Err(ScrapeError::Extraction {
                field: "ratingValue"
            })
        ));
    }

    #[test]
    fn test_malformed_rating_value_is_parse_error() {
        let page = r#"
            <div itemprop="aggregateRating">
              <meta itemprop="ratingValue" content="not-a-number">
              <meta itemprop="ratingCount" content="1000">
            </div>"#;
        let mut entry = AppEntry::from_html("com.example", page);
        assert!(matches!(
            entry.get_rating(),
            Err(ScrapeError::Parse {
                field: "ratingValue",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_downloads_is_extraction_error() {
        let mut entry = AppEntry::from_html("com.example", "<html><body></body></html>");
        assert!(matches!(
            entry.get_downloads(),
            Err(ScrapeError::Extraction {
                field: "numDownloads"
            })
        ));
    }

    #[test]
    fn test_collect_fields_fails_on_any_missing_field() {
        // Rating present, name missing: the whole pass fails.
        let page = r#"
            <div itemprop="aggregateRating">
              <meta itemprop="ratingValue" content="4.5">
              <meta itemprop="ratingCount" content="1000">
            </div>
            <div itemprop="numDownloads">500+</div>
            <span itemprop="genre">Tools</span>"#;
        let mut entry = AppEntry::from_html("com.example", page);
        assert!(matches!(
            entry.collect_fields(),
            Err(ScrapeError::Extraction { field: "app title" })
        ));
    }

    #[test]
    fn test_detail_url_shape() {
        let entry = AppEntry::new("com.newsblur").unwrap();
        assert_eq!(
            entry.url.as_str(),
            "https://play.google.com/store/apps/details?id=com.newsblur&hl=en"
        );
    }
}

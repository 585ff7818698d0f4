//! Starter kit marketplace client
//!
//! Answers three questions for the pipeline: is a kit listed (and paid),
//! is a license valid for it, and which kits exist for the search prompt.

use crate::error::{InstallError, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Pricing metadata of a listed kit
#[derive(Debug, Clone, PartialEq)]
pub struct KitDetails {
    /// Any positive or unreadable price marks the kit as paid
    pub paid: bool,
    pub seller_slug: String,
    pub kit_slug: String,
}

impl KitDetails {
    pub fn is_paid(&self) -> bool {
        self.paid
    }
}

/// Entry of the marketplace kit list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitListing {
    pub package: String,
    pub name: String,
}

impl KitListing {
    /// Label shown in the search prompt, e.g. `Cool Writings (statamic/starter-kit-cool-writings)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.package)
    }
}

/// Marketplace collaborator used by the license stage
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// `Ok(None)` when the kit is not listed
    async fn kit_details(&self, kit: &str) -> Result<Option<KitDetails>>;

    async fn validate_license(&self, kit: &str, license: &str) -> Result<bool>;

    /// Kits offered by the search prompt; empty when the list is unavailable
    async fn starter_kits(&self) -> Vec<KitListing>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KitData {
    Listed(ListedKit),
    Unlisted(bool),
}

#[derive(Debug, Deserialize)]
struct ListedKit {
    #[serde(default)]
    price: Option<Price>,
    slug: String,
    seller: Seller,
}

#[derive(Debug, Deserialize)]
struct Seller {
    slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    fn is_paid(&self) -> bool {
        match self {
            Price::Number(n) => *n > 0.0,
            Price::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(value) => value > 0.0,
                    Err(_) => !s.is_empty(),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Validation {
    valid: bool,
}

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    license: &'a str,
    package: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    package: String,
    name: String,
}

/// Parse a kit details response body
pub fn parse_kit_details(body: &str) -> anyhow::Result<Option<KitDetails>> {
    let envelope: Envelope<KitData> =
        serde_json::from_str(body).context("Failed to parse starter kit details")?;

    Ok(match envelope.data {
        KitData::Unlisted(_) => None,
        KitData::Listed(kit) => Some(KitDetails {
            paid: kit.price.as_ref().is_some_and(Price::is_paid),
            seller_slug: kit.seller.slug,
            kit_slug: kit.slug,
        }),
    })
}

/// Parse a license validation response body
pub fn parse_validation(body: &str) -> anyhow::Result<bool> {
    let envelope: Envelope<Validation> =
        serde_json::from_str(body).context("Failed to parse license validation")?;
    Ok(envelope.data.valid)
}

/// Parse the kit list response body
pub fn parse_listing(body: &str) -> anyhow::Result<Vec<KitListing>> {
    let envelope: Envelope<Vec<ListingEntry>> =
        serde_json::from_str(body).context("Failed to parse starter kit list")?;
    Ok(envelope
        .data
        .into_iter()
        .map(|e| KitListing {
            package: e.package,
            name: e.name,
        })
        .collect())
}

/// HTTP client for the marketplace endpoints
pub struct HttpMarketplace {
    client: reqwest::Client,
    base: Url,
    listing: Url,
}

impl HttpMarketplace {
    pub fn new(base: &str, listing: &str, user_agent: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| InstallError::usage(format!("Invalid marketplace URL {}: {}", base, e)))?;
        let listing = Url::parse(listing).map_err(|e| {
            InstallError::usage(format!("Invalid starter kit list URL {}: {}", listing, e))
        })?;

        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base,
            listing,
        })
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| InstallError::usage(format!("URL cannot have path segments: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn connection_error(&self) -> InstallError {
        InstallError::service(format!(
            "Cannot connect to [{}] to validate license. Please try again later.",
            self.base.host_str().unwrap_or("marketplace")
        ))
    }

    async fn fetch_text(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!("marketplace request failed: {}", e);
            self.connection_error()
        })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "marketplace returned an error status");
            return Err(self.connection_error());
        }

        response.text().await.map_err(|_| self.connection_error())
    }
}

#[async_trait]
impl Marketplace for HttpMarketplace {
    async fn kit_details(&self, kit: &str) -> Result<Option<KitDetails>> {
        let segments: Vec<&str> = kit.split('/').collect();
        let url = self.build_url(&segments)?;
        tracing::debug!(%url, "fetching starter kit details");

        let body = self.fetch_text(self.client.get(url)).await?;
        parse_kit_details(&body).map_err(|e| InstallError::service(format!("{:#}", e)))
    }

    async fn validate_license(&self, kit: &str, license: &str) -> Result<bool> {
        let url = self.build_url(&["validate"])?;
        tracing::debug!(%url, kit, "validating starter kit license");

        let request = self.client.post(url).json(&ValidationRequest {
            license,
            package: kit,
        });
        let body = self.fetch_text(request).await?;
        parse_validation(&body).map_err(|e| InstallError::service(format!("{:#}", e)))
    }

    async fn starter_kits(&self) -> Vec<KitListing> {
        let mut url = self.listing.clone();
        url.query_pairs_mut().append_pair("perPage", "100");

        match self.fetch_text(self.client.get(url)).await {
            Ok(body) => parse_listing(&body).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unlisted_kit() {
        assert_eq!(parse_kit_details(r#"{"data": false}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_free_kit() {
        let details = parse_kit_details(
            r#"{"data": {"price": null, "slug": "cool-writings", "seller": {"slug": "statamic"}}}"#,
        )
        .unwrap()
        .unwrap();
        assert!(!details.is_paid());
        assert_eq!(details.kit_slug, "cool-writings");
    }

    #[test]
    fn test_parse_paid_kit() {
        let details = parse_kit_details(
            r#"{"data": {"price": 4900, "slug": "peak", "seller": {"slug": "studio1902"}}}"#,
        )
        .unwrap()
        .unwrap();
        assert!(details.is_paid());
        assert_eq!(details.seller_slug, "studio1902");
    }

    #[test]
    fn test_fractional_and_unreadable_prices_are_paid() {
        let paid = |price: &str| {
            parse_kit_details(&format!(
                r#"{{"data": {{"price": {}, "slug": "peak", "seller": {{"slug": "studio1902"}}}}}}"#,
                price
            ))
            .unwrap()
            .unwrap()
            .is_paid()
        };

        assert!(paid("0.25"));
        assert!(paid(r#""0.25""#));
        assert!(paid(r#""$49""#));
        assert!(!paid("0"));
        assert!(!paid(r#""0.00""#));
        assert!(!paid(r#""""#));
    }

    #[test]
    fn test_parse_malformed_details() {
        assert!(parse_kit_details("<html>").is_err());
    }

    #[test]
    fn test_parse_validation() {
        assert!(parse_validation(r#"{"data": {"valid": true}}"#).unwrap());
        assert!(!parse_validation(r#"{"data": {"valid": false}}"#).unwrap());
    }

    #[test]
    fn test_parse_listing_labels() {
        let kits = parse_listing(
            r#"{"data": [{"package": "statamic/starter-kit-cool-writings", "name": "Cool Writings"}]}"#,
        )
        .unwrap();
        assert_eq!(
            kits[0].label(),
            "Cool Writings (statamic/starter-kit-cool-writings)"
        );
    }

    #[test]
    fn test_build_url_appends_package_segments() {
        let marketplace = HttpMarketplace::new(
            "https://outpost.statamic.com/v3/starter-kits/",
            "https://statamic.com/api/v1/marketplace/starter-kits",
            "test",
        )
        .unwrap();

        let url = marketplace.build_url(&["statamic", "starter-kit-cool-writings"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://outpost.statamic.com/v3/starter-kits/statamic/starter-kit-cool-writings"
        );
    }
}

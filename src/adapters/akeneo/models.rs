//! Akeneo REST API models
//!
//! Resource catalog and the HAL envelopes returned by list endpoints.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A list endpoint of the Akeneo REST API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Products,
    ProductModels,
    MediaFiles,
    Attributes,
    AssociationTypes,
    Categories,
    Channels,
    Locales,
    Currencies,
    Families,
    /// Variants of one family
    FamilyVariants(String),
    /// Options of one select attribute
    AttributeOptions(String),
}

impl Resource {
    /// Resources with no dependency on other resources
    pub fn independent() -> Vec<Resource> {
        vec![
            Self::Products,
            Self::ProductModels,
            Self::MediaFiles,
            Self::Attributes,
            Self::AssociationTypes,
            Self::Categories,
            Self::Channels,
            Self::Locales,
            Self::Currencies,
            Self::Families,
        ]
    }

    /// Path of the list endpoint
    pub fn path(&self) -> String {
        match self {
            Self::Products => "/api/rest/v1/products".to_string(),
            Self::ProductModels => "/api/rest/v1/product-models".to_string(),
            Self::MediaFiles => "/api/rest/v1/media-files".to_string(),
            Self::Attributes => "/api/rest/v1/attributes".to_string(),
            Self::AssociationTypes => "/api/rest/v1/association-types".to_string(),
            Self::Categories => "/api/rest/v1/categories".to_string(),
            Self::Channels => "/api/rest/v1/channels".to_string(),
            Self::Locales => "/api/rest/v1/locales".to_string(),
            Self::Currencies => "/api/rest/v1/currencies".to_string(),
            Self::Families => "/api/rest/v1/families".to_string(),
            Self::FamilyVariants(family) => format!("/api/rest/v1/families/{family}/variants"),
            Self::AttributeOptions(attribute) => {
                format!("/api/rest/v1/attributes/{attribute}/options")
            }
        }
    }

    /// Name used for the staging collection (`akeneo_<name>`)
    pub fn staging_name(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ProductModels => "product_models",
            Self::MediaFiles => "product_media",
            Self::Attributes => "attributes",
            Self::AssociationTypes => "association_types",
            Self::Categories => "categories",
            Self::Channels => "channels",
            Self::Locales => "locales",
            Self::Currencies => "currencies",
            Self::Families => "families",
            Self::FamilyVariants(_) => "family_variants",
            Self::AttributeOptions(_) => "attribute_options",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FamilyVariants(family) => write!(f, "family_variants[{family}]"),
            Self::AttributeOptions(attribute) => write!(f, "attribute_options[{attribute}]"),
            other => f.write_str(other.staging_name()),
        }
    }
}

/// A request to fetch every page of one resource
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub resource: Resource,
}

impl FetchRequest {
    /// Fetch the complete resource
    pub fn all(resource: Resource) -> Self {
        Self { resource }
    }
}

/// OAuth token response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// One page of a HAL list response
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Page {
    /// URL of the following page, if the server announced one
    pub fn next_url(&self) -> Option<&str> {
        self.links.next.as_ref().map(|link| link.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        assert_eq!(Resource::ProductModels.path(), "/api/rest/v1/product-models");
        assert_eq!(
            Resource::FamilyVariants("shoes".into()).path(),
            "/api/rest/v1/families/shoes/variants"
        );
        assert_eq!(
            Resource::AttributeOptions("color".into()).path(),
            "/api/rest/v1/attributes/color/options"
        );
    }

    #[test]
    fn test_staging_names_share_parameterized_collections() {
        assert_eq!(
            Resource::FamilyVariants("a".into()).staging_name(),
            Resource::FamilyVariants("b".into()).staging_name()
        );
        assert_eq!(Resource::MediaFiles.staging_name(), "product_media");
    }

    #[test]
    fn test_page_parsing() {
        let page: Page = serde_json::from_value(json!({
            "_links": {"self": {"href": "a"}, "next": {"href": "https://pim/next"}},
            "current_page": 1,
            "_embedded": {"items": [{"code": "x"}]}
        }))
        .unwrap();
        assert_eq!(page.embedded.items.len(), 1);
        assert_eq!(page.next_url(), Some("https://pim/next"));

        let last: Page = serde_json::from_value(json!({"_links": {}})).unwrap();
        assert!(last.embedded.items.is_empty());
        assert!(last.next_url().is_none());
    }
}

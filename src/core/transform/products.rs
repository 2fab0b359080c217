//! Product mapping
//!
//! Products become `SimpleProduct`s and product models become
//! `ConfigurableProduct`s. Media files referenced by the `plan_cover` and
//! `cover` attributes are joined in from the staged media collection.
//!
//! In incremental mode only entities updated after the watermark are
//! announced. Staging still holds the full catalog, so the other passes see
//! every product.

use super::diff::DiffContext;
use super::pass::{required_str, timestamp_field, MappingPass, PassSource};
use crate::adapters::store::{staging_collection, FieldExpr, Stage, StagingStore};
use crate::domain::errors::TransformError;
use crate::domain::event::{Entity, Event};
use crate::domain::record::{attribute_value, str_field, Document};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

pub const PASS_NAME: &str = "products";

/// Akeneo locale the content is read from
const SOURCE_LOCALE: &str = "de_CH";
/// Unchained locale the content is written to
const CONTENT_LOCALE: &str = "de";
const COUNTRY_CODE: &str = "CH";
const BASE_UNIT: &str = "ST";
const IS_TAXABLE: bool = true;
const IS_NET_PRICE: bool = false;

const SIMPLE_PRODUCT: &str = "SimpleProduct";
const CONFIGURABLE_PRODUCT: &str = "ConfigurableProduct";

/// Attributes holding media file codes
const MEDIA_ATTRIBUTES: [&str; 2] = ["values.plan_cover.data", "values.cover.data"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductsPass {
    /// Skip entities whose `updated` is not after this instant
    pub updated_after: Option<DateTime<Utc>>,
}

impl ProductsPass {
    pub fn new(updated_after: Option<DateTime<Utc>>) -> Self {
        Self { updated_after }
    }

    /// Whether an entity falls outside the incremental window
    ///
    /// Entities without an `updated` timestamp are always announced.
    fn unchanged(&self, doc: &Document) -> Result<bool, TransformError> {
        let Some(after) = self.updated_after else {
            return Ok(false);
        };
        let updated = timestamp_field(PASS_NAME, doc, "updated")?;
        Ok(updated.is_some_and(|updated| updated <= after))
    }
}

fn media_pipeline() -> Vec<Stage> {
    vec![
        Stage::AddFields(vec![(
            "mediaCodes".to_string(),
            FieldExpr::ConcatArrays(MEDIA_ATTRIBUTES.iter().map(|p| p.to_string()).collect()),
        )]),
        Stage::lookup(
            &staging_collection("product_media"),
            "mediaCodes",
            "code",
            "media",
        ),
    ]
}

#[async_trait]
impl MappingPass for ProductsPass {
    type Context = ();

    fn name(&self) -> &'static str {
        PASS_NAME
    }

    async fn prepare(
        &self,
        _store: &dyn StagingStore,
        _batch_size: usize,
    ) -> Result<Self::Context, TransformError> {
        Ok(())
    }

    fn sources(&self, _context: &()) -> Vec<PassSource> {
        let mut models = media_pipeline();
        models.push(Stage::AddFields(vec![(
            "isProductModel".to_string(),
            FieldExpr::Literal(Value::Bool(true)),
        )]));

        vec![
            PassSource::new(staging_collection("products"), media_pipeline()),
            PassSource::new(staging_collection("product_models"), models),
        ]
    }

    fn map(
        &self,
        doc: &Document,
        _context: &(),
        diff: &DiffContext<'_>,
    ) -> Result<Option<Event>, TransformError> {
        let is_model = doc.get("isProductModel").and_then(Value::as_bool) == Some(true);
        let id = if is_model {
            required_str(PASS_NAME, doc, "code")?
        } else {
            required_str(PASS_NAME, doc, "identifier")?
        };

        if self.unchanged(doc)? {
            return Ok(None);
        }

        let created = timestamp_field(PASS_NAME, doc, "created")?;
        let operation = diff.classify(Entity::Product, id, created);
        let kind = if is_model {
            CONFIGURABLE_PRODUCT
        } else {
            SIMPLE_PRODUCT
        };
        let tags: Vec<&str> = str_field(doc, "family").into_iter().collect();
        let pricing = pricing(doc)?;
        let media = media(doc)?;

        let payload = json!({
            "_id": id,
            "specification": {
                "type": kind,
                "tags": tags,
                "meta": {},
                "commerce": { "pricing": pricing },
                "warehousing": { "baseUnit": BASE_UNIT, "sku": id },
                "content": { CONTENT_LOCALE: content(doc, id) },
            },
            "media": media,
        });

        Ok(Some(Event::new(Entity::Product, operation, payload)))
    }
}

fn content(doc: &Document, id: &str) -> Value {
    let title = attribute_value(doc, "name", None, Some(SOURCE_LOCALE))
        .and_then(Value::as_str)
        .unwrap_or(id);
    let description = attribute_value(doc, "description", None, Some(SOURCE_LOCALE))
        .cloned()
        .unwrap_or(Value::Null);
    json!({
        "title": title,
        "slug": slugify(id),
        "description": description,
    })
}

/// Price entries of the `price` attribute, amounts in cents
fn pricing(doc: &Document) -> Result<Vec<Value>, TransformError> {
    let Some(prices) = attribute_value(doc, "price", None, None) else {
        return Ok(Vec::new());
    };
    let prices = prices
        .as_array()
        .ok_or_else(|| malformed("values.price", "expected a list of prices"))?;

    prices
        .iter()
        .map(|price| {
            let currency = price
                .get("currency")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("values.price", "price without currency"))?;
            let amount = price.get("amount").and_then(amount_in_cents).ok_or_else(|| {
                malformed(
                    "values.price",
                    &format!("invalid amount for {currency}: {}", price["amount"]),
                )
            })?;
            Ok(json!({
                "amount": amount,
                "currencyCode": currency,
                "countryCode": COUNTRY_CODE,
                "isTaxable": IS_TAXABLE,
                "isNetPrice": IS_NET_PRICE,
            }))
        })
        .collect()
}

/// Akeneo sends amounts as decimal strings ("12.50") or numbers
fn amount_in_cents(amount: &Value) -> Option<i64> {
    let value = match amount {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    value
        .is_finite()
        .then(|| (value * 100.0).round() as i64)
}

fn media(doc: &Document) -> Result<Vec<Value>, TransformError> {
    let Some(files) = doc.get("media").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    files
        .iter()
        .map(|file| {
            let code = required_str(PASS_NAME, file, "code")?;
            let title = str_field(file, "original_filename").unwrap_or(code);
            Ok(json!({
                "_id": code,
                "asset": {
                    "_id": code,
                    "url": str_field(file, "_links.download.href"),
                },
                "tags": [],
                "meta": {},
                "content": { CONTENT_LOCALE: { "title": title } },
            }))
        })
        .collect()
}

fn malformed(field: &str, message: &str) -> TransformError {
    TransformError::MalformedField {
        pass: PASS_NAME.to_string(),
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to `-`
pub(crate) fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

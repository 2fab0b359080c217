//! Association mapping
//!
//! Every product or product model with at least one associated product
//! becomes a product group assortment listing the associated products,
//! tagged with their association type, followed by the product itself.

use super::diff::DiffContext;
use super::pass::{
    required_str, store_error, str_list, timestamp_field, MappingPass, PassSource,
};
use crate::adapters::store::{
    collect_all, staging_collection, FieldExpr, Filter, Stage, StagingStore,
};
use crate::domain::errors::TransformError;
use crate::domain::event::{Entity, Event};
use crate::domain::record::Document;
use async_trait::async_trait;
use serde_json::json;

pub const PASS_NAME: &str = "associations";

const GROUP_TAG: &str = "group";
const PRIMARY_PRODUCT_TAG: &str = "primary_product";
const ASSOCIATION_TAG: &str = "association";

/// Association lists that make a product part of a group
const ASSOCIATED_KINDS: [&str; 2] = ["products", "product_models"];

pub struct AssociationsPass;

/// Payload id of the group built around a product
pub fn group_id(identifier: &str) -> String {
    format!("group.{identifier}")
}

fn has_associations(association_types: &[String]) -> Filter {
    Filter::Or(
        association_types
            .iter()
            .flat_map(|code| {
                ASSOCIATED_KINDS
                    .iter()
                    .map(move |kind| Filter::NonEmpty(format!("associations.{code}.{kind}")))
            })
            .collect(),
    )
}

#[async_trait]
impl MappingPass for AssociationsPass {
    /// Association type codes, in staging order
    type Context = Vec<String>;

    fn name(&self) -> &'static str {
        PASS_NAME
    }

    async fn prepare(
        &self,
        store: &dyn StagingStore,
        batch_size: usize,
    ) -> Result<Vec<String>, TransformError> {
        let cursor = store
            .find(&staging_collection("association_types"), Filter::All, batch_size)
            .await
            .map_err(|e| store_error(PASS_NAME, e))?;
        let types = collect_all(cursor)
            .await
            .map_err(|e| store_error(PASS_NAME, e))?;

        types
            .iter()
            .map(|t| required_str(PASS_NAME, t, "code").map(str::to_string))
            .collect()
    }

    fn sources(&self, association_types: &Vec<String>) -> Vec<PassSource> {
        let selector = Stage::Match(has_associations(association_types));
        vec![
            PassSource::new(staging_collection("products"), vec![selector.clone()]),
            PassSource::new(
                staging_collection("product_models"),
                vec![
                    selector,
                    Stage::AddFields(vec![(
                        "identifier".to_string(),
                        FieldExpr::Field("code".to_string()),
                    )]),
                ],
            ),
        ]
    }

    fn map(
        &self,
        doc: &Document,
        association_types: &Vec<String>,
        diff: &DiffContext<'_>,
    ) -> Result<Option<Event>, TransformError> {
        let identifier = required_str(PASS_NAME, doc, "identifier")?;
        let id = group_id(identifier);

        let mut products: Vec<_> = association_types
            .iter()
            .flat_map(|code| {
                ASSOCIATED_KINDS.iter().flat_map(move |kind| {
                    str_list(doc, &format!("associations.{code}.{kind}"))
                        .into_iter()
                        .map(move |product_id| {
                            json!({ "productId": product_id, "tags": [GROUP_TAG, code] })
                        })
                })
            })
            .collect();
        products.push(json!({
            "productId": identifier,
            "tags": [GROUP_TAG, PRIMARY_PRODUCT_TAG],
        }));

        let created = timestamp_field(PASS_NAME, doc, "created")?;
        let operation = diff.classify(Entity::Assortment, &id, created);
        let payload = json!({
            "_id": id,
            "specification": {
                "isActive": true,
                "isBase": false,
                "isRoot": false,
                "tags": [ASSOCIATION_TAG, format!("group:{identifier}")],
                "meta": {},
                "content": {
                    "de": {
                        "title": format!("Product Group of {identifier}"),
                        "slug": format!("group-{identifier}"),
                    },
                },
            },
            "products": products,
        });

        Ok(Some(Event::new(Entity::Assortment, operation, payload)))
    }
}

//! Taxonomy mapping
//!
//! Categories become assortments linking the staged products filed under
//! them and their child categories. A category with neither is dropped, and
//! so are links to dropped children.

use super::diff::DiffContext;
use super::pass::{
    required_str, store_error, str_list, timestamp_field, MappingPass, PassSource,
};
use super::products::slugify;
use crate::adapters::store::{staging_collection, Filter, StagingStore};
use crate::domain::errors::TransformError;
use crate::domain::event::{Entity, Event};
use crate::domain::record::{str_field, Document};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

pub const PASS_NAME: &str = "taxonomy";

const CATEGORY_TAG: &str = "category";
const SOURCE_LOCALE_LABEL: &str = "labels.de_CH";

pub struct TaxonomyPass;

/// Category membership read from staging before the pass streams categories
#[derive(Debug, Default)]
pub struct TaxonomyIndex {
    /// Category code to product ids, in staging order
    products: HashMap<String, Vec<String>>,
    /// Category code to child category codes, in staging order
    children: HashMap<String, Vec<String>>,
}

impl TaxonomyIndex {
    fn link_product(&mut self, category: &str, product_id: &str) {
        self.products
            .entry(category.to_string())
            .or_default()
            .push(product_id.to_string());
    }

    fn link_child(&mut self, parent: &str, child: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    fn products_of(&self, category: &str) -> &[String] {
        self.products.get(category).map_or(&[], Vec::as_slice)
    }

    fn children_of(&self, category: &str) -> &[String] {
        self.children.get(category).map_or(&[], Vec::as_slice)
    }

    /// Whether a category has products somewhere in its subtree
    fn emits(
        &self,
        category: &str,
        resolved: &mut HashMap<String, bool>,
        visiting: &mut HashSet<String>,
    ) -> bool {
        if let Some(&emits) = resolved.get(category) {
            return emits;
        }
        if !self.products_of(category).is_empty() {
            resolved.insert(category.to_string(), true);
            return true;
        }
        // A parent cycle contributes nothing
        if !visiting.insert(category.to_string()) {
            return false;
        }
        let emits = self
            .children_of(category)
            .iter()
            .any(|child| self.emits(child, resolved, visiting));
        visiting.remove(category);
        resolved.insert(category.to_string(), emits);
        emits
    }

    /// Keep only child links to categories that become assortments
    fn prune_children(&mut self) {
        let mut resolved = HashMap::new();
        let linked: Vec<String> = self.children.values().flatten().cloned().collect();
        for child in &linked {
            self.emits(child, &mut resolved, &mut HashSet::new());
        }
        for children in self.children.values_mut() {
            children.retain(|child| resolved.get(child).copied().unwrap_or(false));
        }
    }
}

/// Stream a staging collection, calling `visit` on every document
async fn scan<F>(
    store: &dyn StagingStore,
    resource: &str,
    batch_size: usize,
    mut visit: F,
) -> Result<(), TransformError>
where
    F: FnMut(&Document) -> Result<(), TransformError>,
{
    let mut cursor = store
        .find(&staging_collection(resource), Filter::All, batch_size)
        .await
        .map_err(|e| store_error(PASS_NAME, e))?;
    while let Some(batch) = cursor
        .next_batch()
        .await
        .map_err(|e| store_error(PASS_NAME, e))?
    {
        for doc in &batch {
            visit(doc)?;
        }
    }
    Ok(())
}

#[async_trait]
impl MappingPass for TaxonomyPass {
    type Context = TaxonomyIndex;

    fn name(&self) -> &'static str {
        PASS_NAME
    }

    async fn prepare(
        &self,
        store: &dyn StagingStore,
        batch_size: usize,
    ) -> Result<TaxonomyIndex, TransformError> {
        let mut index = TaxonomyIndex::default();

        for (resource, id_field) in [("products", "identifier"), ("product_models", "code")] {
            scan(store, resource, batch_size, |doc| {
                let id = required_str(PASS_NAME, doc, id_field)?;
                for category in str_list(doc, "categories") {
                    index.link_product(category, id);
                }
                Ok(())
            })
            .await?;
        }

        scan(store, "categories", batch_size, |doc| {
            if let Some(parent) = str_field(doc, "parent") {
                index.link_child(parent, required_str(PASS_NAME, doc, "code")?);
            }
            Ok(())
        })
        .await?;

        index.prune_children();
        Ok(index)
    }

    fn sources(&self, _index: &TaxonomyIndex) -> Vec<PassSource> {
        vec![PassSource::new(staging_collection("categories"), Vec::new())]
    }

    fn map(
        &self,
        doc: &Document,
        index: &TaxonomyIndex,
        diff: &DiffContext<'_>,
    ) -> Result<Option<Event>, TransformError> {
        let code = required_str(PASS_NAME, doc, "code")?;
        let products = index.products_of(code);
        let children = index.children_of(code);
        if products.is_empty() && children.is_empty() {
            return Ok(None);
        }

        let is_root = doc.get("parent").map_or(true, Value::is_null);
        let title = str_field(doc, SOURCE_LOCALE_LABEL).unwrap_or(code);
        let products: Vec<Value> = products
            .iter()
            .map(|id| json!({ "productId": id, "tags": [CATEGORY_TAG] }))
            .collect();
        let children: Vec<Value> = children
            .iter()
            .map(|child| json!({ "assortmentId": child, "tags": [CATEGORY_TAG], "meta": {} }))
            .collect();

        let created = timestamp_field(PASS_NAME, doc, "created")?;
        let operation = diff.classify(Entity::Assortment, code, created);
        let payload = json!({
            "_id": code,
            "specification": {
                "isActive": true,
                "isBase": false,
                "isRoot": is_root,
                "tags": [CATEGORY_TAG],
                "meta": {},
                "content": {
                    "de": { "title": title, "slug": slugify(code) },
                },
            },
            "products": products,
            "children": children,
        });

        Ok(Some(Event::new(Entity::Assortment, operation, payload)))
    }
}

//! Extraction plan
//!
//! Wave 1 has one task per independent resource. Wave 2 has one task per
//! parameterized resource type, built from what wave 1 staged.

use crate::adapters::akeneo::{FetchRequest, Resource};
use crate::adapters::store::staging_collection;
use crate::domain::record::{str_field, Document};

/// Attribute types whose options are extracted
pub const SELECT_ATTRIBUTE_TYPES: [&str; 2] =
    ["pim_catalog_simpleselect", "pim_catalog_multiselect"];

/// One fetch, plus the parent key stamped on every fetched document
#[derive(Debug, Clone, PartialEq)]
pub struct ParentedRequest {
    pub request: FetchRequest,
    pub annotation: Option<(&'static str, String)>,
}

impl ParentedRequest {
    fn plain(request: FetchRequest) -> Self {
        Self {
            request,
            annotation: None,
        }
    }
}

/// Fetches that together replace one staging collection
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractTask {
    pub collection: String,
    pub requests: Vec<ParentedRequest>,
}

impl ExtractTask {
    fn single(request: FetchRequest) -> Self {
        Self {
            collection: staging_collection(request.resource.staging_name()),
            requests: vec![ParentedRequest::plain(request)],
        }
    }
}

/// Wave 1: every independent resource, fetched in full
pub fn wave_one() -> Vec<ExtractTask> {
    Resource::independent()
        .into_iter()
        .map(FetchRequest::all)
        .map(ExtractTask::single)
        .collect()
}

/// Wave 2: variants of every staged family
pub fn family_variants_task(families: &[Document]) -> ExtractTask {
    parented_task(
        staging_collection("family_variants"),
        "family",
        families,
        Resource::FamilyVariants,
    )
}

/// Wave 2: options of every staged select attribute
///
/// `attributes` is expected to be filtered on [`SELECT_ATTRIBUTE_TYPES`].
pub fn attribute_options_task(attributes: &[Document]) -> ExtractTask {
    parented_task(
        staging_collection("attribute_options"),
        "attribute",
        attributes,
        Resource::AttributeOptions,
    )
}

fn parented_task(
    collection: String,
    key: &'static str,
    parents: &[Document],
    resource: fn(String) -> Resource,
) -> ExtractTask {
    let requests = parents
        .iter()
        .filter_map(|parent| str_field(parent, "code"))
        .map(|code| ParentedRequest {
            request: FetchRequest::all(resource(code.to_string())),
            annotation: Some((key, code.to_string())),
        })
        .collect();
    ExtractTask {
        collection,
        requests,
    }
}

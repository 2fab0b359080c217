//! Channel mapping
//!
//! Every channel becomes a root assortment tagged with its locales and
//! currencies, with the channel's category tree as its only child.
//! Channels carry no creation timestamp, so they are classified on the
//! ledger alone.

use super::diff::DiffContext;
use super::pass::{required_str, str_list, MappingPass, PassSource};
use crate::adapters::store::{staging_collection, StagingStore};
use crate::domain::errors::TransformError;
use crate::domain::event::{Entity, Event};
use crate::domain::record::{str_field, Document};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const PASS_NAME: &str = "channels";

const CHANNEL_TAG: &str = "channel";
const SOURCE_LOCALE_LABEL: &str = "labels.de_CH";

pub struct ChannelsPass;

/// Payload id of a channel assortment
pub fn channel_id(code: &str) -> String {
    format!("channel.{code}")
}

#[async_trait]
impl MappingPass for ChannelsPass {
    type Context = ();

    fn name(&self) -> &'static str {
        PASS_NAME
    }

    async fn prepare(
        &self,
        _store: &dyn StagingStore,
        _batch_size: usize,
    ) -> Result<(), TransformError> {
        Ok(())
    }

    fn sources(&self, _context: &()) -> Vec<PassSource> {
        vec![PassSource::new(staging_collection("channels"), Vec::new())]
    }

    fn map(
        &self,
        doc: &Document,
        _context: &(),
        diff: &DiffContext<'_>,
    ) -> Result<Option<Event>, TransformError> {
        let code = required_str(PASS_NAME, doc, "code")?;
        let id = channel_id(code);

        let mut tags = vec![CHANNEL_TAG.to_string()];
        tags.extend(str_list(doc, "locales").into_iter().map(|l| format!("locale:{l}")));
        tags.extend(
            str_list(doc, "currencies")
                .into_iter()
                .map(|c| format!("currency:{c}")),
        );

        let children: Vec<Value> = str_field(doc, "category_tree")
            .map(|tree| json!({ "assortmentId": tree, "tags": [CHANNEL_TAG], "meta": {} }))
            .into_iter()
            .collect();

        let operation = diff.classify(Entity::Assortment, &id, None);
        let payload = json!({
            "_id": id,
            "specification": {
                "isActive": true,
                "isBase": false,
                "isRoot": true,
                "tags": tags,
                "meta": {},
                "content": {
                    "de": {
                        "title": str_field(doc, SOURCE_LOCALE_LABEL).unwrap_or(code),
                        "slug": code,
                    },
                },
            },
            "products": [],
            "children": children,
        });

        Ok(Some(Event::new(Entity::Assortment, operation, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::diff::LedgerIndex;
    use crate::domain::event::Operation;
    use chrono::Utc;

    fn channel() -> Value {
        json!({
            "code": "ecommerce",
            "currencies": ["CHF", "EUR"],
            "locales": ["de_CH", "fr_CH"],
            "category_tree": "master",
            "labels": {"de_CH": "Webshop"}
        })
    }

    #[test]
    fn test_channel_payload() {
        let ledger = LedgerIndex::default();
        let diff = DiffContext::new(Utc::now(), &ledger);
        let event = ChannelsPass.map(&channel(), &(), &diff).unwrap().unwrap();

        assert_eq!(event.operation, Operation::Create);
        assert_eq!(
            event.payload,
            json!({
                "_id": "channel.ecommerce",
                "specification": {
                    "isActive": true,
                    "isBase": false,
                    "isRoot": true,
                    "tags": ["channel", "locale:de_CH", "locale:fr_CH", "currency:CHF", "currency:EUR"],
                    "meta": {},
                    "content": {"de": {"title": "Webshop", "slug": "ecommerce"}}
                },
                "products": [],
                "children": [{"assortmentId": "master", "tags": ["channel"], "meta": {}}]
            })
        );
    }

    #[test]
    fn test_known_channel_is_update() {
        let mut ledger = LedgerIndex::default();
        ledger.insert(Entity::Assortment, "channel.ecommerce");
        let diff = DiffContext::new(Utc::now(), &ledger);

        let event = ChannelsPass.map(&channel(), &(), &diff).unwrap().unwrap();
        assert_eq!(event.operation, Operation::Update);
    }
}

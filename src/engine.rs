use tracing::debug;

use person_types::DocumentReport;

use crate::annotation::Annotation;
use crate::config::EngineConfig;
use crate::coref::link_coreferences;
use crate::error::Result;
use crate::extract::extract_mentions;
use crate::gender::resolve_genders;
use crate::honorifics::HonorificMatcher;
use crate::mention::MentionSet;
use crate::merge::{Clusterer, Entities, GreedySubsetClusterer};
use crate::quotes::attribute_quotes;
use crate::roles::attach_roles;
use crate::TARGET_RESOLVE;

/// Runs the resolution pipeline over one document at a time.
///
/// The engine holds only configuration; each call to [`Engine::analyze`]
/// starts from scratch, so one engine can be shared across threads and
/// documents never see each other's state.
#[derive(Debug, Clone)]
pub struct Engine<C = GreedySubsetClusterer> {
    config: EngineConfig,
    honorifics: HonorificMatcher,
    clusterer: C,
}

impl Engine<GreedySubsetClusterer> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let clusterer = GreedySubsetClusterer::new(config.min_tokens_first_last);
        Self::with_clusterer(config, clusterer)
    }
}

impl<C: Clusterer> Engine<C> {
    pub fn with_clusterer(config: EngineConfig, clusterer: C) -> Result<Self> {
        config.validate()?;
        let honorifics = HonorificMatcher::new(&config.honorifics)?;
        Ok(Engine {
            config,
            honorifics,
            clusterer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract mentions, link them to coref chains and give each its own
    /// gender verdict.
    pub fn resolve_mentions(&self, ann: &Annotation) -> MentionSet {
        let mut mentions = extract_mentions(ann, &self.honorifics);
        link_coreferences(ann, &mut mentions);
        resolve_genders(&mut mentions, self.config.high_confidence_pronouns);
        mentions
    }

    pub fn analyze(&self, ann: &Annotation) -> Result<DocumentReport> {
        ann.validate()?;

        let mentions = self.resolve_mentions(ann);
        let clusters = self.clusterer.cluster(&mentions);
        let mut entities = Entities::from_clusters(&clusters, &mentions);
        let unattributed = attribute_quotes(ann, &mentions, &mut entities)?;
        attach_roles(ann, &mut entities, &self.config.speech_verbs);

        debug!(
            target: TARGET_RESOLVE,
            "resolved {} mentions into {} entities",
            mentions.len(),
            entities.records.len()
        );
        Ok(DocumentReport {
            entities: entities.records,
            unattributed_quote_tokens: unattributed,
        })
    }

    pub fn analyze_json(&self, json: &str) -> Result<DocumentReport> {
        let ann = Annotation::from_json(json)?;
        self.analyze(&ann)
    }
}

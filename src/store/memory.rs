use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::error::{CatalogError, Result};
use crate::logic::PatchEngine;
use crate::model::{
    AspectName, ChangeProposal, EntityUrn, Id, IngestReceipt, ProposalPayload, VersionedAspect,
};
use crate::store::traits::AspectStore;

type EntityAspects = HashMap<AspectName, VersionedAspect>;

/// Receipts of applied proposals, oldest evicted first once `capacity` is reached
#[derive(Debug)]
struct AppliedProposals {
    receipts: HashMap<Id, IngestReceipt>,
    order: VecDeque<Id>,
    capacity: usize,
}

impl AppliedProposals {
    fn new(capacity: usize) -> Self {
        Self {
            receipts: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, id: &str) -> Option<&IngestReceipt> {
        self.receipts.get(id)
    }

    fn remember(&mut self, receipt: IngestReceipt) {
        if self.capacity == 0 {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.receipts.remove(&oldest);
            }
        }
        self.order.push_back(receipt.proposal_id.clone());
        self.receipts.insert(receipt.proposal_id.clone(), receipt);
    }

    fn len(&self) -> usize {
        self.receipts.len()
    }
}

/// Reference storage engine keeping every aspect in memory.
///
/// Ingestion holds the entity map's write lock for the whole read-merge-write,
/// so applications targeting the same aspect are serialized.
#[derive(Debug, Clone)]
pub struct InMemoryAspectStore {
    entities: Arc<RwLock<HashMap<EntityUrn, EntityAspects>>>,
    /// Receipts of the most recently applied proposals
    applied: Arc<Mutex<AppliedProposals>>,
    max_operations_per_proposal: usize,
}

impl InMemoryAspectStore {
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            applied: Arc::new(Mutex::new(AppliedProposals::new(
                config.max_remembered_proposals,
            ))),
            max_operations_per_proposal: config.max_operations_per_proposal,
        }
    }

    pub async fn entity_count(&self) -> usize {
        self.entities.read().await.len()
    }

    /// Number of proposal ids currently remembered for replay detection
    pub fn remembered_proposals(&self) -> usize {
        self.applied.lock().len()
    }

    fn check_size(&self, proposal: &ChangeProposal) -> Result<()> {
        if let ProposalPayload::Patch(document) = &proposal.payload {
            if document.len() > self.max_operations_per_proposal {
                return Err(CatalogError::validation(format!(
                    "patch has {} operations, the limit is {}",
                    document.len(),
                    self.max_operations_per_proposal
                )));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryAspectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AspectStore for InMemoryAspectStore {
    async fn get_aspect(
        &self,
        urn: &EntityUrn,
        aspect: AspectName,
    ) -> Result<Option<VersionedAspect>> {
        let entities = self.entities.read().await;
        let aspects = entities
            .get(urn)
            .ok_or_else(|| CatalogError::NotFound(format!("entity '{}'", urn)))?;
        Ok(aspects.get(&aspect).cloned())
    }

    async fn ingest_proposal(&self, proposal: ChangeProposal) -> Result<IngestReceipt> {
        proposal.validate()?;
        self.check_size(&proposal)?;

        let mut entities = self.entities.write().await;

        let previous = self.applied.lock().get(&proposal.proposal_id).cloned();
        if let Some(receipt) = previous {
            debug!("proposal {} already applied, skipping", proposal.proposal_id);
            return Ok(IngestReceipt {
                applied: false,
                ..receipt
            });
        }

        let aspect_name = proposal.aspect_name;
        let current = entities
            .get(&proposal.entity_urn)
            .and_then(|aspects| aspects.get(&aspect_name));

        let next_value = match &proposal.payload {
            ProposalPayload::FullValue(aspect) => aspect.clone(),
            ProposalPayload::Patch(document) => {
                PatchEngine::apply_document(current.map(|c| &c.value), aspect_name, document)
                    .map_err(|err| {
                        warn!(
                            "rejected patch {} for {} on {}: {}",
                            proposal.proposal_id, aspect_name, proposal.entity_urn, err
                        );
                        err
                    })?
            }
        };
        let version = current.map_or(1, |c| c.version + 1);
        let stored = VersionedAspect::new(next_value, version, proposal.audit.clone())?;

        let receipt = IngestReceipt {
            proposal_id: proposal.proposal_id.clone(),
            entity_urn: proposal.entity_urn.clone(),
            aspect_name,
            version,
            content_hash: stored.content_hash.clone(),
            applied: true,
        };

        entities
            .entry(proposal.entity_urn.clone())
            .or_default()
            .insert(aspect_name, stored);
        self.applied.lock().remember(receipt.clone());

        info!(
            "{:?} {} on {} -> version {}",
            proposal.change_type(),
            aspect_name,
            proposal.entity_urn,
            version
        );
        Ok(receipt)
    }
}

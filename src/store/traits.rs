use crate::error::Result;
use crate::model::{AspectName, ChangeProposal, EntityUrn, IngestReceipt, VersionedAspect};

/// The seam between patch producers and whatever holds aspect state.
///
/// Implementations must serialize ingestion per (entity, aspect): two patches
/// for the same target never interleave their field mutations.
#[async_trait::async_trait]
pub trait AspectStore: Send + Sync {
    /// Current merged value. `Ok(None)` when the entity exists without this
    /// aspect; `NotFound` when the entity is unknown altogether.
    async fn get_aspect(
        &self,
        urn: &EntityUrn,
        aspect: AspectName,
    ) -> Result<Option<VersionedAspect>>;

    /// Overwrite (full value) or merge (patch) one proposal. A rejected
    /// proposal leaves the stored state unchanged.
    async fn ingest_proposal(&self, proposal: ChangeProposal) -> Result<IngestReceipt>;

    /// Send proposals in order, stopping at the first failure
    async fn emit_all<I>(&self, proposals: I) -> Result<Vec<IngestReceipt>>
    where
        I: IntoIterator<Item = ChangeProposal> + Send,
        I::IntoIter: Send,
    {
        let mut receipts = Vec::new();
        for proposal in proposals {
            receipts.push(self.ingest_proposal(proposal).await?);
        }
        Ok(receipts)
    }
}

use crate::error::SourceError;
use async_trait::async_trait;
use model::{pagination::request::RequestId, records::batch::Batch};

/// The remote batch-fetch operation of a query engine.
///
/// Implementations may answer with fewer rows than requested, must accept
/// ranges that do not line up with their own internal chunking, and must set
/// the final flag on the batch whose last row is the last row of the result.
/// A range starting right after the last row is answered with an empty,
/// final batch.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(
        &self,
        request_id: RequestId,
        begin_row: u64,
        end_row: u64,
    ) -> Result<Batch, SourceError>;
}

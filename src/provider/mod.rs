//! Provider adapters, one per remote synthesis backend.
//!
//! Each adapter encapsulates the protocol of one provider behind a uniform
//! contract so the coordinator can drive any of them interchangeably.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ProviderTask, SynthesisRequest};

pub mod kie;
pub mod openai;

pub use kie::KieAdapter;
pub use openai::OpenAiAdapter;

/// Uniform contract for one remote image synthesis backend.
///
/// Task lifecycle: `submit` acknowledges a request into `Polling` (or, for a
/// synchronous provider, directly into `Succeeded`/`Failed`), `poll`
/// refreshes the task's state, and `download` fetches the result binary.
/// `download` may only be called on a `Succeeded` task; any other state is a
/// programming error surfaced as `TaskNotReady`.
///
/// Tasks are owned by the adapter instance that created them and are never
/// shared across adapters.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short provider name used in logs and result attribution.
    fn name(&self) -> &str;

    /// Submit a synthesis request, returning the acknowledged task.
    async fn submit(&self, request: &SynthesisRequest) -> Result<ProviderTask>;

    /// Refresh the task's state from the provider.
    async fn poll(&self, task: ProviderTask) -> Result<ProviderTask>;

    /// Download the result binary for a succeeded task.
    async fn download(&self, task: &ProviderTask) -> Result<Vec<u8>>;
}

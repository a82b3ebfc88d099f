//! Trusted-network resolution: the operator override, or the provider's
//! meta endpoint queried fresh on every delivery.

use hookgate_core::network::{MetaDocument, TrustedNetworks};
use hookgate_core::HookError;

use crate::state::GateSettings;

/// Fetch the `hooks` blocks from the meta endpoint.
pub async fn fetch_hook_blocks(
    client: &reqwest::Client,
    meta_url: &str,
) -> Result<Vec<String>, HookError> {
    let response = client
        .get(meta_url)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| HookError::NetworkLookup(format!("GET {meta_url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HookError::NetworkLookup(format!(
            "GET {meta_url}: HTTP {status}"
        )));
    }

    let meta: MetaDocument = response
        .json()
        .await
        .map_err(|e| HookError::NetworkLookup(format!("GET {meta_url}: {e}")))?;
    Ok(meta.hooks)
}

/// Build the trusted set for one delivery.
pub async fn trusted_networks(
    client: &reqwest::Client,
    settings: &GateSettings,
) -> Result<TrustedNetworks, HookError> {
    if let Some(ref block) = settings.origin_override {
        return TrustedNetworks::from_blocks(&[block]);
    }
    let blocks = fetch_hook_blocks(client, &settings.meta_url).await?;
    tracing::debug!(count = blocks.len(), "fetched hook blocks");
    TrustedNetworks::from_blocks(&blocks)
}

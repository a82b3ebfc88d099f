use anyhow::Context;
use clap::Args;
use hookgate_core::network::{self, DEFAULT_META_URL};
use hookgate_server::GateSettings;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "HOOKGATE_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Trust only this address or CIDR block instead of querying the meta endpoint
    #[arg(long, env = "GHE_ADDRESS")]
    ghe_address: Option<String>,

    /// Provider meta endpoint listing webhook source blocks
    #[arg(long, env = "GITHUB_META_URL", default_value = DEFAULT_META_URL)]
    meta_url: String,

    /// Timeout for the meta endpoint request, in seconds
    #[arg(long, env = "GITHUB_META_TIMEOUT_SECS", default_value = "10")]
    meta_timeout_secs: u64,
}

impl ServeArgs {
    fn settings(self, repos: PathBuf, debug: bool) -> anyhow::Result<GateSettings> {
        let mut settings = GateSettings::new(repos)
            .with_meta_url(self.meta_url)
            .with_meta_timeout(Duration::from_secs(self.meta_timeout_secs))
            .with_debug(debug);
        if let Some(block) = self.ghe_address.filter(|b| !b.trim().is_empty()) {
            network::parse_block(&block).with_context(|| format!("invalid GHE_ADDRESS '{block}'"))?;
            settings = settings.with_origin_override(block);
        }
        Ok(settings)
    }
}

pub fn run(repos: PathBuf, args: ServeArgs, debug: bool) -> anyhow::Result<()> {
    if !repos.exists() {
        tracing::warn!(
            repos = %repos.display(),
            "repository store not found; push deliveries will fail until it exists"
        );
    }

    let bind = args.bind.clone();
    let settings = args.settings(repos, debug)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        };
        hookgate_server::serve(settings, &bind, shutdown)
            .await
            .with_context(|| format!("failed to serve on {bind}"))
    })
}

use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use hookgate_core::signature::{self, Algorithm};
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Shared secret configured for the repository
    #[arg(long, env = "HOOKGATE_SIGN_KEY", hide_env_values = true)]
    key: String,

    /// Payload file (default: stdin)
    file: Option<PathBuf>,
}

pub fn run(args: SignArgs, json: bool) -> anyhow::Result<()> {
    let body = match &args.file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };

    let sha1 = signature::sign(Algorithm::Sha1, args.key.as_bytes(), &body);
    let sha256 = signature::sign(Algorithm::Sha256, args.key.as_bytes(), &body);

    if json {
        let mut value = serde_json::Map::new();
        value.insert(signature::SHA1_HEADER.to_string(), sha1.into());
        value.insert(signature::SHA256_HEADER.to_string(), sha256.into());
        print_json(&value)
    } else {
        println!("{}: {sha1}", signature::SHA1_HEADER);
        println!("{}: {sha256}", signature::SHA256_HEADER);
        Ok(())
    }
}

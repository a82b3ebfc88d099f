use crate::error::{HookError, Result};
use ipnet::IpNet;
use serde::Deserialize;
use std::net::IpAddr;

/// Environment variable holding a fixed trusted address or block, used
/// instead of the provider's meta endpoint (GitHub Enterprise).
pub const ORIGIN_OVERRIDE_ENV: &str = "GHE_ADDRESS";

/// Default provider meta endpoint.
pub const DEFAULT_META_URL: &str = "https://api.github.com/meta";

/// The subset of the provider's meta document the gate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub hooks: Vec<String>,
}

/// Parse one block: a CIDR (`192.30.252.0/22`) or a bare address, which
/// becomes a single-host network.
pub fn parse_block(block: &str) -> Result<IpNet> {
    let block = block.trim();
    if let Ok(net) = block.parse::<IpNet>() {
        return Ok(net);
    }
    let invalid = || HookError::InvalidNetworkBlock(block.to_string());
    let addr = block.parse::<IpAddr>().map_err(|_| invalid())?;
    let host_len = if addr.is_ipv4() { 32 } else { 128 };
    IpNet::new(addr, host_len).map_err(|_| invalid())
}

/// The set of network blocks deliveries may originate from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedNetworks {
    blocks: Vec<IpNet>,
}

impl TrustedNetworks {
    pub fn from_blocks<S: AsRef<str>>(blocks: &[S]) -> Result<Self> {
        let blocks = blocks
            .iter()
            .map(|b| parse_block(b.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { blocks })
    }

    pub fn from_meta(meta: &MetaDocument) -> Result<Self> {
        Self::from_blocks(&meta.hooks)
    }

    pub fn blocks(&self) -> &[IpNet] {
        &self.blocks
    }

    /// True when `ip` falls inside at least one block. IPv4-mapped IPv6
    /// callers (from dual-stack listeners) are matched as IPv4.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.blocks.iter().any(|net| net.contains(&ip))
    }

    /// `Ok(())` if `ip` is trusted, otherwise an origin rejection.
    pub fn check(&self, ip: IpAddr) -> Result<()> {
        if self.contains(ip) {
            Ok(())
        } else {
            Err(HookError::UntrustedOrigin(ip.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn cidr_membership() {
        let nets =
            TrustedNetworks::from_blocks(&["192.30.252.0/22", "185.199.108.0/22"]).unwrap();
        assert!(nets.contains(ip("192.30.252.41")));
        assert!(nets.contains(ip("185.199.111.255")));
        assert!(!nets.contains(ip("10.0.0.1")));
    }

    #[test]
    fn single_address_is_a_host_block() {
        let nets = TrustedNetworks::from_blocks(&["10.1.2.3"]).unwrap();
        assert!(nets.contains(ip("10.1.2.3")));
        assert!(!nets.contains(ip("10.1.2.4")));
    }

    #[test]
    fn ipv6_blocks() {
        let nets = TrustedNetworks::from_blocks(&["2a0a:a440::/29"]).unwrap();
        assert!(nets.contains(ip("2a0a:a440::1")));
        assert!(!nets.contains(ip("2001:db8::1")));
    }

    #[test]
    fn ipv4_mapped_callers_match_ipv4_blocks() {
        let nets = TrustedNetworks::from_blocks(&["192.30.252.0/22"]).unwrap();
        assert!(nets.contains(ip("::ffff:192.30.252.1")));
    }

    #[test]
    fn empty_set_trusts_nobody() {
        let nets = TrustedNetworks::default();
        assert!(matches!(
            nets.check(ip("127.0.0.1")),
            Err(HookError::UntrustedOrigin(_))
        ));
    }

    #[test]
    fn invalid_block_is_rejected() {
        let err = TrustedNetworks::from_blocks(&["192.30.252.0/99"]).unwrap_err();
        assert!(matches!(err, HookError::InvalidNetworkBlock(_)));
    }

    #[test]
    fn meta_document_hooks() {
        let meta: MetaDocument =
            serde_json::from_str(r#"{"verifiable_password_authentication":true,"hooks":["192.30.252.0/22"]}"#)
                .unwrap();
        let nets = TrustedNetworks::from_meta(&meta).unwrap();
        assert_eq!(nets.blocks().len(), 1);
    }
}

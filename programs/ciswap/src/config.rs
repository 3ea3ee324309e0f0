//! Protocol configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! { "fee_bps": 30, "lp_share_pct": 10, "creation_fee": 1000000 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    error::{CiswapError, Result},
    types::{Address, AssetId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Swap fee in basis points (1–1000)
    pub fee_bps: u64,
    /// Percent of each fee distributed to positions (0–100)
    pub lp_share_pct: u64,
    /// Charged in `native_asset` by `create_pair`
    pub creation_fee: u64,
    pub native_asset: AssetId,
    /// Receives creation fees
    pub treasury: Address,
    /// Only this address may replace the configuration
    pub admin: Address,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            fee_bps: FEE_RATE_DEFAULT_BPS,
            lp_share_pct: LP_SHARE_DEFAULT_PCT,
            creation_fee: 0,
            native_asset: AssetId::native(),
            treasury: Address::treasury(),
            admin: Address::admin(),
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps == 0 || self.fee_bps > FEE_RATE_MAX_BPS {
            return Err(CiswapError::InvalidConfig(format!(
                "fee_bps must be 1–{FEE_RATE_MAX_BPS}, got {}",
                self.fee_bps
            )));
        }
        if self.lp_share_pct as u128 > PCT_DENOMINATOR {
            return Err(CiswapError::InvalidConfig(format!(
                "lp_share_pct must be 0–100, got {}",
                self.lp_share_pct
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CiswapError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CiswapError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }
}

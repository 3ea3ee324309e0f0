//! Identifiers shared across the engine.
//!
//! `Address` and `AssetId` are opaque 32-byte keys. Keys owned by the engine
//! (pool custody, fee stores, virtual assets) are derived from seeds with
//! SHA-256, so the same pool id always yields the same identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::*;

/// Dense pool identifier, assigned sequentially from zero.
pub type PoolId = u64;

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Derive a key from `seeds`: `sha256(seed_0 || seed_1 || …)`.
            pub fn derive(seeds: &[&[u8]]) -> Self {
                let mut hasher = Sha256::new();
                for seed in seeds {
                    hasher.update(seed);
                }
                Self(hasher.finalize().into())
            }

            pub fn to_bytes(&self) -> [u8; 32] {
                self.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = bs58::decode(s)
                    .into_vec()
                    .map_err(|e| format!("invalid base58 key {s:?}: {e}"))?;
                let bytes: [u8; 32] = bytes
                    .try_into()
                    .map_err(|v: Vec<u8>| format!("key {s:?} is {} bytes; expected 32", v.len()))?;
                Ok(Self(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

define_key!(
    /// Account holding balances: users, pool custody, fee stores, treasury.
    Address
);

define_key!(
    /// Fungible asset identifier understood by the [`Bank`](crate::bank::Bank).
    AssetId
);

impl Address {
    /// Custody account holding a pool's real and virtual reserves.
    pub fn pool_authority(pool_id: PoolId) -> Self {
        Self::derive(&[POOL_AUTHORITY_SEED, &pool_id.to_le_bytes()])
    }

    /// Account holding a pool's collected-but-undistributed fees.
    pub fn fee_store(pool_id: PoolId) -> Self {
        Self::derive(&[FEE_STORE_SEED, &pool_id.to_le_bytes()])
    }

    /// Default protocol treasury.
    pub fn treasury() -> Self {
        Self::derive(&[TREASURY_SEED])
    }

    /// Default protocol admin.
    pub fn admin() -> Self {
        Self::derive(&[ADMIN_SEED])
    }
}

impl AssetId {
    /// Platform native asset, used for pool creation fees.
    pub fn native() -> Self {
        Self::derive(&[NATIVE_ASSET_SEED])
    }

    /// Virtual (debt) asset minted for one side of a pool.
    pub fn virtual_asset(pool_id: PoolId, side: Side) -> Self {
        Self::derive(&[VIRTUAL_SEED, &pool_id.to_le_bytes(), side.seed()])
    }
}

/// One side of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    X,
    Y,
}

impl Side {
    fn seed(self) -> &'static [u8] {
        match self {
            Side::X => b"x",
            Side::Y => b"y",
        }
    }
}

/// Swap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    XToY,
    YToX,
}

impl Direction {
    /// Side the caller pays into.
    pub fn input_side(self) -> Side {
        match self {
            Direction::XToY => Side::X,
            Direction::YToX => Side::Y,
        }
    }

    /// Side the recipient is paid from.
    pub fn output_side(self) -> Side {
        match self {
            Direction::XToY => Side::Y,
            Direction::YToX => Side::X,
        }
    }
}

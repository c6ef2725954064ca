//! Multi-asset values.
//!
//! A [`Value`] is a quantity of the base asset plus a finite map of other
//! asset quantities, keyed by policy and asset name. Values form a
//! commutative monoid under componentwise addition, with a componentwise
//! partial order. Quantities are signed: forging uses negative components
//! to burn, but every value stored in the ledger is strictly positive.

use std::{collections::BTreeMap, fmt, io};

use byteorder::{ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    amount::{Amount, Coin},
    script::ScriptHash,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
};

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;

#[cfg(test)]
mod tests;

/// The result of a value operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The policy under which a non-base asset was forged.
///
/// A policy is a script hash: forging requires satisfying the script.
pub type PolicyId = ScriptHash;

/// Errors that can be returned when operating on `Value`s
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Componentwise arithmetic left the representable range
    #[error("value arithmetic overflowed")]
    Overflow,
    /// An asset name exceeded the length limit
    #[error("asset name is {len} bytes, longer than the 32 byte limit")]
    AssetNameTooLong {
        /// The length of the rejected name
        len: usize,
    },
    /// The value has a zero or negative component where positivity is required
    #[error("value is not strictly positive")]
    NotPositive,
}

/// The name of an asset under a policy, at most 32 bytes.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// The maximum length of an asset name in bytes.
    pub const MAX_LEN: usize = 32;

    /// Create an asset name, checking the length limit.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() > Self::MAX_LEN {
            return Err(Error::AssetNameTooLong { len: bytes.len() });
        }
        Ok(AssetName(bytes))
    }
}

impl AsRef<[u8]> for AssetName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("AssetName")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl CanonicalSerialize for AssetName {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.0.len() as u64)?;
        writer.write_all(&self.0)
    }
}

impl CanonicalDeserialize for AssetName {
    fn canonical_deserialize<R: io::Read>(
        mut reader: R,
    ) -> Result<Self, SerializationError> {
        let len = usize::try_from(reader.read_compact_u64()?)?;
        if len > Self::MAX_LEN {
            return Err(SerializationError::Parse("asset name too long"));
        }
        let mut bytes = vec![0; len];
        reader.read_exact(&mut bytes)?;
        Ok(AssetName(bytes))
    }
}

/// The non-base-asset components of a value.
type Assets = BTreeMap<PolicyId, BTreeMap<AssetName, i64>>;

/// A multi-asset value.
///
/// # Correctness
///
/// The representation is canonical: zero quantities and empty policy maps
/// are never stored, so values with equal content compare equal and encode
/// to identical bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Value {
    coin: i64,
    assets: Assets,
}

impl Value {
    /// The identity of the value monoid.
    pub fn zero() -> Value {
        Value::default()
    }

    /// A value holding `quantity` of a single non-base asset.
    pub fn from_asset(policy: PolicyId, name: AssetName, quantity: i64) -> Value {
        let mut value = Value::zero();
        if quantity != 0 {
            value.assets.entry(policy).or_default().insert(name, quantity);
        }
        value
    }

    /// The base-asset component.
    pub fn coin(&self) -> i64 {
        self.coin
    }

    /// The quantity of the asset under `policy` named `name`, zero when the
    /// value has no such component.
    pub fn quantity(&self, policy: &PolicyId, name: &AssetName) -> i64 {
        self.assets
            .get(policy)
            .and_then(|names| names.get(name))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over the non-base components as `(policy, name, quantity)`.
    pub fn assets(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, i64)> {
        self.assets.iter().flat_map(|(policy, names)| {
            names.iter().map(move |(name, quantity)| (policy, name, *quantity))
        })
    }

    /// Iterate over the policies of the non-base components.
    pub fn policies(&self) -> impl Iterator<Item = &PolicyId> {
        self.assets.keys()
    }

    /// Returns whether this is the zero value.
    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.assets.is_empty()
    }

    /// Returns whether every component, the base asset included, is
    /// strictly positive.
    pub fn is_positive(&self) -> bool {
        self.coin > 0 && self.assets().all(|(_, _, quantity)| quantity > 0)
    }

    /// Componentwise order: `self ≤ other` when every component of `self`
    /// is at most the corresponding component of `other`.
    pub fn leq(&self, other: &Value) -> bool {
        if self.coin > other.coin {
            return false;
        }
        let selfward = self
            .assets()
            .all(|(policy, name, quantity)| quantity <= other.quantity(policy, name));
        let otherward = other
            .assets()
            .all(|(policy, name, quantity)| self.quantity(policy, name) <= quantity);
        selfward && otherward
    }

    /// The stored form of this value.
    ///
    /// Fails unless the value is strictly positive; only positive values
    /// are ever stored in the ledger.
    pub fn to_compact(&self) -> Result<CompactValue> {
        CompactValue::try_from(self.clone())
    }

    fn insert_checked(
        &mut self,
        policy: &PolicyId,
        name: &AssetName,
        delta: i64,
    ) -> Result<()> {
        let quantity = self
            .quantity(policy, name)
            .checked_add(delta)
            .ok_or(Error::Overflow)?;
        let names = self.assets.entry(*policy).or_default();
        if quantity == 0 {
            names.remove(name);
        } else {
            names.insert(name.clone(), quantity);
        }
        if names.is_empty() {
            self.assets.remove(policy);
        }
        Ok(())
    }
}

impl<C> From<Amount<C>> for Value {
    fn from(amount: Amount<C>) -> Value {
        Value {
            coin: amount.into(),
            assets: Assets::new(),
        }
    }
}

impl std::ops::Add for Value {
    type Output = Result<Value>;

    fn add(self, rhs: Value) -> Self::Output {
        let mut value = self;
        value.coin = value.coin.checked_add(rhs.coin).ok_or(Error::Overflow)?;
        for (policy, names) in &rhs.assets {
            for (name, quantity) in names {
                value.insert_checked(policy, name, *quantity)?;
            }
        }
        Ok(value)
    }
}

impl std::ops::Add<Value> for Result<Value> {
    type Output = Result<Value>;

    fn add(self, rhs: Value) -> Self::Output {
        self? + rhs
    }
}

impl std::ops::Add<Result<Value>> for Value {
    type Output = Result<Value>;

    fn add(self, rhs: Result<Value>) -> Self::Output {
        self + rhs?
    }
}

impl std::ops::Neg for Value {
    type Output = Result<Value>;

    fn neg(self) -> Self::Output {
        let coin = self.coin.checked_neg().ok_or(Error::Overflow)?;
        let mut assets = Assets::new();
        for (policy, names) in &self.assets {
            let mut negated = BTreeMap::new();
            for (name, quantity) in names {
                negated.insert(name.clone(), quantity.checked_neg().ok_or(Error::Overflow)?);
            }
            assets.insert(*policy, negated);
        }
        Ok(Value { coin, assets })
    }
}

impl std::ops::Sub for Value {
    type Output = Result<Value>;

    fn sub(self, rhs: Value) -> Self::Output {
        self + (-rhs)?
    }
}

impl std::ops::Sub<Value> for Result<Value> {
    type Output = Result<Value>;

    fn sub(self, rhs: Value) -> Self::Output {
        self? - rhs
    }
}

impl CanonicalSerialize for Value {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_i64(self.coin)?;
        self.assets.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for Value {
    fn canonical_deserialize<R: io::Read>(
        mut reader: R,
    ) -> Result<Self, SerializationError> {
        let coin = reader.read_compact_i64()?;
        let assets = Assets::canonical_deserialize(&mut reader)?;
        for names in assets.values() {
            if names.is_empty() {
                return Err(SerializationError::Parse("empty asset policy map"));
            }
            if names.values().any(|&quantity| quantity == 0) {
                return Err(SerializationError::Parse("zero asset quantity"));
            }
        }
        Ok(Value { coin, assets })
    }
}

/// The encoding-optimized stored form of a strictly positive [`Value`].
///
/// Base-only values, the overwhelmingly common case, store just the coin;
/// multi-asset values keep the full map with unsigned quantities. The two
/// forms round-trip with `Value` exactly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CompactValue {
    /// A value holding only the base asset.
    Coin(Coin),
    /// A value holding the base asset and at least one other asset.
    MultiAsset {
        /// The base-asset component.
        coin: Coin,
        /// The non-base components; every quantity is strictly positive.
        assets: BTreeMap<PolicyId, BTreeMap<AssetName, i64>>,
    },
}

impl CompactValue {
    /// The base-asset component.
    pub fn coin(&self) -> Coin {
        match self {
            CompactValue::Coin(coin) => *coin,
            CompactValue::MultiAsset { coin, .. } => *coin,
        }
    }

    /// Decode back into the general form.
    pub fn value(&self) -> Value {
        match self {
            CompactValue::Coin(coin) => Value::from(*coin),
            CompactValue::MultiAsset { coin, assets } => Value {
                coin: (*coin).into(),
                assets: assets.clone(),
            },
        }
    }
}

impl TryFrom<Value> for CompactValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<CompactValue> {
        if !value.is_positive() {
            return Err(Error::NotPositive);
        }
        let coin = Coin::try_from(value.coin).map_err(|_| Error::Overflow)?;
        if value.assets.is_empty() {
            Ok(CompactValue::Coin(coin))
        } else {
            Ok(CompactValue::MultiAsset {
                coin,
                assets: value.assets,
            })
        }
    }
}

impl CanonicalSerialize for CompactValue {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            CompactValue::Coin(coin) => {
                writer.write_u8(0)?;
                coin.canonical_serialize(&mut writer)
            }
            CompactValue::MultiAsset { coin, assets } => {
                writer.write_u8(1)?;
                coin.canonical_serialize(&mut writer)?;
                writer.write_compact_u64(assets.len() as u64)?;
                for (policy, names) in assets {
                    policy.canonical_serialize(&mut writer)?;
                    writer.write_compact_u64(names.len() as u64)?;
                    for (name, quantity) in names {
                        name.canonical_serialize(&mut writer)?;
                        writer.write_compact_u64(*quantity as u64)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl CanonicalDeserialize for CompactValue {
    fn canonical_deserialize<R: io::Read>(
        mut reader: R,
    ) -> Result<Self, SerializationError> {
        match reader.read_u8()? {
            0 => {
                let coin = Coin::canonical_deserialize(&mut reader)?;
                if coin.is_zero() {
                    return Err(SerializationError::Parse("stored value must be positive"));
                }
                Ok(CompactValue::Coin(coin))
            }
            1 => {
                let coin = Coin::canonical_deserialize(&mut reader)?;
                if coin.is_zero() {
                    return Err(SerializationError::Parse("stored value must be positive"));
                }
                let policy_count = reader.read_compact_u64()?;
                if policy_count == 0 {
                    return Err(SerializationError::Parse(
                        "multi-asset stored value without assets",
                    ));
                }
                let mut assets = Assets::new();
                let mut last_policy: Option<PolicyId> = None;
                for _ in 0..policy_count {
                    let policy = PolicyId::canonical_deserialize(&mut reader)?;
                    if last_policy.map_or(false, |prev| prev >= policy) {
                        return Err(SerializationError::Parse(
                            "map keys not in strictly ascending order",
                        ));
                    }
                    last_policy = Some(policy);
                    let name_count = reader.read_compact_u64()?;
                    if name_count == 0 {
                        return Err(SerializationError::Parse("empty asset policy map"));
                    }
                    let mut names = BTreeMap::new();
                    let mut last_name: Option<AssetName> = None;
                    for _ in 0..name_count {
                        let name = AssetName::canonical_deserialize(&mut reader)?;
                        if last_name.as_ref().map_or(false, |prev| prev >= &name) {
                            return Err(SerializationError::Parse(
                                "map keys not in strictly ascending order",
                            ));
                        }
                        let quantity = reader.read_compact_u64()?;
                        if quantity == 0 {
                            return Err(SerializationError::Parse("zero asset quantity"));
                        }
                        let quantity = i64::try_from(quantity)?;
                        names.insert(name.clone(), quantity);
                        last_name = Some(name);
                    }
                    assets.insert(policy, names);
                }
                Ok(CompactValue::MultiAsset { coin, assets })
            }
            _ => Err(SerializationError::Parse("invalid stored value tag")),
        }
    }
}

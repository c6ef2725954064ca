//! Addresses, credentials, and reward accounts.
//!
//! An address carries a payment credential, which locks the funds at the
//! address, and a staking reference, which says where those funds' stake
//! rights point. Both credentials are either a key hash or a script hash.
//! Legacy bootstrap addresses from before the delegation era carry opaque
//! attribute bytes instead.
//!
//! The first byte of an address encoding is a header: the upper nibble is
//! the shape discriminant, the lower nibble the network.

use std::{fmt, io};

use byteorder::{ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::{
    keys::{PaymentKeyHash, StakingKeyHash},
    parameters::{Network, Slot},
    script::ScriptHash,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
};

/// The credential locking the funds at an address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum PaymentCredential {
    /// Spending requires a signature by the named key.
    Key(PaymentKeyHash),
    /// Spending requires satisfying the named script.
    Script(ScriptHash),
}

/// The credential controlling a reward account and its delegation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum StakeCredential {
    /// Staking rights exercised by a signature by the named key.
    Key(StakingKeyHash),
    /// Staking rights exercised by satisfying the named script.
    Script(ScriptHash),
}

/// A pointer to the certificate that registered a stake credential.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Ptr {
    /// The slot of the block holding the registering transaction.
    pub slot: Slot,
    /// The index of the registering transaction within that block.
    pub tx_index: u64,
    /// The index of the registering certificate within that transaction.
    pub cert_index: u64,
}

/// Where an address's stake rights point.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum StakeReference {
    /// Stake rights belong to the embedded credential.
    Base(StakeCredential),
    /// Stake rights belong to the credential registered by the pointed-at
    /// certificate.
    Pointer(Ptr),
    /// The address has no stake rights.
    Null,
}

/// A legacy address from before the delegation era.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct BootstrapAddress {
    /// The hash of the key locking the address.
    pub root: PaymentKeyHash,
    /// Opaque derivation attributes carried by the legacy format.
    pub attributes: Vec<u8>,
}

impl BootstrapAddress {
    /// The maximum attribute size accepted in new outputs.
    pub const MAX_ATTRIBUTES_LEN: usize = 64;
}

/// An address.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Address {
    /// A delegation-era address.
    Shelley {
        /// The network the address belongs to.
        network: Network,
        /// The credential locking funds at the address.
        payment: PaymentCredential,
        /// Where the address's stake rights point.
        stake: StakeReference,
    },
    /// A legacy address.
    Bootstrap(BootstrapAddress),
}

impl Address {
    /// The credential locking funds at this address.
    pub fn payment_credential(&self) -> PaymentCredential {
        match self {
            Address::Shelley { payment, .. } => *payment,
            Address::Bootstrap(bootstrap) => PaymentCredential::Key(bootstrap.root),
        }
    }

    /// The network this address declares, if the format carries one.
    ///
    /// Bootstrap addresses bury their network inside the opaque attributes,
    /// so they are exempt from network checking.
    pub fn network(&self) -> Option<Network> {
        match self {
            Address::Shelley { network, .. } => Some(*network),
            Address::Bootstrap(_) => None,
        }
    }

    fn header(&self) -> u8 {
        use PaymentCredential::*;
        use StakeReference::*;

        match self {
            Address::Shelley {
                network,
                payment,
                stake,
            } => {
                let shape: u8 = match (payment, stake) {
                    (Key(_), Base(StakeCredential::Key(_))) => 0b0000,
                    (Script(_), Base(StakeCredential::Key(_))) => 0b0001,
                    (Key(_), Base(StakeCredential::Script(_))) => 0b0010,
                    (Script(_), Base(StakeCredential::Script(_))) => 0b0011,
                    (Key(_), Pointer(_)) => 0b0100,
                    (Script(_), Pointer(_)) => 0b0101,
                    (Key(_), Null) => 0b0110,
                    (Script(_), Null) => 0b0111,
                };
                (shape << 4) | network.id()
            }
            Address::Bootstrap(_) => 0b1000_0000,
        }
    }
}

impl CanonicalSerialize for Address {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.header())?;
        match self {
            Address::Shelley { payment, stake, .. } => {
                match payment {
                    PaymentCredential::Key(hash) => writer.write_28_bytes(&hash.0)?,
                    PaymentCredential::Script(hash) => writer.write_28_bytes(&hash.0)?,
                }
                match stake {
                    StakeReference::Base(StakeCredential::Key(hash)) => {
                        writer.write_28_bytes(&hash.0)
                    }
                    StakeReference::Base(StakeCredential::Script(hash)) => {
                        writer.write_28_bytes(&hash.0)
                    }
                    StakeReference::Pointer(ptr) => {
                        ptr.slot.canonical_serialize(&mut writer)?;
                        writer.write_compact_u64(ptr.tx_index)?;
                        writer.write_compact_u64(ptr.cert_index)
                    }
                    StakeReference::Null => Ok(()),
                }
            }
            Address::Bootstrap(bootstrap) => {
                writer.write_28_bytes(&bootstrap.root.0)?;
                bootstrap.attributes.canonical_serialize(&mut writer)
            }
        }
    }
}

impl CanonicalDeserialize for Address {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let header = reader.read_u8()?;
        let shape = header >> 4;

        if shape == 0b1000 {
            if header & 0x0f != 0 {
                return Err(SerializationError::Parse("invalid bootstrap address header"));
            }
            let root = PaymentKeyHash(reader.read_28_bytes()?);
            let attributes = Vec::canonical_deserialize(&mut reader)?;
            return Ok(Address::Bootstrap(BootstrapAddress { root, attributes }));
        }

        let network = Network::from_id(header & 0x0f)
            .ok_or(SerializationError::Parse("invalid address network id"))?;
        let payment_bytes = reader.read_28_bytes()?;
        let payment = if shape & 0b0001 == 0 {
            PaymentCredential::Key(PaymentKeyHash(payment_bytes))
        } else {
            PaymentCredential::Script(ScriptHash(payment_bytes))
        };
        let stake = match shape {
            0b0000 | 0b0001 => {
                StakeReference::Base(StakeCredential::Key(StakingKeyHash(reader.read_28_bytes()?)))
            }
            0b0010 | 0b0011 => {
                StakeReference::Base(StakeCredential::Script(ScriptHash(reader.read_28_bytes()?)))
            }
            0b0100 | 0b0101 => StakeReference::Pointer(Ptr {
                slot: Slot::canonical_deserialize(&mut reader)?,
                tx_index: reader.read_compact_u64()?,
                cert_index: reader.read_compact_u64()?,
            }),
            0b0110 | 0b0111 => StakeReference::Null,
            _ => return Err(SerializationError::Parse("invalid address header")),
        };

        Ok(Address::Shelley {
            network,
            payment,
            stake,
        })
    }
}

/// An account accruing staking rewards, addressed by its controlling
/// credential.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct RewardAccount {
    /// The network the account belongs to.
    pub network: Network,
    /// The credential controlling withdrawals from the account.
    pub credential: StakeCredential,
}

impl CanonicalSerialize for RewardAccount {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        let (shape, bytes) = match &self.credential {
            StakeCredential::Key(hash) => (0b1110, hash.0),
            StakeCredential::Script(hash) => (0b1111, hash.0),
        };
        writer.write_u8((shape << 4) | self.network.id())?;
        writer.write_28_bytes(&bytes)
    }
}

impl CanonicalDeserialize for RewardAccount {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let header = reader.read_u8()?;
        let network = Network::from_id(header & 0x0f)
            .ok_or(SerializationError::Parse("invalid address network id"))?;
        let bytes = reader.read_28_bytes()?;
        let credential = match header >> 4 {
            0b1110 => StakeCredential::Key(StakingKeyHash(bytes)),
            0b1111 => StakeCredential::Script(ScriptHash(bytes)),
            _ => return Err(SerializationError::Parse("invalid reward account header")),
        };
        Ok(RewardAccount {
            network,
            credential,
        })
    }
}

impl fmt::Display for RewardAccount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self
            .canonical_serialize_to_vec()
            .expect("serializing into a Vec never fails");
        f.write_str(&hex::encode(bytes))
    }
}

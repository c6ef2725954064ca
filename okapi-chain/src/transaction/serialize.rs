//! Canonical serialization of transactions.

use std::{
    collections::{BTreeMap, BTreeSet},
    io,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    address::Address,
    amount::Coin,
    parameters::Slot,
    primitives::ed25519,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
    value::Value,
};

use super::{
    witness::{BootstrapWitness, VKeyWitness, WitnessSet},
    Body, Hash, Metadata, MetadataHash, Transaction, TxIn, TxOut,
};

impl CanonicalSerialize for TxIn {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_32_bytes(&self.id.0)?;
        writer.write_u32::<LittleEndian>(self.index)
    }
}

impl CanonicalDeserialize for TxIn {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(TxIn {
            id: Hash(reader.read_32_bytes()?),
            index: reader.read_u32::<LittleEndian>()?,
        })
    }
}

impl CanonicalSerialize for TxOut {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.address.canonical_serialize(&mut writer)?;
        self.value.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for TxOut {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(TxOut {
            address: Address::canonical_deserialize(&mut reader)?,
            value: Value::canonical_deserialize(&mut reader)?,
        })
    }
}

impl CanonicalSerialize for MetadataHash {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_32_bytes(&self.0)
    }
}

impl CanonicalDeserialize for MetadataHash {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(MetadataHash(reader.read_32_bytes()?))
    }
}

impl CanonicalSerialize for Metadata {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.0.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for Metadata {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Metadata(Vec::canonical_deserialize(&mut reader)?))
    }
}

/// Bodies are encoded with a fixed field order and no tags; the encoding
/// is the sole input to the identity hash.
impl CanonicalSerialize for Body {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.inputs.canonical_serialize(&mut writer)?;
        self.outputs.canonical_serialize(&mut writer)?;
        self.certificates.canonical_serialize(&mut writer)?;
        self.forge.canonical_serialize(&mut writer)?;
        self.withdrawals.canonical_serialize(&mut writer)?;
        self.fee.canonical_serialize(&mut writer)?;
        self.ttl.canonical_serialize(&mut writer)?;
        self.update.canonical_serialize(&mut writer)?;
        self.metadata_hash.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for Body {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Body {
            inputs: BTreeSet::canonical_deserialize(&mut reader)?,
            outputs: Vec::canonical_deserialize(&mut reader)?,
            certificates: Vec::canonical_deserialize(&mut reader)?,
            forge: Value::canonical_deserialize(&mut reader)?,
            withdrawals: BTreeMap::canonical_deserialize(&mut reader)?,
            fee: Coin::canonical_deserialize(&mut reader)?,
            ttl: Slot::canonical_deserialize(&mut reader)?,
            update: Option::canonical_deserialize(&mut reader)?,
            metadata_hash: Option::canonical_deserialize(&mut reader)?,
        })
    }
}

impl From<&Body> for Hash {
    fn from(body: &Body) -> Self {
        let bytes = body
            .canonical_serialize_to_vec()
            .expect("serializing into a Vec never fails");
        Hash::of_body_bytes(&bytes)
    }
}

impl CanonicalSerialize for VKeyWitness {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_32_bytes(&self.vkey.into())?;
        writer.write_64_bytes(&self.signature.into())
    }
}

impl CanonicalDeserialize for VKeyWitness {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(VKeyWitness {
            vkey: ed25519::VerificationKeyBytes::from(reader.read_32_bytes()?),
            signature: ed25519::Signature::from(reader.read_64_bytes()?),
        })
    }
}

impl CanonicalSerialize for BootstrapWitness {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_32_bytes(&self.vkey.into())?;
        writer.write_64_bytes(&self.signature.into())?;
        writer.write_32_bytes(&self.chain_code)?;
        self.attributes.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for BootstrapWitness {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(BootstrapWitness {
            vkey: ed25519::VerificationKeyBytes::from(reader.read_32_bytes()?),
            signature: ed25519::Signature::from(reader.read_64_bytes()?),
            chain_code: reader.read_32_bytes()?,
            attributes: Vec::canonical_deserialize(&mut reader)?,
        })
    }
}

impl CanonicalSerialize for WitnessSet {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.vkey_witnesses.canonical_serialize(&mut writer)?;
        self.scripts.canonical_serialize(&mut writer)?;
        self.bootstrap_witnesses.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for WitnessSet {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let vkey_witnesses = BTreeSet::canonical_deserialize(&mut reader)?;
        let scripts: BTreeMap<_, crate::script::MultiSig> =
            BTreeMap::canonical_deserialize(&mut reader)?;
        for (hash, script) in &scripts {
            if script.hash() != *hash {
                return Err(SerializationError::Parse("script keyed by the wrong hash"));
            }
        }
        let bootstrap_witnesses = BTreeSet::canonical_deserialize(&mut reader)?;
        Ok(WitnessSet {
            vkey_witnesses,
            scripts,
            bootstrap_witnesses,
        })
    }
}

impl CanonicalSerialize for Transaction {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.body.canonical_serialize(&mut writer)?;
        self.witnesses.canonical_serialize(&mut writer)?;
        self.metadata.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for Transaction {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Transaction {
            body: Body::canonical_deserialize(&mut reader)?,
            witnesses: WitnessSet::canonical_deserialize(&mut reader)?,
            metadata: Option::canonical_deserialize(&mut reader)?,
        })
    }
}

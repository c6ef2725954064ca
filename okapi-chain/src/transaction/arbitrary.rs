//! Randomised data generation for transactions.

use proptest::{
    collection::{btree_map, btree_set, vec},
    prelude::*,
};

use crate::{
    address::RewardAccount,
    certificate::Certificate,
    parameters::{Slot, Update},
    value::{arbitrary::small_coin, Value},
};

use super::{Body, MetadataHash, TxIn, TxOut};

impl Arbitrary for Body {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            btree_set(any::<TxIn>(), 1..4),
            vec(any::<TxOut>(), 1..4),
            vec(any::<Certificate>(), 0..3),
            any::<Value>(),
            btree_map(any::<RewardAccount>(), small_coin(), 0..3),
            small_coin(),
            any::<Slot>(),
            any::<Option<Update>>(),
            any::<Option<MetadataHash>>(),
        )
            .prop_map(
                |(
                    inputs,
                    outputs,
                    certificates,
                    forge,
                    withdrawals,
                    fee,
                    ttl,
                    update,
                    metadata_hash,
                )| {
                    Body::new(
                        inputs,
                        outputs,
                        certificates,
                        forge,
                        withdrawals,
                        fee,
                        ttl,
                        update,
                        metadata_hash,
                    )
                },
            )
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

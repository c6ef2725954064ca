//! Randomised data generation for multi-asset values.

use proptest::{collection::btree_map, prelude::*};

use super::{AssetName, CompactValue, PolicyId, Value};
use crate::script::ScriptHash;
use crate::amount::{Coin, MAX_MONEY};

impl Arbitrary for AssetName {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        prop::collection::vec(any::<u8>(), 0..=8)
            .prop_map(|bytes| AssetName::new(bytes).expect("generated name is within the limit"))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A strategy for small policy identifiers, so generated values share
/// policies often enough to exercise the merge paths.
fn policy() -> impl Strategy<Value = PolicyId> {
    (0u8..4).prop_map(|byte| ScriptHash([byte; 28]))
}

/// A strategy for signed asset quantities, excluding zero.
fn quantity() -> impl Strategy<Value = i64> + Clone {
    prop_oneof![1i64..=1_000_000, -1_000_000i64..=-1]
}

fn assets(
    quantities: impl Strategy<Value = i64> + Clone,
) -> impl Strategy<Value = super::Assets> {
    btree_map(policy(), btree_map(any::<AssetName>(), quantities, 1..4), 0..3)
}

impl Arbitrary for Value {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        ((-1_000_000i64..=1_000_000), assets(quantity()))
            .prop_map(|(coin, assets)| {
                let mut value = Value { coin, assets: Default::default() };
                for (policy, names) in assets {
                    for (name, quantity) in names {
                        value
                            .insert_checked(&policy, &name, quantity)
                            .expect("generated quantities cannot overflow");
                    }
                }
                value
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A strategy for strictly positive values, as stored in the ledger.
pub fn positive_value() -> impl Strategy<Value = Value> {
    ((1i64..=MAX_MONEY / 2), assets(1i64..=1_000_000)).prop_map(|(coin, assets)| {
        let mut value = Value { coin, assets: Default::default() };
        for (policy, names) in assets {
            for (name, quantity) in names {
                value
                    .insert_checked(&policy, &name, quantity)
                    .expect("generated quantities cannot overflow");
            }
        }
        value
    })
}

impl Arbitrary for CompactValue {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        positive_value()
            .prop_map(|value| {
                CompactValue::try_from(value).expect("generated value is strictly positive")
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A strategy for coins within a comfortable test range.
pub fn small_coin() -> impl Strategy<Value = Coin> {
    (0i64..=1_000_000_000).prop_map(|units| units.try_into().expect("units are in range"))
}

//! Randomised data generation for amounts.

use std::fmt;

use proptest::prelude::*;

use super::{Amount, Constraint};

impl<C> Arbitrary for Amount<C>
where
    C: Constraint + fmt::Debug + 'static,
{
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        C::valid_range()
            .prop_map(|value| value.try_into().expect("value is in the valid range"))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

//! Property-based tests for the value monoid.

use proptest::prelude::*;

use super::super::{arbitrary::positive_value, CompactValue, Value};
use crate::serialization::{CanonicalDeserializeInto, CanonicalSerialize};

proptest! {
    #[test]
    fn addition_is_commutative(a in any::<Value>(), b in any::<Value>()) {
        prop_assert_eq!(a.clone() + b.clone(), b + a);
    }

    #[test]
    fn addition_is_associative(
        a in any::<Value>(),
        b in any::<Value>(),
        c in any::<Value>(),
    ) {
        let left = ((a.clone() + b.clone()) + c.clone()).unwrap();
        let right = (a + (b + c)).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn zero_is_the_identity(a in any::<Value>()) {
        prop_assert_eq!((a.clone() + Value::zero()).unwrap(), a);
    }

    #[test]
    fn negation_cancels(a in any::<Value>()) {
        let negated = (-a.clone()).unwrap();
        prop_assert_eq!((a + negated).unwrap(), Value::zero());
    }

    #[test]
    fn leq_is_reflexive_and_respects_addition(
        a in any::<Value>(),
        b in positive_value(),
    ) {
        prop_assert!(a.leq(&a));
        let larger = (a.clone() + b).unwrap();
        prop_assert!(a.leq(&larger));
    }

    #[test]
    fn adding_positive_values_stays_positive(
        a in positive_value(),
        b in positive_value(),
    ) {
        prop_assert!((a + b).unwrap().is_positive());
    }

    #[test]
    fn compact_round_trips(a in positive_value()) {
        let compact = a.to_compact().unwrap();
        prop_assert_eq!(compact.value(), a);
    }

    #[test]
    fn value_serialization_round_trips(a in any::<Value>()) {
        let bytes = a.canonical_serialize_to_vec().unwrap();
        let decoded: Value = bytes.as_slice().canonical_deserialize_into().unwrap();
        prop_assert_eq!(decoded, a);
    }

    #[test]
    fn compact_serialization_round_trips(a in any::<CompactValue>()) {
        let bytes = a.canonical_serialize_to_vec().unwrap();
        let decoded: CompactValue = bytes.as_slice().canonical_deserialize_into().unwrap();
        prop_assert_eq!(decoded, a);
    }
}

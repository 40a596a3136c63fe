use ion_kit::IonInt;
use proptest::prelude::*;

proptest! {
    #[test]
    fn decimal_text_round_trips(magnitude in "[1-9][0-9]{0,40}", negative in any::<bool>()) {
        let text = if negative {
            format!("-{magnitude}")
        } else {
            magnitude
        };
        let value = IonInt::from_decimal_str(&text).unwrap();
        prop_assert_eq!(value.to_decimal_string(), text);
    }

    #[test]
    fn signed_bytes_round_trip(value in any::<i64>()) {
        let n = IonInt::from_i64(value);
        let bytes = n.to_signed_bytes();
        prop_assert_eq!(IonInt::from_signed_bytes(&bytes), n);
    }

    #[test]
    fn unsigned_bytes_round_trip(
        bytes in proptest::collection::vec(any::<u8>(), 0..48),
        negative in any::<bool>(),
    ) {
        let value = IonInt::from_unsigned_bytes(&bytes, negative);
        let back = IonInt::from_unsigned_bytes(&value.to_unsigned_bytes(), value.is_negative());
        prop_assert_eq!(back, value);
    }

    #[test]
    fn i64_embedding_is_faithful(value in any::<i64>()) {
        let n = IonInt::from_i64(value);
        prop_assert_eq!(n.to_i64().unwrap(), value);
        prop_assert_eq!(n.to_decimal_string(), value.to_string());
    }

    #[test]
    fn comparison_agrees_with_i64(a in any::<i64>(), b in any::<i64>()) {
        let big_a = IonInt::from_i64(a);
        let big_b = IonInt::from_i64(b);
        prop_assert_eq!(big_a.compare(&big_b), a.cmp(&b));
    }
}

use proptest::prelude::*;

use cryptoconditions::{
    condition_uri, decode_condition, decode_fulfillment, encode_condition, encode_fulfillment,
    parse_condition_uri, Ed25519Sha256, Fulfillment, PreimageSha256, PrefixSha256, RsaSha256,
    ThresholdSha256,
};

const MAX_TREE_DEPTH: u32 = 3;
const MAX_PREIMAGE_LEN: usize = 48;
const MAX_PREFIX_LEN: usize = 16;

fn preimage_strategy() -> impl Strategy<Value = Fulfillment> {
    prop::collection::vec(any::<u8>(), 0..=MAX_PREIMAGE_LEN)
        .prop_map(|preimage| Fulfillment::from(PreimageSha256::new(preimage)))
}

fn ed25519_strategy() -> impl Strategy<Value = Fulfillment> {
    (
        prop::array::uniform32(any::<u8>()),
        prop::collection::vec(any::<u8>(), 64),
    )
        .prop_map(|(public_key, signature)| {
            let signature: [u8; 64] = signature.try_into().expect("exact length");
            Fulfillment::from(Ed25519Sha256::new(public_key, signature))
        })
}

fn rsa_strategy() -> impl Strategy<Value = Fulfillment> {
    prop::collection::vec(any::<u8>(), 128..=512).prop_map(|mut modulus| {
        // force the ordering invariant: top octet set on the modulus,
        // cleared on the signature
        modulus[0] |= 0x80;
        let mut signature = modulus.clone();
        signature[0] &= 0x7F;
        Fulfillment::from(RsaSha256::new(modulus, signature).expect("rsa payload"))
    })
}

fn fulfillment_strategy() -> impl Strategy<Value = Fulfillment> {
    let leaf = prop_oneof![
        4 => preimage_strategy(),
        2 => ed25519_strategy(),
        1 => rsa_strategy(),
    ];
    leaf.prop_recursive(MAX_TREE_DEPTH, 12, 3, |inner| {
        prop_oneof![
            (
                prop::collection::vec(any::<u8>(), 0..=MAX_PREFIX_LEN),
                0u32..=1024,
                inner.clone(),
            )
                .prop_map(|(prefix, max_message_length, subfulfillment)| {
                    Fulfillment::from(PrefixSha256::new(
                        prefix,
                        max_message_length,
                        subfulfillment,
                    ))
                }),
            (
                prop::collection::vec(inner.clone(), 1..=3),
                prop::collection::vec(inner, 0..=2),
            )
                .prop_map(|(revealed, unrevealed)| {
                    let threshold = revealed.len() as u16;
                    let subconditions =
                        unrevealed.iter().map(Fulfillment::condition).collect();
                    Fulfillment::from(
                        ThresholdSha256::new(threshold, revealed, subconditions)
                            .expect("threshold"),
                    )
                }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fulfillments_roundtrip_canonically(fulfillment in fulfillment_strategy()) {
        let bytes = encode_fulfillment(&fulfillment);
        let decoded = decode_fulfillment(&bytes).expect("decode fulfillment");
        prop_assert_eq!(&decoded, &fulfillment);
        prop_assert_eq!(encode_fulfillment(&decoded), bytes);
    }

    #[test]
    fn derived_conditions_roundtrip_through_der_and_uri(fulfillment in fulfillment_strategy()) {
        let condition = fulfillment.condition();
        prop_assert_eq!(&fulfillment.condition(), &condition);

        let bytes = encode_condition(&condition);
        let decoded = decode_condition(&bytes).expect("decode condition");
        prop_assert_eq!(&decoded, &condition);
        prop_assert_eq!(encode_condition(&decoded), bytes);

        let uri = condition_uri(&condition);
        prop_assert_eq!(parse_condition_uri(&uri).expect("parse uri"), condition);
    }

    #[test]
    fn subtypes_never_contain_the_own_type(fulfillment in fulfillment_strategy()) {
        let condition = fulfillment.condition();
        prop_assert!(!condition.subtypes().has(condition.condition_type()));
        if !condition.condition_type().is_compound() {
            prop_assert!(condition.subtypes().is_empty());
        }
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_fulfillment(&bytes);
        let _ = decode_condition(&bytes);
    }
}

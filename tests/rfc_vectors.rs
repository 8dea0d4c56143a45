use cryptoconditions::{
    condition_uri, decode_condition, decode_fulfillment, encode_condition, encode_fulfillment,
    validate, ConditionType, CryptoConditionError, Ed25519Sha256, Fulfillment, PreimageSha256,
    PrefixSha256, ThresholdSha256,
};

fn unhex(input: &str) -> Vec<u8> {
    hex::decode(input).expect("test vector hex")
}

// RFC 8032 test vector 1: key pair and signature over the empty message.
const ED25519_PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
const ED25519_SIGNATURE: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
                                 5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

fn ed25519_fulfillment() -> Fulfillment {
    let public_key: [u8; 32] = unhex(ED25519_PUBLIC_KEY).try_into().expect("key length");
    let signature: [u8; 64] = unhex(ED25519_SIGNATURE).try_into().expect("sig length");
    Fulfillment::from(Ed25519Sha256::new(public_key, signature))
}

#[test]
fn empty_preimage_vector() {
    let fulfillment = Fulfillment::from(PreimageSha256::new(Vec::new()));
    assert_eq!(encode_fulfillment(&fulfillment), unhex("A0028000"));

    let condition = fulfillment.condition();
    assert_eq!(condition.cost(), 0);
    assert_eq!(
        encode_condition(&condition),
        unhex("A0258020E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855810100")
    );
    assert_eq!(
        condition_uri(&condition),
        "ni:///sha-256;47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU?fpt=preimage-sha-256&cost=0"
    );

    let decoded = decode_fulfillment(&unhex("A0028000")).expect("decode fulfillment");
    assert_eq!(decoded, fulfillment);
    validate(&condition, &decoded, b"any message at all").expect("validate");
}

#[test]
fn short_preimage_vector() {
    let fulfillment = Fulfillment::from(PreimageSha256::new(b"aaa".to_vec()));
    assert_eq!(encode_fulfillment(&fulfillment), unhex("A0058003616161"));

    let condition = fulfillment.condition();
    assert_eq!(condition.cost(), 3);
    assert_eq!(
        condition.fingerprint().as_slice(),
        unhex("9834876dcfb05cb167a5c24953eba58c4ac89b1adf57f28f2f9d09af107ee8f0").as_slice()
    );
}

#[test]
fn prefix_over_empty_preimage_vector() {
    let inner = Fulfillment::from(PreimageSha256::new(Vec::new()));
    let fulfillment = Fulfillment::from(PrefixSha256::new(Vec::new(), 0, inner));
    assert_eq!(
        encode_fulfillment(&fulfillment),
        unhex("A10B8000810100A204A0028000")
    );

    let condition = fulfillment.condition();
    assert_eq!(condition.cost(), 1024);
    assert!(condition.subtypes().has(ConditionType::PreimageSha256));
    assert_eq!(
        encode_condition(&condition),
        unhex(
            "A12A8020BB1AC5260C0141B7E54B26EC2330637C5597BF811951AC09E744AD20FF77E287\
             8102040082020780"
        )
    );
    assert_eq!(
        condition_uri(&condition),
        "ni:///sha-256;uxrFJgwBQbflSybsIzBjfFWXv4EZUawJ50StIP934oc?\
         fpt=prefix-sha-256&cost=1024&subtypes=preimage-sha-256"
    );

    let decoded =
        decode_fulfillment(&unhex("A10B8000810100A204A0028000")).expect("decode fulfillment");
    assert_eq!(decoded, fulfillment);
    validate(&condition, &decoded, b"").expect("validate");
}

#[test]
fn rsa_condition_vector() {
    let bytes = unhex(
        "A3278020B31FA8206E4EA7E515337B3B33082B877651801085ED84FB4DAEB247BF698D7F8103010000",
    );
    let condition = decode_condition(&bytes).expect("decode condition");
    assert_eq!(condition.condition_type(), ConditionType::RsaSha256);
    assert_eq!(condition.cost(), 65536);
    assert!(condition.subtypes().is_empty());
    assert_eq!(encode_condition(&condition), bytes);
}

#[test]
fn ed25519_vector() {
    let fulfillment = ed25519_fulfillment();
    let mut expected = unhex("A4648020");
    expected.extend_from_slice(&unhex(ED25519_PUBLIC_KEY));
    expected.extend_from_slice(&unhex("8140"));
    expected.extend_from_slice(&unhex(ED25519_SIGNATURE));
    assert_eq!(encode_fulfillment(&fulfillment), expected);

    let condition = fulfillment.condition();
    assert_eq!(condition.cost(), 131_072);
    assert_eq!(
        encode_condition(&condition),
        unhex(
            "A4278020799239ABA8FC4FF7EABFBC4C44E69E8BDFED993324E12ED64792ABE289CF1D5F\
             8103020000"
        )
    );
    validate(&condition, &fulfillment, b"").expect("validate");
}

#[test]
fn ed25519_bit_flip_is_rejected() {
    let public_key: [u8; 32] = unhex(ED25519_PUBLIC_KEY).try_into().expect("key length");
    let mut signature: [u8; 64] = unhex(ED25519_SIGNATURE).try_into().expect("sig length");
    signature[0] ^= 0x10;
    let tampered = Fulfillment::from(Ed25519Sha256::new(public_key, signature));
    match validate(&tampered.condition(), &tampered, b"") {
        Err(CryptoConditionError::SignatureInvalid) => {}
        other => panic!("expected signature invalid, got {other:?}"),
    }
}

#[test]
fn threshold_duplicate_children_change_the_fingerprint() {
    let child = || Fulfillment::from(PreimageSha256::new(Vec::new()));
    let single = Fulfillment::from(
        ThresholdSha256::new(1, vec![child()], Vec::new()).expect("single-child threshold"),
    );
    let double = Fulfillment::from(
        ThresholdSha256::new(2, vec![child(), child()], Vec::new())
            .expect("duplicate-child threshold"),
    );

    assert_eq!(
        single.fingerprint().as_slice(),
        unhex("b4b84136df48a71d73f4985c04c6767a778ecb65ba7023b4506823beee7631b9").as_slice()
    );
    assert_eq!(
        double.fingerprint().as_slice(),
        unhex("9ba8f945f4ac17add3939686478d19a869ceb6fbd8e0cf4564f627de6c2ad648").as_slice()
    );
    assert_ne!(single.fingerprint(), double.fingerprint());

    assert_eq!(
        encode_condition(&single.condition()),
        unhex(
            "A22A8020B4B84136DF48A71D73F4985C04C6767A778ECB65BA7023B4506823BEEE7631B9\
             8102040082020780"
        )
    );

    let bytes = encode_fulfillment(&double);
    let decoded = decode_fulfillment(&bytes).expect("decode duplicate children");
    assert_eq!(decoded, double);
}

#[test]
fn threshold_out_of_order_set_is_rejected() {
    let first = Fulfillment::from(PreimageSha256::new(Vec::new()));
    let second = Fulfillment::from(PreimageSha256::new(b"aaa".to_vec()));
    let fulfillment = Fulfillment::from(
        ThresholdSha256::new(2, vec![second, first], Vec::new()).expect("threshold"),
    );

    let canonical = encode_fulfillment(&fulfillment);
    assert_eq!(canonical, unhex("A20FA00BA0028000A0058003616161A100"));
    decode_fulfillment(&canonical).expect("canonical order decodes");

    let swapped = unhex("A20FA00BA0058003616161A0028000A100");
    match decode_fulfillment(&swapped) {
        Err(CryptoConditionError::NonCanonical(_)) => {}
        other => panic!("expected non-canonical rejection, got {other:?}"),
    }
}

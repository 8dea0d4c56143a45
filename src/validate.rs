use ed25519_dalek::{Signature as Ed25519Signature, VerifyingKey};
use rsa::pss::{Signature as PssSignature, VerifyingKey as PssVerifyingKey};
use rsa::signature::Verifier;
use rsa::{BigUint, RsaPublicKey};
use sha2::Sha256;

use crate::condition::Condition;
use crate::error::{CryptoConditionError, CryptoConditionResult};
use crate::fulfillment::{Ed25519Sha256, Fulfillment, PrefixSha256, RsaSha256, ThresholdSha256};

/// The fixed RSA public exponent.
const RSA_PUBLIC_EXPONENT: u32 = 65537;

/// PSS salt length in bytes, equal to the SHA-256 output size.
const RSA_PSS_SALT_LENGTH: usize = 32;

/// Check that `fulfillment` discharges `condition` for `message`.
///
/// The condition is first re-derived from the fulfillment and compared
/// structurally, then the variant-specific proof is checked, recursing
/// through compound fulfillments. Errors short-circuit and carry the
/// path of subfulfillment indices they surfaced from.
pub fn validate(
    condition: &Condition,
    fulfillment: &Fulfillment,
    message: &[u8],
) -> CryptoConditionResult<()> {
    let derived = fulfillment.condition();
    if derived != *condition {
        return Err(CryptoConditionError::FulfillmentDoesNotMatchCondition {
            expected: hex::encode(condition.fingerprint()),
            derived: hex::encode(derived.fingerprint()),
        });
    }
    match fulfillment {
        // The fingerprint comparison above already proves knowledge of
        // the preimage.
        Fulfillment::PreimageSha256(_) => Ok(()),
        Fulfillment::PrefixSha256(ff) => validate_prefix(ff, message),
        Fulfillment::ThresholdSha256(ff) => validate_threshold(ff, message),
        Fulfillment::RsaSha256(ff) => validate_rsa(ff, message),
        Fulfillment::Ed25519Sha256(ff) => validate_ed25519(ff, message),
    }
}

fn validate_prefix(ff: &PrefixSha256, message: &[u8]) -> CryptoConditionResult<()> {
    if message.len() > ff.max_message_length() as usize {
        return Err(CryptoConditionError::MessageTooLong {
            length: message.len(),
            max: ff.max_message_length(),
        });
    }
    let mut prefixed = Vec::with_capacity(ff.prefix().len() + message.len());
    prefixed.extend_from_slice(ff.prefix());
    prefixed.extend_from_slice(message);
    let subfulfillment = ff.subfulfillment();
    validate(&subfulfillment.condition(), subfulfillment, &prefixed)
        .map_err(|err| err.at_subfulfillment(0))
}

fn validate_threshold(ff: &ThresholdSha256, message: &[u8]) -> CryptoConditionResult<()> {
    if ff.subfulfillments().len() < usize::from(ff.threshold()) {
        return Err(CryptoConditionError::ThresholdNotMet {
            threshold: ff.threshold(),
            available: ff.subfulfillments().len(),
        });
    }
    // Unrevealed subconditions participate in the fingerprint only.
    for (index, subfulfillment) in ff.subfulfillments().iter().enumerate() {
        validate(&subfulfillment.condition(), subfulfillment, message)
            .map_err(|err| err.at_subfulfillment(index))?;
    }
    Ok(())
}

fn validate_rsa(ff: &RsaSha256, message: &[u8]) -> CryptoConditionResult<()> {
    let public_key = RsaPublicKey::new(
        BigUint::from_bytes_be(ff.modulus()),
        BigUint::from(RSA_PUBLIC_EXPONENT),
    )
    .map_err(|_| CryptoConditionError::SignatureInvalid)?;
    let verifying_key =
        PssVerifyingKey::<Sha256>::new_with_salt_len(public_key, RSA_PSS_SALT_LENGTH);
    let signature = PssSignature::try_from(ff.signature())
        .map_err(|_| CryptoConditionError::SignatureInvalid)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CryptoConditionError::SignatureInvalid)
}

fn validate_ed25519(ff: &Ed25519Sha256, message: &[u8]) -> CryptoConditionResult<()> {
    let verifying_key = VerifyingKey::from_bytes(ff.public_key())
        .map_err(|_| CryptoConditionError::SignatureInvalid)?;
    let signature = Ed25519Signature::from_bytes(ff.signature());
    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| CryptoConditionError::SignatureInvalid)
}

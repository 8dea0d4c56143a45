use sha2::{Digest, Sha256};

use crate::binary;
use crate::condition::{Condition, ConditionType, ConditionTypeSet};
use crate::error::{CryptoConditionError, CryptoConditionResult};
use crate::validate;

/// Fixed verification cost of an Ed25519 signature check.
const ED25519_SHA256_COST: u64 = 131_072;

/// Base overhead added to a prefix condition's cost.
const PREFIX_BASE_COST: u64 = 1024;

/// Per-child overhead in a threshold condition's cost, charged for every
/// child whether revealed or not.
const THRESHOLD_CHILD_COST: u64 = 1024;

/// Accepted RSA modulus sizes, in bytes.
const RSA_MODULUS_BYTES_MIN: usize = 128;
const RSA_MODULUS_BYTES_MAX: usize = 512;

/// A SHA-256 preimage proof. Knowing the preimage is the whole proof, so
/// validation has no work beyond the fingerprint comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreimageSha256 {
    preimage: Vec<u8>,
}

impl PreimageSha256 {
    pub fn new(preimage: impl Into<Vec<u8>>) -> Self {
        Self {
            preimage: preimage.into(),
        }
    }

    pub fn preimage(&self) -> &[u8] {
        &self.preimage
    }
}

/// A proof that delegates to a single subfulfillment, validated against
/// the prefix concatenated with the caller's message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefixSha256 {
    prefix: Vec<u8>,
    max_message_length: u32,
    subfulfillment: Box<Fulfillment>,
}

impl PrefixSha256 {
    pub fn new(
        prefix: impl Into<Vec<u8>>,
        max_message_length: u32,
        subfulfillment: Fulfillment,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            max_message_length,
            subfulfillment: Box::new(subfulfillment),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn max_message_length(&self) -> u32 {
        self.max_message_length
    }

    pub fn subfulfillment(&self) -> &Fulfillment {
        &self.subfulfillment
    }
}

/// A k-of-n proof: exactly `threshold` subfulfillments are revealed,
/// alongside the conditions of children left unrevealed. The wire format
/// carries no threshold field, so the revealed count is the threshold;
/// holding back a proof means passing its condition instead. Duplicate
/// children are legal and meaningful; they are never de-duplicated.
///
/// Children are held in canonical DER SET OF order (lexicographic over
/// their complete encodings), so decoding an encoded value reproduces
/// the in-memory ordering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThresholdSha256 {
    threshold: u16,
    subfulfillments: Vec<Fulfillment>,
    subconditions: Vec<Condition>,
}

impl ThresholdSha256 {
    pub fn new(
        threshold: u16,
        mut subfulfillments: Vec<Fulfillment>,
        mut subconditions: Vec<Condition>,
    ) -> CryptoConditionResult<Self> {
        if threshold == 0 {
            return Err(CryptoConditionError::InvalidArgument(
                "threshold must be at least 1".into(),
            ));
        }
        if subfulfillments.len() != usize::from(threshold) {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "threshold {threshold} requires exactly that many revealed subfulfillments, found {}",
                subfulfillments.len()
            )));
        }
        subfulfillments.sort_by_cached_key(binary::encode_fulfillment);
        subconditions.sort_by_cached_key(binary::encode_condition);
        Ok(Self {
            threshold,
            subfulfillments,
            subconditions,
        })
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn subfulfillments(&self) -> &[Fulfillment] {
        &self.subfulfillments
    }

    pub fn subconditions(&self) -> &[Condition] {
        &self.subconditions
    }

    /// Every child's derived or stated condition: revealed children
    /// first, then the unrevealed subconditions.
    pub(crate) fn all_subconditions(&self) -> Vec<Condition> {
        let mut conditions: Vec<Condition> = self
            .subfulfillments
            .iter()
            .map(Fulfillment::condition)
            .collect();
        conditions.extend(self.subconditions.iter().cloned());
        conditions
    }
}

/// An RSA-PSS proof over the caller's message. The public exponent is
/// fixed at 65537; the modulus and signature are equal-length big-endian
/// byte strings with the signature numerically below the modulus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RsaSha256 {
    modulus: Vec<u8>,
    signature: Vec<u8>,
}

impl RsaSha256 {
    pub fn new(modulus: Vec<u8>, signature: Vec<u8>) -> CryptoConditionResult<Self> {
        if modulus.len() < RSA_MODULUS_BYTES_MIN || modulus.len() > RSA_MODULUS_BYTES_MAX {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "modulus must be {RSA_MODULUS_BYTES_MIN} to {RSA_MODULUS_BYTES_MAX} bytes, found {}",
                modulus.len()
            )));
        }
        if signature.len() != modulus.len() {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "signature length {} does not match modulus length {}",
                signature.len(),
                modulus.len()
            )));
        }
        // Equal-length big-endian buffers order the same way their
        // numeric values do.
        if signature.as_slice() >= modulus.as_slice() {
            return Err(CryptoConditionError::InvalidArgument(
                "signature must be numerically smaller than the modulus".into(),
            ));
        }
        Ok(Self { modulus, signature })
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// An Ed25519 proof over the caller's message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ed25519Sha256 {
    public_key: [u8; 32],
    signature: [u8; 64],
}

impl Ed25519Sha256 {
    pub fn new(public_key: [u8; 32], signature: [u8; 64]) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }
}

/// The proof side of a crypto-condition: a closed sum over the five
/// variants. Dispatch on the variant happens once per operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fulfillment {
    PreimageSha256(PreimageSha256),
    PrefixSha256(PrefixSha256),
    ThresholdSha256(ThresholdSha256),
    RsaSha256(RsaSha256),
    Ed25519Sha256(Ed25519Sha256),
}

impl Fulfillment {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            Fulfillment::PreimageSha256(_) => ConditionType::PreimageSha256,
            Fulfillment::PrefixSha256(_) => ConditionType::PrefixSha256,
            Fulfillment::ThresholdSha256(_) => ConditionType::ThresholdSha256,
            Fulfillment::RsaSha256(_) => ConditionType::RsaSha256,
            Fulfillment::Ed25519Sha256(_) => ConditionType::Ed25519Sha256,
        }
    }

    /// SHA-256 over the variant-specific DER pre-image.
    pub fn fingerprint(&self) -> [u8; 32] {
        Sha256::digest(binary::fingerprint_contents(self)).into()
    }

    /// The worst-case verification cost of the derived condition.
    pub fn cost(&self) -> u64 {
        match self {
            Fulfillment::PreimageSha256(ff) => ff.preimage().len() as u64,
            Fulfillment::PrefixSha256(ff) => {
                ff.prefix().len() as u64
                    + u64::from(ff.max_message_length())
                    + PREFIX_BASE_COST
                    + ff.subfulfillment().cost()
            }
            Fulfillment::ThresholdSha256(ff) => {
                let mut costs: Vec<u64> = ff
                    .all_subconditions()
                    .iter()
                    .map(Condition::cost)
                    .collect();
                costs.sort_unstable_by(|a, b| b.cmp(a));
                let top: u64 = costs.iter().take(usize::from(ff.threshold())).sum();
                top + THRESHOLD_CHILD_COST * costs.len() as u64
            }
            Fulfillment::RsaSha256(ff) => {
                let length = ff.modulus().len() as u64;
                length * length
            }
            Fulfillment::Ed25519Sha256(_) => ED25519_SHA256_COST,
        }
    }

    /// The union of every child's type and subtypes. `None` for simple
    /// variants. The result may still contain this fulfillment's own
    /// type; condition derivation removes it.
    pub fn subcondition_type_set(&self) -> Option<ConditionTypeSet> {
        match self {
            Fulfillment::PrefixSha256(ff) => {
                let sub = ff.subfulfillment().condition();
                let mut set = ConditionTypeSet::new();
                set.add(sub.condition_type());
                set.add_all(sub.subtypes());
                Some(set)
            }
            Fulfillment::ThresholdSha256(ff) => {
                let mut set = ConditionTypeSet::new();
                for condition in ff.all_subconditions() {
                    set.add(condition.condition_type());
                    set.add_all(condition.subtypes());
                }
                Some(set)
            }
            _ => None,
        }
    }

    /// Derive the unique condition this fulfillment discharges.
    pub fn condition(&self) -> Condition {
        let condition_type = self.condition_type();
        let subtypes = match self.subcondition_type_set() {
            Some(mut set) => {
                set.remove(condition_type);
                set
            }
            None => ConditionTypeSet::new(),
        };
        Condition::from_parts(condition_type, self.fingerprint(), self.cost(), subtypes)
    }

    /// Check that this fulfillment discharges `condition` for `message`.
    pub fn validate(&self, condition: &Condition, message: &[u8]) -> CryptoConditionResult<()> {
        validate::validate(condition, self, message)
    }
}

impl From<PreimageSha256> for Fulfillment {
    fn from(ff: PreimageSha256) -> Self {
        Fulfillment::PreimageSha256(ff)
    }
}

impl From<PrefixSha256> for Fulfillment {
    fn from(ff: PrefixSha256) -> Self {
        Fulfillment::PrefixSha256(ff)
    }
}

impl From<ThresholdSha256> for Fulfillment {
    fn from(ff: ThresholdSha256) -> Self {
        Fulfillment::ThresholdSha256(ff)
    }
}

impl From<RsaSha256> for Fulfillment {
    fn from(ff: RsaSha256) -> Self {
        Fulfillment::RsaSha256(ff)
    }
}

impl From<Ed25519Sha256> for Fulfillment {
    fn from(ff: Ed25519Sha256) -> Self {
        Fulfillment::Ed25519Sha256(ff)
    }
}

use std::fmt::{self, Display, Formatter};

use crate::error::{CryptoConditionError, CryptoConditionResult};
use crate::uri;

/// The closed set of condition types.
///
/// The tag values are the context-specific CHOICE tags used on the wire;
/// the names are the canonical strings used in `ni:` URIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionType {
    PreimageSha256,
    PrefixSha256,
    ThresholdSha256,
    RsaSha256,
    Ed25519Sha256,
}

impl ConditionType {
    /// The CHOICE tag number for this type.
    pub fn tag(self) -> u8 {
        match self {
            ConditionType::PreimageSha256 => 0,
            ConditionType::PrefixSha256 => 1,
            ConditionType::ThresholdSha256 => 2,
            ConditionType::RsaSha256 => 3,
            ConditionType::Ed25519Sha256 => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ConditionType::PreimageSha256),
            1 => Some(ConditionType::PrefixSha256),
            2 => Some(ConditionType::ThresholdSha256),
            3 => Some(ConditionType::RsaSha256),
            4 => Some(ConditionType::Ed25519Sha256),
            _ => None,
        }
    }

    /// The canonical lower-case name used in URIs.
    pub fn name(self) -> &'static str {
        match self {
            ConditionType::PreimageSha256 => "preimage-sha-256",
            ConditionType::PrefixSha256 => "prefix-sha-256",
            ConditionType::ThresholdSha256 => "threshold-sha-256",
            ConditionType::RsaSha256 => "rsa-sha-256",
            ConditionType::Ed25519Sha256 => "ed25519-sha-256",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "preimage-sha-256" => Some(ConditionType::PreimageSha256),
            "prefix-sha-256" => Some(ConditionType::PrefixSha256),
            "threshold-sha-256" => Some(ConditionType::ThresholdSha256),
            "rsa-sha-256" => Some(ConditionType::RsaSha256),
            "ed25519-sha-256" => Some(ConditionType::Ed25519Sha256),
            _ => None,
        }
    }

    /// Compound types reference sub-conditions; the rest are simple.
    pub fn is_compound(self) -> bool {
        matches!(
            self,
            ConditionType::PrefixSha256 | ConditionType::ThresholdSha256
        )
    }
}

impl Display for ConditionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of condition types, packed as the MSB-first ASN.1 BIT STRING it
/// is encoded as: bit `n` (counting from the most significant bit of the
/// first octet) is set iff type `n` is present. The representation is
/// always trimmed, so derived equality is canonical equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConditionTypeSet {
    mask: u8,
}

impl ConditionTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, t: ConditionType) -> bool {
        self.mask & (0x80 >> t.tag()) != 0
    }

    pub fn add(&mut self, t: ConditionType) {
        self.mask |= 0x80 >> t.tag();
    }

    pub fn add_all(&mut self, other: &ConditionTypeSet) {
        self.mask |= other.mask;
    }

    pub fn remove(&mut self, t: ConditionType) {
        self.mask &= !(0x80 >> t.tag());
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Iterate the members in tag order.
    pub fn iter(&self) -> impl Iterator<Item = ConditionType> + '_ {
        (0u8..5).filter_map(ConditionType::from_tag).filter(|t| self.has(*t))
    }

    /// The DER BIT STRING content octets: one unused-bits octet followed
    /// by the packed bits, with trailing zero bits trimmed.
    pub(crate) fn to_bit_string(self) -> Vec<u8> {
        if self.mask == 0 {
            return vec![0];
        }
        let unused = self.mask.trailing_zeros() as u8;
        vec![unused, self.mask]
    }

    /// Parse DER BIT STRING content octets, enforcing canonical padding.
    pub(crate) fn from_bit_string(content: &[u8]) -> CryptoConditionResult<Self> {
        let (&unused, data) = content.split_first().ok_or_else(|| {
            CryptoConditionError::MalformedEncoding("empty bit string".into())
        })?;
        if unused > 7 {
            return Err(CryptoConditionError::MalformedEncoding(format!(
                "bit string claims {unused} unused bits"
            )));
        }
        if data.is_empty() {
            if unused != 0 {
                return Err(CryptoConditionError::MalformedEncoding(
                    "unused bits in empty bit string".into(),
                ));
            }
            return Ok(Self::new());
        }
        let last = *data.last().unwrap_or(&0);
        if last == 0 || last & ((1u8 << unused) - 1) != 0 || (last >> unused) & 1 == 0 {
            return Err(CryptoConditionError::NonCanonical(
                "bit string padding is not canonical",
            ));
        }
        let mut set = Self::new();
        for (byte_index, byte) in data.iter().enumerate() {
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let index = byte_index * 8 + bit;
                let t = u8::try_from(index)
                    .ok()
                    .and_then(ConditionType::from_tag)
                    .ok_or_else(|| {
                        CryptoConditionError::UnknownType(format!("subtype bit {index}"))
                    })?;
                set.add(t);
            }
        }
        Ok(set)
    }
}

/// An immutable condition: the commitment side of a crypto-condition.
///
/// Simple conditions carry an empty subtype set; compound conditions
/// carry the set of types appearing anywhere below them, never including
/// their own type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Condition {
    condition_type: ConditionType,
    fingerprint: [u8; 32],
    cost: u64,
    subtypes: ConditionTypeSet,
}

impl Condition {
    /// Create a simple condition.
    pub fn simple(
        condition_type: ConditionType,
        fingerprint: [u8; 32],
        cost: u64,
    ) -> CryptoConditionResult<Self> {
        if condition_type.is_compound() {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "{condition_type} is a compound type"
            )));
        }
        Ok(Self::from_parts(
            condition_type,
            fingerprint,
            cost,
            ConditionTypeSet::new(),
        ))
    }

    /// Create a compound condition. The subtype set must not contain the
    /// condition's own type.
    pub fn compound(
        condition_type: ConditionType,
        fingerprint: [u8; 32],
        cost: u64,
        subtypes: ConditionTypeSet,
    ) -> CryptoConditionResult<Self> {
        if !condition_type.is_compound() {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "{condition_type} is a simple type"
            )));
        }
        if subtypes.has(condition_type) {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "subtypes of a {condition_type} condition may not contain its own type"
            )));
        }
        Ok(Self::from_parts(condition_type, fingerprint, cost, subtypes))
    }

    pub(crate) fn from_parts(
        condition_type: ConditionType,
        fingerprint: [u8; 32],
        cost: u64,
        subtypes: ConditionTypeSet,
    ) -> Self {
        Self {
            condition_type,
            fingerprint,
            cost,
            subtypes,
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        self.condition_type
    }

    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn subtypes(&self) -> &ConditionTypeSet {
        &self.subtypes
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&uri::condition_uri(self))
    }
}

mod reader;
mod writer;

use crate::condition::{Condition, ConditionType, ConditionTypeSet};
use crate::error::{CryptoConditionError, CryptoConditionResult};
use crate::fulfillment::{
    Ed25519Sha256, Fulfillment, PreimageSha256, PrefixSha256, RsaSha256, ThresholdSha256,
};

use reader::{parse_integer, DerReader, Tlv};
use writer::{context_constructed, context_primitive, DerWriter, TAG_SEQUENCE};

/// Decoders refuse to recurse deeper than this many fulfillment levels.
pub const MAX_DECODE_DEPTH: usize = 1024;

/// Encode a condition into its canonical DER form.
pub fn encode_condition(condition: &Condition) -> Vec<u8> {
    let mut body = DerWriter::new();
    body.write_tlv(context_primitive(0), condition.fingerprint());
    body.write_integer(context_primitive(1), condition.cost());
    if condition.condition_type().is_compound() {
        body.write_tlv(context_primitive(2), &condition.subtypes().to_bit_string());
    }
    let mut out = DerWriter::new();
    out.write_tlv(
        context_constructed(condition.condition_type().tag()),
        &body.into_bytes(),
    );
    out.into_bytes()
}

/// Decode a condition from its canonical DER form.
pub fn decode_condition(bytes: &[u8]) -> CryptoConditionResult<Condition> {
    let mut reader = DerReader::new(bytes);
    let tlv = reader.read_any()?;
    let condition = condition_from_tlv(&tlv)?;
    reader.finish("condition")?;
    Ok(condition)
}

/// Encode a fulfillment into its canonical DER form.
pub fn encode_fulfillment(fulfillment: &Fulfillment) -> Vec<u8> {
    let body = match fulfillment {
        Fulfillment::PreimageSha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.preimage());
            body
        }
        Fulfillment::PrefixSha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.prefix());
            body.write_integer(context_primitive(1), u64::from(ff.max_message_length()));
            body.write_tlv(
                context_constructed(2),
                &encode_fulfillment(ff.subfulfillment()),
            );
            body
        }
        Fulfillment::ThresholdSha256(ff) => {
            let mut body = DerWriter::new();
            let fulfillments: Vec<Vec<u8>> =
                ff.subfulfillments().iter().map(encode_fulfillment).collect();
            body.write_tlv(context_constructed(0), &sorted_set_of(fulfillments));
            let conditions: Vec<Vec<u8>> =
                ff.subconditions().iter().map(encode_condition).collect();
            body.write_tlv(context_constructed(1), &sorted_set_of(conditions));
            body
        }
        Fulfillment::RsaSha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.modulus());
            body.write_tlv(context_primitive(1), ff.signature());
            body
        }
        Fulfillment::Ed25519Sha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.public_key());
            body.write_tlv(context_primitive(1), ff.signature());
            body
        }
    };
    let mut out = DerWriter::new();
    out.write_tlv(
        context_constructed(fulfillment.condition_type().tag()),
        &body.into_bytes(),
    );
    out.into_bytes()
}

/// Decode a fulfillment from its canonical DER form.
pub fn decode_fulfillment(bytes: &[u8]) -> CryptoConditionResult<Fulfillment> {
    let mut reader = DerReader::new(bytes);
    let tlv = reader.read_any()?;
    let fulfillment = fulfillment_from_tlv(&tlv, 0)?;
    reader.finish("fulfillment")?;
    Ok(fulfillment)
}

/// The DER pre-image whose SHA-256 digest is the fulfillment's
/// fingerprint. Preimage fulfillments hash their payload directly; every
/// other variant hashes a per-variant SEQUENCE.
pub(crate) fn fingerprint_contents(fulfillment: &Fulfillment) -> Vec<u8> {
    match fulfillment {
        Fulfillment::PreimageSha256(ff) => ff.preimage().to_vec(),
        Fulfillment::PrefixSha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.prefix());
            body.write_integer(context_primitive(1), u64::from(ff.max_message_length()));
            body.write_tlv(
                context_constructed(2),
                &encode_condition(&ff.subfulfillment().condition()),
            );
            let mut out = DerWriter::new();
            out.write_tlv(TAG_SEQUENCE, &body.into_bytes());
            out.into_bytes()
        }
        Fulfillment::ThresholdSha256(ff) => {
            let mut conditions: Vec<Vec<u8>> = ff
                .subfulfillments()
                .iter()
                .map(|sff| encode_condition(&sff.condition()))
                .collect();
            conditions.extend(ff.subconditions().iter().map(encode_condition));
            let mut body = DerWriter::new();
            body.write_integer(context_primitive(0), u64::from(ff.threshold()));
            body.write_tlv(context_constructed(1), &sorted_set_of(conditions));
            let mut out = DerWriter::new();
            out.write_tlv(TAG_SEQUENCE, &body.into_bytes());
            out.into_bytes()
        }
        Fulfillment::RsaSha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.modulus());
            let mut out = DerWriter::new();
            out.write_tlv(TAG_SEQUENCE, &body.into_bytes());
            out.into_bytes()
        }
        Fulfillment::Ed25519Sha256(ff) => {
            let mut body = DerWriter::new();
            body.write_tlv(context_primitive(0), ff.public_key());
            let mut out = DerWriter::new();
            out.write_tlv(TAG_SEQUENCE, &body.into_bytes());
            out.into_bytes()
        }
    }
}

/// Sort complete child encodings into DER SET OF order and concatenate.
fn sorted_set_of(mut encodings: Vec<Vec<u8>>) -> Vec<u8> {
    encodings.sort_unstable();
    encodings.concat()
}

/// Map a CHOICE tag octet to its condition type, rejecting wrong tag
/// classes and primitive-form encodings.
fn choice_type(tag: u8, what: &'static str) -> CryptoConditionResult<ConditionType> {
    if tag & 0xC0 != 0x80 {
        return Err(CryptoConditionError::MalformedEncoding(format!(
            "expected a context-specific tag for {what}, found 0x{tag:02X}"
        )));
    }
    if tag & 0x20 == 0 {
        return Err(CryptoConditionError::MalformedEncoding(format!(
            "{what} must be encoded in constructed form"
        )));
    }
    let number = tag & 0x1F;
    ConditionType::from_tag(number)
        .ok_or_else(|| CryptoConditionError::UnknownType(format!("tag {number}")))
}

fn condition_from_tlv(tlv: &Tlv<'_>) -> CryptoConditionResult<Condition> {
    let condition_type = choice_type(tlv.tag, "a condition")?;
    let mut inner = DerReader::new(tlv.body);
    let fingerprint_bytes = inner.read_tag(context_primitive(0), "fingerprint")?;
    let fingerprint: [u8; 32] = fingerprint_bytes.try_into().map_err(|_| {
        CryptoConditionError::MalformedEncoding(format!(
            "fingerprint must be 32 bytes, found {}",
            fingerprint_bytes.len()
        ))
    })?;
    let cost = parse_integer(inner.read_tag(context_primitive(1), "cost")?)?;
    let condition = if condition_type.is_compound() {
        let subtypes =
            ConditionTypeSet::from_bit_string(inner.read_tag(context_primitive(2), "subtypes")?)?;
        Condition::compound(condition_type, fingerprint, cost, subtypes)?
    } else {
        Condition::simple(condition_type, fingerprint, cost)?
    };
    inner.finish("condition fields")?;
    Ok(condition)
}

fn fulfillment_from_tlv(tlv: &Tlv<'_>, depth: usize) -> CryptoConditionResult<Fulfillment> {
    if depth >= MAX_DECODE_DEPTH {
        return Err(CryptoConditionError::MalformedEncoding(format!(
            "fulfillment nesting exceeds {MAX_DECODE_DEPTH} levels"
        )));
    }
    let condition_type = choice_type(tlv.tag, "a fulfillment")?;
    let mut inner = DerReader::new(tlv.body);
    let fulfillment = match condition_type {
        ConditionType::PreimageSha256 => {
            let preimage = inner.read_tag(context_primitive(0), "preimage")?;
            Fulfillment::PreimageSha256(PreimageSha256::new(preimage.to_vec()))
        }
        ConditionType::PrefixSha256 => {
            let prefix = inner.read_tag(context_primitive(0), "prefix")?;
            let max_message_length =
                parse_integer(inner.read_tag(context_primitive(1), "maxMessageLength")?)?;
            let max_message_length = u32::try_from(max_message_length).map_err(|_| {
                CryptoConditionError::MalformedEncoding(
                    "maxMessageLength exceeds uint32 range".into(),
                )
            })?;
            let wrapper = inner.read_tag(context_constructed(2), "subfulfillment")?;
            let mut sub_reader = DerReader::new(wrapper);
            let sub_tlv = sub_reader.read_any()?;
            let subfulfillment = fulfillment_from_tlv(&sub_tlv, depth + 1)?;
            sub_reader.finish("subfulfillment")?;
            Fulfillment::PrefixSha256(PrefixSha256::new(
                prefix.to_vec(),
                max_message_length,
                subfulfillment,
            ))
        }
        ConditionType::ThresholdSha256 => {
            let subfulfillments = decode_set_of(
                inner.read_tag(context_constructed(0), "subfulfillments")?,
                |element| fulfillment_from_tlv(element, depth + 1),
            )?;
            let subconditions = decode_set_of(
                inner.read_tag(context_constructed(1), "subconditions")?,
                condition_from_tlv,
            )?;
            let threshold = u16::try_from(subfulfillments.len()).map_err(|_| {
                CryptoConditionError::InvalidArgument(
                    "threshold fulfillment reveals more than 65535 subfulfillments".into(),
                )
            })?;
            Fulfillment::ThresholdSha256(ThresholdSha256::new(
                threshold,
                subfulfillments,
                subconditions,
            )?)
        }
        ConditionType::RsaSha256 => {
            let modulus = inner.read_tag(context_primitive(0), "modulus")?;
            let signature = inner.read_tag(context_primitive(1), "signature")?;
            Fulfillment::RsaSha256(RsaSha256::new(modulus.to_vec(), signature.to_vec())?)
        }
        ConditionType::Ed25519Sha256 => {
            let public_key_bytes = inner.read_tag(context_primitive(0), "publicKey")?;
            let public_key: [u8; 32] = public_key_bytes.try_into().map_err(|_| {
                CryptoConditionError::MalformedEncoding(format!(
                    "public key must be 32 bytes, found {}",
                    public_key_bytes.len()
                ))
            })?;
            let signature_bytes = inner.read_tag(context_primitive(1), "signature")?;
            let signature: [u8; 64] = signature_bytes.try_into().map_err(|_| {
                CryptoConditionError::MalformedEncoding(format!(
                    "signature must be 64 bytes, found {}",
                    signature_bytes.len()
                ))
            })?;
            Fulfillment::Ed25519Sha256(Ed25519Sha256::new(public_key, signature))
        }
    };
    inner.finish("fulfillment fields")?;
    Ok(fulfillment)
}

/// Decode the elements of a SET OF, enforcing canonical order over the
/// full element encodings. Equal adjacent encodings are accepted: the
/// format deliberately allows duplicate threshold children.
fn decode_set_of<'a, T>(
    content: &'a [u8],
    mut decode: impl FnMut(&Tlv<'a>) -> CryptoConditionResult<T>,
) -> CryptoConditionResult<Vec<T>> {
    let mut reader = DerReader::new(content);
    let mut elements = Vec::new();
    let mut previous: Option<&[u8]> = None;
    while !reader.is_empty() {
        let tlv = reader.read_any()?;
        if let Some(previous) = previous {
            if tlv.encoding < previous {
                return Err(CryptoConditionError::NonCanonical(
                    "set elements are not in canonical order",
                ));
            }
        }
        previous = Some(tlv.encoding);
        elements.push(decode(&tlv)?);
    }
    Ok(elements)
}

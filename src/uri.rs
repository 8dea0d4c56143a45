use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::condition::{Condition, ConditionType, ConditionTypeSet};
use crate::error::{CryptoConditionError, CryptoConditionResult};

const NI_SHA256_PREFIX: &str = "ni:///sha-256;";

/// Render a condition as an RFC 6920 `ni:` URI.
///
/// The output is deterministic: the fingerprint is base64url without
/// padding, and subtype names are emitted in alphabetical order, only
/// for compound conditions with a non-empty set.
pub fn condition_uri(condition: &Condition) -> String {
    let fingerprint = URL_SAFE_NO_PAD.encode(condition.fingerprint());
    let mut uri = format!(
        "{NI_SHA256_PREFIX}{fingerprint}?fpt={}&cost={}",
        condition.condition_type().name(),
        condition.cost()
    );
    if condition.condition_type().is_compound() && !condition.subtypes().is_empty() {
        let mut names: Vec<&str> = condition
            .subtypes()
            .iter()
            .map(ConditionType::name)
            .collect();
        names.sort_unstable();
        uri.push_str("&subtypes=");
        uri.push_str(&names.join(","));
    }
    uri
}

/// Parse a condition from its `ni:` URI form.
///
/// Unknown query parameters are ignored; duplicated or missing `fpt` and
/// `cost` parameters are rejected. Subtype order in the URI is
/// irrelevant.
pub fn parse_condition_uri(uri: &str) -> CryptoConditionResult<Condition> {
    let rest = uri.strip_prefix(NI_SHA256_PREFIX).ok_or_else(|| {
        CryptoConditionError::MalformedEncoding(format!(
            "condition URI must begin with {NI_SHA256_PREFIX:?}"
        ))
    })?;
    let (fingerprint_text, query) = match rest.split_once('?') {
        Some((fingerprint, query)) => (fingerprint, query),
        None => (rest, ""),
    };
    let decoded = URL_SAFE_NO_PAD.decode(fingerprint_text).map_err(|_| {
        CryptoConditionError::MalformedEncoding("fingerprint is not valid base64url".into())
    })?;
    let fingerprint: [u8; 32] = decoded.try_into().map_err(|decoded: Vec<u8>| {
        CryptoConditionError::MalformedEncoding(format!(
            "fingerprint must be 32 bytes, found {}",
            decoded.len()
        ))
    })?;

    let mut fpt = None;
    let mut cost = None;
    let mut subtypes_csv = None;
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let slot = match key {
            "fpt" => &mut fpt,
            "cost" => &mut cost,
            "subtypes" => &mut subtypes_csv,
            _ => continue,
        };
        if slot.replace(value).is_some() {
            return Err(CryptoConditionError::MalformedEncoding(format!(
                "duplicate {key} parameter"
            )));
        }
    }

    let fpt = fpt.ok_or_else(|| {
        CryptoConditionError::MalformedEncoding("missing fpt parameter".into())
    })?;
    let condition_type = ConditionType::from_name(fpt)
        .ok_or_else(|| CryptoConditionError::UnknownType(fpt.to_string()))?;
    let cost_text = cost.ok_or_else(|| {
        CryptoConditionError::MalformedEncoding("missing cost parameter".into())
    })?;
    let cost: u64 = cost_text.parse().map_err(|_| {
        CryptoConditionError::MalformedEncoding(format!("invalid cost: {cost_text:?}"))
    })?;

    if !condition_type.is_compound() {
        if subtypes_csv.is_some() {
            return Err(CryptoConditionError::InvalidArgument(format!(
                "{condition_type} is a simple type and cannot carry subtypes"
            )));
        }
        return Condition::simple(condition_type, fingerprint, cost);
    }
    let mut subtypes = ConditionTypeSet::new();
    if let Some(csv) = subtypes_csv {
        for name in csv.split(',') {
            let subtype = ConditionType::from_name(name)
                .ok_or_else(|| CryptoConditionError::UnknownType(name.to_string()))?;
            subtypes.add(subtype);
        }
    }
    Condition::compound(condition_type, fingerprint, cost, subtypes)
}

use crate::error::{CryptoConditionError, CryptoConditionResult};

/// A complete tag-length-value triple read from the input.
///
/// `encoding` spans the whole triple including tag and length octets;
/// SET OF ordering is defined over these full encodings.
#[derive(Debug)]
pub(crate) struct Tlv<'a> {
    pub tag: u8,
    pub body: &'a [u8],
    pub encoding: &'a [u8],
}

/// Strict DER cursor.
///
/// Rejects multi-octet tags, indefinite and non-minimal lengths, and
/// truncated values. Callers check `finish` at the end of every scope so
/// trailing octets are rejected at each nesting level.
pub(crate) struct DerReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.input.len()
    }

    /// Read the next complete value regardless of tag.
    pub fn read_any(&mut self) -> CryptoConditionResult<Tlv<'a>> {
        let start = self.pos;
        let tag = self.next_octet("tag")?;
        if tag & 0x1F == 0x1F {
            return Err(CryptoConditionError::MalformedEncoding(
                "multi-octet tags are not supported".into(),
            ));
        }
        let len = self.read_length()?;
        if self.input.len() - self.pos < len {
            return Err(CryptoConditionError::MalformedEncoding(format!(
                "value of length {len} is truncated"
            )));
        }
        let body = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(Tlv {
            tag,
            body,
            encoding: &self.input[start..self.pos],
        })
    }

    /// Read the next value, requiring an exact tag octet. A primitive
    /// field in constructed form (or vice versa) fails the comparison.
    pub fn read_tag(&mut self, tag: u8, field: &'static str) -> CryptoConditionResult<&'a [u8]> {
        let tlv = self.read_any()?;
        if tlv.tag != tag {
            return Err(CryptoConditionError::MalformedEncoding(format!(
                "expected tag 0x{tag:02X} for {field}, found 0x{:02X}",
                tlv.tag
            )));
        }
        Ok(tlv.body)
    }

    /// Require that the scope has been consumed completely.
    pub fn finish(&self, context: &'static str) -> CryptoConditionResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CryptoConditionError::MalformedEncoding(format!(
                "trailing bytes after {context}"
            )))
        }
    }

    fn next_octet(&mut self, what: &'static str) -> CryptoConditionResult<u8> {
        let octet = *self.input.get(self.pos).ok_or_else(|| {
            CryptoConditionError::MalformedEncoding(format!("unexpected end of input reading {what}"))
        })?;
        self.pos += 1;
        Ok(octet)
    }

    fn read_length(&mut self) -> CryptoConditionResult<usize> {
        let first = self.next_octet("length")?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(CryptoConditionError::MalformedEncoding(
                "indefinite length is not permitted".into(),
            ));
        }
        let count = (first & 0x7F) as usize;
        if count > 4 {
            return Err(CryptoConditionError::MalformedEncoding(format!(
                "length of {count} octets exceeds supported range"
            )));
        }
        let mut value = 0usize;
        for i in 0..count {
            let octet = self.next_octet("length")?;
            if i == 0 && octet == 0 {
                return Err(CryptoConditionError::MalformedEncoding(
                    "non-minimal length octets".into(),
                ));
            }
            value = (value << 8) | octet as usize;
        }
        if count == 1 && value < 0x80 {
            return Err(CryptoConditionError::MalformedEncoding(
                "non-minimal length octets".into(),
            ));
        }
        Ok(value)
    }
}

/// Parse the content octets of a DER INTEGER into a non-negative value.
pub(crate) fn parse_integer(content: &[u8]) -> CryptoConditionResult<u64> {
    let (&first, rest) = content.split_first().ok_or_else(|| {
        CryptoConditionError::MalformedEncoding("empty integer".into())
    })?;
    if first & 0x80 != 0 {
        return Err(CryptoConditionError::MalformedEncoding(
            "negative integer".into(),
        ));
    }
    if first == 0 && rest.first().is_some_and(|b| b & 0x80 == 0) {
        return Err(CryptoConditionError::NonCanonical(
            "integer has redundant leading octet",
        ));
    }
    if content.len() > 9 || (content.len() == 9 && first != 0) {
        return Err(CryptoConditionError::MalformedEncoding(
            "integer exceeds supported range".into(),
        ));
    }
    let mut value = u64::from(first);
    for &octet in rest {
        value = (value << 8) | u64::from(octet);
    }
    Ok(value)
}

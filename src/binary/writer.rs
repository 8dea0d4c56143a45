/// Append-only DER emitter.
///
/// Every value is written exactly once in its canonical form: tags are
/// single octets, lengths are minimal, and integers carry no redundant
/// leading octets. Nested structures are built bottom-up by encoding the
/// body into its own writer first.
pub(crate) struct DerWriter {
    out: Vec<u8>,
}

/// Context-specific primitive tag `[n]`.
pub(crate) fn context_primitive(n: u8) -> u8 {
    0x80 | n
}

/// Context-specific constructed tag `[n]`.
pub(crate) fn context_constructed(n: u8) -> u8 {
    0xA0 | n
}

/// Universal SEQUENCE tag.
pub(crate) const TAG_SEQUENCE: u8 = 0x30;

impl DerWriter {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    /// Write a complete tag-length-value triple.
    pub fn write_tlv(&mut self, tag: u8, body: &[u8]) {
        self.out.push(tag);
        write_length(&mut self.out, body.len());
        self.out.extend_from_slice(body);
    }

    /// Write a non-negative INTEGER under the given tag.
    pub fn write_integer(&mut self, tag: u8, value: u64) {
        self.write_tlv(tag, &integer_content(value));
    }
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = (len as u64).to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// The content octets of a DER INTEGER holding a non-negative value:
/// big-endian, minimal, with a leading zero octet only when the top bit
/// of the first value octet is set.
pub(crate) fn integer_content(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let mut content = bytes[skip..].to_vec();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_content_is_minimal() {
        assert_eq!(integer_content(0), vec![0x00]);
        assert_eq!(integer_content(1), vec![0x01]);
        assert_eq!(integer_content(127), vec![0x7F]);
        assert_eq!(integer_content(128), vec![0x00, 0x80]);
        assert_eq!(integer_content(1024), vec![0x04, 0x00]);
        assert_eq!(integer_content(65536), vec![0x01, 0x00, 0x00]);
        assert_eq!(
            integer_content(u64::MAX),
            vec![0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn long_form_lengths_are_minimal() {
        let mut writer = DerWriter::new();
        writer.write_tlv(context_primitive(0), &[0u8; 0x80]);
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..3], &[0x80, 0x81, 0x80]);

        let mut writer = DerWriter::new();
        writer.write_tlv(context_primitive(0), &[0u8; 0x100]);
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[0x80, 0x82, 0x01, 0x00]);
    }
}

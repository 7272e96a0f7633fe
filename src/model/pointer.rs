/// Version line every pointer must carry.
pub const SPEC_VERSION_URL: &str = "https://lode.sh/spec/v1";

/// Blobs at or above this size are never pointer candidates.
pub const POINTER_SIZE_CUTOFF: usize = 1024;

/// A decoded large-object pointer: the content oid and declared payload size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    pub oid: String,
    pub size: i64,
}

impl Pointer {
    /// Canonical serialization: version, oid, size, each `\n`-terminated.
    pub fn encode(&self) -> String {
        format!(
            "version {}\noid sha256:{}\nsize {}\n",
            SPEC_VERSION_URL, self.oid, self.size
        )
    }

    /// Decode a blob as a pointer.
    ///
    /// Accepts reordered keys, unknown extra keys, and CRLF line endings;
    /// those variants decode but are not canonical. Returns `None` for
    /// anything that is not a pointer at all (wrong version line, bad oid,
    /// bad size, oversized blob).
    pub fn decode(data: &[u8]) -> Option<Pointer> {
        if data.is_empty() || data.len() >= POINTER_SIZE_CUTOFF {
            return None;
        }
        let text = std::str::from_utf8(data).ok()?;

        let mut lines = text.split('\n').map(|l| l.trim_end_matches('\r'));

        let version = lines.next()?;
        let (key, value) = version.split_once(' ')?;
        if key != "version" || value != SPEC_VERSION_URL {
            return None;
        }

        let mut oid = None;
        let mut size = None;
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once(' ')?;
            match key {
                "oid" => {
                    let hex = value.strip_prefix("sha256:")?;
                    if !is_sha256_hex(hex) {
                        return None;
                    }
                    oid = Some(hex.to_string());
                }
                "size" => {
                    let parsed: i64 = value.parse().ok()?;
                    if parsed < 0 {
                        return None;
                    }
                    size = Some(parsed);
                }
                // Unknown keys are tolerated (they still break canonicality).
                _ => {}
            }
        }

        Some(Pointer {
            oid: oid?,
            size: size?,
        })
    }

    /// Whether `data` is the canonical serialization of the pointer it decodes to.
    pub fn is_canonical(&self, data: &[u8]) -> bool {
        self.encode().as_bytes() == data
    }
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OID: &str = "6c17f2007cbe934aee6e309b28b2dba3c119c35dda631e2de0aca2646b8ab32c";

    fn canonical(oid: &str, size: i64) -> String {
        Pointer {
            oid: oid.to_string(),
            size,
        }
        .encode()
    }

    #[test]
    fn test_decode_canonical() {
        let text = canonical(OID, 12345);
        let p = Pointer::decode(text.as_bytes()).unwrap();
        assert_eq!(p.oid, OID);
        assert_eq!(p.size, 12345);
        assert!(p.is_canonical(text.as_bytes()));
    }

    #[test]
    fn test_decode_reordered_is_not_canonical() {
        let text = format!("version {}\nsize 7\noid sha256:{}\n", SPEC_VERSION_URL, OID);
        let p = Pointer::decode(text.as_bytes()).unwrap();
        assert_eq!(p.size, 7);
        assert!(!p.is_canonical(text.as_bytes()));
    }

    #[test]
    fn test_decode_extra_key_is_not_canonical() {
        let text = format!(
            "version {}\noid sha256:{}\nsize 7\nx-custom yes\n",
            SPEC_VERSION_URL, OID
        );
        let p = Pointer::decode(text.as_bytes()).unwrap();
        assert!(!p.is_canonical(text.as_bytes()));
    }

    #[test]
    fn test_decode_crlf_is_not_canonical() {
        let text = canonical(OID, 7).replace('\n', "\r\n");
        let p = Pointer::decode(text.as_bytes()).unwrap();
        assert!(!p.is_canonical(text.as_bytes()));
    }

    #[test]
    fn test_decode_rejects_non_pointers() {
        assert!(Pointer::decode(b"").is_none());
        assert!(Pointer::decode(b"just some file contents\n").is_none());
        // Wrong version URL
        let text = format!("version https://example.com/v1\noid sha256:{}\nsize 7\n", OID);
        assert!(Pointer::decode(text.as_bytes()).is_none());
        // Bad hex (uppercase)
        let text = format!(
            "version {}\noid sha256:{}\nsize 7\n",
            SPEC_VERSION_URL,
            OID.to_uppercase()
        );
        assert!(Pointer::decode(text.as_bytes()).is_none());
        // Truncated oid
        let text = format!("version {}\noid sha256:{}\nsize 7\n", SPEC_VERSION_URL, &OID[..32]);
        assert!(Pointer::decode(text.as_bytes()).is_none());
        // Negative size
        let text = format!("version {}\noid sha256:{}\nsize -1\n", SPEC_VERSION_URL, OID);
        assert!(Pointer::decode(text.as_bytes()).is_none());
        // Missing size
        let text = format!("version {}\noid sha256:{}\n", SPEC_VERSION_URL, OID);
        assert!(Pointer::decode(text.as_bytes()).is_none());
    }

    #[test]
    fn test_decode_rejects_oversized_blob() {
        let mut text = canonical(OID, 7);
        text.push_str(&"# padding\n".repeat(200));
        assert!(text.len() >= POINTER_SIZE_CUTOFF);
        assert!(Pointer::decode(text.as_bytes()).is_none());
    }
}

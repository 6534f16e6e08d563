//! Digest-to-text encodings used in content-addressed URIs

use data_encoding::{BASE32_NOPAD, BASE64URL_NOPAD, HEXUPPER};

use crate::{Error, Result};

/// How a digest is rendered inside a content-addressed URI.
///
/// The encoding is a property of the algorithm, not of the call site: MD5
/// URNs are conventionally uppercase hex, SHA-1 URNs base32, RFC 6920 `ni`
/// URIs base64url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestFormat {
    Hex,
    Base32,
    Base58,
    Base64Url,
    /// Decimal rendering of the digest as a big-endian integer. Only defined
    /// for digests of at most 8 bytes (checksums, not cryptographic hashes).
    Decimal,
}

impl DigestFormat {
    /// Encode a raw digest under this format.
    pub fn encode(self, digest: &[u8]) -> Result<String> {
        match self {
            Self::Hex => Ok(HEXUPPER.encode(digest)),
            Self::Base32 => Ok(BASE32_NOPAD.encode(digest)),
            Self::Base58 => Ok(bs58::encode(digest).into_string()),
            Self::Base64Url => Ok(BASE64URL_NOPAD.encode(digest)),
            Self::Decimal => {
                if digest.len() > 8 {
                    return Err(Error::UnencodableDigest {
                        format: self,
                        len: digest.len(),
                    });
                }
                let mut value = 0u64;
                for byte in digest {
                    value = value << 8 | u64::from(*byte);
                }
                Ok(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_uppercase() {
        let encoded = DigestFormat::Hex.encode(&[0x76, 0x4e, 0xfa]).unwrap();
        assert_eq!(encoded, "764EFA");
    }

    #[test]
    fn base32_has_no_padding() {
        let encoded = DigestFormat::Base32.encode(b"hi").unwrap();
        assert_eq!(encoded, "NBUQ");
    }

    #[test]
    fn base64url_uses_url_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet
        let encoded = DigestFormat::Base64Url.encode(&[0xfb, 0xff]).unwrap();
        assert_eq!(encoded, "-_8");
    }

    #[test]
    fn decimal_renders_big_endian() {
        let encoded = DigestFormat::Decimal.encode(&[0x01, 0x00]).unwrap();
        assert_eq!(encoded, "256");
    }

    #[test]
    fn decimal_rejects_wide_digests() {
        let err = DigestFormat::Decimal.encode(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::UnencodableDigest { len: 16, .. }));
    }

    #[test]
    fn base58_round_trip() {
        let encoded = DigestFormat::Base58.encode(&[0x00, 0x01]).unwrap();
        assert_eq!(bs58::decode(&encoded).into_vec().unwrap(), vec![0x00, 0x01]);
    }
}

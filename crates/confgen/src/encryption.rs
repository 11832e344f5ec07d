//! reproducible encryption of secret values
//!
//! Generated files are regenerated on every build and only rewritten when their content changes,
//! so nothing in here may depend on randomness:
//!
//! - the initialisation vector is the lowercase hex MD5 digest of the whole configuration document
//!   in canonical json form ([Value::to_canonical_json])
//! - secrets are encrypted with AES-128 in CBC mode with PKCS#7 padding, using the encryption key's
//!   utf-8 bytes (truncated or zero padded to 16 bytes) as key and the first 16 bytes of the digest
//!   text as initialisation vector
//!
//! The generated source exposes the key and the digest as `[UInt8]` so the app can decrypt at runtime.
use crate::value::Value;
use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// AES-128 key size in bytes
pub const KEY_LENGTH: usize = 16;

/// AES block size in bytes
pub const BLOCK_LENGTH: usize = 16;

/// Suffix of the property injected next to every encryption key
pub const IV_SUFFIX: &str = "IV";

/// Initialisation vector derived from a configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iv {
    hash: String,
}

impl Iv {
    pub fn derive(config: &Value) -> Result<Self, serde_json::Error> {
        let canonical = config.to_canonical_json()?;
        let hash = format!("{:x}", Md5::digest(canonical.as_bytes()));
        tracing::trace!(%hash, "derived initialisation vector");
        Ok(Self { hash })
    }

    /// 32 character lowercase hex digest
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// utf-8 bytes of the digest text, as rendered into the generated file
    pub fn bytes(&self) -> &[u8] {
        self.hash.as_bytes()
    }

    fn block(&self) -> [u8; BLOCK_LENGTH] {
        sized(self.bytes())
    }
}

/// Name of the property carrying the initialisation vector for `key_name`
pub fn iv_property_name(key_name: &str) -> String {
    format!("{key_name}{IV_SUFFIX}")
}

/// Encrypts `plaintext` under `key`
///
/// Identical inputs always produce identical output.
pub fn encrypt(key: &[u8], iv: &Iv, plaintext: &str) -> Vec<u8> {
    let key: [u8; KEY_LENGTH] = sized(key);
    let iv = iv.block();

    Aes128CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes())
}

/// Truncates or zero pads `bytes` to exactly `N` bytes
fn sized<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut sized = [0u8; N];
    let len = bytes.len().min(N);
    sized[..len].copy_from_slice(&bytes[..len]);
    sized
}

//! Hashing utilities.
//!
//! Everything here works against the [`digest`] traits from the [RustCrypto] project. The concrete
//! hash used by the signature schemes is SHA256 from [`sha2`].
//!
//! [RustCrypto]: https://github.com/RustCrypto/hashes
use digest::{Digest, Update};
use sha2::Sha256;

/// Returns a SHA256 instance pre-loaded with the BIP340 tag prefix `sha256(tag) || sha256(tag)`.
///
/// # Example
/// ```
/// use digest::Digest;
/// use kfun::hash::tagged_hash;
/// let mut hash = tagged_hash("my-domain/my-purpose");
/// hash.update(b"hello world");
/// println!("{:x}", hash.finalize());
/// ```
pub fn tagged_hash(tag: &str) -> Sha256 {
    let hashed_tag = Sha256::digest(tag.as_bytes());
    let mut hash = Sha256::default();
    Digest::update(&mut hash, hashed_tag);
    Digest::update(&mut hash, hashed_tag);
    hash
}

/// Single SHA256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Anything that can be hashed.
///
/// The implementations decide how the type is converted into bytes when it is added to a hash.
///
/// # Example
///
/// ```
/// use digest::Digest;
/// use kfun::hash::{HashAdd, HashInto};
/// struct CryptoData([u8; 42]);
///
/// impl HashInto for &CryptoData {
///     fn hash_into(self, hash: &mut impl digest::Update) {
///         hash.update(&self.0[..])
///     }
/// }
///
/// let cryptodata = CryptoData([42u8; 42]);
/// let hash = sha2::Sha256::default().add(&cryptodata).finalize();
/// ```
pub trait HashInto {
    /// Asks the item to convert itself to bytes and add itself to `hash`.
    fn hash_into(self, hash: &mut impl Update);
}

impl HashInto for u8 {
    fn hash_into(self, hash: &mut impl Update) {
        hash.update(&[self])
    }
}

impl HashInto for &[u8] {
    fn hash_into(self, hash: &mut impl Update) {
        hash.update(self)
    }
}

impl<const N: usize> HashInto for [u8; N] {
    fn hash_into(self, hash: &mut impl Update) {
        hash.update(&self[..])
    }
}

impl<const N: usize> HashInto for &[u8; N] {
    fn hash_into(self, hash: &mut impl Update) {
        hash.update(&self[..])
    }
}

/// Extension trait for [`digest::Update`] to make adding things to a hash convenient.
pub trait HashAdd {
    /// Converts something that implements [`HashInto`] to bytes and incorporates the result into
    /// the hash.
    fn add<HI: HashInto>(self, data: HI) -> Self;
}

impl<D: Update> HashAdd for D {
    fn add<HI: HashInto>(mut self, data: HI) -> Self {
        data.hash_into(&mut self);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tagged_hash_prefix() {
        let tag_hash = sha256(b"BIP0340/challenge");
        let expected = Sha256::default()
            .chain_update(tag_hash)
            .chain_update(tag_hash)
            .chain_update(b"msg")
            .finalize();
        let got = tagged_hash("BIP0340/challenge").add(b"msg").finalize();
        assert_eq!(got, expected);
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            crate::hex::encode(&sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

//! Nonce generation.
//!
//! Nonce generation is one of the most difficult things to get right when implementing discrete
//! log based cryptosystems. A nonce is a secret [`Scalar`] chosen for each signature or proof. It
//! must look uniformly random to anyone who doesn't know the secret key. Even a slight bias can let
//! an attacker who sees enough signatures extract the key.
//!
//! Signing schemes take a [`NonceFunction`] when they are created. Two are provided:
//!
//! - [`Rfc6979`]: the HMAC-SHA256 based deterministic derivation used for Bitcoin ECDSA.
//! - [`Synthetic`]: BIP340 style tagged hashing that mixes auxiliary randomness into the key before
//!   hashing. Use it with [`NoAux`] for fully deterministic nonces.
//!
//! [`FixedNonce`] and plain closures can stand in for either, which is mostly useful for
//! reproducing test vectors.
use crate::{Error, Scalar, hash::*, marker::*};
use alloc::format;
use core::marker::PhantomData;
use digest::{Digest, KeyInit, generic_array::GenericArray};
use hmac::{Hmac, Mac};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

/// How many times [`derive_nonce`] asks a nonce function for a fresh nonce before giving up.
///
/// For honest inputs a retry only happens with probability around `2^-128` so hitting this bound
/// means the nonce function is broken.
pub const MAX_NONCE_RETRIES: u32 = 256;

/// A pluggable strategy for deriving signing nonces.
///
/// `secret` is the signing key, `public` any public inputs the scheme binds the nonce to (like a
/// BIP340 x-only public key) and `message` the message being signed. `counter` starts at zero and
/// is incremented each time the scheme rejects the nonce, so an implementation must return a
/// different value for each counter. Returning `None` rejects the candidate without using it.
pub trait NonceFunction {
    /// Derives the `counter`th candidate nonce.
    fn derive(&self, secret: &Scalar, public: &[u8], message: &[u8], counter: u32) -> Option<Scalar>;
}

impl<F> NonceFunction for F
where
    F: Fn(&Scalar, &[u8], &[u8], u32) -> Option<Scalar>,
{
    fn derive(&self, secret: &Scalar, public: &[u8], message: &[u8], counter: u32) -> Option<Scalar> {
        self(secret, public, message, counter)
    }
}

/// Runs `attempt` on nonces from `nonce_fn` until it accepts one.
///
/// Candidates the nonce function rejects and candidates `attempt` returns `None` for are skipped
/// by bumping the counter. Gives up with [`Error::NonceExhausted`] after [`MAX_NONCE_RETRIES`]
/// candidates.
pub fn derive_nonce<T>(
    nonce_fn: &impl NonceFunction,
    secret: &Scalar,
    public: &[u8],
    message: &[u8],
    mut attempt: impl FnMut(&Scalar) -> Option<T>,
) -> Result<T, Error> {
    for counter in 0..MAX_NONCE_RETRIES {
        let nonce = nonce_fn.derive(secret, public, message, counter).map(Zeroizing::new);
        if let Some(output) = nonce.as_deref().and_then(&mut attempt) {
            return Ok(output);
        }
        tracing::debug!(counter, "nonce rejected, deriving another");
    }
    tracing::warn!(retries = MAX_NONCE_RETRIES, "nonce function exhausted");
    Err(Error::NonceExhausted)
}

/// Deterministic nonces as specified in [RFC6979] with HMAC-SHA256, matching libsecp256k1's
/// default ECDSA nonce function.
///
/// The HMAC-DRBG is seeded with `key || message || extra_data`. `public` inputs are not used.
///
/// # Example
/// ```
/// use kfun::{Scalar, nonce::{NonceFunction, Rfc6979}};
/// let secret = Scalar::random(&mut rand::thread_rng());
/// let nonce = Rfc6979::default().derive(&secret, &[], &[42u8; 32], 0);
/// assert_eq!(nonce, Rfc6979::default().derive(&secret, &[], &[42u8; 32], 0));
/// ```
///
/// [RFC6979]: https://www.rfc-editor.org/rfc/rfc6979
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rfc6979 {
    /// Extra entropy appended to the seed. Signatures made with different `extra_data` use
    /// unrelated nonces.
    pub extra_data: Option<[u8; 32]>,
}

impl Rfc6979 {
    /// Creates the nonce function with 32 bytes of extra entropy in the seed.
    pub fn with_extra_data(extra_data: [u8; 32]) -> Self {
        Self {
            extra_data: Some(extra_data),
        }
    }
}

impl NonceFunction for Rfc6979 {
    fn derive(&self, secret: &Scalar, _public: &[u8], message: &[u8], counter: u32) -> Option<Scalar> {
        let key = Zeroizing::new(secret.to_bytes());
        let extra: &[u8] = match &self.extra_data {
            Some(extra) => &extra[..],
            None => &[],
        };
        let mut drbg = HmacDrbg::new(&key[..], message, extra);
        let mut candidate = drbg.generate();
        for _ in 0..counter {
            candidate = drbg.generate();
        }
        Scalar::from_bytes(*candidate)
    }
}

/// The HMAC-SHA256 DRBG from RFC6979 section 3.2.
struct HmacDrbg {
    k: Zeroizing<[u8; 32]>,
    v: Zeroizing<[u8; 32]>,
    retry: bool,
}

impl HmacDrbg {
    fn new(key: &[u8], message: &[u8], extra: &[u8]) -> Self {
        let mut k = Zeroizing::new([0x00u8; 32]);
        let mut v = Zeroizing::new([0x01u8; 32]);
        for round in [0x00u8, 0x01] {
            *k = hmac_sha256(&k, &[&v[..], &[round], key, message, extra]);
            *v = hmac_sha256(&k, &[&v[..]]);
        }
        Self { k, v, retry: false }
    }

    fn generate(&mut self) -> Zeroizing<[u8; 32]> {
        if self.retry {
            *self.k = hmac_sha256(&self.k, &[&self.v[..], &[0x00]]);
            *self.v = hmac_sha256(&self.k, &[&self.v[..]]);
        }
        *self.v = hmac_sha256(&self.k, &[&self.v[..]]);
        self.retry = true;
        Zeroizing::new(*self.v)
    }
}

fn hmac_sha256(key: &[u8; 32], parts: &[&[u8]]) -> [u8; 32] {
    // HMAC zero pads short keys up to the 64 byte block so padding here is the same key
    let mut block = Zeroizing::new([0u8; 64]);
    block[..32].copy_from_slice(key);
    let mut mac = <Hmac<Sha256> as KeyInit>::new(GenericArray::from_slice(&block[..]));
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// A source of auxiliary randomness for [`Synthetic`] nonces.
///
/// [`RngCore`] requires `&mut self` which is awkward for a nonce function shared by a signing
/// scheme, so implementations must handle any mutability internally.
pub trait NonceRng {
    /// Fill `bytes` with random data.
    fn fill_bytes(&self, bytes: &mut [u8]);
}

/// A zero sized type that conjures up an RNG with `Default` (like [`ThreadRng`]) whenever it needs
/// randomness. It is `Sync` even if `R` isn't.
///
/// # Examples
/// ```
/// use kfun::nonce::{GlobalRng, NonceRng};
/// use rand::rngs::ThreadRng;
/// let nonce_rng = GlobalRng::<ThreadRng>::default();
/// let mut bytes = [0u8; 32];
/// nonce_rng.fill_bytes(&mut bytes);
/// assert_ne!(bytes, [0u8; 32]);
/// ```
///
/// [`ThreadRng`]: https://docs.rs/rand/latest/rand/rngs/struct.ThreadRng.html
#[derive(Debug, Default, Clone)]
pub struct GlobalRng<R> {
    inner: PhantomData<fn(R)>,
}

impl<R: RngCore + CryptoRng + Default> NonceRng for GlobalRng<R> {
    fn fill_bytes(&self, bytes: &mut [u8]) {
        R::default().fill_bytes(bytes);
    }
}

/// No auxiliary randomness. BIP340 calls for 32 zero bytes in this case.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoAux;

impl NonceRng for NoAux {
    fn fill_bytes(&self, bytes: &mut [u8]) {
        bytes.fill(0);
    }
}

/// Fixed auxiliary bytes. Mostly useful for test vectors.
impl NonceRng for [u8; 32] {
    fn fill_bytes(&self, bytes: &mut [u8]) {
        bytes.copy_from_slice(&self[..bytes.len()]);
    }
}

/// BIP340 style nonces: the secret is masked with a tagged hash of auxiliary randomness and the
/// result is hashed with a second tag together with the public inputs and the message.
///
/// ```text
/// t = secret XOR tagged_hash(aux_tag, aux)
/// k = tagged_hash(nonce_tag, t || public || message [|| counter]) mod n
/// ```
///
/// The 4-byte big-endian counter is only appended on retries so the first nonce is exactly the
/// BIP340 one.
///
/// # Examples
///
/// ```
/// use kfun::nonce::{GlobalRng, NoAux, Synthetic};
/// use rand::rngs::ThreadRng;
/// // deterministic BIP340 nonces
/// let nonce_fn = Synthetic::bip340(NoAux);
/// // with fresh randomness for every signature
/// let nonce_fn = Synthetic::bip340(GlobalRng::<ThreadRng>::default());
/// // domain separated for your own protocol
/// let nonce_fn = Synthetic::from_tag("my-protocol", NoAux);
/// ```
#[derive(Debug, Clone)]
pub struct Synthetic<R> {
    rng: R,
    nonce_hash: Sha256,
    aux_hash: Sha256,
}

impl<R: NonceRng> Synthetic<R> {
    /// Creates a nonce function with explicit tags for the nonce and the auxiliary data hash.
    pub fn with_tags(nonce_tag: &str, aux_tag: &str, rng: R) -> Self {
        Self {
            rng,
            nonce_hash: tagged_hash(nonce_tag),
            aux_hash: tagged_hash(aux_tag),
        }
    }

    /// Uses the tags `{tag}/nonce` and `{tag}/aux`.
    pub fn from_tag(tag: &str, rng: R) -> Self {
        Self::with_tags(&format!("{}/nonce", tag), &format!("{}/aux", tag), rng)
    }

    /// The nonce function from BIP340.
    pub fn bip340(rng: R) -> Self {
        Self::from_tag("BIP0340", rng)
    }
}

impl Default for Synthetic<NoAux> {
    /// Deterministic BIP340 nonces.
    fn default() -> Self {
        Self::bip340(NoAux)
    }
}

impl<R: NonceRng> NonceFunction for Synthetic<R> {
    fn derive(&self, secret: &Scalar, public: &[u8], message: &[u8], counter: u32) -> Option<Scalar> {
        let mut aux = Zeroizing::new([0u8; 32]);
        self.rng.fill_bytes(&mut aux[..]);
        let mut masked: Zeroizing<[u8; 32]> = Zeroizing::new(self.aux_hash.clone().add(&*aux).finalize().into());
        for (byte, secret_byte) in masked.iter_mut().zip(secret.to_bytes()) {
            *byte ^= secret_byte;
        }

        let mut hash = self.nonce_hash.clone().add(&*masked).add(public).add(message);
        if counter > 0 {
            hash = hash.add(counter.to_be_bytes());
        }
        Scalar::<Zero>::from_hash(hash).non_zero()
    }
}

/// Always returns the same nonce.
///
/// This exists to reproduce published test vectors. Reusing a nonce for two different messages
/// reveals the secret key so never use this to sign anything real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedNonce(pub Scalar);

impl NonceFunction for FixedNonce {
    fn derive(&self, _secret: &Scalar, _public: &[u8], _message: &[u8], counter: u32) -> Option<Scalar> {
        if counter == 0 { Some(self.0) } else { None }
    }
}

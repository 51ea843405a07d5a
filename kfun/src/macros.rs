//! Hex `Display`, `Debug` and `FromStr` impls plus serde support for types that have a fixed
//! length byte encoding.
//!
//! The macros are exported so the signature crates can use them on their own types. They expand
//! to calls into the functions below which hold the actual logic.
use crate::hex::{self, HexError};
use core::fmt;

#[doc(hidden)]
pub fn write_hex(f: &mut fmt::Formatter, bytes: &[u8]) -> fmt::Result {
    bytes.iter().try_for_each(|byte| write!(f, "{:02x}", byte))
}

/// The last path segment of a marker type's name.
#[doc(hidden)]
pub fn marker_name<T>() -> &'static str {
    core::any::type_name::<T>().rsplit("::").next().unwrap_or("")
}

#[doc(hidden)]
pub fn from_hex<T, const N: usize>(
    hex: &str,
    decode: impl FnOnce([u8; N]) -> Option<T>,
) -> Result<T, HexError> {
    decode(hex::decode_array::<N>(hex)?).ok_or(HexError::InvalidEncoding)
}

#[cfg(feature = "serde")]
#[doc(hidden)]
pub fn serialize_bytes<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeTuple;
    if serializer.is_human_readable() {
        return serializer.serialize_str(&hex::encode(bytes));
    }
    // a tuple has no length prefix in binary formats
    let mut tuple = serializer.serialize_tuple(bytes.len())?;
    for byte in bytes {
        tuple.serialize_element(byte)?;
    }
    tuple.end()
}

#[cfg(feature = "serde")]
#[doc(hidden)]
pub fn deserialize_bytes<'de, D, T, F, const N: usize>(
    deserializer: D,
    name: &'static str,
    decode: F,
) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    F: Fn([u8; N]) -> Option<T>,
{
    let visitor = FixedBytesVisitor {
        name,
        decode,
        _out: core::marker::PhantomData,
    };
    if deserializer.is_human_readable() {
        deserializer.deserialize_str(visitor)
    } else {
        deserializer.deserialize_tuple(N, visitor)
    }
}

#[cfg(feature = "serde")]
struct FixedBytesVisitor<T, F, const N: usize> {
    name: &'static str,
    decode: F,
    _out: core::marker::PhantomData<fn() -> T>,
}

#[cfg(feature = "serde")]
impl<'de, T, F, const N: usize> serde::de::Visitor<'de> for FixedBytesVisitor<T, F, N>
where
    F: Fn([u8; N]) -> Option<T>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a valid {}-byte encoding of a {}", N, self.name)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<T, E> {
        let bytes = hex::decode_array::<N>(v).map_err(|e| match e {
            HexError::InvalidLength => E::invalid_length(v.len() / 2, &self),
            e => E::custom(e),
        })?;
        (self.decode)(bytes).ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<T, A::Error> {
        use serde::de::Error;
        let mut bytes = [0u8; N];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = seq
                .next_element()?
                .ok_or_else(|| A::Error::invalid_length(i, &self))?;
        }
        (self.decode)(bytes)
            .ok_or_else(|| A::Error::invalid_value(serde::de::Unexpected::Bytes(&bytes), &self))
    }
}

/// `Debug` as the type name, its marker if it has one, then the hex encoding.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_debug {
    (fn to_bytes$(<$z:ident $(: $bound:path)?>)?($self:ident : &$name:ident $(<$tz:ident>)?) -> $(&)?[u8; $len:literal] $body:block) => {
        impl$(<$z $(: $bound)?>)? core::fmt::Debug for $name$(<$tz>)? {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                let $self = self;
                f.write_str(stringify!($name))?;
                $(write!(f, "<{}>", $crate::macros::marker_name::<$tz>())?;)?
                f.write_str("(")?;
                let bytes = $body;
                $crate::macros::write_hex(f, &bytes[..])?;
                f.write_str(")")
            }
        }
    };
}

/// Hex `Display` and a `Serialize` that writes hex to human readable formats and the raw bytes
/// to binary ones.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_display_serialize {
    (fn to_bytes$(<$z:ident $(: $bound:path)?>)?($self:ident : &$name:ident $(<$tz:ident>)?) -> $(&)?[u8; $len:literal] $body:block) => {
        impl$(<$z $(: $bound)?>)? core::fmt::Display for $name$(<$tz>)? {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                let $self = self;
                let bytes = $body;
                $crate::macros::write_hex(f, &bytes[..])
            }
        }

        #[cfg(feature = "serde")]
        impl$(<$z $(: $bound)?>)? $crate::serde::Serialize for $name$(<$tz>)? {
            fn serialize<S: $crate::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let $self = self;
                let bytes = $body;
                $crate::macros::serialize_bytes(&bytes[..], serializer)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! impl_display_debug_serialize {
    ($($tt:tt)+) => {
        $crate::impl_display_serialize!($($tt)+);
        $crate::impl_debug!($($tt)+);
    };
}

/// `FromStr` from hex and the `Deserialize` matching [`impl_display_serialize`]. `$name` shows
/// up in error messages.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_fromstr_deserialize {
    (
        name => $desc:literal,
        fn from_bytes$(<$z:ident $(: $bound:path)?>)?($input:ident : [u8; $len:literal]) -> Option<$name:ident $(<$tz:ident>)?> $body:block
    ) => {
        impl$(<$z $(: $bound)?>)? core::str::FromStr for $name$(<$tz>)? {
            type Err = $crate::hex::HexError;

            fn from_str(hex: &str) -> Result<Self, Self::Err> {
                $crate::macros::from_hex(hex, |$input: [u8; $len]| -> Option<Self> { $body })
            }
        }

        #[cfg(feature = "serde")]
        impl<'de $(, $z $(: $bound)?)?> $crate::serde::Deserialize<'de> for $name$(<$tz>)? {
            fn deserialize<D: $crate::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::macros::deserialize_bytes(deserializer, $desc, |$input: [u8; $len]| -> Option<Self> { $body })
            }
        }
    };
}

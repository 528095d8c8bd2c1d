//! Token decoders.
//!
//! A decoder turns one input token into a typed value or a human-readable
//! message. The message is reported to the user verbatim, so it should name
//! the offending token.
//!
//! Built-ins and caller-supplied decoders share the same [`Decoder`] trait;
//! the parser never needs to know which one it is holding.

use std::marker::PhantomData;
use std::str::FromStr;

/// Type tag used for options that take no value.
pub const BOOLEAN: &str = "boolean";

pub trait Decoder: Send + Sync + 'static {
    type Value: 'static;

    /// Type tag shown in help output, e.g. `--count <number>`.
    fn name(&self) -> &str;

    fn decode(&self, token: &str) -> Result<Self::Value, String>;
}

fn malformed(token: &str, name: &str) -> String {
    format!("argument \"{token}\" cannot be parsed into {name}")
}

/// Identity decoder. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDecoder;

impl Decoder for StringDecoder {
    type Value = String;

    fn name(&self) -> &str {
        "string"
    }

    fn decode(&self, token: &str) -> Result<String, String> {
        Ok(token.to_string())
    }
}

/// Floating point decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberDecoder;

impl Decoder for NumberDecoder {
    type Value = f64;

    fn name(&self) -> &str {
        "number"
    }

    fn decode(&self, token: &str) -> Result<f64, String> {
        match token.parse::<f64>() {
            Ok(n) if !n.is_nan() => Ok(n),
            _ => Err(malformed(token, self.name())),
        }
    }
}

/// Decoder for any [`FromStr`] type, reported under a caller-chosen name.
pub struct ParsedDecoder<V> {
    name: String,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Decoder for ParsedDecoder<V>
where
    V: FromStr + 'static,
{
    type Value = V;

    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, token: &str) -> Result<V, String> {
        token.parse::<V>().map_err(|_| malformed(token, &self.name))
    }
}

/// A named closure.
pub struct FnDecoder<F, V> {
    name: String,
    f: F,
    _marker: PhantomData<fn() -> V>,
}

impl<F, V> Decoder for FnDecoder<F, V>
where
    F: Fn(&str) -> Result<V, String> + Send + Sync + 'static,
    V: 'static,
{
    type Value = V;

    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, token: &str) -> Result<V, String> {
        (self.f)(token)
    }
}

/// Post-processes another decoder's value. Keeps the inner decoder's name.
pub struct Map<D, F> {
    inner: D,
    f: F,
}

impl<D, F, U> Decoder for Map<D, F>
where
    D: Decoder,
    F: Fn(D::Value) -> U + Send + Sync + 'static,
    U: 'static,
{
    type Value = U;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn decode(&self, token: &str) -> Result<U, String> {
        self.inner.decode(token).map(&self.f)
    }
}

pub fn string() -> StringDecoder {
    StringDecoder
}

pub fn number() -> NumberDecoder {
    NumberDecoder
}

/// Decode with `V::from_str`, e.g. `decode::parsed::<u16>("port")`.
pub fn parsed<V: FromStr + 'static>(name: impl Into<String>) -> ParsedDecoder<V> {
    ParsedDecoder {
        name: name.into(),
        _marker: PhantomData,
    }
}

/// Wrap a closure as a named decoder.
///
/// ```
/// use argdecl::decode::{self, Decoder};
///
/// let even = decode::from_fn("even", |s: &str| match s.parse::<u32>() {
///     Ok(n) if n % 2 == 0 => Ok(n),
///     _ => Err(format!("\"{s}\" is not an even number")),
/// });
/// assert_eq!(even.decode("4"), Ok(4));
/// assert!(even.decode("3").is_err());
/// ```
pub fn from_fn<F, V>(name: impl Into<String>, f: F) -> FnDecoder<F, V>
where
    F: Fn(&str) -> Result<V, String> + Send + Sync + 'static,
    V: 'static,
{
    FnDecoder {
        name: name.into(),
        f,
        _marker: PhantomData,
    }
}

pub fn map<D, F, U>(inner: D, f: F) -> Map<D, F>
where
    D: Decoder,
    F: Fn(D::Value) -> U + Send + Sync + 'static,
{
    Map { inner, f }
}

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;

/// A primitive value as exchanged with the store.
///
/// The store itself only keeps byte strings. The variants exist so callers
/// can hand over native numbers and text without formatting them first;
/// [`WireValue::to_bytes`] produces the canonical byte form that is actually
/// persisted. Equality and hashing are defined over that canonical form, so
/// `WireValue::Integer(8)` equals `WireValue::Text("8".into())`.
#[derive(Clone)]
pub enum WireValue {
    /// Signed 64-bit integer. Booleans travel as `1` / `0`.
    Integer(i64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes, as returned by the store.
    Bytes(Bytes),
}

impl WireValue {
    /// The empty text value used for absent data.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Canonical byte encoding, exactly as the store persists it.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Integer(n) => Bytes::from(n.to_string()),
            Self::Float(f) => Bytes::from(format_float(*f)),
            Self::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
            Self::Bytes(b) => b.clone(),
        }
    }

    /// Textual representation. Non-UTF-8 bytes are replaced lossily.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Float(f) => Cow::Owned(format_float(*f)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Returns `true` if the canonical encoding is zero-length.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Float(_) => false,
            Self::Text(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
        }
    }

    /// Returns `true` for an empty value or a value whose text is `0`.
    ///
    /// Identifiers in this state are treated as not yet assigned.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(_) | Self::Bytes(_) => {
                let text = self.as_text();
                text.is_empty() || text == "0"
            }
        }
    }
}

/// Store-compatible float formatting: `inf`, `-inf`, and plain decimals.
fn format_float(f: f64) -> String {
    if f.is_infinite() {
        if f.is_sign_positive() { "inf".into() } else { "-inf".into() }
    } else {
        f.to_string()
    }
}

impl Default for WireValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for WireValue {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for WireValue {}

impl Hash for WireValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl PartialOrd for WireValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WireValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl fmt::Debug for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "Integer({n})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "Bytes({s:?})"),
                Err(_) => write!(f, "Bytes(0x{})", hex::encode(b)),
            },
        }
    }
}

impl From<i64> for WireValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for WireValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for WireValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for WireValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for WireValue {
    fn from(b: bool) -> Self {
        Self::Integer(i64::from(b))
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for WireValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<Bytes> for WireValue {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for WireValue {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<&WireValue> for WireValue {
    fn from(v: &WireValue) -> Self {
        v.clone()
    }
}

/// One named sub-field of a store hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HashEntry {
    pub name: String,
    pub value: WireValue,
}

impl HashEntry {
    pub fn new(name: impl Into<String>, value: impl Into<WireValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

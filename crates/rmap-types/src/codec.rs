//! Conversion between native field values and [`WireValue`]s.
//!
//! The supported native kinds are booleans, 32/64-bit integers, doubles,
//! text, raw bytes and `WireValue` itself (pass-through), plus `Option<_>`
//! of any of them for nullable members. Everything else goes through the
//! textual fallback.

use std::fmt::Display;

use bytes::Bytes;

use crate::error::{CodecError, CodecResult};
use crate::wire::WireValue;

/// A native type with a dedicated wire encoding.
///
/// `decode` receives `None` when the store holds no value for the field.
/// Missing and empty values decode to the type's zero value.
pub trait FieldValue: Sized {
    fn encode(&self) -> WireValue;

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self>;
}

/// Textual encoding for types without a dedicated codec.
pub fn encode_display<D: Display + ?Sized>(value: &D) -> WireValue {
    WireValue::Text(value.to_string())
}

/// Textual decoding for types without a dedicated codec. Never fails.
pub fn decode_text(wire: Option<&WireValue>) -> String {
    wire.map(|w| w.as_text().into_owned()).unwrap_or_default()
}

fn present(wire: Option<&WireValue>) -> Option<&WireValue> {
    wire.filter(|w| !w.is_empty())
}

fn invalid(expected: &'static str, wire: &WireValue) -> CodecError {
    CodecError::InvalidValue {
        expected,
        found: wire.as_text().into_owned(),
    }
}

impl FieldValue for WireValue {
    fn encode(&self) -> WireValue {
        self.clone()
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        Ok(wire.cloned().unwrap_or_default())
    }
}

impl FieldValue for bool {
    fn encode(&self) -> WireValue {
        WireValue::from(*self)
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        let Some(w) = present(wire) else {
            return Ok(false);
        };
        match w {
            WireValue::Integer(n) => Ok(*n != 0),
            WireValue::Float(f) => Ok(*f != 0.0),
            _ => {
                let text = w.as_text();
                let text = text.trim();
                if text == "1" || text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text == "0" || text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(invalid("boolean", w))
                }
            }
        }
    }
}

impl FieldValue for i64 {
    fn encode(&self) -> WireValue {
        WireValue::Integer(*self)
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        let Some(w) = present(wire) else {
            return Ok(0);
        };
        match w {
            WireValue::Integer(n) => Ok(*n),
            WireValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            _ => w.as_text().trim().parse().map_err(|_| invalid("integer", w)),
        }
    }
}

impl FieldValue for i32 {
    fn encode(&self) -> WireValue {
        WireValue::Integer(i64::from(*self))
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        let wide = i64::decode(wire)?;
        i32::try_from(wide).map_err(|_| CodecError::OutOfRange {
            target: "i32",
            value: wide,
        })
    }
}

impl FieldValue for f64 {
    fn encode(&self) -> WireValue {
        WireValue::Float(*self)
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        let Some(w) = present(wire) else {
            return Ok(0.0);
        };
        match w {
            WireValue::Float(f) => Ok(*f),
            WireValue::Integer(n) => Ok(*n as f64),
            _ => w.as_text().trim().parse().map_err(|_| invalid("float", w)),
        }
    }
}

impl FieldValue for String {
    fn encode(&self) -> WireValue {
        WireValue::Text(self.clone())
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        Ok(decode_text(wire))
    }
}

impl FieldValue for Vec<u8> {
    fn encode(&self) -> WireValue {
        WireValue::Bytes(Bytes::copy_from_slice(self))
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        Ok(wire.map(|w| w.to_bytes().to_vec()).unwrap_or_default())
    }
}

impl FieldValue for Bytes {
    fn encode(&self) -> WireValue {
        WireValue::Bytes(self.clone())
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        Ok(wire.map(WireValue::to_bytes).unwrap_or_default())
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    fn encode(&self) -> WireValue {
        match self {
            Some(v) => v.encode(),
            None => WireValue::empty(),
        }
    }

    fn decode(wire: Option<&WireValue>) -> CodecResult<Self> {
        match present(wire) {
            Some(w) => V::decode(Some(w)).map(Some),
            None => Ok(None),
        }
    }
}

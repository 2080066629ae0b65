//! Field mappings: one entity member bound to one store field, or to a
//! family of sub-fields for map-valued members.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use rmap_types::{decode_text, encode_display, CodecResult, FieldValue, HashEntry, WireValue};

use crate::error::{MappingError, MappingResult};
use crate::member::Member;
use crate::names::SEPARATOR;

/// Read/write access to a member stored as a single field.
pub trait ScalarAccess<T>: Send + Sync {
    fn read(&self, entity: &T) -> WireValue;

    /// `value` is `None` when the store holds no such field.
    fn write(&self, entity: &mut T, value: Option<&WireValue>) -> CodecResult<()>;
}

/// Read/write access to a map-valued member stored as prefixed sub-fields.
pub trait MapAccess<T>: Send + Sync {
    /// Encoded `(sub-key, value)` pairs, sorted by sub-key.
    fn read(&self, entity: &T) -> Vec<(WireValue, WireValue)>;

    /// Replace the member with a fresh map built from `(sub-key, value)` pairs.
    fn write(&self, entity: &mut T, pairs: &[(WireValue, &WireValue)]) -> CodecResult<()>;

    /// Name of the map's value type, for diagnostics.
    fn value_type(&self) -> &'static str;
}

/// Key types whose encoding is valid text, so they survive being embedded
/// in a `{field}:{sub-key}` field name.
///
/// Binary keys are not accepted:
///
/// ```compile_fail
/// use std::collections::BTreeMap;
/// use rmap_mapping::{member, MappingBuilder};
///
/// #[derive(Default)]
/// struct Blob {
///     id: i64,
///     parts: BTreeMap<Vec<u8>, String>,
/// }
///
/// let mut b = MappingBuilder::<Blob>::with_default_constructor();
/// b.map_flattened(member!(Blob, parts), None);
/// ```
pub trait SubKey: FieldValue {}

impl SubKey for String {}
impl SubKey for i64 {}
impl SubKey for i32 {}
impl SubKey for bool {}

/// Map types that can be flattened into prefixed sub-fields.
pub trait FlatMap: Default {
    type Key: SubKey;
    type Value: FieldValue;

    fn encode_pairs(&self) -> Vec<(WireValue, WireValue)>;

    fn insert_decoded(&mut self, key: Self::Key, value: Self::Value);
}

impl<K, V, S> FlatMap for HashMap<K, V, S>
where
    K: SubKey + Eq + Hash,
    V: FieldValue,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = V;

    fn encode_pairs(&self) -> Vec<(WireValue, WireValue)> {
        self.iter().map(|(k, v)| (k.encode(), v.encode())).collect()
    }

    fn insert_decoded(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K, V> FlatMap for BTreeMap<K, V>
where
    K: SubKey + Ord,
    V: FieldValue,
{
    type Key = K;
    type Value = V;

    fn encode_pairs(&self) -> Vec<(WireValue, WireValue)> {
        self.iter().map(|(k, v)| (k.encode(), v.encode())).collect()
    }

    fn insert_decoded(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

// ---------------------------------------------------------------------------
// Accessor implementations
// ---------------------------------------------------------------------------

/// Scalar member with a dedicated codec.
pub(crate) struct CodecAccess<T, V>(pub(crate) Member<T, V>);

impl<T, V> ScalarAccess<T> for CodecAccess<T, V>
where
    V: FieldValue,
{
    fn read(&self, entity: &T) -> WireValue {
        self.0.get(entity).encode()
    }

    fn write(&self, entity: &mut T, value: Option<&WireValue>) -> CodecResult<()> {
        let decoded = V::decode(value)?;
        self.0.set(entity, decoded);
        Ok(())
    }
}

/// Scalar member without a dedicated codec, stored as its textual form.
///
/// Text that does not parse back leaves the member at `V::default()`.
pub(crate) struct DisplayAccess<T, V>(pub(crate) Member<T, V>);

impl<T, V> ScalarAccess<T> for DisplayAccess<T, V>
where
    V: Display + FromStr + Default,
{
    fn read(&self, entity: &T) -> WireValue {
        encode_display(self.0.get(entity))
    }

    fn write(&self, entity: &mut T, value: Option<&WireValue>) -> CodecResult<()> {
        let text = decode_text(value);
        let parsed = text.parse().unwrap_or_else(|_| {
            tracing::debug!(
                member = self.0.name(),
                target = type_name::<V>(),
                "textual value did not parse, using default"
            );
            V::default()
        });
        self.0.set(entity, parsed);
        Ok(())
    }
}

type ReadFn<T> = Arc<dyn Fn(&T) -> WireValue + Send + Sync>;
type WriteFn<T> = Arc<dyn Fn(&mut T, Option<&WireValue>) -> CodecResult<()> + Send + Sync>;

/// Caller-supplied accessor pair.
pub(crate) struct CustomAccess<T> {
    pub(crate) read: ReadFn<T>,
    pub(crate) write: WriteFn<T>,
}

impl<T> ScalarAccess<T> for CustomAccess<T> {
    fn read(&self, entity: &T) -> WireValue {
        (self.read)(entity)
    }

    fn write(&self, entity: &mut T, value: Option<&WireValue>) -> CodecResult<()> {
        (self.write)(entity, value)
    }
}

/// Map-valued member flattened into sub-fields.
pub(crate) struct FlattenedAccess<T, M> {
    member: Member<T, M>,
    _map: PhantomData<fn() -> M>,
}

impl<T, M> FlattenedAccess<T, M> {
    pub(crate) fn new(member: Member<T, M>) -> Self {
        Self {
            member,
            _map: PhantomData,
        }
    }
}

impl<T, M> MapAccess<T> for FlattenedAccess<T, M>
where
    M: FlatMap,
{
    fn read(&self, entity: &T) -> Vec<(WireValue, WireValue)> {
        let mut pairs = self.member.get(entity).encode_pairs();
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        pairs
    }

    fn write(&self, entity: &mut T, pairs: &[(WireValue, &WireValue)]) -> CodecResult<()> {
        let mut map = M::default();
        for (key, value) in pairs {
            let key = M::Key::decode(Some(key))?;
            let value = M::Value::decode(Some(*value))?;
            map.insert_decoded(key, value);
        }
        self.member.set(entity, map);
        Ok(())
    }

    fn value_type(&self) -> &'static str {
        type_name::<M::Value>()
    }
}

// ---------------------------------------------------------------------------
// FieldMapping
// ---------------------------------------------------------------------------

/// How a member is laid out in the hash. Decided at registration time.
pub enum FieldKind<T> {
    /// One field named exactly `field_name`.
    Scalar(Arc<dyn ScalarAccess<T>>),
    /// Every field named `field_name:{sub-key}`.
    Map(Arc<dyn MapAccess<T>>),
}

impl<T> Clone for FieldKind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(a) => Self::Scalar(Arc::clone(a)),
            Self::Map(a) => Self::Map(Arc::clone(a)),
        }
    }
}

/// Binds one entity member to one store field name or field-name prefix.
pub struct FieldMapping<T> {
    field_name: String,
    kind: FieldKind<T>,
}

impl<T> FieldMapping<T> {
    pub fn scalar(field_name: impl Into<String>, access: Arc<dyn ScalarAccess<T>>) -> Self {
        Self {
            field_name: field_name.into(),
            kind: FieldKind::Scalar(access),
        }
    }

    pub fn map(field_name: impl Into<String>, access: Arc<dyn MapAccess<T>>) -> Self {
        Self {
            field_name: field_name.into(),
            kind: FieldKind::Map(access),
        }
    }

    /// Store field name, or the sub-field prefix for map kind.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn kind(&self) -> &FieldKind<T> {
        &self.kind
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, FieldKind::Map(_))
    }

    fn prefix(&self) -> String {
        format!("{}{SEPARATOR}", self.field_name)
    }

    /// The `(field name, value)` pairs this member contributes to the hash.
    ///
    /// A scalar member yields exactly one entry; a map member yields one per
    /// map entry, and none for an empty map.
    pub fn entries(&self, entity: &T) -> Vec<HashEntry> {
        match &self.kind {
            FieldKind::Scalar(access) => {
                vec![HashEntry::new(self.field_name.clone(), access.read(entity))]
            }
            FieldKind::Map(access) => {
                let prefix = self.prefix();
                access
                    .read(entity)
                    .into_iter()
                    .map(|(key, value)| HashEntry::new(format!("{prefix}{key}"), value))
                    .collect()
            }
        }
    }

    /// Populate this member of `entity` from the full set of hash entries.
    ///
    /// A missing scalar field leaves the member untouched. A map member is
    /// always replaced, with an empty map when no sub-field matches.
    pub fn read_from_entries(&self, entity: &mut T, entries: &[HashEntry]) -> MappingResult<()> {
        let result = match &self.kind {
            FieldKind::Scalar(access) => {
                match entries.iter().find(|e| e.name == self.field_name) {
                    Some(entry) => access.write(entity, Some(&entry.value)),
                    None => Ok(()),
                }
            }
            FieldKind::Map(access) => {
                let prefix = self.prefix();
                let pairs: Vec<(WireValue, &WireValue)> = entries
                    .iter()
                    .filter_map(|e| {
                        e.name
                            .strip_prefix(prefix.as_str())
                            .map(|key| (WireValue::Text(key.to_string()), &e.value))
                    })
                    .collect();
                access.write(entity, &pairs)
            }
        };
        result.map_err(|source| MappingError::Codec {
            field: self.field_name.clone(),
            source,
        })
    }
}

impl<T> Clone for FieldMapping<T> {
    fn clone(&self) -> Self {
        Self {
            field_name: self.field_name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FieldMapping");
        s.field("field_name", &self.field_name);
        match &self.kind {
            FieldKind::Scalar(_) => s.field("kind", &"scalar"),
            FieldKind::Map(access) => s.field("kind", &"map").field("value_type", &access.value_type()),
        };
        s.finish()
    }
}

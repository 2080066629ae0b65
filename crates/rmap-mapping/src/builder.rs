//! Fluent construction of [`EntityMapping`]s.

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use rmap_types::{CodecResult, FieldValue, WireValue};

use crate::entity::{EntityMapping, Factory, IdMapping};
use crate::error::{MappingError, MappingResult};
use crate::field::{CodecAccess, CustomAccess, DisplayAccess, FieldMapping, FlatMap, FlattenedAccess};
use crate::member::Member;
use crate::names::{validate_collection_name, validate_field_name};

/// Accumulates the configuration of one entity type.
///
/// Every method returns `&mut Self` so calls can be chained. Configuration
/// errors do not panic: the first one is recorded and returned by
/// [`build`](Self::build), so a registration either fully succeeds or has
/// no effect.
///
/// Field names are checked for collisions in `build`. The id member is
/// excluded from that check because it is never written as a hash field.
pub struct MappingBuilder<T> {
    name: Option<String>,
    key_prefix: String,
    id: Option<IdMapping<T>>,
    fields: Vec<FieldMapping<T>>,
    factory: Option<Factory<T>>,
    error: Option<MappingError>,
}

impl<T: 'static> MappingBuilder<T> {
    /// A builder with no constructor configured.
    pub fn new() -> Self {
        Self {
            name: None,
            key_prefix: String::new(),
            id: None,
            fields: Vec::new(),
            factory: None,
            error: None,
        }
    }

    /// A builder whose constructor is `T::default`.
    pub fn with_default_constructor() -> Self
    where
        T: Default,
    {
        let mut builder = Self::new();
        builder.set_constructor(T::default);
        builder
    }

    fn fail(&mut self, error: MappingError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn resolve_field_name(&mut self, member_name: &str, field_name: Option<&str>) -> Option<String> {
        let name = field_name.unwrap_or(member_name);
        match validate_field_name(name) {
            Ok(()) => Some(name.to_string()),
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Collection name used in every key of this type.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if let Err(e) = validate_collection_name(&name) {
            self.fail(e);
        }
        self.name = Some(name);
        self
    }

    /// Namespace prepended to every key of this type.
    pub fn set_key_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Constructor used when rebuilding entities from stored fields.
    pub fn set_constructor<F>(&mut self, constructor: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(constructor));
        self
    }

    /// Designate the identifier member.
    ///
    /// With `auto_number`, storing an entity whose id is empty or zero
    /// assigns the next value of the type's counter. With `indexed`, the set
    /// of live ids is maintained and can be listed.
    pub fn map_id<V>(&mut self, member: Member<T, V>, auto_number: bool, indexed: bool) -> &mut Self
    where
        V: FieldValue + 'static,
    {
        if self.id.is_some() {
            self.fail(MappingError::DuplicateIdMapping);
            return self;
        }
        self.id = Some(IdMapping {
            member_name: member.name().to_string(),
            access: Arc::new(CodecAccess(member)),
            auto_number,
            indexed,
        });
        self
    }

    /// Map a scalar member. `field_name` defaults to the member name.
    pub fn map<V>(&mut self, member: Member<T, V>, field_name: Option<&str>) -> &mut Self
    where
        V: FieldValue + 'static,
    {
        if let Some(name) = self.resolve_field_name(member.name(), field_name) {
            self.fields
                .push(FieldMapping::scalar(name, Arc::new(CodecAccess(member))));
        }
        self
    }

    /// Map a `HashMap`/`BTreeMap` member as `{field_name}:{key}` sub-fields.
    pub fn map_flattened<M>(&mut self, member: Member<T, M>, field_name: Option<&str>) -> &mut Self
    where
        M: FlatMap + 'static,
    {
        if let Some(name) = self.resolve_field_name(member.name(), field_name) {
            self.fields
                .push(FieldMapping::map(name, Arc::new(FlattenedAccess::new(member))));
        }
        self
    }

    /// Map a member with no dedicated codec through its textual form.
    ///
    /// Encoding uses `Display`; decoding uses `FromStr` and silently falls
    /// back to `V::default()` for text that does not parse.
    pub fn map_display<V>(&mut self, member: Member<T, V>, field_name: Option<&str>) -> &mut Self
    where
        V: Display + FromStr + Default + 'static,
    {
        if let Some(name) = self.resolve_field_name(member.name(), field_name) {
            self.fields
                .push(FieldMapping::scalar(name, Arc::new(DisplayAccess(member))));
        }
        self
    }

    /// Map a field through a caller-supplied accessor pair.
    pub fn map_with<R, W>(&mut self, field_name: &str, read: R, write: W) -> &mut Self
    where
        R: Fn(&T) -> WireValue + Send + Sync + 'static,
        W: Fn(&mut T, Option<&WireValue>) -> CodecResult<()> + Send + Sync + 'static,
    {
        if let Some(name) = self.resolve_field_name(field_name, None) {
            let access = CustomAccess {
                read: Arc::new(read),
                write: Arc::new(write),
            };
            self.fields.push(FieldMapping::scalar(name, Arc::new(access)));
        }
        self
    }

    /// Validate the accumulated configuration and freeze it.
    pub fn build(self) -> MappingResult<EntityMapping<T>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let name = self.name.ok_or_else(|| MappingError::InvalidName {
            name: String::new(),
            reason: "no collection name was set".into(),
        })?;

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.field_name()) {
                return Err(MappingError::DuplicateFieldName {
                    name: field.field_name().to_string(),
                });
            }
        }

        tracing::debug!(
            collection = %name,
            fields = self.fields.len(),
            has_id = self.id.is_some(),
            "built entity mapping"
        );

        Ok(EntityMapping {
            name,
            key_prefix: self.key_prefix,
            id: self.id,
            fields: self.fields,
            factory: self.factory,
        })
    }
}

impl<T: 'static> Default for MappingBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Read/write capability pairs bound to one entity member.

use std::fmt;
use std::sync::Arc;

type Getter<T, V> = Arc<dyn Fn(&T) -> &V + Send + Sync>;
type Setter<T, V> = Arc<dyn Fn(&mut T, V) + Send + Sync>;

/// Accessor for a member of type `V` inside an entity of type `T`.
///
/// Carries the member's name, used as the default store field name.
/// Built once at registration time; mapping never inspects types at runtime.
/// The [`member!`](crate::member) macro derives all three parts from a
/// struct field.
pub struct Member<T, V> {
    name: String,
    get: Getter<T, V>,
    set: Setter<T, V>,
}

impl<T: 'static, V: 'static> Member<T, V> {
    pub fn new<G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }
}

impl<T, V> Member<T, V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get<'a>(&self, entity: &'a T) -> &'a V {
        (self.get)(entity)
    }

    pub fn set(&self, entity: &mut T, value: V) {
        (self.set)(entity, value)
    }
}

impl<T, V> Clone for Member<T, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<T, V> fmt::Debug for Member<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member").field("name", &self.name).finish()
    }
}

/// Build a [`Member`] for a named struct field.
///
/// ```
/// use rmap_mapping::member;
///
/// #[derive(Default)]
/// struct User {
///     first_name: String,
/// }
///
/// let m = member!(User, first_name);
/// let mut user = User::default();
/// m.set(&mut user, "Peter".to_string());
/// assert_eq!(m.name(), "first_name");
/// assert_eq!(m.get(&user), "Peter");
/// ```
#[macro_export]
macro_rules! member {
    ($ty:ty, $field:ident) => {
        $crate::Member::<$ty, _>::new(
            stringify!($field),
            |entity: &$ty| &entity.$field,
            |entity: &mut $ty, value| entity.$field = value,
        )
    };
}

#[cfg(test)]
mod tests {
    #[derive(Default)]
    struct Point {
        x: i64,
    }

    #[test]
    fn macro_binds_field() {
        let m = member!(Point, x);
        let mut p = Point::default();
        m.set(&mut p, 7);
        assert_eq!(*m.get(&p), 7);
        assert_eq!(m.name(), "x");
    }

    #[test]
    fn clone_shares_accessors() {
        let m = member!(Point, x);
        let copy = m.clone();
        let mut p = Point::default();
        copy.set(&mut p, 3);
        assert_eq!(*m.get(&p), 3);
        assert!(format!("{m:?}").contains("\"x\""));
    }
}

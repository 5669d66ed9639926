//! Read-only map access that tolerates an absent message.

use std::borrow::Borrow;
use std::collections::hash_map::{self, RandomState};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::{iter, option};

/// A read-only view of a map field which may belong to no message at all.
///
/// Generated accessors return a `MapView` for an `Option<&Message>`. A view
/// over `None` behaves exactly like a view over an empty map.
///
/// ```
/// use std::collections::HashMap;
/// use mapwire::MapView;
///
/// let absent: MapView<'_, String, i32> = MapView::new(None);
/// assert!(absent.is_empty());
/// assert_eq!(absent.get("missing"), None);
/// assert_eq!(absent, HashMap::new());
/// ```
pub struct MapView<'a, K, V, S = RandomState> {
    map: Option<&'a HashMap<K, V, S>>,
}

impl<'a, K, V, S> MapView<'a, K, V, S> {
    pub fn new(map: Option<&'a HashMap<K, V, S>>) -> Self {
        MapView { map }
    }

    /// Returns the underlying map, if there is one.
    pub fn as_map(&self) -> Option<&'a HashMap<K, V, S>> {
        self.map
    }

    pub fn len(&self) -> usize {
        self.map.map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.map.into_iter().flat_map(|map| map.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a K> + 'a {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &'a V> + 'a {
        self.iter().map(|(_, value)| value)
    }
}

impl<'a, K, V, S> MapView<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&'a V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.and_then(|map| map.get(key))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<'a, K, V, S> MapView<'a, K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Copies the entries into an owned map.
    pub fn to_map(&self) -> HashMap<K, V> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<'a, K, V, S> Clone for MapView<'a, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V, S> Copy for MapView<'a, K, V, S> {}

impl<'a, K, V, S> Default for MapView<'a, K, V, S> {
    fn default() -> Self {
        MapView { map: None }
    }
}

impl<'a, K, V, S> fmt::Debug for MapView<'a, K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, 'b, K, V, S, T> PartialEq<MapView<'b, K, V, T>> for MapView<'a, K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
    T: BuildHasher,
{
    fn eq(&self, other: &MapView<'b, K, V, T>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).map_or(false, |other| value == other))
    }
}

impl<'a, K, V, S, T> PartialEq<HashMap<K, V, T>> for MapView<'a, K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
    T: BuildHasher,
{
    fn eq(&self, other: &HashMap<K, V, T>) -> bool {
        *self == MapView::new(Some(other))
    }
}

impl<'a, K, V, S> IntoIterator for MapView<'a, K, V, S>
where
    K: 'a,
    V: 'a,
{
    type Item = (&'a K, &'a V);
    type IntoIter = iter::Flatten<option::IntoIter<hash_map::Iter<'a, K, V>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.map(HashMap::iter).into_iter().flatten()
    }
}

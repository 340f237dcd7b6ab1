/// A stored key/value pair together with the hash it was placed under.
///
/// The hash is computed once at insertion. Promotion and every table
/// rebuild reuse it, so user hash code never runs while a table is being
/// reassembled.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub(crate) fn new(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }

    #[inline]
    pub(crate) fn pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    #[inline]
    pub(crate) fn pair_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

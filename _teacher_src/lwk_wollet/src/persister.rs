use crate::Update;

trait Persister {
    /// Return the elements in the same order as they have been inserted
    fn iter(&self) -> impl ExactSizeIterator<Item = &Update>;

    /// Push and persist an update.
    ///
    /// Implementors could decide to override previous element if both previous element and current
    /// has `update.only_tip() == true`
    fn push(&mut self, update: Update);
}

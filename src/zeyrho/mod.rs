pub mod btree;

/// An ordered collection that may hold equal values more than once.
///
/// `remove` takes out a single occurrence per call.
pub trait MultiSet<T: Ord> {
    fn add(&mut self, value: T);
    fn remove(&mut self, value: &T) -> bool;
    fn contains(&self, value: &T) -> bool;
    fn len(&self) -> usize;
    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

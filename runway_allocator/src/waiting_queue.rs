use indexmap::IndexSet;

/// First come, first served backlog of flights circling for a runway.
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    flights: IndexSet<String>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the tail and returns the 1-based position. A flight that is
    /// already queued keeps its place.
    pub(crate) fn enqueue(&mut self, flight_id: impl Into<String>) -> usize {
        let (index, _) = self.flights.insert_full(flight_id.into());
        index + 1
    }

    pub(crate) fn dequeue_front(&mut self) -> Option<String> {
        self.flights.shift_remove_index(0)
    }

    pub(crate) fn remove(&mut self, flight_id: &str) -> bool {
        self.flights.shift_remove(flight_id)
    }

    pub fn front(&self) -> Option<&str> {
        self.flights.first().map(String::as_str)
    }

    pub fn position(&self, flight_id: &str) -> Option<usize> {
        self.flights.get_index_of(flight_id).map(|index| index + 1)
    }

    pub fn contains(&self, flight_id: &str) -> bool {
        self.flights.contains(flight_id)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flights.iter().map(String::as_str)
    }
}

// Two queues are only the same when they would land flights in the same order.
impl PartialEq for WaitingQueue {
    fn eq(&self, other: &Self) -> bool {
        self.flights.iter().eq(other.flights.iter())
    }
}

impl Eq for WaitingQueue {}

impl FromIterator<String> for WaitingQueue {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            flights: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(flights: &[&str]) -> WaitingQueue {
        flights.iter().map(|flight| flight.to_string()).collect()
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = WaitingQueue::new();
        assert_eq!(queue.enqueue("AB1"), 1);
        assert_eq!(queue.enqueue("CD2"), 2);
        assert_eq!(queue.enqueue("EF3"), 3);
        assert_eq!(queue.front(), Some("AB1"));
        assert_eq!(queue.dequeue_front().as_deref(), Some("AB1"));
        assert_eq!(queue.dequeue_front().as_deref(), Some("CD2"));
        assert_eq!(queue.enqueue("GH4"), 2);
        assert_eq!(queue.dequeue_front().as_deref(), Some("EF3"));
        assert_eq!(queue.dequeue_front().as_deref(), Some("GH4"));
        assert_eq!(queue.dequeue_front(), None);
    }

    #[test]
    fn test_no_duplicates() {
        let mut queue = WaitingQueue::new();
        queue.enqueue("AB1");
        queue.enqueue("CD2");
        assert_eq!(queue.enqueue("AB1"), 1);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut queue = queue_of(&["AB1", "CD2", "EF3"]);
        assert!(queue.remove("CD2"));
        assert!(!queue.remove("CD2"));
        assert_eq!(queue.iter().collect::<Vec<_>>(), ["AB1", "EF3"]);
        assert_eq!(queue.position("EF3"), Some(2));
    }

    #[test]
    fn test_equality_follows_landing_order() {
        assert_eq!(queue_of(&["AB1", "CD2"]), queue_of(&["AB1", "CD2"]));
        assert_ne!(queue_of(&["AB1", "CD2"]), queue_of(&["CD2", "AB1"]));
        assert_ne!(queue_of(&["AB1"]), queue_of(&["AB1", "CD2"]));
    }
}

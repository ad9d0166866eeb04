use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks aggregate bytes held across all live shares against a fixed
/// ceiling. Reservation is an atomic check-and-increment, so concurrent
/// uploads can never collectively oversubscribe the cap.
pub struct QuotaTracker {
    used: AtomicU64,
    capacity: u64,
}

impl QuotaTracker {
    pub fn new(capacity: u64) -> Self {
        Self {
            used: AtomicU64::new(0),
            capacity,
        }
    }

    /// Reserve `bytes` if they fit under the ceiling. On failure nothing
    /// changes.
    pub fn try_reserve(&self, bytes: u64) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                match used.checked_add(bytes) {
                    Some(next) if next <= self.capacity => Some(next),
                    _ => None,
                }
            })
            .is_ok()
    }

    /// Release a prior reservation. Floored at zero so a stray double
    /// release cannot wrap the counter.
    pub fn release(&self, bytes: u64) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn reserve_up_to_capacity() {
        let quota = QuotaTracker::new(100);
        assert!(quota.try_reserve(100));
        assert_eq!(quota.used(), 100);
        assert!(!quota.try_reserve(1));
        assert_eq!(quota.used(), 100);
    }

    #[test]
    fn rejection_within_one_byte_of_capacity() {
        let quota = QuotaTracker::new(100);
        assert!(quota.try_reserve(99));
        assert!(!quota.try_reserve(2));
        assert!(quota.try_reserve(1));
        assert_eq!(quota.used(), 100);
    }

    #[test]
    fn failed_reserve_changes_nothing() {
        let quota = QuotaTracker::new(10);
        assert!(!quota.try_reserve(11));
        assert_eq!(quota.used(), 0);
    }

    #[test]
    fn release_floors_at_zero() {
        let quota = QuotaTracker::new(100);
        assert!(quota.try_reserve(10));
        quota.release(50);
        assert_eq!(quota.used(), 0);
    }

    #[test]
    fn overflowing_request_is_rejected() {
        let quota = QuotaTracker::new(u64::MAX);
        assert!(quota.try_reserve(u64::MAX - 1));
        assert!(!quota.try_reserve(u64::MAX));
        assert_eq!(quota.used(), u64::MAX - 1);
    }

    #[test]
    fn concurrent_reservations_never_oversubscribe() {
        let quota = Arc::new(QuotaTracker::new(50));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let quota = Arc::clone(&quota);
            handles.push(thread::spawn(move || {
                let mut granted = 0u64;
                for _ in 0..20 {
                    if quota.try_reserve(1) {
                        granted += 1;
                    }
                }
                granted
            }));
        }
        let total: u64 = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .sum();
        assert_eq!(total, 50);
        assert_eq!(quota.used(), 50);
    }
}

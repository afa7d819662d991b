//! Time helpers and the snowflake id generator.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Id;

/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Custom epoch: 2024-01-01 00:00:00 UTC
const EPOCH_MS: i64 = 1_704_067_200_000;

const TIMESTAMP_BITS: u32 = 41;
const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

const TIMESTAMP_MASK: i64 = (1 << TIMESTAMP_BITS) - 1;
const NODE_MASK: i64 = (1 << NODE_BITS) - 1;

/// Snowflake-style id generator.
///
/// Layout (63 bits, always positive):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 10 bits: node id (distinct per process/host, avoids cross-process collisions)
///   - 12 bits: sequence within one millisecond
///
/// Ids are strictly increasing within one process: the generator keeps the
/// last issued value and never goes below it, so a clock step backwards or a
/// burst of more than 4096 ids in one millisecond degrades into plain
/// increments instead of duplicates. Zero is never returned; it is the
/// "unset" sentinel of [`Id`].
#[derive(Debug)]
pub struct IdGenerator {
    node: i64,
    last: AtomicI64,
}

impl IdGenerator {
    /// Create a generator with an explicit node id (low 10 bits used).
    pub fn new(node_id: u16) -> Self {
        Self {
            node: i64::from(node_id) & NODE_MASK,
            last: AtomicI64::new(0),
        }
    }

    /// Create a generator with a random node id.
    ///
    /// Useful for tools and tests; deployments should configure a fixed,
    /// distinct node id per instance.
    pub fn with_random_node() -> Self {
        use rand::Rng;
        Self::new(rand::thread_rng().gen_range(0..1 << NODE_BITS))
    }

    /// Generate the next id. Never returns the zero sentinel.
    pub fn generate(&self) -> Id {
        loop {
            let ts = (now_millis() - EPOCH_MS) & TIMESTAMP_MASK;
            let candidate = (ts << (NODE_BITS + SEQUENCE_BITS)) | (self.node << SEQUENCE_BITS);
            let prev = self.last.load(Ordering::Acquire);
            let next = if candidate > prev { candidate } else { prev + 1 };
            if self
                .last
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Id::new(next);
            }
        }
    }

    /// The node id embedded in generated values.
    pub fn node_id(&self) -> u16 {
        self.node as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_never_zero() {
        let ids = IdGenerator::new(1);
        for _ in 0..1000 {
            assert!(!ids.generate().is_unset());
        }
    }

    #[test]
    fn generate_is_strictly_increasing() {
        let ids = IdGenerator::new(7);
        let mut prev = ids.generate();
        for _ in 0..10_000 {
            let next = ids.generate();
            assert!(next > prev, "{next} not greater than {prev}");
            prev = next;
        }
    }

    #[test]
    fn node_id_is_embedded() {
        let ids = IdGenerator::new(0x2A5);
        let id = ids.generate().as_i64();
        assert_eq!((id >> SEQUENCE_BITS) & NODE_MASK, 0x2A5);
    }

    #[test]
    fn concurrent_generation_yields_unique_ids() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdGenerator::new(3));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..2000).map(|_| ids.generate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
    }
}

//! Time helpers and the snowflake identifier generator.

use std::sync::atomic::{AtomicI64, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// Custom epoch: 2024-01-01 00:00:00 UTC
const EPOCH_MS: i64 = 1_704_067_200_000;

const NODE_BITS: u8 = 10;
const SEQ_BITS: u8 = 12;

/// Highest valid node id (10 bits).
pub const MAX_NODE_ID: i64 = (1 << NODE_BITS) - 1;

const SEQ_MASK: i64 = (1 << SEQ_BITS) - 1;
const TS_MASK: i64 = 0x1FF_FFFF_FFFF; // 41 bits

/// Node id passed to [`IdGenerator::new`] was outside `1..=1023`.
#[derive(Debug, thiserror::Error)]
#[error("node id {0} out of range (expected 1..={MAX_NODE_ID})")]
pub struct InvalidNodeId(pub i64);

/// Snowflake-style i64 generator for resource IDs.
///
/// Layout (63 bits):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 10 bits: node id (distinct per service process)
///   - 12 bits: per-millisecond sequence (4096 ids per ms per node)
///
/// IDs are strictly increasing within a process and unique across
/// processes given distinct node ids. `generate` is a CAS loop over a
/// single atomic word, safe from any number of tasks without locking.
#[derive(Debug)]
pub struct IdGenerator {
    node: i64,
    /// Packed `(last_timestamp << SEQ_BITS) | sequence`.
    state: AtomicI64,
}

impl IdGenerator {
    /// Create a generator for the given node id.
    ///
    /// Fails when the node id is outside `1..=1023`; the owning process
    /// must not start in that case.
    pub fn new(node_id: i64) -> Result<Self, InvalidNodeId> {
        if !(1..=MAX_NODE_ID).contains(&node_id) {
            return Err(InvalidNodeId(node_id));
        }
        Ok(Self {
            node: node_id,
            state: AtomicI64::new(0),
        })
    }

    /// The node id this generator stamps into every id.
    pub fn node_id(&self) -> i64 {
        self.node
    }

    /// Mint the next id.
    pub fn generate(&self) -> i64 {
        loop {
            let prev = self.state.load(Ordering::Acquire);
            let prev_ts = prev >> SEQ_BITS;
            // Never move backwards if the wall clock regresses.
            let now = ((now_millis() - EPOCH_MS) & TS_MASK).max(prev_ts);

            let next = if now == prev_ts {
                let seq = (prev & SEQ_MASK) + 1;
                if seq > SEQ_MASK {
                    // Sequence exhausted for this millisecond; wait for the clock.
                    std::hint::spin_loop();
                    continue;
                }
                (now << SEQ_BITS) | seq
            } else {
                now << SEQ_BITS
            };

            if self
                .state
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let ts = next >> SEQ_BITS;
                let seq = next & SEQ_MASK;
                return (ts << (NODE_BITS + SEQ_BITS)) | (self.node << SEQ_BITS) | seq;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn rejects_out_of_range_node() {
        assert!(IdGenerator::new(0).is_err());
        assert!(IdGenerator::new(1024).is_err());
        assert!(IdGenerator::new(-5).is_err());
        assert!(IdGenerator::new(1).is_ok());
        assert!(IdGenerator::new(1023).is_ok());
    }

    #[test]
    fn ids_are_monotonic() {
        let generator = IdGenerator::new(1).unwrap();
        let mut last = 0;
        for _ in 0..10_000 {
            let id = generator.generate();
            assert!(id > last, "id {} not greater than {}", id, last);
            last = id;
        }
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let generator = Arc::new(IdGenerator::new(7).unwrap());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let g = generator.clone();
            handles.push(std::thread::spawn(move || {
                (0..2_000).map(|_| g.generate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
    }

    #[test]
    fn node_bits_differ_between_generators() {
        let a = IdGenerator::new(1).unwrap().generate();
        let b = IdGenerator::new(2).unwrap().generate();
        assert_ne!((a >> 12) & 0x3FF, (b >> 12) & 0x3FF);
    }
}

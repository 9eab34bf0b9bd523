//! Property tests for the history buffer.
//!
//! These tests use `proptest` to check the read-after-write and slot
//! collision behaviour for arbitrary ticks and capacities.

use proptest::prelude::*;
use tickback_core::{Tick, TickHistory};
use tickback_rollback_buffer::HistoryBuffer;

const DEFAULT: i64 = i64::MIN;

fn tick() -> impl Strategy<Value = Tick> {
    -1_000i64..1_000_000i64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn get_after_set_returns_value(capacity in 1usize..256, t in tick(), value in any::<i64>()) {
        let mut buffer = HistoryBuffer::new(capacity, DEFAULT, 0);
        buffer.set(value, t);
        prop_assert_eq!(buffer.get(t), value);
    }

    #[test]
    fn colliding_write_restores_default(
        capacity in 1usize..256,
        t1 in tick(),
        laps in 1i64..50,
        forward in any::<bool>(),
    ) {
        let offset = laps * capacity as i64;
        let t2 = if forward { t1 + offset } else { t1 - offset };

        let mut buffer = HistoryBuffer::new(capacity, DEFAULT, 0);
        buffer.set(1, t1);
        buffer.set(2, t2);

        prop_assert_eq!(buffer.get(t1), DEFAULT);
        prop_assert_eq!(buffer.get(t2), 2);
    }

    #[test]
    fn last_capacity_ticks_are_all_retrievable(capacity in 1usize..128, start in tick()) {
        let mut buffer = HistoryBuffer::new(capacity, DEFAULT, start);
        let end = start + 3 * capacity as i64;
        for t in start..end {
            buffer.set(t, t);
        }

        for t in buffer.window_start(end - 1)..end {
            prop_assert_eq!(buffer.get(t), t);
        }
        prop_assert_eq!(buffer.get(buffer.window_start(end - 1) - 1), DEFAULT);
        prop_assert_eq!(buffer.len(), capacity);
    }

    #[test]
    fn untouched_ticks_read_default(t in tick(), default in any::<i64>()) {
        let buffer = HistoryBuffer::new(64, default, 0);
        prop_assert_eq!(buffer.get(t), default);
    }
}

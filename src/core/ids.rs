use chrono::Utc;
use uuid::Uuid;

/// Source of fresh identifiers for transactions, budgets and plans.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;
}

/// Millisecond-timestamp ids, bumped forward when two requests land in the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct TimestampIdGenerator {
    last: i64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_after(&mut self, now_millis: i64) -> i64 {
        let next = if now_millis > self.last {
            now_millis
        } else {
            self.last + 1
        };
        self.last = next;
        next
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&mut self) -> String {
        self.next_after(Utc::now().timestamp_millis()).to_string()
    }
}

/// Random v4 UUID ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` ids for scripted sessions and tests.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ids_never_repeat_within_a_millisecond() {
        let mut ids = TimestampIdGenerator::new();
        assert_eq!(ids.next_after(1_000), 1_000);
        assert_eq!(ids.next_after(1_000), 1_001);
        assert_eq!(ids.next_after(999), 1_002);
        assert_eq!(ids.next_after(5_000), 5_000);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIdGenerator::new("tx");
        assert_eq!(ids.next_id(), "tx-1");
        assert_eq!(ids.next_id(), "tx-2");
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let mut ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}

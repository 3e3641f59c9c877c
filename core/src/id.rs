use larder_proto::{Record, Value};
use serde::{Deserialize, Serialize};

/// Hands out integer record ids for one table.
///
/// Mirrors SQLite `AUTOINCREMENT`: the first id is 1, every assigned id is greater than any integer
/// id the table has ever held, and ids are never reused after a remove or clear. Non-integer ids
/// supplied by callers don't move the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: i64,
}

impl Default for IdAllocator {
    fn default() -> Self { Self { next: 1 } }
}

impl IdAllocator {
    pub fn peek(&self) -> i64 { self.next }

    pub fn allocate(&mut self) -> i64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    /// Records that `id` is in use so it is never handed out.
    pub fn observe(&mut self, id: &Value) {
        if let Some(i) = id.as_i64() {
            if i >= self.next {
                self.next = i.saturating_add(1);
            }
        }
    }

    /// Returns the record as it will be stored: unchanged if it carries an id, otherwise with a
    /// freshly allocated `id` as its first field.
    pub fn assign(&mut self, record: &Record) -> Record {
        match record.id() {
            Some(id) => {
                self.observe(id);
                record.clone()
            }
            None => record.with_id(Value::Integer(self.allocate())),
        }
    }
}

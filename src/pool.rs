use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Pool of tables mapping dictionary indices to the generation that last reported them.
///
/// Each table is used by one search at a time. Generations are unique per search, so a
/// returned table never needs to be cleared.
pub(crate) struct ScratchPool {
    tables: Mutex<Vec<Vec<u64>>>,
    table_len: usize,
    capacity: usize,
}

impl ScratchPool {
    pub(crate) fn new(table_len: usize, capacity: usize) -> Self {
        Self {
            tables: Mutex::new(vec![]),
            table_len,
            capacity,
        }
    }

    /// Borrows a table, allocating a new one if none is idle.
    #[inline]
    pub(crate) fn acquire(&self) -> Scratch<'_> {
        let table = self.tables.lock().pop();
        let table = table.unwrap_or_else(|| {
            tracing::trace!(table_len = self.table_len, "scratch pool miss");
            vec![0; self.table_len]
        });
        Scratch { pool: self, table }
    }

    #[inline]
    fn release(&self, table: Vec<u64>) {
        let mut tables = self.tables.lock();
        if tables.len() < self.capacity {
            tables.push(table);
        }
    }

    /// Returns the number of idle tables.
    #[cfg(test)]
    pub(crate) fn num_idle(&self) -> usize {
        self.tables.lock().len()
    }
}

impl Clone for ScratchPool {
    fn clone(&self) -> Self {
        Self::new(self.table_len, self.capacity)
    }
}

/// Table borrowed from [`ScratchPool`], given back on drop.
pub(crate) struct Scratch<'a> {
    pool: &'a ScratchPool,
    table: Vec<u64>,
}

impl Deref for Scratch<'_> {
    type Target = Vec<u64>;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.table
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        let table = std::mem::take(&mut self.table);
        self.pool.release(table);
    }
}

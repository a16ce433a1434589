//! Limit executor.

/// Limit executor - applies OFFSET and LIMIT to an ordered sequence.
pub struct LimitExecutor {
    offset: usize,
    limit: Option<usize>,
}

impl LimitExecutor {
    /// Creates a new limit executor. `None` means unlimited.
    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self {
            offset: saturating_usize(offset),
            limit: limit.map(saturating_usize),
        }
    }

    /// Keeps the slice `[offset, offset + limit)`, clipped to the input.
    pub fn execute<T>(&self, mut input: Vec<T>) -> Vec<T> {
        let len = input.len();
        let start = self.offset.min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(len),
            None => len,
        };

        input.truncate(end);
        if start > 0 {
            input.drain(..start);
        }
        input
    }
}

fn saturating_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

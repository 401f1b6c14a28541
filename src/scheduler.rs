/// Default number of blocks per chunk.
pub const CHUNK_SIZE: u64 = 1_000_000;

/// Splits `[lowest_cursor, head]` into inclusive `(from, to)` windows of at
/// most `chunk` blocks. The last window always ends at `head`, so a cursor
/// already past the head still yields a single `(head, head)` window.
pub fn windows(lowest_cursor: u64, head: u64, chunk: u64) -> Vec<(u64, u64)> {
    let chunk = chunk.max(1);
    let mut windows = Vec::new();

    let mut from = lowest_cursor.min(head);
    let mut to = from.saturating_add(chunk - 1);
    while to < head {
        windows.push((from, to));
        from = to + 1;
        to = to.saturating_add(chunk);
    }
    windows.push((from, head));

    windows
}

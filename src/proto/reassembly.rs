//! Receiver-side out-of-order holding buffer.

use std::collections::BTreeMap;

/// Holds payloads the receiver got ahead of `recv_base`, keyed by the
/// sequence number (byte offset) they start at, until the missing prefix
/// shows up and they can be released as one contiguous run.
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    entries: BTreeMap<u32, Vec<u8>>,
    size: usize,
    max_size: usize,
}

impl ReassemblyBuffer {
    pub fn new(max_size: usize) -> Self {
        ReassemblyBuffer {
            entries: BTreeMap::new(),
            size: 0,
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// No-op if `seq_no` is already buffered or the buffer is already at
    /// capacity. Note the capacity check is against the size *before* this
    /// push (`size < max_size`, not `size + payload.len() <= max_size`),
    /// preserving the original implementation's small overshoot allowance.
    pub fn push(&mut self, seq_no: u32, payload: Vec<u8>) {
        if self.size >= self.max_size || self.entries.contains_key(&seq_no) {
            return;
        }
        self.size += payload.len();
        self.entries.insert(seq_no, payload);
    }

    /// Releases the maximal contiguous run starting at `seq_no`. Returns
    /// an empty vector if the buffer is empty or doesn't start at
    /// `seq_no`. Panics if `seq_no` is past the buffer's smallest key —
    /// that would mean the caller is about to silently skip buffered
    /// data, which is a caller bug rather than a recoverable condition.
    pub fn pop(&mut self, seq_no: u32) -> Vec<u8> {
        let Some(&smallest) = self.entries.keys().next() else {
            return Vec::new();
        };
        assert!(
            smallest >= seq_no,
            "pop({seq_no}) called past buffered sequence {smallest}"
        );
        if smallest != seq_no {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut expect = seq_no;
        loop {
            let Some(payload) = self.entries.remove(&expect) else {
                break;
            };
            self.size -= payload.len();
            expect = expect.wrapping_add(payload.len() as u32);
            out.extend_from_slice(&payload);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_drains_maximal_contiguous_run() {
        let mut buf = ReassemblyBuffer::new(1024);
        buf.push(4, vec![0; 4]);
        buf.push(8, vec![0; 4]);
        buf.push(12, vec![0; 4]);
        buf.push(20, vec![0; 4]); // gap at 16, not contiguous

        let out = buf.pop(4);
        assert_eq!(out.len(), 12);
        assert_eq!(buf.len(), 4);
        assert_eq!(*buf.entries.keys().next().unwrap(), 20);
    }

    #[test]
    fn pop_on_mismatched_start_returns_empty() {
        let mut buf = ReassemblyBuffer::new(1024);
        buf.push(8, vec![0; 4]);
        assert!(buf.pop(4).is_empty());
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn pop_on_empty_buffer_returns_empty() {
        let mut buf = ReassemblyBuffer::new(1024);
        assert!(buf.pop(0).is_empty());
    }

    #[test]
    fn push_ignores_duplicate_seq_no() {
        let mut buf = ReassemblyBuffer::new(1024);
        buf.push(4, vec![1, 2, 3]);
        buf.push(4, vec![9, 9, 9, 9]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn push_respects_capacity_with_preexisting_overshoot_behavior() {
        let mut buf = ReassemblyBuffer::new(4);
        buf.push(4, vec![0; 4]); // size now == max_size
        buf.push(8, vec![0; 10]); // size(4) < max_size(4) is false -> rejected
        assert_eq!(buf.len(), 4);

        let mut buf = ReassemblyBuffer::new(5);
        buf.push(4, vec![0; 4]); // size(0) < max_size(5) -> accepted, size now 4
        buf.push(8, vec![0; 10]); // size(4) < max_size(5) -> accepted despite overshoot
        assert_eq!(buf.len(), 14);
    }

    #[test]
    #[should_panic]
    fn pop_past_smallest_key_panics() {
        let mut buf = ReassemblyBuffer::new(1024);
        buf.push(8, vec![0; 4]);
        buf.pop(12);
    }
}

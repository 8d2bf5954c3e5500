//! Fixed-width backend status record.
//!
//! # Layout
//! ```text
//! offset 0                                   RECORD_SIZE
//! ┌──────────┬──────────┬─────┬──────────────┐
//! │ slot 0   │ slot 1   │ ... │ slot 127     │   u32 little-endian each
//! └──────────┴──────────┴─────┴──────────────┘
//! ```
//!
//! The width never depends on the configured backend count, so a file written
//! with N backends stays readable after reconfiguring to M backends. There is
//! no header, version or checksum.

use crate::persist::MAX_NUM_BACKENDS;
use crate::registry::{BackendRegistry, BackendStatus};

/// Bytes per status slot.
pub const STATUS_CODE_SIZE: usize = std::mem::size_of::<u32>();

/// Total on-disk size of one record.
pub const RECORD_SIZE: usize = MAX_NUM_BACKENDS * STATUS_CODE_SIZE;

/// One snapshot of per-backend status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    codes: [u32; MAX_NUM_BACKENDS],
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self {
            codes: [0; MAX_NUM_BACKENDS],
        }
    }
}

impl StatusRecord {
    /// An all-zero record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the live status of every configured backend.
    /// Slots past the configured count stay zero.
    pub fn from_registry<R: BackendRegistry + ?Sized>(registry: &R) -> Self {
        let mut record = Self::new();
        let count = registry.num_backends().min(MAX_NUM_BACKENDS);
        for i in 0..count {
            record.set(i, registry.status(i));
        }
        record
    }

    /// Status stored at `index`. Out of range reads as `Unused`.
    pub fn get(&self, index: usize) -> BackendStatus {
        self.codes
            .get(index)
            .map(|&code| BackendStatus::from(code))
            .unwrap_or(BackendStatus::Unused)
    }

    /// Raw code stored at `index`.
    pub fn code(&self, index: usize) -> Option<u32> {
        self.codes.get(index).copied()
    }

    /// Store `status` at `index`. Out of range writes are dropped.
    pub fn set(&mut self, index: usize, status: BackendStatus) {
        if let Some(slot) = self.codes.get_mut(index) {
            *slot = status.code();
        }
    }

    /// Return true if the slot holds the DOWN code.
    pub fn is_down(&self, index: usize) -> bool {
        self.code(index) == Some(BackendStatus::Down.code())
    }

    /// Encode into the on-disk layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        for (chunk, code) in buf.chunks_exact_mut(STATUS_CODE_SIZE).zip(self.codes.iter()) {
            chunk.copy_from_slice(&code.to_le_bytes());
        }
        buf
    }

    /// Decode from the on-disk layout.
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let mut record = Self::new();
        for (code, chunk) in record.codes.iter_mut().zip(buf.chunks_exact(STATUS_CODE_SIZE)) {
            let mut raw = [0u8; STATUS_CODE_SIZE];
            raw.copy_from_slice(chunk);
            *code = u32::from_le_bytes(raw);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BackendPool;

    #[test]
    fn test_record_size() {
        assert_eq!(RECORD_SIZE, 512);
        assert_eq!(StatusRecord::new().to_bytes().len(), RECORD_SIZE);
    }

    #[test]
    fn test_from_registry_zero_fills() {
        let pool = BackendPool::with_count(2).unwrap();
        pool.set_status(0, BackendStatus::Down);

        let record = StatusRecord::from_registry(&pool);
        assert_eq!(record.get(0), BackendStatus::Down);
        assert_eq!(record.get(1), BackendStatus::ConnectWait);
        assert!((2..MAX_NUM_BACKENDS).all(|i| record.code(i) == Some(0)));
    }

    #[test]
    fn test_byte_layout() {
        let mut record = StatusRecord::new();
        record.set(0, BackendStatus::Down);
        record.set(1, BackendStatus::Up);

        let bytes = record.to_bytes();
        assert_eq!(&bytes[..8], &[3, 0, 0, 0, 2, 0, 0, 0]);
        assert!(bytes[8..].iter().all(|&b| b == 0));
        assert_eq!(StatusRecord::from_bytes(&bytes), record);
    }

    #[test]
    fn test_unknown_code_is_not_down() {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0] = 9;
        let record = StatusRecord::from_bytes(&bytes);
        assert_eq!(record.code(0), Some(9));
        assert!(!record.is_down(0));
        assert_eq!(record.get(MAX_NUM_BACKENDS), BackendStatus::Unused);
    }
}

//! Prepared-write buffer
//!
//! Long writes arrive as a run of prepare-write fragments followed by one
//! execute-write decision. Fragments are appended in arrival order into a
//! fixed-capacity buffer; the execute decision either hands the whole buffer
//! back for application or drops it. A fragment that would overflow the buffer
//! poisons the run: the buffered bytes are discarded and nothing from the run
//! is applied, whatever the execute decision turns out to be.
use super::error::{AttError, AttErrorCode, AttResult};
use log::{debug, warn};

/// Fixed-capacity buffer accumulating fragments for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWriteBuffer {
    handle: u16,
    data: Vec<u8>,
    capacity: usize,
}

impl PreparedWriteBuffer {
    /// Allocate an empty buffer for `handle`
    pub fn new(handle: u16, capacity: usize) -> Self {
        Self {
            handle,
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Target attribute handle
    pub fn handle(&self) -> u16 {
        self.handle
    }

    /// Bytes accumulated so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum number of bytes the buffer accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Accumulated bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append a fragment at the current length
    ///
    /// The buffer is left untouched when the fragment does not fit.
    pub fn append(&mut self, value: &[u8]) -> AttResult<()> {
        let new_len = self.data.len() + value.len();
        if new_len > self.capacity {
            return Err(AttError::InvalidAttributeValueLength {
                len: new_len,
                max: self.capacity,
            });
        }

        self.data.extend_from_slice(value);
        Ok(())
    }

    /// Consume the buffer, yielding the target handle and the bytes
    pub fn into_parts(self) -> (u16, Vec<u8>) {
        (self.handle, self.data)
    }
}

/// Prepared-write state of one connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrepareState {
    /// No run in progress
    #[default]
    Idle,
    /// Fragments accepted so far
    Collecting(PreparedWriteBuffer),
    /// The run was rejected; later fragments are refused until execute-write
    Rejected(AttErrorCode),
}

impl PrepareState {
    /// Accept one prepare-write fragment
    ///
    /// On error the run is poisoned and the returned error carries the status
    /// to answer the peer with.
    pub fn prepare(
        &mut self,
        handle: u16,
        offset: u16,
        value: &[u8],
        capacity: usize,
    ) -> AttResult<()> {
        if let PrepareState::Rejected(code) = self {
            return Err(AttError::PreparedWriteRejected(*code));
        }

        let result = self.append(handle, offset, value, capacity);
        if let Err(err) = &result {
            let released = self.buffered_len();
            *self = PrepareState::Rejected(err.to_error_code());
            warn!(
                "Prepared write on handle {} rejected ({}), released {} buffered bytes",
                handle, err, released
            );
        }

        result
    }

    fn append(&mut self, handle: u16, offset: u16, value: &[u8], capacity: usize) -> AttResult<()> {
        if offset as usize > capacity {
            return Err(AttError::InvalidOffset { handle, offset });
        }

        if let PrepareState::Idle = self {
            debug!("Allocating prepared write buffer of {} bytes for handle {}", capacity, handle);
            *self = PrepareState::Collecting(PreparedWriteBuffer::new(handle, capacity));
        }

        let PrepareState::Collecting(buffer) = self else {
            return Err(AttError::PreparedWriteRejected(AttErrorCode::Unlikely));
        };

        if buffer.handle() != handle {
            return Err(AttError::PreparedWriteRejected(AttErrorCode::InvalidHandle));
        }

        if offset as usize != buffer.len() {
            debug!(
                "Prepared write offset {} differs from buffered length {}, appending",
                offset,
                buffer.len()
            );
        }

        buffer.append(value)
    }

    /// Resolve the run on an execute-write decision
    ///
    /// Returns the handle and bytes to apply when `commit` is set and the run
    /// was not rejected. The state is idle afterwards either way.
    pub fn execute(&mut self, commit: bool) -> Option<(u16, Vec<u8>)> {
        match std::mem::take(self) {
            PrepareState::Collecting(buffer) if commit => Some(buffer.into_parts()),
            _ => None,
        }
    }

    /// Drop any run in progress, returning the number of bytes released
    pub fn release(&mut self) -> usize {
        let released = self.buffered_len();
        *self = PrepareState::Idle;
        released
    }

    /// Bytes currently buffered
    pub fn buffered_len(&self) -> usize {
        match self {
            PrepareState::Collecting(buffer) => buffer.len(),
            _ => 0,
        }
    }

    /// Whether no run is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self, PrepareState::Idle)
    }
}

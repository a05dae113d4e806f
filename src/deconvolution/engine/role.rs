//! Ping-pong buffer roles and pass counting.

use std::fmt;

/// One of the two alternating work buffers of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkBuffer {
    A,
    B,
}

impl fmt::Display for WorkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkBuffer::A => f.write_str("work buffer A"),
            WorkBuffer::B => f.write_str("work buffer B"),
        }
    }
}

/// Which work buffer a pass reads from; the other one is written.
///
/// Pass 0 starts at [`BufferRole::ASource`] because buffer A holds the
/// uploaded input. The role toggles exactly once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferRole {
    #[default]
    ASource,
    BSource,
}

impl BufferRole {
    pub fn for_pass(pass: usize) -> Self {
        if pass % 2 == 0 {
            BufferRole::ASource
        } else {
            BufferRole::BSource
        }
    }

    pub fn source(self) -> WorkBuffer {
        match self {
            BufferRole::ASource => WorkBuffer::A,
            BufferRole::BSource => WorkBuffer::B,
        }
    }

    pub fn target(self) -> WorkBuffer {
        match self {
            BufferRole::ASource => WorkBuffer::B,
            BufferRole::BSource => WorkBuffer::A,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            BufferRole::ASource => BufferRole::BSource,
            BufferRole::BSource => BufferRole::ASource,
        }
    }

    /// Buffer holding the authoritative image after `passes` passes.
    pub fn result_after(passes: usize) -> WorkBuffer {
        match passes {
            0 => WorkBuffer::A,
            n => BufferRole::for_pass(n - 1).target(),
        }
    }
}

/// Number of passes to run.
///
/// The requested count is rounded up to an even number so the result always
/// lands back in buffer A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationPlan {
    requested: u32,
    passes: usize,
}

impl IterationPlan {
    pub fn new(requested: u32) -> Self {
        let passes = requested as usize + (requested as usize % 2);
        Self { requested, passes }
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn result_buffer(&self) -> WorkBuffer {
        BufferRole::result_after(self.passes)
    }
}

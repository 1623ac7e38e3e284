//! Format-and-emit: grow-to-fit rendering with a one-shot sink handoff.
//!
//! Two delivery conventions are supported:
//!
//! - [`Convention::Terminated`]: one byte of every buffer is reserved for a
//!   NUL terminator and the sink receives a `&CStr`. A render fits when
//!   `n <= capacity - 1`; a miss retries with `n + 1`.
//! - [`Convention::Sized`]: no terminator; the sink receives the bytes with
//!   their length and the allocated capacity. A render fits when
//!   `n <= capacity`; a miss retries with exactly `n`.
//!
//! The first attempt uses [`EmitConfig::initial_capacity`] (1024 by default).
//! Every attempt re-measures, so the loop has no fixed bound, but with fixed
//! arguments the second attempt always fits.

use core::ffi::CStr;

use crate::buffer::{BufferAlloc, SystemAlloc};
use crate::config::EmitConfig;
use crate::error::{EmitError, EncodingError};
use crate::printf::FormatArg;
use crate::render::render_bounded;

/// How rendered text is handed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// NUL-terminated text only.
    Terminated,
    /// Text plus explicit length and capacity.
    Sized,
}

impl Convention {
    /// Bytes of every buffer not available to rendered text.
    #[must_use]
    pub const fn reserved(self) -> usize {
        match self {
            Self::Terminated => 1,
            Self::Sized => 0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terminated => "terminated",
            Self::Sized => "sized",
        }
    }

    /// Parse `terminated` / `sized` (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "terminated" | "nul" | "cstr" => Some(Self::Terminated),
            "sized" | "len" => Some(Self::Sized),
            _ => None,
        }
    }
}

/// Text handed to a [`SizedSink`], valid only for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    text: &'a [u8],
    capacity: u32,
}

impl<'a> Rendered<'a> {
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text
    }

    /// Rendered length in bytes.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Capacity of the buffer the text was rendered into (`>= len()`).
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Receives NUL-terminated output.
pub trait TerminatedSink {
    fn emit(&mut self, text: &CStr);
}

impl<F: FnMut(&CStr)> TerminatedSink for F {
    fn emit(&mut self, text: &CStr) {
        self(text);
    }
}

/// Receives output together with its length and buffer capacity.
pub trait SizedSink {
    fn emit(&mut self, rendered: Rendered<'_>);
}

impl<F: FnMut(Rendered<'_>)> SizedSink for F {
    fn emit(&mut self, rendered: Rendered<'_>) {
        self(rendered);
    }
}

/// Outcome of a successful call: the sink has been invoked exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emitted {
    /// Rendered length in bytes, terminator excluded.
    pub length: u32,
    /// Capacity of the buffer that was delivered.
    pub capacity: u32,
    /// Render attempts made, including capacity misses.
    pub attempts: u32,
}

/// Collapse a call result into the integer a C caller expects.
///
/// Success yields the rendered length. Allocation failure yields 0 under both
/// conventions. An encoding error yields its negative code under
/// [`Convention::Sized`] and 0 under [`Convention::Terminated`], whose callers
/// only know 0 as a failure signal.
#[must_use]
pub fn status_code(result: &Result<Emitted, EmitError>, convention: Convention) -> i32 {
    match (result, convention) {
        (Ok(emitted), _) => emitted.length as i32,
        (Err(EmitError::AllocationExhausted { .. }), _) => 0,
        (Err(EmitError::Encoding(err)), Convention::Sized) => err.code(),
        (Err(EmitError::Encoding(_)), Convention::Terminated) => 0,
    }
}

/// Renders templates into right-sized buffers and hands them to sinks.
#[derive(Debug)]
pub struct Emitter<A = SystemAlloc> {
    config: EmitConfig,
    alloc: A,
}

impl Emitter<SystemAlloc> {
    /// Emitter using the environment-resolved config and the global allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EmitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: EmitConfig) -> Self {
        Self {
            config,
            alloc: SystemAlloc,
        }
    }
}

impl Default for Emitter<SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: BufferAlloc> Emitter<A> {
    #[must_use]
    pub fn with_alloc(config: EmitConfig, alloc: A) -> Self {
        Self { config, alloc }
    }

    #[must_use]
    pub fn config(&self) -> EmitConfig {
        self.config
    }

    #[must_use]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    pub fn into_alloc(self) -> A {
        self.alloc
    }

    /// Render `template` and deliver it NUL-terminated.
    ///
    /// An interior NUL produced by the template (e.g. `%c` with 0) ends the
    /// string the sink sees, as it would for a C reader; `length` still
    /// counts every rendered byte.
    pub fn emit_terminated<S: TerminatedSink + ?Sized>(
        &mut self,
        sink: &mut S,
        template: &[u8],
        args: &[FormatArg<'_>],
    ) -> Result<Emitted, EmitError> {
        self.grow_to_fit(Convention::Terminated, template, args, |buf, n, _| {
            buf[n] = 0;
            let text = CStr::from_bytes_until_nul(&buf[..=n]).unwrap_or_default();
            sink.emit(text);
        })
    }

    /// Render `template` and deliver it with its length and capacity.
    pub fn emit_sized<S: SizedSink + ?Sized>(
        &mut self,
        sink: &mut S,
        template: &[u8],
        args: &[FormatArg<'_>],
    ) -> Result<Emitted, EmitError> {
        self.grow_to_fit(Convention::Sized, template, args, |buf, n, capacity| {
            sink.emit(Rendered {
                text: &buf[..n],
                capacity,
            });
        })
    }

    fn grow_to_fit(
        &mut self,
        convention: Convention,
        template: &[u8],
        args: &[FormatArg<'_>],
        deliver: impl FnOnce(&mut [u8], usize, u32),
    ) -> Result<Emitted, EmitError> {
        let reserved = convention.reserved();
        let mut capacity = self.config.initial_capacity.max(reserved);
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);
            let mut buffer = self
                .alloc
                .allocate(capacity)
                .map_err(|err| EmitError::AllocationExhausted {
                    capacity: err.capacity,
                })?;

            let writable = capacity - reserved;
            let n = render_bounded(&mut buffer.as_mut_slice()[..writable], template, args)?;

            if n <= writable {
                let length = u32::try_from(n).map_err(|_| EncodingError::Overflow)?;
                let capacity = u32::try_from(capacity).map_err(|_| EncodingError::Overflow)?;
                deliver(buffer.as_mut_slice(), n, capacity);
                return Ok(Emitted {
                    length,
                    capacity,
                    attempts,
                });
            }

            // Capacity miss: release before the next allocation.
            drop(buffer);
            capacity = n + reserved;
        }
    }
}

/// Render and deliver NUL-terminated text with a default [`Emitter`].
pub fn format_and_emit<S: TerminatedSink + ?Sized>(
    sink: &mut S,
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<Emitted, EmitError> {
    Emitter::new().emit_terminated(sink, template, args)
}

/// Render and deliver text, length and capacity with a default [`Emitter`].
pub fn format_and_emit_sized<S: SizedSink + ?Sized>(
    sink: &mut S,
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<Emitted, EmitError> {
    Emitter::new().emit_sized(sink, template, args)
}

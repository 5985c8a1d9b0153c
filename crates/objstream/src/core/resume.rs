use crate::error::Error;

/// Bookkeeping shared across every stream a single buffer opens.
///
/// `position` is where the next stream must start. It only moves forward, by
/// exactly the number of bytes pulled. `resume_count` is never reset, so the
/// budget covers the whole read session rather than one burst of failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeState {
    position:     u64,
    resume_count: u32,
    max_resume:   u32,
}

impl ResumeState {
    pub fn new(start: u64, max_resume: u32) -> Self {
        Self { position: start, resume_count: 0, max_resume }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn resume_count(&self) -> u32 {
        self.resume_count
    }

    pub fn max_resume(&self) -> u32 {
        self.max_resume
    }

    /// Record `len` bytes pulled from the current stream.
    pub fn advance(&mut self, len: usize) {
        self.position += len as u64;
    }

    /// Account for one interruption.
    ///
    /// Returns `Ok(())` when another reopen is allowed. Once the budget is
    /// spent the interruption comes back wrapped in
    /// [`Error::MaxResumeExceeded`] and the count stays at `max_resume`.
    pub fn on_failure<E>(&mut self, err: E) -> Result<(), Error<E>> {
        if self.resume_count >= self.max_resume {
            return Err(Error::MaxResumeExceeded { max_resume: self.max_resume, source: err });
        }
        self.resume_count += 1;
        Ok(())
    }
}

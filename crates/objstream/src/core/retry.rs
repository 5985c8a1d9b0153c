use std::time::Duration;

/// Delay before the given resume attempt, using exponential backoff.
///
/// `attempt` is 1-based: the first resume waits `base`, the second `base * 2`,
/// and so on. Attempt `0` means nothing failed yet and yields no delay.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use objstream::core::resume_delay;
///
/// let base = Duration::from_millis(100);
/// assert_eq!(resume_delay(0, base), Duration::ZERO);
/// assert_eq!(resume_delay(1, base), Duration::from_millis(100));
/// assert_eq!(resume_delay(3, base), Duration::from_millis(400));
/// ```
pub fn resume_delay(attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let multiplier = 2_u32.saturating_pow(attempt - 1);
    base.saturating_mul(multiplier)
}

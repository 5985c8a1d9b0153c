/// `Range` header value requesting everything from `offset` on.
///
/// Offset `0` needs no header: a plain request already starts there.
///
/// # Examples
///
/// ```
/// use objstream::core::range_header;
///
/// assert_eq!(range_header(0), None);
/// assert_eq!(range_header(13).as_deref(), Some("bytes=13-"));
/// ```
pub fn range_header(offset: u64) -> Option<String> {
    (offset > 0).then(|| format!("bytes={offset}-"))
}

/// How a response status relates to the offset that was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    /// The body starts exactly at the requested offset.
    Content,
    /// The offset is at or past the end of the object; nothing left to read.
    Exhausted,
    /// A ranged request was answered with the whole object.
    RangeIgnored,
    Unexpected,
}

/// Classify a response status for a request starting at `offset`.
///
/// A `200` is only acceptable when no range was asked for, otherwise the
/// body would repeat bytes that were already consumed.
pub fn check_range_status(status: u16, offset: u64) -> RangeStatus {
    match status {
        200 if offset == 0 => RangeStatus::Content,
        200 => RangeStatus::RangeIgnored,
        206 => RangeStatus::Content,
        416 if offset > 0 => RangeStatus::Exhausted,
        _ => RangeStatus::Unexpected,
    }
}

/// First byte position of a `Content-Range` value such as `bytes 13-19/20`.
///
/// Unsatisfied ranges (`bytes */20`) and other units have no start.
///
/// # Examples
///
/// ```
/// use objstream::core::content_range_start;
///
/// assert_eq!(content_range_start("bytes 13-19/20"), Some(13));
/// assert_eq!(content_range_start("bytes */20"), None);
/// ```
pub fn content_range_start(value: &str) -> Option<u64> {
    let range = value.trim().strip_prefix("bytes ")?;
    let (span, _size) = range.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    (start <= end).then_some(start)
}

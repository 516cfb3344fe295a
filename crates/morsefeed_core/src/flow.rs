/// Why word emission stopped before the input ran out.
///
/// These are control outcomes, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user asked to end the session.
    Quit,
    /// The user asked to skip to the next linked page.
    NextPage,
    /// The configured word count has been emitted.
    WordLimit,
}

use crate::{PageIndex, Record};

/// Classified outcome of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The table was found; it may legitimately hold zero rows.
    Rows(Vec<Record>),
    /// Access denied or redirected to a login page. Never retried.
    AuthFailure,
    /// 404 or missing table after the retry budget was spent.
    NotFound,
    /// Network or server error after the retry budget was spent.
    TransientFailure,
}

impl FetchResult {
    pub fn is_failure(&self) -> bool {
        !matches!(self, FetchResult::Rows(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A fetch task finished for `page`.
    PageCompleted {
        page: PageIndex,
        result: FetchResult,
    },
    /// A fetch task for `page` died before producing a result.
    TaskFailed { page: PageIndex, reason: String },
    /// Every submitted task has been consumed.
    AllTasksDrained,
}

/// Pure task query engine
///
/// Filtering, ordering, and pagination over an in-memory snapshot of
/// tasks. Kept free of I/O so the rules are trivially testable: filters
/// compose with AND, ordering is deadline-descending with surrogate-key
/// ascending as the tie break, and pagination is 1-based.

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::TaskItem;
use crate::service::dto::TaskQuery;

/// Default page number when the caller leaves it unset
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Default page size when the caller leaves it unset
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number
    pub page_number: u32,

    /// Items per page
    pub page_size: u32,
}

impl PageWindow {
    /// Resolves the caller's pagination parameters, applying defaults
    ///
    /// A page number or page size of zero is a validation error, not a
    /// silent correction.
    pub fn resolve(query: &TaskQuery) -> ServiceResult<Self> {
        let page_number = query.page_number.unwrap_or(DEFAULT_PAGE_NUMBER);
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page_number == 0 {
            return Err(ServiceError::Validation(
                "page_number must be at least 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(ServiceError::Validation(
                "page_size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Number of pages needed to hold `total` items (at least 1)
    pub fn total_pages(&self, total: usize) -> u32 {
        let size = self.page_size as usize;
        (total.div_ceil(size).max(1)) as u32
    }
}

/// Drops tasks not matching every set criterion
///
/// Search matches case-insensitively against the title and, when present,
/// the description.
pub fn filter(tasks: Vec<TaskItem>, query: &TaskQuery) -> Vec<TaskItem> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    tasks
        .into_iter()
        .filter(|task| {
            if let Some(needle) = &needle {
                let in_title = task.title.to_lowercase().contains(needle);
                let in_description = task
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(needle));
                if !in_title && !in_description {
                    return false;
                }
            }
            if let Some(status) = query.status {
                if task.status != status {
                    return false;
                }
            }
            if let Some(priority) = query.priority {
                if task.priority != priority {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Orders tasks by deadline descending, ties by surrogate key ascending
///
/// The tie break keeps the ordering total, so identical queries always
/// paginate identically.
pub fn sort(tasks: &mut [TaskItem]) {
    tasks.sort_by(|a, b| b.deadline.cmp(&a.deadline).then(a.id.cmp(&b.id)));
}

/// Cuts one page out of an ordered snapshot
///
/// Pages past the end are empty, not an error.
pub fn paginate(tasks: Vec<TaskItem>, window: PageWindow) -> Vec<TaskItem> {
    let offset = (window.page_number as usize - 1).saturating_mul(window.page_size as usize);
    tasks
        .into_iter()
        .skip(offset)
        .take(window.page_size as usize)
        .collect()
}

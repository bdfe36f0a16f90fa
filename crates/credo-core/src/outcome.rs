//! Operation outcomes

use crate::error::ServiceError;

/// Successful result of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<T> {
    pub data: T,
    /// Total number of matching records, for listings
    pub total: Option<i64>,
}

impl<T> Completed<T> {
    pub fn new(data: T) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(data: T, total: i64) -> Self {
        Self {
            data,
            total: Some(total),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completed<U> {
        Completed {
            data: f(self.data),
            total: self.total,
        }
    }
}

/// What every operation produces, exactly once
pub type Outcome<T> = Result<Completed<T>, ServiceError>;

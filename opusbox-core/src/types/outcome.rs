use crate::error::StorageError;

/// Per-key result of one unit of work within a batch.
#[derive(Debug)]
pub enum ItemOutcome<T> {
    /// The unit ran to completion and produced a value.
    Succeeded(T),
    /// The unit ran and its store call (or descriptor issuance) failed.
    Failed(StorageError),
    /// The unit observed batch cancellation before its store call and never
    /// performed any work.
    Skipped,
}

impl<T> ItemOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded(_))
    }
}

/// Full per-key outcome list for one batch, in completion order.
///
/// Every submitted key appears exactly once, including keys whose units were
/// preempted by cancellation. Order carries no meaning; correlate by key.
#[derive(Debug)]
pub struct BatchReport<K, T> {
    outcomes: Vec<(K, ItemOutcome<T>)>,
    deadline_hit: bool,
}

impl<K, T> BatchReport<K, T> {
    pub(crate) fn new(outcomes: Vec<(K, ItemOutcome<T>)>, deadline_hit: bool) -> Self {
        Self {
            outcomes,
            deadline_hit,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether the batch deadline fired before every unit reported.
    pub fn deadline_hit(&self) -> bool {
        self.deadline_hit
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_success())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, ItemOutcome<T>)> {
        self.outcomes.iter()
    }

    pub fn into_outcomes(self) -> Vec<(K, ItemOutcome<T>)> {
        self.outcomes
    }

    /// Split the report into its three outcome categories.
    pub fn partition(self) -> BatchPartition<K, T> {
        let mut partition = BatchPartition {
            successes: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
            deadline_hit: self.deadline_hit,
        };

        for (key, outcome) in self.outcomes {
            match outcome {
                ItemOutcome::Succeeded(value) => partition.successes.push((key, value)),
                ItemOutcome::Failed(cause) => partition.failures.push((key, cause)),
                ItemOutcome::Skipped => partition.skipped.push(key),
            }
        }

        partition
    }
}

/// Outcome categories of a finished batch.
#[derive(Debug)]
pub struct BatchPartition<K, T> {
    pub successes: Vec<(K, T)>,
    pub failures: Vec<(K, StorageError)>,
    pub skipped: Vec<K>,
    pub deadline_hit: bool,
}

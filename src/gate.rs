//! The error classification gate
//!
//! An `ErrorGate` holds an immutable, ordered table of suppression rules and
//! turns each undeliverable error into a `Decision`. It has no other state,
//! so one gate can be shared by every thread that completes operations.

use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorCategory, OperationError, UndeliverableError};

/// Outcome of classifying one undeliverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Known-benign: drop it
    Suppress,
    /// Hand the original cause to the fatal-error path
    Propagate,
}

impl Decision {
    pub fn is_suppress(&self) -> bool {
        matches!(self, Decision::Suppress)
    }

    pub fn is_propagate(&self) -> bool {
        matches!(self, Decision::Propagate)
    }
}

/// Custom predicate over an error cause.
pub type RulePredicate = Arc<dyn Fn(&OperationError) -> bool + Send + Sync>;

/// A single suppression rule.
#[derive(Clone)]
pub enum SuppressionRule {
    /// Matches every cause of the given category.
    Category(ErrorCategory),
    /// Matches whatever the predicate accepts.
    Predicate(RulePredicate),
}

impl SuppressionRule {
    pub fn category(category: ErrorCategory) -> Self {
        SuppressionRule::Category(category)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&OperationError) -> bool + Send + Sync + 'static,
    {
        SuppressionRule::Predicate(Arc::new(f))
    }

    pub fn matches(&self, cause: &OperationError) -> bool {
        match self {
            SuppressionRule::Category(category) => cause.category() == *category,
            SuppressionRule::Predicate(f) => f(cause),
        }
    }
}

impl fmt::Debug for SuppressionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressionRule::Category(category) => {
                f.debug_tuple("Category").field(category).finish()
            }
            SuppressionRule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

// Predicates compare by pointer: two rules are the same only if they share
// the closure.
impl PartialEq for SuppressionRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SuppressionRule::Category(a), SuppressionRule::Category(b)) => a == b,
            (SuppressionRule::Predicate(a), SuppressionRule::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Classifies undeliverable errors against a fixed rule table.
///
/// # Example
/// ```
/// use ble_error_gate::{BleError, Decision, ErrorCategory, ErrorGate, OperationError,
///     Origin, UndeliverableError};
///
/// let gate = ErrorGate::builder().suppress(ErrorCategory::Ble).build();
///
/// let late_disconnect = UndeliverableError::new(
///     OperationError::from(BleError::GattError("GATT disconnect".into())),
///     Origin::ble("read"),
/// );
/// assert_eq!(gate.handle(&late_disconnect), Decision::Suppress);
///
/// let bug = UndeliverableError::new(
///     OperationError::NullReference("unrelated bug".into()),
///     Origin::ble("read"),
/// );
/// assert_eq!(gate.handle(&bug), Decision::Propagate);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorGate {
    rules: Arc<[SuppressionRule]>,
}

impl ErrorGate {
    pub fn new(rules: Vec<SuppressionRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn builder() -> ErrorGateBuilder {
        ErrorGateBuilder::default()
    }

    /// The gate installed by the application shell: late BLE failures are
    /// swallowed, everything else propagates.
    pub fn ble_default() -> Self {
        Self::new(vec![SuppressionRule::Category(ErrorCategory::Ble)])
    }

    pub fn rules(&self) -> &[SuppressionRule] {
        &self.rules
    }

    /// Decide what happens to an undeliverable error.
    ///
    /// Rules are tried in registration order; the first match suppresses.
    /// Never logs and never touches the error.
    pub fn handle(&self, error: &UndeliverableError) -> Decision {
        let cause = error.cause();
        if self.rules.iter().any(|rule| rule.matches(cause)) {
            Decision::Suppress
        } else {
            Decision::Propagate
        }
    }
}

/// Builder for `ErrorGate`. Rules keep the order they are added in.
#[derive(Debug, Default)]
pub struct ErrorGateBuilder {
    rules: Vec<SuppressionRule>,
}

impl ErrorGateBuilder {
    pub fn suppress(mut self, category: ErrorCategory) -> Self {
        self.rules.push(SuppressionRule::Category(category));
        self
    }

    pub fn suppress_when<F>(mut self, f: F) -> Self
    where
        F: Fn(&OperationError) -> bool + Send + Sync + 'static,
    {
        self.rules.push(SuppressionRule::predicate(f));
        self
    }

    pub fn rule(mut self, rule: SuppressionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> ErrorGate {
        ErrorGate::new(self.rules)
    }
}

use crate::filters::StrategyKind;

/// Notifications sent to the handler registered on a combinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// A new predicate is about to be pushed to the view
    BeforeChange { predicate: String },
    /// The view accepted the new predicate
    AfterChange { predicate: String },
    StrategyBound { column: String, kind: StrategyKind },
    StrategyUnbound { column: String, kind: StrategyKind },
}

impl FilterEvent {
    pub fn predicate(&self) -> Option<&str> {
        match self {
            FilterEvent::BeforeChange { predicate } | FilterEvent::AfterChange { predicate } => {
                Some(predicate)
            }
            _ => None,
        }
    }
}

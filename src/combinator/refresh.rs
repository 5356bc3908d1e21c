use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::filters::WidgetEvent;

/// When widget edits turn into a new predicate
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Every value change recomputes
    #[default]
    OnInput,
    OnEnter,
    OnLeave,
    OnEnterOrLeave,
    /// Only explicit refreshes recompute
    Off,
}

/// What the combinator does in response to a widget event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    Ignore,
    /// Recompute, skipping the push when the predicate is unchanged
    Recompute,
    /// Recompute and push regardless of the last applied predicate
    ForceRefresh,
}

impl RefreshMode {
    pub fn decide(&self, event: &WidgetEvent) -> RefreshAction {
        match (self, event) {
            (RefreshMode::OnInput, WidgetEvent::ValueChanged(_)) => RefreshAction::Recompute,
            (RefreshMode::OnEnter | RefreshMode::OnEnterOrLeave, WidgetEvent::CommitKey(_)) => {
                RefreshAction::ForceRefresh
            }
            (RefreshMode::OnLeave | RefreshMode::OnEnterOrLeave, WidgetEvent::FocusLost(_)) => {
                RefreshAction::ForceRefresh
            }
            _ => RefreshAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_decisions() {
        let changed = WidgetEvent::ValueChanged(0);
        let enter = WidgetEvent::CommitKey(0);
        let leave = WidgetEvent::FocusLost(0);

        assert_eq!(RefreshMode::OnInput.decide(&changed), RefreshAction::Recompute);
        assert_eq!(RefreshMode::OnInput.decide(&enter), RefreshAction::Ignore);
        assert_eq!(RefreshMode::OnEnter.decide(&enter), RefreshAction::ForceRefresh);
        assert_eq!(RefreshMode::OnEnter.decide(&leave), RefreshAction::Ignore);
        assert_eq!(RefreshMode::OnLeave.decide(&leave), RefreshAction::ForceRefresh);
        assert_eq!(RefreshMode::OnEnterOrLeave.decide(&enter), RefreshAction::ForceRefresh);
        assert_eq!(RefreshMode::OnEnterOrLeave.decide(&leave), RefreshAction::ForceRefresh);
        assert_eq!(RefreshMode::OnEnterOrLeave.decide(&changed), RefreshAction::Ignore);
    }

    #[test]
    fn test_off_never_refreshes() {
        for event in [
            WidgetEvent::ValueChanged(1),
            WidgetEvent::CommitKey(1),
            WidgetEvent::FocusLost(1),
        ] {
            assert_eq!(RefreshMode::Off.decide(&event), RefreshAction::Ignore);
        }
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(RefreshMode::from_str("on_enter_or_leave").unwrap(), RefreshMode::OnEnterOrLeave);
        assert_eq!(RefreshMode::iter().count(), 5);
        assert_eq!(RefreshMode::default().to_string(), "on_input");
    }
}

//! Input widgets backing filter strategies.
//!
//! Each strategy keeps its parameters in a widget, the way a grid keeps a
//! textbox or combo box under a column header. The engine only needs the
//! capability contract in [`FilterWidget`]; [`HeadlessWidget`] implements it
//! without any rendering.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::core::TriState;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a widget instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetHandle(u64);

impl WidgetHandle {
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Selection in an enumerated (combo box) widget
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    NoFilter,
    Null,
    Value(String),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::NoFilter => write!(f, "(*)"),
            Choice::Null => write!(f, "(null)"),
            Choice::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Current contents of a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetValue {
    Empty,
    Text(String),
    /// Operator selector plus one or two operand inputs
    Operands {
        operator: String,
        first: String,
        second: String,
    },
    Check(TriState),
    Choice(Choice),
}

impl WidgetValue {
    pub fn operands(operator: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        WidgetValue::Operands {
            operator: operator.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Notification sent by a widget, carrying the bound column's index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEvent {
    ValueChanged(usize),
    /// Enter pressed inside the widget
    CommitKey(usize),
    FocusLost(usize),
}

impl WidgetEvent {
    pub fn column(&self) -> usize {
        match self {
            WidgetEvent::ValueChanged(c) | WidgetEvent::CommitKey(c) | WidgetEvent::FocusLost(c) => *c,
        }
    }
}

/// Sending half of a widget subscription
#[derive(Debug, Clone)]
pub struct WidgetListener {
    column: usize,
    tx: UnboundedSender<WidgetEvent>,
}

impl WidgetListener {
    pub fn new(column: usize, tx: UnboundedSender<WidgetEvent>) -> Self {
        Self { column, tx }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    fn send(&self, event: WidgetEvent) {
        // The receiver is gone once the combinator is dropped
        if self.tx.send(event).is_err() {
            trace!("Dropped widget event {:?}: receiver closed", event);
        }
    }

    pub fn changed(&self) {
        self.send(WidgetEvent::ValueChanged(self.column));
    }

    pub fn committed(&self) {
        self.send(WidgetEvent::CommitKey(self.column));
    }

    pub fn left(&self) {
        self.send(WidgetEvent::FocusLost(self.column));
    }
}

/// Capability contract for a filter input widget
pub trait FilterWidget: fmt::Debug + Send {
    fn handle(&self) -> WidgetHandle;

    fn value(&self) -> &WidgetValue;

    /// Replace the contents; listeners are notified only when the value actually changes.
    fn set_value(&mut self, value: WidgetValue);

    fn subscribe(&mut self, listener: WidgetListener);

    fn unsubscribe(&mut self);

    fn listener(&self) -> Option<&WidgetListener>;

    /// Release the widget; a disposed widget ignores edits and sends nothing.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    /// The user pressed Enter
    fn commit(&self) {
        if let Some(listener) = self.listener() {
            listener.committed();
        }
    }

    /// The widget lost keyboard focus
    fn leave(&self) {
        if let Some(listener) = self.listener() {
            listener.left();
        }
    }
}

/// In-process widget with no visual representation
#[derive(Debug)]
pub struct HeadlessWidget {
    handle: WidgetHandle,
    value: WidgetValue,
    listener: Option<WidgetListener>,
    disposed: bool,
}

impl HeadlessWidget {
    pub fn new(value: WidgetValue) -> Self {
        Self {
            handle: WidgetHandle::next(),
            value,
            listener: None,
            disposed: false,
        }
    }

    pub fn boxed(value: WidgetValue) -> Box<dyn FilterWidget> {
        Box::new(Self::new(value))
    }
}

impl FilterWidget for HeadlessWidget {
    fn handle(&self) -> WidgetHandle {
        self.handle
    }

    fn value(&self) -> &WidgetValue {
        &self.value
    }

    fn set_value(&mut self, value: WidgetValue) {
        if self.disposed || self.value == value {
            return;
        }
        self.value = value;
        if let Some(listener) = &self.listener {
            listener.changed();
        }
    }

    fn subscribe(&mut self, listener: WidgetListener) {
        if !self.disposed {
            self.listener = Some(listener);
        }
    }

    fn unsubscribe(&mut self) {
        self.listener = None;
    }

    fn listener(&self) -> Option<&WidgetListener> {
        self.listener.as_ref()
    }

    fn dispose(&mut self) {
        self.listener = None;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_set_value_notifies_only_on_change() {
        let (tx, mut rx) = unbounded_channel();
        let mut widget = HeadlessWidget::new(WidgetValue::Text(String::new()));
        widget.subscribe(WidgetListener::new(3, tx));

        widget.set_value(WidgetValue::Text("smi".to_string()));
        widget.set_value(WidgetValue::Text("smi".to_string()));
        assert_eq!(rx.try_recv().unwrap(), WidgetEvent::ValueChanged(3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_commit_and_leave_events() {
        let (tx, mut rx) = unbounded_channel();
        let mut widget = HeadlessWidget::new(WidgetValue::Empty);
        widget.subscribe(WidgetListener::new(1, tx));
        widget.commit();
        widget.leave();
        assert_eq!(rx.try_recv().unwrap(), WidgetEvent::CommitKey(1));
        assert_eq!(rx.try_recv().unwrap(), WidgetEvent::FocusLost(1));
    }

    #[test]
    fn test_disposed_widget_is_silent() {
        let (tx, mut rx) = unbounded_channel();
        let mut widget = HeadlessWidget::new(WidgetValue::Check(TriState::Unset));
        widget.subscribe(WidgetListener::new(0, tx));
        widget.dispose();
        widget.set_value(WidgetValue::Check(TriState::True));
        widget.commit();
        assert!(widget.is_disposed());
        assert_eq!(widget.value(), &WidgetValue::Check(TriState::Unset));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handles_are_unique() {
        let a = HeadlessWidget::new(WidgetValue::Empty);
        let b = HeadlessWidget::new(WidgetValue::Empty);
        assert_ne!(a.handle(), b.handle());
        assert_eq!(Choice::NoFilter.to_string(), "(*)");
        assert_eq!(Choice::Null.to_string(), "(null)");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use crate::predicate::literal;

/// Logical identity of the table a view is bound to
///
/// Base filters and remembered column filters are keyed by this value, so two
/// views over the same logical table share them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(String);

impl TableId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Table identity cannot be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for TableId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of values a column holds; decides which filter strategy it gets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Number,
    Date,
    Boolean,
    Enumerable,
}

/// Column metadata as published by the grid or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub display_name: String,
    pub kind: ValueKind,
    pub visible: bool,
    pub display_index: usize,
    pub width: u16,
}

impl ColumnDescriptor {
    /// Create a visible column whose display name equals its name
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            kind,
            visible: true,
            display_index: 0,
            width: 100,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_display_index(mut self, display_index: usize) -> Self {
        self.display_index = display_index;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// The bracketed reference used inside predicates, e.g. `[sender]`
    pub fn column_ref(&self) -> String {
        literal::column_ref(&self.name)
    }
}

/// Operator used to join predicate fragments
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    #[strum(serialize = "and", to_string = "AND")]
    And,
    #[strum(serialize = "or", to_string = "OR")]
    Or,
}

impl LogicalOperator {
    /// Keyword surrounded by spaces, ready to be placed between two operands
    pub fn joiner(&self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Three-valued check state: unset means "no filter"
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::True => Some(true),
            Self::False => Some(false),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

/// Binary comparison operator of the predicate grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
pub enum CompareOp {
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<>")]
    Ne,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Whether an ordering between two operands satisfies this operator
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Self::Eq => ordering == Equal,
            Self::Ne => ordering != Equal,
            Self::Lt => ordering == Less,
            Self::Le => ordering != Greater,
            Self::Gt => ordering == Greater,
            Self::Ge => ordering != Less,
        }
    }
}

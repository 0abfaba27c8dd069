use thiserror::Error;

use crate::inst::Label;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    #[error("label `{0}` is defined more than once")]
    DuplicateLabel(Label),
    #[error("jump to undefined label(s): {}", .0.join(", "))]
    UnresolvedLabels(Vec<Label>),
}

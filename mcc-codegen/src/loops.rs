//! Loop context stack
//!
//! Each enclosing loop contributes a pair of jump targets. `break` and
//! `continue` only ever look at the innermost pair and allocate its label the
//! first time it is needed, so a loop that is never broken out of never
//! emits a break label.

use log::trace;
use mcc_common::{CompilerError, LabelGenerator, SourceLocation};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    #[error("{0} statement not within a loop")]
    NotInLoop(&'static str),

    #[error("loop stack underflow")]
    Underflow,
}

impl LoopError {
    pub fn at(self, location: &SourceLocation) -> CompilerError {
        match self {
            LoopError::NotInLoop(_) => CompilerError::codegen_error(self.to_string(), location.clone()),
            LoopError::Underflow => CompilerError::internal_error(self.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopContext {
    pub continue_label: Option<String>,
    pub break_label: Option<String>,
}

impl LoopContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose targets are already known
    pub fn with_labels(continue_label: Option<String>, break_label: Option<String>) -> Self {
        Self {
            continue_label,
            break_label,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopStack {
    contexts: Vec<LoopContext>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, context: LoopContext) {
        self.contexts.push(context);
    }

    pub fn pop(&mut self) -> Result<LoopContext, LoopError> {
        self.contexts.pop().ok_or(LoopError::Underflow)
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Current loop's exit label, allocated on first use
    pub fn break_label(&mut self, labels: &mut LabelGenerator) -> Result<String, LoopError> {
        let context = self.contexts.last_mut().ok_or(LoopError::NotInLoop("break"))?;
        Ok(context
            .break_label
            .get_or_insert_with(|| {
                let label = labels.new_label();
                trace!("break target {label}");
                label
            })
            .clone())
    }

    /// Current loop's continue target, allocated on first use
    pub fn continue_label(&mut self, labels: &mut LabelGenerator) -> Result<String, LoopError> {
        let context = self.contexts.last_mut().ok_or(LoopError::NotInLoop("continue"))?;
        Ok(context
            .continue_label
            .get_or_insert_with(|| {
                let label = labels.new_label();
                trace!("continue target {label}");
                label
            })
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labels_are_lazy_and_stable() {
        let mut labels = LabelGenerator::new();
        let mut loops = LoopStack::new();
        loops.push(LoopContext::new());

        assert_eq!(loops.break_label(&mut labels), Ok(".L0".to_string()));
        assert_eq!(loops.break_label(&mut labels), Ok(".L0".to_string()));
        assert_eq!(loops.continue_label(&mut labels), Ok(".L1".to_string()));

        let context = loops.pop().unwrap();
        assert_eq!(context.break_label.as_deref(), Some(".L0"));
        assert_eq!(labels.allocated(), 2);
    }

    #[test]
    fn test_inner_loop_has_its_own_targets() {
        let mut labels = LabelGenerator::new();
        let mut loops = LoopStack::new();
        loops.push(LoopContext::with_labels(Some(".Lcond".to_string()), None));
        loops.push(LoopContext::new());
        assert_eq!(loops.depth(), 2);

        let inner = loops.break_label(&mut labels).unwrap();
        loops.pop().unwrap();
        let outer = loops.pop().unwrap();
        assert_eq!(loops.depth(), 0);

        assert_eq!(inner, ".L0");
        assert_eq!(outer.break_label, None);
        assert_eq!(outer.continue_label.as_deref(), Some(".Lcond"));
    }

    #[test]
    fn test_outside_any_loop() {
        let mut labels = LabelGenerator::new();
        let mut loops = LoopStack::new();

        let err = loops.break_label(&mut labels).unwrap_err();
        assert_eq!(
            err.at(&SourceLocation::new("l.c", 2, 5)).to_string(),
            "l.c:2:5: error: break statement not within a loop"
        );
        assert_eq!(
            loops.continue_label(&mut labels),
            Err(LoopError::NotInLoop("continue"))
        );
        assert_eq!(loops.pop(), Err(LoopError::Underflow));
        assert!(LoopError::Underflow.at(&SourceLocation::dummy()).is_internal());
    }
}

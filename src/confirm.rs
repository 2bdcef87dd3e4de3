//! "Type the name to confirm" gate for destructive actions.
//!
//! Reused wherever an irreversible action needs an explicit confirmation
//! step; team deletion is the current caller. The server re-validates the
//! action regardless.

/// Gate state for one confirmation dialog.
#[derive(Debug, Clone)]
pub struct ConfirmDeletionGate {
    item_name: String,
    typed: String,
    pending: bool,
}

impl ConfirmDeletionGate {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            typed: String::new(),
            pending: false,
        }
    }

    /// Updates the confirmation field.
    pub fn type_input(&mut self, text: &str) {
        text.clone_into(&mut self.typed);
    }

    /// Exact equality with the target name: case-sensitive, no trimming.
    pub fn is_satisfied(&self) -> bool {
        self.typed == self.item_name
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.is_satisfied() && !self.pending
    }

    /// Marks the underlying action as in flight. Returns `false` (and does
    /// nothing) when submission is currently blocked.
    pub fn begin(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.pending = true;
        true
    }

    /// Clears the in-flight flag once the action resolved.
    pub fn finish(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }
}

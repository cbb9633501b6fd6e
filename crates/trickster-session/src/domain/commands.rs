//! Commands for the session context.

use trickster_core::command::Command;
use uuid::Uuid;

/// Command to submit one player utterance.
#[derive(Debug, Clone)]
pub struct SubmitUtterance {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The raw utterance; surrounding whitespace is ignored.
    pub text: String,
}

impl Command for SubmitUtterance {
    fn command_type(&self) -> &'static str {
        "session.submit_utterance"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to select or deselect a palette keyword.
#[derive(Debug, Clone)]
pub struct ToggleKeyword {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The keyword to toggle.
    pub token: String,
}

impl Command for ToggleKeyword {
    fn command_type(&self) -> &'static str {
        "session.toggle_keyword"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pay for a fresh palette.
#[derive(Debug, Clone)]
pub struct RerollPalette {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for RerollPalette {
    fn command_type(&self) -> &'static str {
        "session.reroll_palette"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to ask the draft assistant for a suggested line.
#[derive(Debug, Clone)]
pub struct RequestDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for RequestDraft {
    fn command_type(&self) -> &'static str {
        "session.request_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

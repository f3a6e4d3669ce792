// Confirmation port.
//
// Purpose
// - Every destructive request (project, task, image, assignment and user deletion) is gated by
//   an explicit yes from the person driving the session. The session asks; adapters answer.

pub mod terminal;

/// Answers a yes/no question about a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way. Used for `--yes` and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "confirmation answered without asking");
        self.0
    }
}

//! Plain-text rendering of the list for sharing

use crate::database::Task;

/// One `- Title` line per task, with ` (xN)` when more than one is needed.
/// Returns `None` for an empty list, which has nothing worth sharing.
pub fn format_share_text(tasks: &[Task]) -> Option<String> {
    if tasks.is_empty() {
        return None;
    }

    let lines: Vec<String> = tasks
        .iter()
        .map(|task| {
            if task.quantity > 1 {
                format!("- {} (x{})", task.title, task.quantity)
            } else {
                format!("- {}", task.title)
            }
        })
        .collect();

    Some(lines.join("\n"))
}

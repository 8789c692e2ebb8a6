//! Most-frequent titles over a task snapshot

use crate::database::Task;
use crate::services::titles::{capitalize_words, normalize_key};
use std::collections::HashMap;

/// Up to `n` display titles ranked by how often their normalized form
/// appears in `tasks`. Equal counts keep the order in which each title was
/// first seen.
pub fn top_frequent(tasks: &[Task], n: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for task in tasks {
        let key = normalize_key(&task.title);
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(n)
        .map(|(key, _)| capitalize_words(&key))
        .collect()
}

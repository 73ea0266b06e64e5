//! Plain-text outline of a scalar, one branch per level.

use crate::models::{ScalarCollection, ScalarLevel};

/// Render every level with its entries in display order.
///
/// Example output:
/// ```text
/// CLO (2)
/// ├── 1: Identify security threats
/// └── 2: Analyze network traffic
/// Topic (1)
/// └── 1.1: Firewalls (under 1)
/// ```
///
/// Empty levels are omitted unless `include_empty` is set.
pub fn render_outline(collection: &ScalarCollection, include_empty: bool) -> String {
    let mut output = String::new();
    for level in ScalarLevel::ALL {
        let entries = collection.get_by_level(level);
        if entries.is_empty() && !include_empty {
            continue;
        }

        output.push_str(&format!("{} ({})\n", level, entries.len()));
        for (i, entry) in entries.iter().enumerate() {
            let branch = if i == entries.len() - 1 {
                "└── "
            } else {
                "├── "
            };
            output.push_str(branch);
            output.push_str(&entry.to_string());
            if let Some(parent) = &entry.parent_serial {
                output.push_str(&format!(" (under {})", parent));
            }
            output.push('\n');
        }
    }
    output
}

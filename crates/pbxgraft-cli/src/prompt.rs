//! Interactive confirmation before a write.

use std::io::{self, BufRead, Write};

use pbxgraft_store::{Confirm, Preview};

/// Asks on stderr, reads the answer from stdin. End of input means no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, preview: &Preview<'_>) -> bool {
        let mut err = io::stderr();
        let _ = writeln!(
            err,
            "About to add target {} ({} new objects, {} existing objects updated) to {}.",
            preview.created.name,
            preview.created.node_count,
            preview.patches.len(),
            preview.location
        );
        let _ = writeln!(err, "This rewrites the project file. Commit or back it up first (--backup).");
        let _ = write!(err, "Continue? (yes/no): ");
        let _ = err.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

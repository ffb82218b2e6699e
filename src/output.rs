//! Console output and styling.
//!
//! Everything the organizer echoes to the terminal goes through
//! [`OutputFormatter`]. The activity log is always written; these helpers only
//! decide how the console copy looks.

use colored::*;
use std::collections::HashMap;

/// Prefix for console lines produced in dry-run mode.
pub const DRY_RUN_PREFIX: &str = "[DRY RUN] ";

/// Console echo with consistent styling.
///
/// - Progress lines (plain, or yellow with a `[DRY RUN]` prefix)
/// - Per-file outcomes (green on stdout, red on stderr)
/// - Fatal errors on stderr (red with ✗)
/// - A summary table of files organized per destination
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a progress line, in yellow when it belongs to a dry run.
    ///
    /// The line is printed as given; see [`dry_run_line`](Self::dry_run_line)
    /// for the marker.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidywatch::output::OutputFormatter;
    /// let line = OutputFormatter::dry_run_line("Performing initial scan...");
    /// OutputFormatter::progress(&line, true);
    /// ```
    pub fn progress(line: &str, dry_run: bool) {
        if dry_run {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }

    /// Prints the outcome of a completed move in green.
    pub fn success(message: &str) {
        println!("{}", message.green());
    }

    /// Prints a per-file failure to stderr in red.
    pub fn failure(message: &str) {
        eprintln!("{}", message.red());
    }

    /// Prints an error message to stderr in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Formats a message the way dry-run progress lines are shown.
    pub fn dry_run_line(message: &str) -> String {
        format!("{}{}", DRY_RUN_PREFIX, message)
    }

    /// Prints a summary table of files organized per destination folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidywatch::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("docs".to_string(), 15);
    /// counts.insert("images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 2, 1);
    /// ```
    pub fn summary_table(folder_counts: &HashMap<String, usize>, skipped: usize, failed: usize) {
        Self::header("SUMMARY");

        let mut folders: Vec<_> = folder_counts.iter().collect();
        folders.sort_by_key(|&(name, _)| name);

        let width = folders
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Destination".len());

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (folder, count) in &folders {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(**count),
                width = width
            );
        }

        let total: usize = folder_counts.values().sum();
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            file_word(total),
            width = width
        );

        if skipped > 0 {
            println!(
                "{:<width$} | {} {}",
                "Skipped",
                skipped.to_string().yellow(),
                file_word(skipped),
                width = width
            );
        }
        if failed > 0 {
            println!(
                "{:<width$} | {} {}",
                "Failed",
                failed.to_string().red(),
                file_word(failed),
                width = width
            );
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_line_prefix() {
        assert_eq!(
            OutputFormatter::dry_run_line("Initial scan complete."),
            "[DRY RUN] Initial scan complete."
        );
    }

    #[test]
    fn test_file_word() {
        assert_eq!(file_word(0), "files");
        assert_eq!(file_word(1), "file");
        assert_eq!(file_word(2), "files");
    }
}

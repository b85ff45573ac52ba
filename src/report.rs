/*!
 * Reporting functionality for local-gitingest
 *
 * Provides functionality for generating formatted reports of scan results
 * using the tabled library for clean, consistent table rendering.
 */

use std::collections::HashMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::scanner::ScannerStatistics;
use crate::utils::format_file_size;

/// Number of files listed when the snapshot has many files
const TOP_FILES: usize = 10;

/// Information about a captured file in the report
#[derive(Debug, Clone, Default)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Size of the captured content in bytes
    pub bytes: u64,
}

/// Statistics for a completed snapshot
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of files captured
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of captured bytes
    pub total_bytes: u64,
    /// Files excluded by extension
    pub skipped_by_extension: usize,
    /// Files excluded by the size ceiling
    pub skipped_by_size: usize,
    /// Entries skipped as unreadable
    pub skipped_unreadable: usize,
    /// Directories pruned
    pub dirs_pruned: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
}

impl ScanReport {
    /// Build a report from scanner statistics
    pub fn from_statistics(
        output_file: impl Into<String>,
        duration: Duration,
        stats: &ScannerStatistics,
    ) -> Self {
        Self {
            output_file: output_file.into(),
            duration,
            files_processed: stats.files_processed,
            total_lines: stats.total_lines,
            total_bytes: stats.total_bytes,
            skipped_by_extension: stats.skipped_by_extension,
            skipped_by_size: stats.skipped_by_size,
            skipped_unreadable: stats.skipped_unreadable,
            dirs_pruned: stats.dirs_pruned,
            file_details: stats.file_details.clone(),
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for scan results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string based on scan statistics
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    // Truncate long paths, keeping the trailing segments
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.len() <= max_len {
            return path.to_string();
        }

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() <= 2 {
            let start = path.len().saturating_sub(max_len - 3);
            let start = (start..path.len())
                .find(|&i| path.is_char_boundary(i))
                .unwrap_or(path.len());
            return format!("...{}", &path[start..]);
        }

        let mut current_len = 3; // "..."
        let mut segments = Vec::new();
        for part in parts.iter().rev() {
            let part_len = part.len() + 1;
            if current_len + part_len <= max_len {
                segments.push(*part);
                current_len += part_len;
            } else {
                break;
            }
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let row = |key: &str, value: String| SummaryRow {
            key: key.to_string(),
            value,
        };

        let mut rows = vec![
            row("📂 Output File", report.output_file.clone()),
            row("⏱️ Process Time", format!("{:.4?}", report.duration)),
            row("📄 Files Captured", self.format_number(report.files_processed)),
            row("📝 Total Lines", self.format_number(report.total_lines)),
            row("💾 Total Size", format_file_size(report.total_bytes)),
            row(
                "📦 LLM Tokens",
                format!(
                    "{} tokens (estimated)",
                    self.format_number((report.total_bytes / 4) as usize)
                ),
            ),
            row(
                "🚫 Excluded by Extension",
                self.format_number(report.skipped_by_extension),
            ),
            row("📏 Excluded by Size", self.format_number(report.skipped_by_size)),
            row("✂️ Directories Pruned", self.format_number(report.dirs_pruned)),
        ];

        if report.skipped_unreadable > 0 {
            rows.push(row(
                "⚠️ Unreadable (skipped)",
                self.format_number(report.skipped_unreadable),
            ));
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Size")]
            size: String,
        }

        // Largest first, ties broken by path for stable output
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(pa, a), (pb, b)| b.bytes.cmp(&a.bytes).then_with(|| pa.cmp(pb)));

        let files_to_show = if files.len() > TOP_FILES + 5 {
            &files[..TOP_FILES]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                lines: self.format_number(info.lines),
                size: format_file_size(info.bytes),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = "✅  SNAPSHOT COMPLETE";
        let files_title = if report.file_details.len() > TOP_FILES + 5 {
            "📋  TOP 10 LARGEST FILES"
        } else {
            "📋  CAPTURED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(file_count: usize) -> ScanReport {
        let mut stats = ScannerStatistics::default();
        for i in 0..file_count {
            stats.file_details.insert(
                format!("src/file{:02}.rs", i),
                FileReportInfo {
                    lines: i + 1,
                    bytes: (i as u64 + 1) * 100,
                },
            );
            stats.files_processed += 1;
            stats.total_bytes += (i as u64 + 1) * 100;
        }
        stats.skipped_by_size = 2;
        ScanReport::from_statistics("output.txt", Duration::from_millis(12), &stats)
    }

    #[test]
    fn test_report_lists_all_files_when_few() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        let text = reporter.generate_report(&sample_report(3));

        assert!(text.contains("CAPTURED FILES"));
        assert!(text.contains("src/file00.rs"));
        assert!(text.contains("src/file02.rs"));
        assert!(text.contains("output.txt"));
        assert!(text.contains("Excluded by Size"));
        assert!(!text.contains("Unreadable"));
    }

    #[test]
    fn test_report_limits_to_largest_files() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        let text = reporter.generate_report(&sample_report(20));

        assert!(text.contains("TOP 10 LARGEST FILES"));
        assert!(text.contains("src/file19.rs"));
        assert!(text.contains("src/file10.rs"));
        assert!(!text.contains("src/file09.rs"));
    }

    #[test]
    fn test_format_path_truncation() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_path("src/lib.rs", 60), "src/lib.rs");

        let long = "very/long/directory/structure/that/keeps/going/and/going/until/main.rs";
        let short = reporter.format_path(long, 30);
        assert!(short.starts_with("..."));
        assert!(short.ends_with("/main.rs"));
        assert!(short.len() <= 30);
    }

    #[test]
    fn test_format_number() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_number(999), "999");
        assert_eq!(reporter.format_number(1_500), "1.5K");
        assert_eq!(reporter.format_number(2_000_000), "2.0M");
    }
}

//! Plain-text rendering of crawl results

use crate::crawler::CrawlReport;
use std::fmt::Write;

/// Share of finished pages that were fetched without error, in percent
pub fn success_rate(report: &CrawlReport) -> f64 {
    if report.finished == 0 {
        return 0.0;
    }
    let fetched = report.finished.saturating_sub(report.fetch_failures);
    (fetched as f64 / report.finished as f64) * 100.0
}

/// Renders the end-of-run summary
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  Root: {}", report.root);
    let _ = writeln!(out, "  Workers: {}", report.workers);
    let _ = writeln!(
        out,
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "  Finished: {}",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Discovered: {}", report.discovered);
    let _ = writeln!(out, "  Finished: {}", report.finished);
    let _ = writeln!(out, "  Links enqueued: {}", report.links_enqueued);
    let _ = writeln!(out, "  Ledger entries: {}", report.ledger_entries);
    let _ = writeln!(out);

    let _ = writeln!(out, "Failures:");
    let _ = writeln!(out, "  Fetch failures: {}", report.fetch_failures);
    let _ = writeln!(out, "  Ledger failures: {}", report.store_failures);
    let _ = writeln!(out, "  Skipped links: {}", report.skipped_links);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate(report),
        report.finished.saturating_sub(report.fetch_failures),
        report.finished
    );
    if !report.is_balanced() {
        let _ = writeln!(
            out,
            "Warning: {} discovered pages were not processed",
            report.discovered.saturating_sub(report.finished)
        );
    }

    out
}

/// Prints the end-of-run summary to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Renders the ledger contents, one identifier per line
pub fn format_ledger(sites: &[String]) -> String {
    let mut out = format!("=== Ledger ({} entries) ===\n", sites.len());
    for site in sites {
        out.push_str("  - ");
        out.push_str(site);
        out.push('\n');
    }
    out
}

/// Prints the ledger contents to stdout
pub fn print_ledger(sites: &[String]) {
    print!("{}", format_ledger(sites));
}

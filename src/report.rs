//! Aggregation and reporting boundary.
//!
//! Folds per-IP scan results into the monitoring status line, performance
//! data, exit-code mapping, and the optional CSV report.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::models::IpScanResult;
use crate::run::CheckReport;

/// Monitoring severity in the conventional plugin order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl CheckStatus {
    /// Conventional monitoring exit code (0/1/2/3).
    pub fn exit_code(self) -> i32 {
        match self {
            CheckStatus::Ok => 0,
            CheckStatus::Warning => 1,
            CheckStatus::Critical => 2,
            CheckStatus::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Critical => "CRITICAL",
            CheckStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Maps the aggregate listed-server count onto the configured thresholds.
///
/// Critical wins over warning when both thresholds are crossed. Thresholds
/// compare against the total listed-server count, the same quantity the
/// status line reports.
pub fn evaluate_status(servers_listed: usize, warning: usize, critical: usize) -> CheckStatus {
    if servers_listed >= critical {
        CheckStatus::Critical
    } else if servers_listed >= warning {
        CheckStatus::Warning
    } else {
        CheckStatus::Ok
    }
}

/// Builds the human-readable part of the status line.
pub fn summary(report: &CheckReport) -> String {
    let mut parts = Vec::new();

    if report.totals.servers_listed == 0 {
        parts.push(format!(
            "{} not listed on {} server{}",
            report.target,
            report.servers_checked,
            if report.servers_checked == 1 { "" } else { "s" }
        ));
    } else {
        for result in &report.results {
            if !result.listed.is_empty() {
                parts.push(format!(
                    "{} listed on {}",
                    result.ip,
                    result.listed.iter().cloned().collect::<Vec<_>>().join(", ")
                ));
            }
        }
    }

    if report.totals.timeouts > 0 {
        parts.push(format!(
            "{} quer{} timed out",
            report.totals.timeouts,
            if report.totals.timeouts == 1 { "y" } else { "ies" }
        ));
    }

    parts.join("; ")
}

/// Builds the performance-data suffix of the status line.
pub fn perf_data(report: &CheckReport) -> String {
    format!(
        "hosts={} servers={} time={:.2}s",
        report.totals.hosts_listed, report.totals.servers_listed, report.elapsed_seconds
    )
}

/// Writes one CSV row per scanned IP (`ip,listed,timed_out`, server lists
/// `;`-joined) to the given path, or to stdout when no path is given.
pub fn export_csv(results: &[IpScanResult], output: Option<&Path>) -> Result<usize> {
    let mut writer: Writer<Box<dyn Write>> = if let Some(path) = output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Writer::from_writer(Box::new(file) as Box<dyn Write>)
    } else {
        Writer::from_writer(Box::new(io::stdout()) as Box<dyn Write>)
    };

    writer.write_record(["ip", "listed", "timed_out"])?;
    for result in results {
        let listed = result.listed.iter().cloned().collect::<Vec<_>>().join(";");
        let timed_out = result
            .timed_out
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([result.ip.as_str(), listed.as_str(), timed_out.as_str()])?;
    }
    writer.flush().context("Failed to flush CSV output")?;

    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AggregateResult;

    fn report_with(listed: &[(&str, &[&str])], timeouts: usize) -> CheckReport {
        let mut results = Vec::new();
        let mut totals = AggregateResult::default();
        for (ip, servers) in listed {
            let mut r = IpScanResult::new(ip.to_string());
            for s in *servers {
                r.listed.insert(s.to_string());
            }
            totals.absorb(&r);
            results.push(r);
        }
        totals.timeouts = timeouts;
        CheckReport {
            target: "192.0.2.10".to_string(),
            servers_checked: 3,
            results,
            totals,
            elapsed_seconds: 0.5,
        }
    }

    #[test]
    fn thresholds_map_to_severity() {
        assert_eq!(evaluate_status(0, 1, 2), CheckStatus::Ok);
        assert_eq!(evaluate_status(1, 1, 2), CheckStatus::Warning);
        assert_eq!(evaluate_status(2, 1, 2), CheckStatus::Critical);
        // Critical wins when both thresholds coincide.
        assert_eq!(evaluate_status(1, 1, 1), CheckStatus::Critical);
    }

    #[test]
    fn exit_codes_follow_plugin_convention() {
        assert_eq!(CheckStatus::Ok.exit_code(), 0);
        assert_eq!(CheckStatus::Warning.exit_code(), 1);
        assert_eq!(CheckStatus::Critical.exit_code(), 2);
        assert_eq!(CheckStatus::Unknown.exit_code(), 3);
    }

    #[test]
    fn clean_summary_names_the_target() {
        let report = report_with(&[("192.0.2.10", &[])], 0);
        assert_eq!(summary(&report), "192.0.2.10 not listed on 3 servers");
    }

    #[test]
    fn listed_summary_names_hosts_and_servers() {
        let report = report_with(&[("192.0.2.10", &["bl.example.org"])], 1);
        let line = summary(&report);
        assert!(line.contains("192.0.2.10 listed on bl.example.org"));
        assert!(line.contains("1 query timed out"));
    }

    #[test]
    fn perf_data_carries_the_counts() {
        let report = report_with(&[("192.0.2.10", &["bl.example.org"])], 0);
        assert_eq!(perf_data(&report), "hosts=1 servers=1 time=0.50s");
    }
}

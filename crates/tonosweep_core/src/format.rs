//! Boxed text banners for sweep progress and the final summary.

use crate::model::{StatusReport, SummaryReport, SweepMode};

/// Characters used to frame a banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    pub border: char,
    pub filler: char,
    /// How many border characters flank each row
    pub border_width: usize,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            border: 'X',
            filler: ' ',
            border_width: 3,
        }
    }
}

/// Zero-pad an ordinal to at least two digits, or to the width of `total`
/// when that is wider, e.g. `03` for 3 of 12.
pub fn pad_ordinal(value: usize, total: usize) -> String {
    let width = total.to_string().len().max(2);
    format!("{value:0width$}")
}

fn ordinal_pair(value: usize, total: usize) -> String {
    format!("{} of {}", pad_ordinal(value, total), pad_ordinal(total, total))
}

fn dimension_label(mode: SweepMode, plural: bool) -> &'static str {
    match (mode, plural) {
        (SweepMode::Single, false) => "VARIABLE",
        (SweepMode::Single, true) => "VARIABLES",
        (SweepMode::Paired, false) => "VARIABLE PAIR",
        (SweepMode::Paired, true) => "VARIABLE PAIRS",
    }
}

/// The text rows of a status banner, without framing
pub fn status_lines(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "TESTING {} {} [{}]",
            dimension_label(report.mode, false),
            ordinal_pair(report.dimension_ordinal, report.total_dimensions),
            report.dimension
        ),
        format!(
            "RUNNING SIMULATION {}",
            ordinal_pair(report.trial_ordinal, report.dimension_trial_count)
        ),
        format!(
            "PLAYING FREQUENCY {}",
            ordinal_pair(report.frequency_ordinal, report.frequency_count)
        ),
        format!("{} MINUTES HAVE PASSED", report.elapsed_minutes),
    ];
    if let Some(remaining) = report.remaining_minutes {
        lines.push(format!("ESTIMATED {remaining} MINUTES REMAINING"));
    }
    lines
}

/// The one-sentence summary, also used as the notification body
pub fn summary_line(report: &SummaryReport) -> String {
    format!(
        "TESTED {} {} AT {} FREQUENCIES IN {} MINUTES",
        report.total_dimensions,
        dimension_label(report.mode, report.total_dimensions != 1),
        report.frequency_count,
        report.elapsed_minutes
    )
}

/// Frame rows in a box. Every row is padded with the filler to the widest
/// row and flanked by border runs; top and bottom rules span the full width.
pub fn boxed(lines: &[String], style: &BoxStyle) -> String {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let side: String = std::iter::repeat_n(style.border, style.border_width).collect();
    let rule: String = std::iter::repeat_n(style.border, inner + 2 + 2 * style.border_width).collect();

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(rule.clone());
    for line in lines {
        let pad: String =
            std::iter::repeat_n(style.filler, inner - line.chars().count()).collect();
        out.push(format!("{side} {line}{pad} {side}"));
    }
    out.push(rule);
    out.join("\n")
}

/// Render a live status banner
pub fn render_status(report: &StatusReport, style: &BoxStyle) -> String {
    boxed(&status_lines(report), style)
}

/// Render the final summary banner, with a blank row above and below the
/// sentence
pub fn render_summary(report: &SummaryReport, style: &BoxStyle) -> String {
    boxed(&[String::new(), summary_line(report), String::new()], style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DimensionId, NotificationOutcome};
    use jiff::Timestamp;

    fn status(remaining: Option<u64>) -> StatusReport {
        StatusReport {
            mode: SweepMode::Single,
            dimension: DimensionId::single("tun_rad"),
            dimension_ordinal: 1,
            total_dimensions: 2,
            trial_ordinal: 3,
            dimension_trial_count: 12,
            frequency_ordinal: 5,
            frequency_count: 5,
            completed_trials: 14,
            total_trials: 85,
            elapsed_minutes: 7,
            remaining_minutes: remaining,
        }
    }

    #[test]
    fn test_pad_ordinal() {
        assert_eq!(pad_ordinal(3, 12), "03");
        assert_eq!(pad_ordinal(12, 12), "12");
        assert_eq!(pad_ordinal(7, 120), "007");
        assert_eq!(pad_ordinal(1, 1), "01");
    }

    #[test]
    fn test_status_lines_contents() {
        let lines = status_lines(&status(Some(4)));
        assert_eq!(lines[0], "TESTING VARIABLE 01 of 02 [tun_rad]");
        assert_eq!(lines[1], "RUNNING SIMULATION 03 of 12");
        assert_eq!(lines[2], "PLAYING FREQUENCY 05 of 05");
        assert_eq!(lines[3], "7 MINUTES HAVE PASSED");
        assert_eq!(lines[4], "ESTIMATED 4 MINUTES REMAINING");
    }

    #[test]
    fn test_status_omits_remaining_when_unknown() {
        let lines = status_lines(&status(None));
        assert_eq!(lines.len(), 4);
        assert!(!lines.iter().any(|l| l.contains("REMAINING")));
    }

    #[test]
    fn test_pair_label() {
        let mut report = status(None);
        report.mode = SweepMode::Paired;
        report.dimension = DimensionId::pair("b", "a");
        let lines = status_lines(&report);
        assert_eq!(lines[0], "TESTING VARIABLE PAIR 01 of 02 [(a, b)]");
    }

    #[test]
    fn test_boxed_rows_share_width() {
        let rendered = render_status(&status(Some(4)), &BoxStyle::default());
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 7);
        let width = rows[0].chars().count();
        assert!(rows.iter().all(|r| r.chars().count() == width));
        assert!(rows[0].chars().all(|c| c == 'X'));
        assert!(rows[1].starts_with("XXX TESTING"));
        assert!(rows[1].ends_with(" XXX"));
    }

    #[test]
    fn test_boxed_custom_style() {
        let style = BoxStyle {
            border: '#',
            filler: '.',
            border_width: 1,
        };
        let rendered = boxed(&["ab".to_string(), "abcd".to_string()], &style);
        assert_eq!(rendered, "########\n# ab.. #\n# abcd #\n########");
    }

    #[test]
    fn test_summary_banner() {
        let report = SummaryReport {
            mode: SweepMode::Paired,
            total_dimensions: 3,
            frequency_count: 5,
            total_trials: 375,
            started_at: Timestamp::UNIX_EPOCH,
            finished_at: Timestamp::UNIX_EPOCH,
            elapsed_minutes: 42,
            notification: NotificationOutcome::NotRequested,
        };
        assert_eq!(
            summary_line(&report),
            "TESTED 3 VARIABLE PAIRS AT 5 FREQUENCIES IN 42 MINUTES"
        );
        let rendered = render_summary(&report, &BoxStyle::default());
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[2].contains("TESTED 3 VARIABLE PAIRS"));
        assert!(rows[1].trim_matches('X').trim().is_empty());
    }

    #[test]
    fn test_summary_label_follows_count() {
        let mut report = SummaryReport {
            mode: SweepMode::Paired,
            total_dimensions: 1,
            frequency_count: 2,
            total_trials: 12,
            started_at: Timestamp::UNIX_EPOCH,
            finished_at: Timestamp::UNIX_EPOCH,
            elapsed_minutes: 6,
            notification: NotificationOutcome::NotRequested,
        };
        assert_eq!(
            summary_line(&report),
            "TESTED 1 VARIABLE PAIR AT 2 FREQUENCIES IN 6 MINUTES"
        );

        report.mode = SweepMode::Single;
        assert_eq!(
            summary_line(&report),
            "TESTED 1 VARIABLE AT 2 FREQUENCIES IN 6 MINUTES"
        );
    }
}

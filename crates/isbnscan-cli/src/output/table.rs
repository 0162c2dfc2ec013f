use isbnscan_core::batch::{BatchReport, BookOutcome};

pub fn print(report: &BatchReport) {
    print!("{}", format_report(report));
}

fn status_label(outcome: &BookOutcome) -> &'static str {
    match outcome {
        BookOutcome::Extracted { .. } => "extracted",
        BookOutcome::Unchanged { .. } => "unchanged",
        BookOutcome::NotFound => "not found",
        BookOutcome::NoFormats => "no formats",
        BookOutcome::Skipped => "skipped",
    }
}

/// One row per book, a summary line, then the grouped details.
pub fn format_report(report: &BatchReport) -> String {
    let mut out = String::new();

    let rows: Vec<[String; 5]> = report
        .results
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.title.clone(),
                status_label(&r.outcome).to_string(),
                r.outcome
                    .isbn()
                    .map(|isbn| isbn.to_string())
                    .unwrap_or_else(|| "-".into()),
                format!("{} ms", r.scan_ms),
            ]
        })
        .collect();

    let header = ["ID", "TITLE", "STATUS", "ISBN", "TIME"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| -> String {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = w))
            .collect();
        format!("{}\n", line.join("  ").trim_end())
    };

    out.push_str(&format_row(&header));
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&cells));
    }

    out.push_str(&format!(
        "\n{} extracted, {} unchanged, {} failed, {} skipped\n",
        report.extracted().count(),
        report.unchanged().count(),
        report.failed().count(),
        report.skipped().count()
    ));

    let details = report.details();
    if !details.is_empty() {
        out.push('\n');
        out.push_str(&details);
        out.push('\n');
    }

    out
}

//! Timeline export.
//!
//! Tabular consumers sit outside the core; this module renders the
//! timeline into the two formats they take: CSV rows and a standalone
//! HTML report with per-row provenance.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::types::Timeline;
use super::EventError;

/// CSV with header `date,event,page,position,duplicates,duplicate_locations`.
/// Dates are ISO (`YYYY-MM-DD`); free-text fields are quoted.
pub fn to_csv(timeline: &Timeline) -> String {
    let mut out = String::from("date,event,page,position,duplicates,duplicate_locations\n");
    for event in timeline.iter() {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            event.date.format("%Y-%m-%d"),
            csv_field(&event.text),
            event.page,
            event.offset,
            event.duplicate_count,
            csv_field(&event.duplicate_locations.join("; ")),
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Standalone HTML report: styled table of the timeline with clickable
/// page/position provenance and an optional link back to the source PDF.
pub fn html_report(timeline: &Timeline, pdf_path: Option<&Path>) -> String {
    let pdf_link = pdf_path
        .map(|p| {
            format!(
                "<p><a href=\"file://{}\">Original PDF</a></p>",
                escape_html(&p.display().to_string())
            )
        })
        .unwrap_or_default();

    let mut rows = String::new();
    for event in timeline.iter() {
        let duplicates = if event.duplicate_count > 0 {
            format!(
                "{} ({})",
                event.duplicate_count,
                escape_html(&event.duplicate_locations.join(", "))
            )
        } else {
            "0".to_string()
        };
        rows.push_str(&format!(
            "      <tr>\n        <td>{}</td>\n        <td>{}</td>\n        \
             <td><a href=\"#\" onclick=\"jumpToPdf({}, {})\">Page {}, Pos {}</a></td>\n        \
             <td>{}</td>\n      </tr>\n",
            event.date.format("%Y-%m-%d"),
            escape_html(&event.text),
            event.page,
            event.offset,
            event.page,
            event.offset,
            duplicates,
        ));
    }

    format!(
        "<html>\n<head>\n  <title>Medical Records Report</title>\n  <style>\n    \
         table {{ border-collapse: collapse; width: 100%; }}\n    \
         th, td {{ border: 1px solid black; padding: 8px; text-align: left; }}\n    \
         th {{ background-color: #f2f2f2; }}\n  </style>\n  <script>\n    \
         function jumpToPdf(page, position) {{\n      \
         alert(`Jumping to page ${{page}}, position ${{position}}`);\n    }}\n  \
         </script>\n</head>\n<body>\n  <h1>Medical Records Report</h1>\n  {pdf_link}\n  \
         <table>\n    <tr>\n      <th>Date</th>\n      <th>Event</th>\n      \
         <th>Location</th>\n      <th>Duplicates</th>\n    </tr>\n{rows}  </table>\n\
         </body>\n</html>\n"
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write an export to disk, creating parent directories as needed.
pub fn write_export(path: &Path, contents: &str) -> Result<(), EventError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    info!(path = %path.display(), "timeline export written");
    Ok(())
}

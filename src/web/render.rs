use crate::domain::model::{DocumentFields, ExtractedDocument, VerificationReport};
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
.error{color:#a00;border:1px solid #a00;padding:.5rem}\
.verified{color:#070}.mismatch{color:#a00}\
pre{background:#f4f4f4;padding:.5rem;white-space:pre-wrap;max-height:16rem;overflow:auto}\
td,th{text-align:left;padding:.2rem .6rem}";

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Upload form, optionally followed by an error or a verification report.
pub fn page(report: Option<&VerificationReport>, error: Option<&str>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>Document Verification</title><style>{}</style></head><body>\
<h1>Document Verification</h1>\
<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\
<p><label>PAN card (PDF, TXT, PNG, JPG, JPEG)<br>\
<input type=\"file\" name=\"pan_document\" accept=\".pdf,.txt,.png,.jpg,.jpeg\" required></label></p>\
<p><label>Other documents<br>\
<input type=\"file\" name=\"other_documents\" accept=\".pdf,.txt,.png,.jpg,.jpeg\" multiple required></label></p>\
<p><button type=\"submit\">Verify</button></p></form>",
        STYLE
    );

    if let Some(error) = error {
        let _ = write!(html, "<p class=\"error\">{}</p>", escape_html(error));
    }

    if let Some(report) = report {
        render_report(&mut html, report);
    }

    html.push_str("</body></html>");
    html
}

fn render_report(html: &mut String, report: &VerificationReport) {
    let class = if report.verification.is_verified() {
        "verified"
    } else {
        "mismatch"
    };
    let _ = write!(
        html,
        "<section><h2 class=\"{}\">{}</h2>",
        class,
        escape_html(&report.verification.summary.to_string())
    );

    if !report.verification.flags.is_empty() {
        html.push_str("<ul>");
        for flag in &report.verification.flags {
            let _ = write!(html, "<li>{}</li>", escape_html(flag));
        }
        html.push_str("</ul>");
    }

    render_document(html, "PAN card", &report.pan_info);
    for (index, doc) in report.other_docs.iter().enumerate() {
        render_document(html, &format!("Document {}", index + 1), doc);
    }

    let _ = write!(
        html,
        "<p><small>Request {} processed at {}</small></p></section>",
        report.request_id,
        report.processed_at.to_rfc3339()
    );
}

fn render_document<F: DocumentFields>(html: &mut String, title: &str, doc: &ExtractedDocument<F>) {
    let _ = write!(html, "<h3>{}</h3><table>", escape_html(title));
    for (label, value) in doc.fields.entries() {
        let _ = write!(
            html,
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            escape_html(value.unwrap_or("Not found"))
        );
    }
    let _ = write!(html, "</table><pre>{}</pre>", escape_html(&doc.raw_text));
}

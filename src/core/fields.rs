use crate::domain::model::{ExtractedDocument, PrimaryDocumentFields, SupportingDocumentFields};
use once_cell::sync::Lazy;
use regex::Regex;

const PRIMARY_ANCHOR: &str = "Permanent Account Number Card";

static PAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}\d{4}[A-Z]$").expect("PAN pattern"));
static DOB_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)dob|date of birth").expect("DOB label pattern"));
static GROUPED_TWELVE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\s?\d{4}\s?\d{4}\b").expect("grouped id pattern"));
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{9,12}\b").expect("digit run pattern"));
static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("phone pattern"));

/// Trimmed, non-empty lines after turning every `\r` into a line break.
fn normalized_lines(text: &str) -> Vec<&str> {
    text.split(|c: char| {
        matches!(
            c,
            '\r' | '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect()
}

/// Reads name, date of birth and PAN from the primary ID card.
///
/// The PAN is the line right after the card title, kept only if it has the
/// `AAAAA9999A` shape. The name is the line after that, taken as is. The date
/// of birth is the line following the first `DOB` / `Date of Birth` label.
pub fn extract_primary_fields(text: &str) -> ExtractedDocument<PrimaryDocumentFields> {
    let lines = normalized_lines(text);
    let mut fields = PrimaryDocumentFields::default();

    if let Some(anchor) = lines.iter().position(|line| line.contains(PRIMARY_ANCHOR)) {
        fields.identifier = lines
            .get(anchor + 1)
            .filter(|line| PAN_PATTERN.is_match(line))
            .map(|line| line.to_string());
        fields.name = lines.get(anchor + 2).map(|line| line.to_string());
    }

    // 標籤在最後一行時沒有值，繼續往後找不會有結果
    fields.date_of_birth = lines
        .windows(2)
        .find(|pair| DOB_LABEL.is_match(pair[0]))
        .map(|pair| pair[1].to_string());

    ExtractedDocument::new(text, fields)
}

/// Reads a generic numeric identifier from a supporting document.
///
/// A 12 digit number, optionally in groups of four, wins. Otherwise the first
/// 9 to 12 digit run that does not look like a mobile number is used.
pub fn extract_supporting_fields(text: &str) -> ExtractedDocument<SupportingDocumentFields> {
    let generic_identifier = GROUPED_TWELVE_DIGITS
        .find(text)
        // 分組間可能是換行，一律去掉讓號碼只剩數字
        .map(|m| m.as_str().split_whitespace().collect::<String>())
        .or_else(|| {
            let compact = text.replace(' ', "");
            DIGIT_RUN
                .find_iter(&compact)
                .map(|m| m.as_str())
                .find(|run| !PHONE_NUMBER.is_match(run))
                .map(str::to_string)
        });

    ExtractedDocument::new(text, SupportingDocumentFields { generic_identifier })
}

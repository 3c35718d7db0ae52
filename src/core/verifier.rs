use crate::domain::model::{
    ExtractedDocument, PrimaryDocumentFields, SupportingDocumentFields, VerificationResult,
};

pub const MISSING_NAME_FLAG: &str = "PAN card Name not found.";

/// Checks that the first name on the primary card shows up in every
/// supporting document.
///
/// Comparison is case-insensitive and ignores all whitespace in the
/// supporting text. Without a primary name only the missing-name flag is
/// raised; the documents themselves are not checked.
pub fn verify_documents(
    primary: &PrimaryDocumentFields,
    supporting: &[ExtractedDocument<SupportingDocumentFields>],
) -> VerificationResult {
    let mut flags = Vec::new();

    let reference = primary
        .name
        .as_deref()
        .and_then(|name| name.split_whitespace().next())
        .map(str::to_lowercase);

    match reference {
        None => flags.push(MISSING_NAME_FLAG.to_string()),
        Some(first_name) => {
            for (index, doc) in supporting.iter().enumerate() {
                let flattened: String = doc
                    .raw_text
                    .to_lowercase()
                    .split_whitespace()
                    .collect();
                if !flattened.contains(&first_name) {
                    flags.push(format!(
                        "Document {}: First name from PAN not found.",
                        index + 1
                    ));
                }
            }
        }
    }

    VerificationResult::from_flags(flags)
}

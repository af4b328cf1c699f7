//! Document types, classification, and per-claim-type requirements

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    ItemizedInvoice,
    PaymentReceipt,
    IncidentReport,
    DischargeSummary,
    IdProof,
    Unknown,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::ItemizedInvoice => "itemized_invoice",
            DocType::PaymentReceipt => "payment_receipt",
            DocType::IncidentReport => "incident_report",
            DocType::DischargeSummary => "discharge_summary",
            DocType::IdProof => "id_proof",
            DocType::Unknown => "unknown",
        }
    }

    /// Parses stored or model-emitted type names. Accepts kebab-case
    /// variants and the legacy "fir" name for incident reports.
    pub fn parse(s: &str) -> Option<DocType> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "itemized_invoice" | "invoice" => Some(DocType::ItemizedInvoice),
            "payment_receipt" | "receipt" => Some(DocType::PaymentReceipt),
            "incident_report" | "fir" => Some(DocType::IncidentReport),
            "discharge_summary" => Some(DocType::DischargeSummary),
            "id_proof" => Some(DocType::IdProof),
            "unknown" => Some(DocType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::parse(s).ok_or(())
    }
}

/// Keyword classifier for uploaded documents that arrive untyped.
///
/// Filename hints win over content hints; anything unrecognized is Unknown
/// and surfaces through validation as a missing required type.
pub fn classify_document(filename: &str, _content_type: &str, text: &str) -> DocType {
    let name = filename.to_lowercase();
    let body = text.to_lowercase();

    if name.contains("invoice") || name.contains("bill") || body.contains("gst") || body.contains("total") {
        return DocType::ItemizedInvoice;
    }
    if name.contains("receipt") || name.contains("payment") || body.contains("paid on") || body.contains("receipt") {
        return DocType::PaymentReceipt;
    }
    if name.contains("incident")
        || name.contains("fir")
        || body.contains("first information report")
        || body.contains("police station")
    {
        return DocType::IncidentReport;
    }
    if name.contains("discharge") || body.contains("admission date") || body.contains("discharge date") {
        return DocType::DischargeSummary;
    }
    if name.contains("id") || name.contains("aadhaar") || name.contains("pan") || body.contains("passport") {
        return DocType::IdProof;
    }
    DocType::Unknown
}

/// Required document set for a claim category.
pub fn required_documents(claim_type: Option<&str>) -> &'static [DocType] {
    match claim_type.map(str::to_ascii_lowercase).as_deref() {
        Some("motor") => &[
            DocType::IncidentReport,
            DocType::ItemizedInvoice,
            DocType::PaymentReceipt,
            DocType::IdProof,
        ],
        Some("health") => &[
            DocType::DischargeSummary,
            DocType::ItemizedInvoice,
            DocType::PaymentReceipt,
            DocType::IdProof,
        ],
        _ => &[
            DocType::ItemizedInvoice,
            DocType::PaymentReceipt,
            DocType::IdProof,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_filename() {
        assert_eq!(
            classify_document("hospital_invoice.pdf", "application/pdf", ""),
            DocType::ItemizedInvoice
        );
        assert_eq!(
            classify_document("payment_jan.png", "image/png", ""),
            DocType::PaymentReceipt
        );
        assert_eq!(
            classify_document("incident_report.pdf", "application/pdf", ""),
            DocType::IncidentReport
        );
    }

    #[test]
    fn test_classify_by_content() {
        assert_eq!(
            classify_document("scan1.pdf", "application/pdf", "Admission date: 2026-01-03"),
            DocType::DischargeSummary
        );
        assert_eq!(
            classify_document("scan2.pdf", "application/pdf", "FIRST INFORMATION REPORT"),
            DocType::IncidentReport
        );
        assert_eq!(
            classify_document("misc.pdf", "application/pdf", "nothing recognizable"),
            DocType::Unknown
        );
    }

    #[test]
    fn test_required_documents_by_type() {
        assert!(required_documents(Some("motor")).contains(&DocType::IncidentReport));
        assert!(required_documents(Some("Health")).contains(&DocType::DischargeSummary));
        assert_eq!(required_documents(Some("travel")).len(), 3);
        assert_eq!(required_documents(None).len(), 3);
    }

    #[test]
    fn test_doc_type_parse_aliases() {
        assert_eq!(DocType::parse("fir"), Some(DocType::IncidentReport));
        assert_eq!(DocType::parse("incident-report"), Some(DocType::IncidentReport));
        assert_eq!(DocType::parse("Itemized_Invoice"), Some(DocType::ItemizedInvoice));
        assert_eq!(DocType::parse("something else"), None);
    }
}

//! Proposal records produced by the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::Category;

/// Format of protocol dates on the listing page.
pub const PROTOCOL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `dd/mm/yyyy` protocol date.
///
/// Returns `None` for strings that are not a real calendar date.
pub fn parse_protocol_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), PROTOCOL_DATE_FORMAT).ok()
}

/// A proposal as extracted from one listing row, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    /// Normalized identifier (e.g. "IND 101/2024"), unique in the final set
    pub id: String,

    /// Raw text of the identifier cell
    pub title: String,

    /// Ementa text; the classification input
    pub description: String,

    /// Protocol date as shown on the page (dd/mm/yyyy)
    pub protocol_date: String,

    /// Year taken from the protocol date
    pub year: i32,

    /// Absolute URL of the original document
    pub pdf_url: String,
}

impl RawProposal {
    /// Chronological value of the protocol date.
    pub fn protocol_day(&self) -> Option<NaiveDate> {
        parse_protocol_date(&self.protocol_date)
    }

    /// Attach a classification result.
    pub fn classify(self, result: ClassificationResult) -> ClassifiedProposal {
        ClassifiedProposal {
            proposal: self,
            category: result.category,
            locations: result.locations,
            status: ProposalStatus::Active,
        }
    }
}

/// Lifecycle status shown next to each proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProposalStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
}

impl ProposalStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProposalStatus::Active => "Ativo",
        }
    }
}

/// Outcome of classifying one description.
///
/// This is the unit the classification cache stores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub locations: Vec<String>,
}

impl ClassificationResult {
    pub fn new(category: Category, locations: Vec<String>) -> Self {
        Self {
            category,
            locations,
        }
    }

    /// Result used whenever the backend fails.
    pub fn fallback() -> Self {
        Self::new(Category::CATCH_ALL, Vec::new())
    }
}

/// A proposal enriched with its category and mentioned locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedProposal {
    #[serde(flatten)]
    pub proposal: RawProposal,
    pub category: Category,
    pub locations: Vec<String>,
    pub status: ProposalStatus,
}

impl ClassifiedProposal {
    pub fn id(&self) -> &str {
        &self.proposal.id
    }

    pub fn protocol_day(&self) -> Option<NaiveDate> {
        self.proposal.protocol_day()
    }
}

/// Sort by protocol date, newest first.
///
/// The sort is stable, so ties keep their merge order. Dates that do not
/// parse sort after every valid date.
pub fn sort_by_protocol_date(proposals: &mut [ClassifiedProposal]) {
    proposals.sort_by(|a, b| b.protocol_day().cmp(&a.protocol_day()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(id: &str, date: &str) -> ClassifiedProposal {
        RawProposal {
            id: id.to_string(),
            title: id.to_string(),
            description: format!("Ementa de {}", id),
            protocol_date: date.to_string(),
            year: 2024,
            pdf_url: "https://example.com/doc.pdf".to_string(),
        }
        .classify(ClassificationResult::fallback())
    }

    #[test]
    fn test_parse_protocol_date() {
        assert_eq!(
            parse_protocol_date("05/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_protocol_date("31/02/2024"), None);
        assert_eq!(parse_protocol_date("2024-03-05"), None);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut proposals = vec![
            proposal("IND 1/2024", "10/01/2024"),
            proposal("IND 2/2024", "05/03/2024"),
            proposal("IND 3/2024", "20/02/2024"),
        ];

        sort_by_protocol_date(&mut proposals);

        let dates: Vec<_> = proposals
            .iter()
            .map(|p| p.proposal.protocol_date.as_str())
            .collect();
        assert_eq!(dates, vec!["05/03/2024", "20/02/2024", "10/01/2024"]);
    }

    #[test]
    fn test_sort_keeps_ties_stable_and_invalid_last() {
        let mut proposals = vec![
            proposal("IND 1/2024", "99/99/2024"),
            proposal("IND 2/2024", "10/01/2024"),
            proposal("IND 3/2024", "10/01/2024"),
            proposal("IND 4/2024", "11/01/2024"),
        ];

        sort_by_protocol_date(&mut proposals);

        let ids: Vec<_> = proposals.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["IND 4/2024", "IND 2/2024", "IND 3/2024", "IND 1/2024"]);
    }

    #[test]
    fn test_classified_serializes_flat_camel_case() {
        let value = serde_json::to_value(proposal("IND 7/2024", "10/01/2024")).unwrap();
        assert_eq!(value["id"], "IND 7/2024");
        assert_eq!(value["protocolDate"], "10/01/2024");
        assert_eq!(value["pdfUrl"], "https://example.com/doc.pdf");
        assert_eq!(value["category"], "Outros");
        assert_eq!(value["status"], "Ativo");
        assert!(value["locations"].as_array().unwrap().is_empty());
    }
}

//! Category aggregation for the presentation layer.
//!
//! Everything here is a pure function of the current proposal set and is
//! recomputed on every read.

use serde::Serialize;

use crate::types::{category::Category, proposal::ClassifiedProposal};

/// Per-category share of the proposal set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    #[serde(rename = "name")]
    pub category: Category,
    pub count: usize,
    /// count / total × 100, or 0 when the set is empty
    pub percentage: f64,
    pub color: &'static str,
}

/// Summarize proposals by category.
///
/// Entries follow the canonical taxonomy order and categories with no
/// proposals are omitted.
pub fn summarize(proposals: &[ClassifiedProposal]) -> Vec<CategorySummary> {
    let total = proposals.len();
    let mut counts = [0usize; Category::ALL.len()];
    for proposal in proposals {
        counts[proposal.category.position()] += 1;
    }

    Category::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CategorySummary {
            category,
            count,
            percentage: percentage(count, total),
            color: category.color(),
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Restrict proposals to one category; `None` keeps everything.
pub fn filter_by_category(
    proposals: &[ClassifiedProposal],
    category: Option<Category>,
) -> Vec<&ClassifiedProposal> {
    proposals
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::proposal::{ClassificationResult, RawProposal};

    fn proposal(n: usize, category: Category) -> ClassifiedProposal {
        RawProposal {
            id: format!("IND {}/2024", n),
            title: format!("IND {}/2024", n),
            description: format!("Ementa {}", n),
            protocol_date: "10/01/2024".to_string(),
            year: 2024,
            pdf_url: format!("https://example.com/{}.pdf", n),
        }
        .classify(ClassificationResult::new(category, vec![]))
    }

    #[test]
    fn test_empty_set_has_no_entries() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_single_category_is_one_hundred_percent() {
        let proposals: Vec<_> = (0..10)
            .map(|n| proposal(n, Category::IluminacaoPublica))
            .collect();

        let summary = summarize(&proposals);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].category, Category::IluminacaoPublica);
        assert_eq!(summary[0].count, 10);
        assert_eq!(summary[0].percentage, 100.0);
        assert_eq!(summary[0].color, "#3b82f6");
    }

    #[test]
    fn test_canonical_order_not_arrival_order() {
        let proposals = vec![
            proposal(1, Category::Outros),
            proposal(2, Category::PrediosPublicos),
            proposal(3, Category::Outros),
            proposal(4, Category::SinalizacaoETransito),
        ];

        let summary = summarize(&proposals);

        let order: Vec<_> = summary.iter().map(|s| s.category).collect();
        assert_eq!(
            order,
            vec![
                Category::SinalizacaoETransito,
                Category::PrediosPublicos,
                Category::Outros
            ]
        );
        assert_eq!(summary[2].count, 2);
        assert_eq!(summary[2].percentage, 50.0);
        assert_eq!(summary[0].percentage, 25.0);
    }

    #[test]
    fn test_filter_by_category() {
        let proposals = vec![
            proposal(1, Category::Outros),
            proposal(2, Category::GestaoDeResiduos),
            proposal(3, Category::Outros),
        ];

        assert_eq!(filter_by_category(&proposals, None).len(), 3);

        let residuos = filter_by_category(&proposals, Some(Category::GestaoDeResiduos));
        assert_eq!(residuos.len(), 1);
        assert_eq!(residuos[0].id(), "IND 2/2024");
    }

    #[test]
    fn test_serializes_name_label() {
        let summary = summarize(&[proposal(1, Category::GestaoDeResiduos)]);
        let value = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(value["name"], "Gestão de Resíduos");
        assert_eq!(value["count"], 1);
    }
}

//! The closed classification taxonomy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the nine proposal categories.
///
/// Variants are declared in canonical display order, and `Outros` is the
/// catch-all every unrecognized label is coerced to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    #[serde(rename = "Iluminação Pública")]
    IluminacaoPublica,
    #[serde(rename = "Sinalização e Trânsito")]
    SinalizacaoETransito,
    #[serde(rename = "Pavimentação e Vias")]
    PavimentacaoEVias,
    #[serde(rename = "Manutenção e Limpeza Urbana")]
    ManutencaoELimpezaUrbana,
    #[serde(rename = "Gestão de Resíduos")]
    GestaoDeResiduos,
    #[serde(rename = "Planejamento Urbano e Programas")]
    PlanejamentoUrbanoEProgramas,
    #[serde(rename = "Espaços Públicos e Infraestrutura")]
    EspacosPublicosEInfraestrutura,
    #[serde(rename = "Prédios Públicos")]
    PrediosPublicos,
    #[serde(rename = "Outros")]
    Outros,
}

impl Category {
    /// Every category in canonical order.
    pub const ALL: [Category; 9] = [
        Category::IluminacaoPublica,
        Category::SinalizacaoETransito,
        Category::PavimentacaoEVias,
        Category::ManutencaoELimpezaUrbana,
        Category::GestaoDeResiduos,
        Category::PlanejamentoUrbanoEProgramas,
        Category::EspacosPublicosEInfraestrutura,
        Category::PrediosPublicos,
        Category::Outros,
    ];

    /// The catch-all category.
    pub const CATCH_ALL: Category = Category::Outros;

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Category::IluminacaoPublica => "Iluminação Pública",
            Category::SinalizacaoETransito => "Sinalização e Trânsito",
            Category::PavimentacaoEVias => "Pavimentação e Vias",
            Category::ManutencaoELimpezaUrbana => "Manutenção e Limpeza Urbana",
            Category::GestaoDeResiduos => "Gestão de Resíduos",
            Category::PlanejamentoUrbanoEProgramas => "Planejamento Urbano e Programas",
            Category::EspacosPublicosEInfraestrutura => "Espaços Públicos e Infraestrutura",
            Category::PrediosPublicos => "Prédios Públicos",
            Category::Outros => "Outros",
        }
    }

    /// Exact-match lookup by label.
    pub fn from_label(label: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Lookup by label, coercing anything unknown to the catch-all.
    pub fn from_label_or_catch_all(label: &str) -> Category {
        Self::from_label(label).unwrap_or(Self::CATCH_ALL)
    }

    /// Position in the canonical order.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Chart color for this category.
    pub fn color(self) -> &'static str {
        match self {
            Category::IluminacaoPublica => "#3b82f6",
            Category::SinalizacaoETransito => "#14b8a6",
            Category::PavimentacaoEVias => "#8b5cf6",
            Category::ManutencaoELimpezaUrbana => "#ef4444",
            Category::GestaoDeResiduos => "#f97316",
            Category::PlanejamentoUrbanoEProgramas => "#22c55e",
            Category::EspacosPublicosEInfraestrutura => "#ec4899",
            Category::PrediosPublicos => "#6b7280",
            Category::Outros => "#d946ef",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::CATCH_ALL
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_are_unique_and_ordered() {
        let labels: Vec<_> = Category::ALL.iter().map(|c| c.label()).collect();
        let unique: HashSet<_> = labels.iter().collect();
        assert_eq!(labels.len(), 9);
        assert_eq!(unique.len(), 9);
        assert_eq!(labels.last(), Some(&"Outros"));

        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.position(), i);
        }
    }

    #[test]
    fn test_unknown_label_coerces_to_catch_all() {
        assert_eq!(
            Category::from_label_or_catch_all("Pavimentação e Vias"),
            Category::PavimentacaoEVias
        );
        assert_eq!(Category::from_label_or_catch_all("Saúde"), Category::Outros);
        assert_eq!(Category::from_label("iluminação pública"), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Category::GestaoDeResiduos).unwrap();
        assert_eq!(json, "\"Gestão de Resíduos\"");

        let parsed: Category = serde_json::from_str("\"Prédios Públicos\"").unwrap();
        assert_eq!(parsed, Category::PrediosPublicos);
    }
}

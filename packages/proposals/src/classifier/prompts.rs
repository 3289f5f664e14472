//! Classification prompt.

use crate::traits::backend::ClassificationRequest;

use super::schema::classification_schema;

/// Instruction sent with every ementa. `{description}` is replaced verbatim.
pub const CLASSIFY_PROMPT: &str = "Analise a seguinte ementa de indicação legislativa. \
Extraia os principais locais mencionados (como nomes de ruas, bairros ou praças) e \
classifique a ementa em uma das categorias fornecidas no schema. Ementa: \"{description}\"";

/// Classification is deterministic.
pub const CLASSIFY_TEMPERATURE: f32 = 0.0;

/// Format the classification instruction.
pub fn format_classify_prompt(description: &str) -> String {
    CLASSIFY_PROMPT.replace("{description}", description)
}

/// Build the full backend request for one description.
pub fn classification_request(description: &str) -> ClassificationRequest {
    ClassificationRequest {
        description: description.to_string(),
        instruction: format_classify_prompt(description),
        schema: classification_schema(),
        temperature: CLASSIFY_TEMPERATURE,
    }
}

//! LLM prompt for knowledge graph extraction

/// Builds the per-chunk graph extraction prompt
pub struct PromptBuilder<'a> {
    chunk: &'a str,
    document: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for one chunk
    pub fn new(chunk: &'a str) -> Self {
        Self {
            chunk,
            document: None,
        }
    }

    /// Name the filing the chunk comes from
    pub fn with_document(mut self, document: &'a str) -> Self {
        self.document = Some(document);
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + OUTPUT_FORMAT_REMINDER.len() + self.chunk.len() + 128,
        );

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(document) = self.document {
            prompt.push_str(&format!("Filing: {}\n\n", document));
        }

        prompt.push_str("Use the given format to extract information from the following text:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.chunk);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// JSON shape expected back from the model, passed as the structured schema hint
pub const GRAPH_SCHEMA: &str = r#"{"nodes":[{"id":"string","type":"string"}],"relationships":[{"source":"string","target":"string","type":"string"}]}"#;

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert financial analyst creating a knowledge graph from a 10-K filing.
Your goal is to extract a detailed and meaningful graph focusing on strategic information.

- Nodes: Extract key entities like the Company, its Business Segments, Products/Services,
  specified Financial Metrics (e.g., Total Revenue, Net Income, Segment Revenues), significant
  Legal Proceedings, and major Risk Factors. Identify key People mentioned in executive roles.
  Use these node types: Company, Business Segment, Product/Service, Financial Metric,
  Legal Proceeding, Risk Factor, Person.
- Relationships: Create relationships that describe strategic connections. For example:
  - (Company)-[HAS_SEGMENT]->(Business Segment)
  - (Business Segment)-[GENERATES]->(Financial Metric)
  - (Company)-[FACES_RISK]->(Risk Factor)
  - (Company)-[LED_BY]->(Person)
  - (Company)-[INVOLVED_IN]->(Legal Proceeding)
- Density: Capture a comprehensive set of connections. Aim for a rich graph with roughly
  30-60 nodes and up to 200 of the most significant relationships.
- Use the entity's full name as its id, and the same id every time the entity appears."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (one JSON object only, no additional text):
{
  "nodes": [
    {"id": "Acme Corp", "type": "Company"}
  ],
  "relationships": [
    {"source": "Acme Corp", "target": "Cloud Services", "type": "HAS_SEGMENT"}
  ]
}

Every relationship source and target must be the id of a node.
Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_chunk() {
        let prompt = PromptBuilder::new("Acme Corp reported revenue of $10B.").build();
        assert!(prompt.contains("Acme Corp reported revenue of $10B."));
    }

    #[test]
    fn test_prompt_includes_taxonomy() {
        let prompt = PromptBuilder::new("text").build();
        for label in ["HAS_SEGMENT", "GENERATES", "FACES_RISK", "LED_BY", "INVOLVED_IN"] {
            assert!(prompt.contains(label), "missing {}", label);
        }
        assert!(prompt.contains("Risk Factor"));
        assert!(prompt.contains("30-60 nodes"));
    }

    #[test]
    fn test_prompt_document_is_optional() {
        let without = PromptBuilder::new("text").build();
        assert!(!without.contains("Filing:"));

        let with = PromptBuilder::new("text").with_document("acme-10k").build();
        assert!(with.contains("Filing: acme-10k"));
    }

    #[test]
    fn test_schema_is_valid_json() {
        let schema: serde_json::Value = serde_json::from_str(GRAPH_SCHEMA).unwrap();
        assert!(schema["nodes"].is_array());
        assert!(schema["relationships"].is_array());
    }
}

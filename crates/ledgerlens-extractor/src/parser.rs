//! Parse LLM output into a per-chunk graph

use crate::error::ExtractorError;
use ledgerlens_domain::{GraphDocument, Node, Relationship, UNKNOWN_NODE_TYPE};
use serde_json::{Map, Value};
use tracing::warn;

/// Parse an LLM JSON response into a graph document.
///
/// Malformed nodes and relationships are skipped with a warning; only a
/// response that is not a JSON object at all is an error.
pub fn parse_graph_response(response: &str) -> Result<GraphDocument, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let mut nodes = Vec::new();
    for (idx, node_json) in array_field(obj, "nodes")?.iter().enumerate() {
        match parse_node_json(node_json) {
            Ok(node) => nodes.push(node),
            Err(e) => warn!("Failed to parse node {}: {}", idx, e),
        }
    }

    let mut relationships = Vec::new();
    for (idx, rel_json) in array_field(obj, "relationships")?.iter().enumerate() {
        match parse_relationship_json(rel_json) {
            Ok(rel) => relationships.push(rel),
            Err(e) => warn!("Failed to parse relationship {}: {}", idx, e),
        }
    }

    Ok(GraphDocument::new(nodes, relationships))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence and, when present, the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// A missing array is empty; a present non-array is malformed
fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], ExtractorError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ExtractorError::InvalidFormat(format!(
            "'{}' is not an array",
            key
        ))),
    }
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", key))
}

/// Endpoints are usually ids, but some models nest the whole node
fn endpoint_id(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    match obj.get(key) {
        Some(Value::Object(node)) => required_str(node, "id"),
        _ => required_str(obj, key),
    }
}

fn parse_node_json(json: &Value) -> Result<Node, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Node is not a JSON object".to_string())?;

    let id = required_str(obj, "id")?;
    let node_type = required_str(obj, "type").unwrap_or_else(|_| UNKNOWN_NODE_TYPE.to_string());

    Ok(Node::new(id, node_type))
}

fn parse_relationship_json(json: &Value) -> Result<Relationship, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Relationship is not a JSON object".to_string())?;

    let source = endpoint_id(obj, "source")?;
    let target = endpoint_id(obj, "target")?;
    let rel_type = required_str(obj, "type")?;

    Ok(Relationship::new(source, target, rel_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "nodes": [
                {"id": "Acme Corp", "type": "Company"},
                {"id": "Cloud", "type": "Business Segment"}
            ],
            "relationships": [
                {"source": "Acme Corp", "target": "Cloud", "type": "HAS_SEGMENT"}
            ]
        }"#;

        let doc = parse_graph_response(response).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0], Node::new("Acme Corp", "Company"));
        assert_eq!(
            doc.relationships,
            vec![Relationship::new("Acme Corp", "Cloud", "HAS_SEGMENT")]
        );
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"nodes\": [{\"id\": \"Acme\", \"type\": \"Company\"}]}\n```";
        let doc = parse_graph_response(response).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert!(doc.relationships.is_empty());
    }

    #[test]
    fn test_parse_unterminated_code_block() {
        let response = "```\n{\"nodes\": []}";
        assert!(parse_graph_response(response).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_graph_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_array_rejected() {
        let result = parse_graph_response("[]");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_nodes_not_array_rejected() {
        let result = parse_graph_response(r#"{"nodes": "Acme"}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_skips_invalid_items() {
        let response = r#"{
            "nodes": [
                {"id": "Acme", "type": "Company"},
                {"type": "Company"},
                "Beta",
                {"id": "  ", "type": "Person"}
            ],
            "relationships": [
                {"source": "Acme", "target": "Jane Doe", "type": "LED_BY"},
                {"source": "Acme", "target": "Risk"},
                {"source": "", "target": "Risk", "type": "FACES_RISK"}
            ]
        }"#;

        let doc = parse_graph_response(response).unwrap();
        assert_eq!(doc.nodes, vec![Node::new("Acme", "Company")]);
        assert_eq!(doc.relationships.len(), 1);
    }

    #[test]
    fn test_missing_node_type_is_unknown() {
        let doc = parse_graph_response(r#"{"nodes": [{"id": "Acme"}]}"#).unwrap();
        assert_eq!(doc.nodes[0].node_type, UNKNOWN_NODE_TYPE);
    }

    #[test]
    fn test_nested_endpoint_objects() {
        let response = r#"{
            "relationships": [
                {
                    "source": {"id": "Acme", "type": "Company"},
                    "target": {"id": "Litigation X", "type": "Legal Proceeding"},
                    "type": "INVOLVED_IN"
                }
            ]
        }"#;

        let doc = parse_graph_response(response).unwrap();
        assert_eq!(
            doc.relationships,
            vec![Relationship::new("Acme", "Litigation X", "INVOLVED_IN")]
        );
    }

    #[test]
    fn test_ids_are_trimmed() {
        let doc = parse_graph_response(r#"{"nodes": [{"id": " Acme ", "type": " Company "}]}"#)
            .unwrap();
        assert_eq!(doc.nodes[0], Node::new("Acme", "Company"));
    }
}

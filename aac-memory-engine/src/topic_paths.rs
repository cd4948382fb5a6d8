//! Maps a topic's `nodePath` (the resolver's view, e.g. `["AI", "NLP"]`) onto
//! the actual storage path in the value tree, which interleaves a literal
//! `subtopics` token between levels (the tree shape required by invariant
//! #6 — every node carries its own `subtopics` map).

use aac_memory_core::Path;

/// The tree path of the node itself (a `TopicNode` value).
pub fn node_path(field_id: &str, node_path: &[String]) -> Path {
    Path::from_tokens(json_tokens(field_id, node_path))
}

/// The tree path of the map that holds `node_path`'s immediate children:
/// the field's own top-level map when `node_path` is empty, else the
/// node's `subtopics` map.
pub fn children_container_path(field_id: &str, node_path: &[String]) -> Path {
    if node_path.is_empty() {
        Path::from_tokens(vec![field_id.to_string()])
    } else {
        let mut tokens = json_tokens(field_id, node_path);
        tokens.push("subtopics".to_string());
        Path::from_tokens(tokens)
    }
}

fn json_tokens(field_id: &str, node_path: &[String]) -> Vec<String> {
    let mut tokens = vec![field_id.to_string()];
    let last = node_path.len().saturating_sub(1);
    for (i, segment) in node_path.iter().enumerate() {
        tokens.push(segment.clone());
        if i != last {
            tokens.push("subtopics".to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_children_container_is_the_field_itself() {
        assert_eq!(children_container_path("research", &[]).to_wire(), "/research");
    }

    #[test]
    fn nested_node_path_interleaves_subtopics() {
        let segments = vec!["AI".to_string()];
        assert_eq!(node_path("research", &segments).to_wire(), "/research/AI");
        assert_eq!(
            children_container_path("research", &segments).to_wire(),
            "/research/AI/subtopics"
        );

        let nested = vec!["AI".to_string(), "NLP".to_string()];
        assert_eq!(
            node_path("research", &nested).to_wire(),
            "/research/AI/subtopics/NLP"
        );
    }
}

//! Workflow loader - reading and exporting workflow documents
//!
//! Documents are YAML (`.yaml` / `.yml`) or JSON (`.json`) files in the
//! `{id, type, label, children}` layout. Anything that is not YAML by
//! extension is read as JSON.

use std::fs;
use std::path::Path;

use crate::engine::{FlowError, Tree};

/// Loads and exports workflow trees
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a workflow tree from a file
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<Tree, FlowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let tree = if is_yaml(path) {
            Self::parse_yaml(&content)?
        } else {
            Self::parse_json(&content)?
        };
        log::info!(
            "Loaded workflow '{}' with {} nodes from {}",
            tree.root().label,
            tree.len(),
            path.display()
        );
        Ok(tree)
    }

    /// Parse a workflow tree from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Tree, FlowError> {
        let tree: Tree = serde_yaml::from_str(content)?;
        Ok(tree)
    }

    /// Parse a workflow tree from a JSON string
    pub fn parse_json(content: &str) -> Result<Tree, FlowError> {
        let tree: Tree = serde_json::from_str(content)?;
        Ok(tree)
    }

    /// Pretty-printed JSON of a workflow tree
    pub fn export_json(tree: &Tree) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(tree)?)
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NodeKind;

    #[test]
    fn test_parse_yaml_workflow() {
        let yaml = r#"
id: root
type: action
label: Start Workflow
children:
  - id: check
    type: branch
    label: Is urgent?
    children:
      - id: page
        type: action
        label: Page on-call
      - null
"#;
        let tree = WorkflowLoader::parse_yaml(yaml).unwrap();
        assert_eq!(tree.len(), 3);

        let branch = tree.find("check").unwrap();
        assert_eq!(branch.kind(), NodeKind::Branch);
        assert_eq!(branch.label, "Is urgent?");
        assert_eq!(branch.slot(0).unwrap().label, "Page on-call");
        assert!(branch.slot(1).is_none());
    }

    #[test]
    fn test_parse_json_workflow() {
        let json = r#"{"id": "root", "type": "start", "label": "Go", "children": [
            {"id": "done", "type": "end", "label": "Done"}
        ]}"#;
        let tree = WorkflowLoader::parse_json(json).unwrap();
        assert_eq!(tree.root().kind(), NodeKind::Start);
        assert_eq!(tree.root().slot(0).unwrap().kind(), NodeKind::End);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
id: root
type: action
label: Start
children:
  - id: root
    type: end
    label: Again
"#;
        let err = WorkflowLoader::parse_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate node id 'root'"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = r#"
id: root
type: loop
label: Start
"#;
        assert!(WorkflowLoader::parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let tree = Tree::initial();
        let json = WorkflowLoader::export_json(&tree).unwrap();
        assert!(json.contains("\"label\": \"Start Workflow\""));
        assert_eq!(WorkflowLoader::parse_json(&json).unwrap(), tree);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorkflowLoader::new()
            .load_workflow("does/not/exist.yaml")
            .unwrap_err();
        assert!(matches!(err, FlowError::Io(_)));
    }

    #[test]
    fn test_extension_detection() {
        assert!(is_yaml(Path::new("flow.yaml")));
        assert!(is_yaml(Path::new("flow.yml")));
        assert!(!is_yaml(Path::new("flow.json")));
        assert!(!is_yaml(Path::new("flow")));
    }
}

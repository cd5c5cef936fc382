//! Change list files.
//!
//! A change list is a YAML (or JSON) sequence of pending changes:
//!
//! ```yaml
//! - op: create
//!   resource:
//!     apiVersion: apps/v1
//!     kind: Deployment
//!     metadata: {name: web, namespace: default}
//! - op: delete
//!   resource:
//!     apiVersion: v1
//!     kind: ConfigMap
//!     metadata: {name: old-settings, namespace: default}
//! ```

use std::path::Path;

use kapply_diffgraph::PendingChange;

use crate::error::CliError;

/// Read and parse a change list file.
pub fn load_changes(path: &Path) -> Result<Vec<PendingChange>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadChanges {
        path: path.to_path_buf(),
        source,
    })?;

    let changes = parse_changes(&contents).map_err(|source| CliError::ParseChanges {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), changes = changes.len(), "loaded change list");
    Ok(changes)
}

/// Parse a change list. Empty input is an empty list.
pub fn parse_changes(contents: &str) -> Result<Vec<PendingChange>, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use kapply_diffgraph::ChangeOp;

    use super::*;

    #[test]
    fn test_parse_changes_yaml() {
        let yaml = r#"
- op: create
  resource:
    apiVersion: apps/v1
    kind: Deployment
    metadata: {name: web, namespace: default}
- op: noop
  resource:
    apiVersion: v1
    kind: Namespace
    metadata: {name: default}
"#;
        let changes = parse_changes(yaml).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].op, ChangeOp::Create);
        assert_eq!(changes[0].resource.name(), "web");
        assert!(changes[1].resource.is_cluster_scoped());
    }

    #[test]
    fn test_parse_changes_json() {
        let json = r#"[{"op": "delete", "resource": {"apiVersion": "v1", "kind": "Secret",
            "metadata": {"name": "creds", "namespace": "apps"}}}]"#;
        let changes = parse_changes(json).unwrap();
        assert_eq!(changes[0].op, ChangeOp::Delete);
        assert_eq!(changes[0].resource.namespace(), "apps");
    }

    #[test]
    fn test_parse_changes_empty() {
        assert!(parse_changes("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_changes_rejects_unknown_op() {
        let yaml = "- op: patch\n  resource: {apiVersion: v1, kind: Pod, metadata: {name: a}}\n";
        assert!(parse_changes(yaml).is_err());
    }

    #[test]
    fn test_load_changes_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- op: create\n  resource: {{kind: Pod}}").unwrap();

        let err = load_changes(file.path()).unwrap_err();
        assert!(matches!(err, CliError::ParseChanges { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}

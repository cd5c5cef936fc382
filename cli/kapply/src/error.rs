//! Error handling and display for the CLI.

use std::path::PathBuf;

use colored::Colorize;
use kapply_config::ConfigError;
use kapply_diffgraph::DiffGraphError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read change list {path}: {source}")]
    ReadChanges {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid change list {path}: {source}")]
    ParseChanges {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(hint) = hint_for(err) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(graph_err) = err.downcast_ref::<DiffGraphError>() {
        return match graph_err {
            DiffGraphError::Cycle { .. } => Some(
                "Hint: Every edge on this path comes from a mandatory rule. Mark one of the \
                 config rules `ignoreIfCyclical: true` or change the `kapply.dev/change-rule` \
                 annotations. Run `kapply graph --unresolved` to inspect the raw edges.",
            ),
            DiffGraphError::InvalidRule { .. } => Some(
                "Hint: Rules have the form `<upsert|delete> <after|before> \
                 <upserting|deleting> <change-group>`.",
            ),
            DiffGraphError::InvalidGroup { .. } => None,
        };
    }

    if let Some(config_err) = err.downcast_ref::<ConfigError>() {
        return match config_err {
            ConfigError::UnsupportedVersion { .. } => {
                Some("Hint: Config documents use `apiVersion: kapply.dev/v1alpha1`.")
            }
            ConfigError::File { source, .. }
                if matches!(**source, ConfigError::UnsupportedVersion { .. }) =>
            {
                Some("Hint: Config documents use `apiVersion: kapply.dev/v1alpha1`.")
            }
            _ => None,
        };
    }

    match err.downcast_ref::<CliError>() {
        Some(CliError::ParseChanges { .. }) => Some(
            "Hint: A change list is a sequence of `{op, resource}` entries; \
             op is one of create, update, delete, noop.",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_has_hint() {
        let err = anyhow::Error::new(DiffGraphError::Cycle {
            path: "[a] -> [b] -> [a]".to_string(),
            repeated: "a".to_string(),
        });
        assert!(hint_for(&err).unwrap().contains("ignoreIfCyclical"));
    }

    #[test]
    fn test_wrapped_version_error_has_hint() {
        let err = anyhow::Error::new(ConfigError::File {
            path: PathBuf::from("kapply.yml"),
            source: Box::new(ConfigError::UnsupportedVersion {
                expected: "kapply.dev/v1alpha1",
                actual: "v1".to_string(),
            }),
        });
        assert!(hint_for(&err).unwrap().contains("apiVersion"));
    }

    #[test]
    fn test_other_errors_have_no_hint() {
        assert!(hint_for(&anyhow::anyhow!("boom")).is_none());
    }
}

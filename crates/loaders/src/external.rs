//! ExternalLoader - Profiles produced by an out-of-process program

use crate::Loader;
use shared::{RawProfile, Result, RollerError, SourceDescriptor};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Loader backed by an external program
///
/// The program receives the source descriptor as JSON on stdin
/// (`{"name", "loader", "options", "ttl"}`) and must print a JSON array of
/// profiles on stdout, in the same shape the disk cache stores them. Its
/// stderr is passed through. No timeout is applied.
#[derive(Debug, Clone)]
pub struct ExternalLoader {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalLoader {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builder: pass extra arguments to the program
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Loader for ExternalLoader {
    fn load(&self, source: &SourceDescriptor) -> Result<Vec<RawProfile>> {
        let request = serde_json::to_vec(source)?;

        tracing::debug!("Running {} for source '{}'", self.program.display(), source.name());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                RollerError::load(
                    source.name(),
                    format!("failed to start {}: {}", self.program.display(), e),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A loader that ignores its input may exit before reading it
            if let Err(e) = stdin.write_all(&request) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RollerError::load(
                source.name(),
                format!("{} exited with {}", self.program.display(), output.status),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| RollerError::InvalidLoader {
            loader: self.program.display().to_string(),
            source_name: source.name().to_string(),
            reason: format!("unexpected output: {}", e),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::SourceOptions;

    fn source() -> SourceDescriptor {
        let mut options = SourceOptions::new();
        options.insert("org".to_string(), json!("acme"));
        SourceDescriptor::new("corp", "org-loader", options, 300)
    }

    fn shell(script: &str) -> ExternalLoader {
        ExternalLoader::new("/bin/sh").with_args(["-c", script])
    }

    #[test]
    fn test_loads_profiles_from_stdout() {
        let loader = shell(
            r#"cat >/dev/null; echo '[{"Name":"Ops","Parameters":{"AccountID":"42","Role":"admin","FromProfile":"","TTL":""}}]'"#,
        );
        let profiles = loader.load(&source()).unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Ops");
        assert_eq!(profiles[0].parameters.account_id, "42");
    }

    #[test]
    fn test_receives_descriptor_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let request_path = dir.path().join("request.json");
        let loader = ExternalLoader::new("/bin/sh").with_args([
            "-c".to_string(),
            r#"cat > "$0"; echo '[]'"#.to_string(),
            request_path.to_str().unwrap().to_string(),
        ]);

        assert!(loader.load(&source()).unwrap().is_empty());

        let request: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&request_path).unwrap()).unwrap();
        assert_eq!(request["name"], "corp");
        assert_eq!(request["options"]["org"], "acme");
        assert_eq!(request["ttl"], 300);
    }

    #[test]
    fn test_output_that_is_not_a_profile_list_is_invalid() {
        // echoes the request object back, which is not an array
        let err = shell("cat").load(&source()).unwrap_err();

        match err {
            RollerError::InvalidLoader { loader, source_name, .. } => {
                assert_eq!(loader, "/bin/sh");
                assert_eq!(source_name, "corp");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_zero_exit_is_a_load_error() {
        let err = shell("exit 3").load(&source()).unwrap_err();
        assert!(matches!(err, RollerError::Load { ref source_name, .. } if source_name == "corp"));
    }

    #[test]
    fn test_missing_program_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExternalLoader::new(dir.path().join("missing")).load(&source()).unwrap_err();
        assert!(matches!(err, RollerError::Load { .. }));
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DashError, Result};

/// Shape of the cloud credential file.
#[derive(Debug, Deserialize)]
struct CredentialFile {
    id_token: String,
}

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

/// GitHub token: GITHUB_TOKEN env var, falling back to `gh auth token`.
pub fn github_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    if let Some(token) = try_cli_token("gh auth token") {
        return Ok(token);
    }

    Err(DashError::Auth(
        "no GitHub token found; set GITHUB_TOKEN or log in with `gh auth login`".to_string(),
    ))
}

/// Resolve the credential file path against the home directory. A home
/// directory that cannot be resolved is a fatal environment error.
pub fn resolve_credentials_path(file: &Path) -> Result<PathBuf> {
    if file.is_absolute() {
        return Ok(file.to_path_buf());
    }
    let home = dirs::home_dir()
        .ok_or_else(|| DashError::Environment("cannot resolve home directory".to_string()))?;
    Ok(home.join(file))
}

/// Cloud bearer token: STACKDASH_CLOUD_TOKEN env var, falling back to the
/// JSON credential file written by the cloud CLI's login.
pub fn cloud_token(credentials_path: &Path) -> Result<String> {
    if let Ok(token) = std::env::var("STACKDASH_CLOUD_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    read_credential_file(credentials_path)
}

fn read_credential_file(path: &Path) -> Result<String> {
    let data = std::fs::read_to_string(path).map_err(|err| {
        DashError::Auth(format!(
            "cannot read credential file {}: {}",
            path.display(),
            err
        ))
    })?;

    let creds: CredentialFile = serde_json::from_str(&data).map_err(|err| {
        DashError::Auth(format!(
            "malformed credential file {}: {}",
            path.display(),
            err
        ))
    })?;

    if creds.id_token.is_empty() {
        return Err(DashError::Auth(format!(
            "credential file {} holds an empty token",
            path.display()
        )));
    }

    Ok(creds.id_token)
}

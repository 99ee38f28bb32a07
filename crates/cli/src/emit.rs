//! Writes the specification cache and the generated client files.

use std::path::{Path, PathBuf};

use docs2client_core::{GeneratedClient, OpenApiSpec};
use tracing::info;

use crate::error::EmitError;

pub const SPECS_DIR: &str = "specs";
pub const GENERATED_DIR: &str = "generated";

async fn write(path: PathBuf, contents: &str) -> Result<PathBuf, EmitError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| EmitError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    match tokio::fs::write(&path, contents).await {
        Ok(()) => Ok(path),
        Err(source) => Err(EmitError::Io { path, source }),
    }
}

/// Write `spec` pretty-printed to `<root>/specs/<site_id>.json`.
pub async fn cache_spec(root: &Path, site_id: &str, spec: &OpenApiSpec) -> Result<PathBuf, EmitError> {
    let json = spec.to_json_pretty()?;
    let path = write(root.join(SPECS_DIR).join(format!("{site_id}.json")), &json).await?;
    info!(path = %path.display(), "Cached spec");
    Ok(path)
}

/// Write the generated modules to `<root>/generated/<site_id>/`.
///
/// `client.test.ts` is only written when tests were generated.
pub async fn emit_client(root: &Path, site_id: &str, client: &GeneratedClient) -> Result<PathBuf, EmitError> {
    let dir = root.join(GENERATED_DIR).join(site_id);

    write(dir.join("client.ts"), &client.client_source).await?;
    write(dir.join("types.ts"), &client.type_definitions).await?;
    write(dir.join("index.ts"), &client.index_module).await?;
    if let Some(tests) = client.test_source.as_deref().filter(|t| !t.is_empty()) {
        write(dir.join("client.test.ts"), tests).await?;
    }

    info!(dir = %dir.display(), "Wrote client files");
    Ok(dir)
}

use anyhow::{Context, Result, bail};
use argdecl_metadata::SchemaDocumentV1;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub path: PathBuf,
    pub document: SchemaDocumentV1,
}

pub fn load_schema(schema_path: &Path) -> Result<LoadedSchema> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = resolve_against(&cwd, schema_path);

    if !path.exists() {
        bail!("schema not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let document = SchemaDocumentV1::from_json_str(&contents)
        .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;
    tracing::debug!(path = %path.display(), command = %document.command.name, "loaded schema");

    Ok(LoadedSchema { path, document })
}

/// Write `document` to `dest`, replacing any existing file.
pub fn write_schema(dest: &Path, document: &SchemaDocumentV1) -> Result<()> {
    let mut out = document
        .to_json_string()
        .context("failed to serialize schema")?;
    out.push('\n');

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(())
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

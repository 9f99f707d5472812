use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::debug;

use crate::core::errors::RotationError;
use crate::core::types::CertificateMaterial;

/// Reads the certificate chain and private key from PEM files.
/// Missing, empty, or non-PEM files are input errors.
pub fn read_material(
    fullchain_path: &Path,
    key_path: &Path,
) -> Result<CertificateMaterial, RotationError> {
    let public_key_pem = read_pem_file(fullchain_path, "certificate chain")
        .map_err(|err| RotationError::Input(RotationError::describe(&err)))?;
    let private_key_pem = read_pem_file(key_path, "private key")
        .map_err(|err| RotationError::Input(RotationError::describe(&err)))?;
    Ok(CertificateMaterial::new(public_key_pem, private_key_pem))
}

fn read_pem_file(path: &Path, label: &str) -> Result<String> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {label} file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Err(anyhow!("{label} file {} is empty", path.display()));
    }

    let blocks = pem::parse_many(contents.as_bytes())
        .map_err(|err| anyhow!("{label} file {} is not valid PEM: {err}", path.display()))?;
    if blocks.is_empty() {
        return Err(anyhow!(
            "{label} file {} does not contain a PEM block",
            path.display()
        ));
    }

    debug!(
        "[material] {} file {} holds {} PEM block(s): {}",
        label,
        path.display(),
        blocks.len(),
        blocks.iter().map(|b| b.tag()).collect::<Vec<_>>().join(", ")
    );
    Ok(contents)
}

use anyhow::Result;
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

const LIB_NAME: &str = "gapcm";
const LIB_MANIFEST: &str = "gapcm/Cargo.toml";

fn main() -> Result<()> {
    // Generate git information
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        build_time()?.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let lib_version = lib_version_from_metadata()
        .or_else(|_| lib_version_from_manifest())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=GAPCM_VERSION={lib_version}");

    println!("cargo:rerun-if-changed={LIB_MANIFEST}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    Ok(())
}

/// Honors SOURCE_DATE_EPOCH for reproducible builds.
fn build_time() -> Result<chrono::DateTime<chrono::Utc>> {
    match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => chrono::Utc
            .timestamp_opt(val.parse::<i64>()?, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("SOURCE_DATE_EPOCH is out of range: {val}")),
        Err(_) => Ok(chrono::Utc::now()),
    }
}

/// Library version from cargo metadata (works with published and local dependencies)
fn lib_version_from_metadata() -> Result<String> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let output = Command::new(cargo)
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    // Workspace members first, then the dependency graph
    let packages = metadata["packages"].as_array().into_iter().flatten();
    for package in packages {
        if package["name"].as_str() == Some(LIB_NAME) {
            if let Some(version) = package["version"].as_str() {
                return Ok(version.to_string());
            }
        }
    }

    let nodes = metadata["resolve"]["nodes"].as_array().into_iter().flatten();
    for node in nodes {
        // "gapcm 0.1.0 (registry+...)"
        let mut parts = node["id"].as_str().unwrap_or_default().split(' ');
        if parts.next() == Some(LIB_NAME) {
            if let Some(version) = parts.next() {
                return Ok(version.to_string());
            }
        }
    }

    anyhow::bail!("{LIB_NAME} package not found in metadata");
}

/// Fallback: read the version line of the library manifest
fn lib_version_from_manifest() -> Result<String> {
    let toml_content = fs::read_to_string(LIB_MANIFEST)?;

    for line in toml_content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "version" {
                return Ok(value.trim().trim_matches('"').trim_matches('\'').to_string());
            }
        }
    }

    anyhow::bail!("Could not find version in {LIB_MANIFEST}");
}

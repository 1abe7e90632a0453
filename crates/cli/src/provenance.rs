use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a run was asked to do; serialized into the provenance sidecar.
pub struct RunParams {
    pub seed: u64,
    pub tag: Option<String>,
    pub params: Value,
}

#[derive(Serialize)]
struct Callsite<'a> {
    file: &'a str,
    line: u32,
}

#[derive(Serialize)]
struct Provenance<'a> {
    code_rev: String,
    crate_version: &'static str,
    callsite: Callsite<'a>,
    seed: u64,
    tag: Option<&'a str>,
    params: &'a Value,
    outputs: Vec<String>,
}

/// Write `<artifact>.provenance.json` recording the git commit, callsite,
/// seed, parameters, and every output produced alongside `artifact`.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(
    artifact: P,
    extra_outputs: &[PathBuf],
    run: &RunParams,
) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let outputs = std::iter::once(artifact)
        .chain(extra_outputs.iter().map(PathBuf::as_path))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let doc = Provenance {
        code_rev: current_git_rev(),
        crate_version: gbus::VERSION,
        callsite: Callsite {
            file: callsite.file(),
            line: callsite.line(),
        },
        seed: run.seed,
        tag: run.tag.as_deref(),
        params: &run.params,
        outputs,
    };
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

/// Sibling path `<stem>.<suffix>` next to `artifact`.
pub fn sibling_path(artifact: &Path, suffix: &str) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    let mut name = stem;
    name.push(".");
    name.push(suffix);
    artifact.with_file_name(name)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    sibling_path(artifact, "provenance.json")
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

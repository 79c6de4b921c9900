//! Service-config patching.
//!
//! `ranktab apply` rewrites the fixed set of keys a single-node deployment
//! needs in the serving stack's `config.json`: bind addresses, device ids,
//! model identity, and the sequence-length limits. The file is backed up
//! with a timestamp suffix before anything is written.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use ranktab_types::host::HostAddress;

// Limits written into every patched config.
const MAX_SEQ_LEN: u64 = 32_000;
const MAX_INPUT_TOKEN_LEN: u64 = 24_000;
const MAX_PREFILL_TOKENS: u64 = 24_000;
const MAX_ITER_TIMES: u64 = 8_000;

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Service configuration file to patch in place.
    #[arg(long)]
    config_path: PathBuf,

    /// Address the serving endpoint binds and advertises.
    #[arg(long)]
    container_ip: String,

    /// Model name to serve.
    #[arg(long)]
    model_name: String,

    /// Model weight directory.
    #[arg(long)]
    model_path: String,

    /// Total device count across the deployment.
    #[arg(long)]
    world_size: u64,

    /// JSON array of local device ids, e.g. '[0,1,2,3,4,5,6,7]'.
    #[arg(long)]
    device_ids: String,
}

pub fn run(args: ApplyArgs) -> Result<()> {
    args.container_ip
        .parse::<HostAddress>()
        .context("invalid --container-ip")?;

    let device_ids: Value = serde_json::from_str(&args.device_ids)
        .context("--device-ids is not valid JSON")?;
    if !device_ids.is_array() {
        bail!("--device-ids must be a JSON array, got: {device_ids}");
    }

    let raw = std::fs::read_to_string(&args.config_path)
        .with_context(|| format!("failed to read {}", args.config_path.display()))?;
    let mut config: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.config_path.display()))?;

    let backup_path = backup(&args.config_path)?;
    info!(backup = %backup_path.display(), "configuration backed up");

    patch_config(
        &mut config,
        &args.container_ip,
        &args.model_name,
        &args.model_path,
        args.world_size,
        &device_ids,
    )?;

    let patched = serde_json::to_string_pretty(&config)?;
    std::fs::write(&args.config_path, patched + "\n")
        .with_context(|| format!("failed to write {}", args.config_path.display()))?;
    info!(path = %args.config_path.display(), "configuration patched");
    Ok(())
}

/// Copy the config aside as `<name>.backup_<YYYYmmdd_HHMMSS>`.
fn backup(path: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = PathBuf::from(format!("{}.backup_{timestamp}", path.display()));
    std::fs::copy(path, &backup_path)
        .with_context(|| format!("failed to back up {}", path.display()))?;
    Ok(backup_path)
}

/// Key-by-key substitution against the known config layout. A missing
/// section means the file is not the expected config; nothing is guessed.
fn patch_config(
    config: &mut Value,
    container_ip: &str,
    model_name: &str,
    model_path: &str,
    world_size: u64,
    device_ids: &Value,
) -> Result<()> {
    let server = section_mut(config, "ServerConfig")?;
    server["ipAddress"] = json!(container_ip);
    server["managementIpAddress"] = json!(container_ip);
    server["httpsEnabled"] = json!(false);
    server["interCommTLSEnabled"] = json!(false);

    let backend = section_mut(config, "BackendConfig")?;
    backend["multiNodesInferEnabled"] = json!(false);
    backend["interNodeTLSEnabled"] = json!(false);
    backend["npuDeviceIds"] = json!([device_ids]);

    let deploy = section_mut(backend, "ModelDeployConfig")?;
    deploy["maxSeqLen"] = json!(MAX_SEQ_LEN);
    deploy["maxInputTokenLen"] = json!(MAX_INPUT_TOKEN_LEN);

    let model = deploy
        .get_mut("ModelConfig")
        .and_then(|v| v.get_mut(0))
        .filter(|v| v.is_object())
        .context("config has no ModelConfig[0] entry")?;
    model["modelName"] = json!(model_name);
    model["modelWeightPath"] = json!(model_path);
    model["worldSize"] = json!(world_size);

    let schedule = section_mut(section_mut(config, "BackendConfig")?, "ScheduleConfig")?;
    schedule["maxPrefillTokens"] = json!(MAX_PREFILL_TOKENS);
    schedule["maxIterTimes"] = json!(MAX_ITER_TIMES);

    Ok(())
}

fn section_mut<'a>(value: &'a mut Value, key: &str) -> Result<&'a mut Value> {
    let section = value
        .get_mut(key)
        .with_context(|| format!("config has no {key} section"))?;
    if !section.is_object() {
        bail!("config {key} section is not an object");
    }
    Ok(section)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

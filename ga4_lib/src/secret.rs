//! Secret backends for reading the GA4 API secret when it is not passed explicitly.

use std::process::{Command, Stdio};

/// A password manager CLI that can hold the API secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    OnePassword,
    Bitwarden,
    Keepassxc,
}

impl SecretBackend {
    /// Lookup order used by [crate::get_api_secret].
    pub const ALL: [SecretBackend; 3] = [
        SecretBackend::OnePassword,
        SecretBackend::Bitwarden,
        SecretBackend::Keepassxc,
    ];

    /// Read the secret, or `None` when the backend is not configured or fails.
    pub fn read(self) -> Option<String> {
        match self {
            SecretBackend::OnePassword => one_password(),
            SecretBackend::Bitwarden => bitwarden(),
            SecretBackend::Keepassxc => keepassxc(),
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Run a backend CLI and return its trimmed stdout; stderr is discarded.
fn run_cmd(args: &[&str], env_extra: &[(&str, String)]) -> Option<String> {
    let (bin, rest) = args.split_first()?;
    let mut cmd = Command::new(bin);
    cmd.args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    for (k, v) in env_extra {
        cmd.env(k, v);
    }
    let out = cmd.output().ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8(out.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `op://Vault/Item` + field -> `op://Vault/Item/Field`.
fn op_uri(entry_path: &str, field: &str) -> String {
    format!("{}/{}", entry_path.trim_end_matches('/'), field)
}

/// 1Password: `GA4_OP_ENTRY_PATH`, or `GA4_OP_VAULT` + `GA4_OP_ITEM`;
/// field from `GA4_OP_FIELD` (default `API_SECRET`).
fn one_password() -> Option<String> {
    let field = env_nonempty("GA4_OP_FIELD").unwrap_or_else(|| "API_SECRET".to_string());
    let entry = match env_nonempty("GA4_OP_ENTRY_PATH") {
        Some(path) => path,
        None => format!(
            "op://{}/{}",
            env_nonempty("GA4_OP_VAULT")?,
            env_nonempty("GA4_OP_ITEM")?
        ),
    };
    run_cmd(&["op", "read", &op_uri(&entry, &field)], &[])
}

/// Bitwarden: `GA4_BW_ITEM_ID`, optional `GA4_BW_SESSION` passed on as `BW_SESSION`.
fn bitwarden() -> Option<String> {
    let id = env_nonempty("GA4_BW_ITEM_ID")?;
    let env_extra: Vec<(&str, String)> = env_nonempty("GA4_BW_SESSION")
        .map(|s| ("BW_SESSION", s))
        .into_iter()
        .collect();
    run_cmd(&["bw", "get", "password", &id], &env_extra)
}

/// KeePassXC: `GA4_KPXC_DB`, `GA4_KPXC_ENTRY`; attribute from `GA4_KPXC_ATTRIBUTE` (default `Password`).
fn keepassxc() -> Option<String> {
    let db = env_nonempty("GA4_KPXC_DB")?;
    let entry = env_nonempty("GA4_KPXC_ENTRY")?;
    let attr = env_nonempty("GA4_KPXC_ATTRIBUTE").unwrap_or_else(|| "Password".to_string());
    run_cmd(&["keepassxc-cli", "show", "-a", &attr, &db, &entry], &[])
}

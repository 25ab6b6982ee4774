//! Append-only audit trail of mutating actions.
//!
//! One line per action, `TIMESTAMP [ACTOR] VERB: DETAIL`. Writing is best
//! effort: [`AuditLog::record`] reports failures through `tracing` and never
//! fails the operation that triggered it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};

use crate::config::AuditConfig;

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AuditVerb {
    Create,
    Update,
    Delete,
    UpdateQuantity,
    UpdateVisibility,
    CreatePack,
    UpdatePack,
    DeletePack,
    UpdatePackQuantity,
}

impl AuditVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditVerb::Create => "CREATE",
            AuditVerb::Update => "UPDATE",
            AuditVerb::Delete => "DELETE",
            AuditVerb::UpdateQuantity => "UPDATE QUANTITY",
            AuditVerb::UpdateVisibility => "UPDATE VISIBILITY",
            AuditVerb::CreatePack => "CREATE PACK",
            AuditVerb::UpdatePack => "UPDATE PACK",
            AuditVerb::DeletePack => "DELETE PACK",
            AuditVerb::UpdatePackQuantity => "UPDATE PACK QUANTITY",
        }
    }
}

impl core::fmt::Display for AuditVerb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log handle. Cheap to clone; disabled when no file is configured.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        let path = config.path.trim();
        if path.is_empty() {
            Self::disabled()
        } else {
            Self::to_file(path)
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn format_entry(
        at: DateTime<Local>,
        actor: &str,
        verb: AuditVerb,
        detail: &str,
    ) -> String {
        format!("{} [{actor}] {verb}: {detail}\n", at.format(TIMESTAMP_FORMAT))
    }

    /// Append one entry. A disabled log accepts and drops it.
    pub fn append(&self, actor: &str, verb: AuditVerb, detail: &str) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let entry = Self::format_entry(Local::now(), actor, verb, detail);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open audit log {}", path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("failed to write audit log {}", path.display()))?;

        tracing::info!(target: "polybase::audit", actor, verb = verb.as_str(), detail, "audit entry recorded");
        Ok(())
    }

    /// Best-effort append: failures are logged, never returned.
    pub fn record(&self, actor: &str, verb: AuditVerb, detail: &str) {
        if let Err(err) = self.append(actor, verb, detail) {
            tracing::warn!("failed to record audit entry ({verb}): {err:#}");
        }
    }
}

//! public record of a split, kept next to the protected key
//!
//! lists the quorum, share count, prime size and the fingerprint of every
//! share. contains nothing secret; an operator uses it to confirm that a
//! share handed back by a custodian belongs to this split.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Params;
use crate::share::ShareRecord;
use crate::{Error, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub quorum: usize,
    pub share_count: usize,
    pub prime_bits: u64,
    pub fingerprints: Vec<String>,
}

impl Manifest {
    /// describe the shares of one split
    pub fn new(params: Params, records: &[ShareRecord]) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| Error::invalid("manifest needs at least one share"))?;
        if records.len() != params.share_count {
            return Err(Error::invalid(format!(
                "{} shares given for a split of {}",
                records.len(),
                params.share_count
            )));
        }
        Ok(Self {
            quorum: params.quorum,
            share_count: params.share_count,
            prime_bits: first.prime().bits(),
            fingerprints: records.iter().map(ShareRecord::fingerprint).collect(),
        })
    }

    /// 1-based position of `record` in the split, if it belongs to it
    pub fn check(&self, record: &ShareRecord) -> Option<usize> {
        let fingerprint = record.fingerprint();
        self.fingerprints
            .iter()
            .position(|known| known.eq_ignore_ascii_case(&fingerprint))
            .map(|i| i + 1)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(text)?;
        if manifest.quorum == 0
            || manifest.quorum > manifest.share_count
            || manifest.fingerprints.len() != manifest.share_count
        {
            return Err(Error::format("manifest counts are inconsistent"));
        }
        Ok(manifest)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), shares = self.share_count, "manifest written");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

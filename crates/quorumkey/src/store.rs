//! share files on disk

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::share::ShareRecord;
use crate::{Error, Result};

/// file extension of a saved share
pub const SHARE_EXTENSION: &str = "share";

/// write the armored share to `path`, owner read/write only on unix
pub fn save_share(path: impl AsRef<Path>, record: &ShareRecord) -> Result<()> {
    let path = path.as_ref();
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(record.to_armored().as_bytes())?;
    file.sync_all()?;
    debug!(path = %path.display(), fingerprint = %record.fingerprint_prefix(16), "share saved");
    Ok(())
}

pub fn load_share(path: impl AsRef<Path>) -> Result<ShareRecord> {
    let path = path.as_ref();
    let text = Zeroizing::new(fs::read_to_string(path)?);
    let record = ShareRecord::parse(&text).map_err(|err| {
        warn!(path = %path.display(), "share file did not parse");
        err
    })?;
    debug!(path = %path.display(), fingerprint = %record.fingerprint_prefix(16), "share loaded");
    Ok(record)
}

/// write `<prefix>-<i>.share` into `dir` for i = 1..=n, returning the paths
pub fn save_shares(
    dir: impl AsRef<Path>,
    prefix: &str,
    records: &[ShareRecord],
) -> Result<Vec<PathBuf>> {
    if prefix.is_empty() || prefix.contains(std::path::is_separator) {
        return Err(Error::invalid(format!("unusable share file prefix {:?}", prefix)));
    }
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let path = dir.join(format!("{}-{}.{}", prefix, i + 1, SHARE_EXTENSION));
        save_share(&path, record)?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn record(x: u32) -> ShareRecord {
        ShareRecord::new(BigUint::from(x), BigUint::from(x * 3 + 1), BigUint::from(7919u32))
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.share");
        save_share(&path, &record(10)).unwrap();
        assert_eq!(load_share(&path).unwrap(), record(10));

        // overwriting truncates the previous content
        save_share(&path, &record(2)).unwrap();
        assert_eq!(load_share(&path).unwrap(), record(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_share_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.share");
        save_share(&path, &record(5)).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_restricts_existing_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.share");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save_share(&path, &record(6)).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(load_share(&path).unwrap(), record(6));
    }

    #[test]
    fn test_save_shares_names_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("custodians");
        let records = [record(1), record(2), record(3)];
        let paths = save_shares(&out, "rootca", &records).unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["rootca-1.share", "rootca-2.share", "rootca-3.share"]);
        for (path, expected) in paths.iter().zip(&records) {
            assert_eq!(&load_share(path).unwrap(), expected);
        }
    }

    #[test]
    fn test_bad_prefix_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_shares(dir.path(), "", &[record(1)]).is_err());
        assert!(save_shares(dir.path(), "../up", &[record(1)]).is_err());
        assert!(matches!(
            load_share(dir.path().join("absent.share")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.share");
        fs::write(&path, "not a share\n").unwrap();
        assert!(matches!(load_share(&path), Err(Error::Format(_))));
    }
}

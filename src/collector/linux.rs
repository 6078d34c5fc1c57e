// Unix helpers: statvfs for block/inode counts, tune2fs for ext error counts.

use std::path::Path;
use std::time::Duration;

/// Raw counts from statvfs(3). Block figures are already in bytes.
#[derive(Debug, Clone, Copy)]
pub(super) struct FsCounts {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub avail_bytes: u64,
    pub total_inodes: u64,
    pub used_inodes: u64,
    pub free_inodes: u64,
}

#[cfg(unix)]
pub(super) fn statvfs(path: &str) -> std::io::Result<FsCounts> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_path = CString::new(path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: c_path is NUL-terminated and stat points to writable storage of the right size.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: statvfs returned 0, so the struct is initialized.
    let stat = unsafe { stat.assume_init() };

    let block_size = stat.f_frsize as u64;
    let total_bytes = stat.f_blocks as u64 * block_size;
    let free_bytes = stat.f_bfree as u64 * block_size;
    let avail_bytes = stat.f_bavail as u64 * block_size;
    let total_inodes = stat.f_files as u64;
    let free_inodes = stat.f_ffree as u64;
    Ok(FsCounts {
        total_bytes,
        used_bytes: total_bytes.saturating_sub(free_bytes),
        avail_bytes,
        total_inodes,
        used_inodes: total_inodes.saturating_sub(free_inodes),
        free_inodes,
    })
}

#[cfg(not(unix))]
pub(super) fn statvfs(_path: &str) -> std::io::Result<FsCounts> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "statvfs is only available on unix",
    ))
}

pub(super) fn is_ext_family(filesystem: &str) -> bool {
    matches!(filesystem, "ext2" | "ext3" | "ext4")
}

/// Parse "Filesystem errors: N" out of `tune2fs -l` output. Absent line means 0.
pub(super) fn parse_tune2fs_errors(output: &str) -> Option<u64> {
    for line in output.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("Filesystem errors:") {
            return rest.trim().parse().ok();
        }
    }
    Some(0)
}

/// Run `tune2fs -l <device>` (read-only) and return the recorded error count.
pub(super) async fn tune2fs_error_count(device: &Path, timeout: Duration) -> anyhow::Result<u64> {
    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new("tune2fs")
            .arg("-l")
            .arg(device)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| anyhow::anyhow!("tune2fs timed out after {:?}", timeout))??;
    anyhow::ensure!(
        output.status.success(),
        "tune2fs exited with {}",
        output.status
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_tune2fs_errors(&stdout)
        .ok_or_else(|| anyhow::anyhow!("unparseable Filesystem errors line"))
}

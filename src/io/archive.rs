use std::fs::{self, File};
use std::path::Path;
use std::process::Stdio;

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::process::Invocation;

/// Extract `members` from a `.tar.pixz` archive into `destination`.
///
/// Runs `pixz -x <member>... < archive | tar -x -C destination`. Members are
/// paths relative to the archive root; directories extract recursively.
pub fn extract_pixz<P, Q, S>(archive: P, destination: Q, members: &[S]) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<str>,
{
    extract_with(
        Invocation::new("pixz"),
        Invocation::new("tar"),
        archive.as_ref(),
        destination.as_ref(),
        members,
    )
}

/// The pipe behind [`extract_pixz`]; member flags are appended to `pixz`,
/// `-x -C <destination>` to `tar`.
fn extract_with<S: AsRef<str>>(
    pixz: Invocation,
    tar: Invocation,
    archive: &Path,
    destination: &Path,
    members: &[S],
) -> Result<()> {
    if members.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(destination)?;

    debug!(
        "Extracting {} member(s) from {:?} into {:?}",
        members.len(),
        archive,
        destination
    );

    let pixz = pixz.args(pixz_args(members));
    let mut pixz_child = pixz
        .to_command()
        .stdin(File::open(archive)?)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: pixz.program_name(),
            source,
        })?;

    let tarball = pixz_child
        .stdout
        .take()
        .ok_or_else(|| Error::Extraction("pixz produced no output stream".to_string()))?;

    let tar = tar.arg("-x").arg("-C").arg(destination);
    let tar_status = tar
        .to_command()
        .stdin(Stdio::from(tarball))
        .status()
        .map_err(|source| Error::Spawn {
            program: tar.program_name(),
            source,
        });

    // Reap pixz before reporting a tar failure
    let pixz_status = pixz_child.wait()?;
    let tar_status = tar_status?;

    if !pixz_status.success() {
        return Err(Error::Extraction(format!(
            "pixz exited with {} while reading {:?}",
            pixz_status, archive
        )));
    }
    if !tar_status.success() {
        return Err(Error::Extraction(format!(
            "tar exited with {} while extracting into {:?}",
            tar_status, destination
        )));
    }
    Ok(())
}

fn pixz_args<S: AsRef<str>>(members: &[S]) -> Vec<String> {
    members
        .iter()
        .flat_map(|m| ["-x".to_string(), m.as_ref().to_string()])
        .collect()
}

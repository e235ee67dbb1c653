//! Locations inside a SymbiFlow install: device data, helper scripts and the
//! Python environment the scripts expect.
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::io::archive::extract_pixz;
use crate::types::Architecture;

const ICEBOX_SCRIPT: &str = "icebox.py";

#[derive(Debug, Clone)]
pub struct FileManager {
    base: PathBuf,
    devices: PathBuf,
    scripts: PathBuf,
    archive: Option<PathBuf>,
    /// Where to look for helper tools; `PATH` when unset
    search_path: Option<OsString>,
}

/// Device files VPR and genfasm need for one architecture/device pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchInfo {
    pub arch: Architecture,
    pub device: String,
    pub definition: PathBuf,
    pub rr_graph: PathBuf,
    pub place_delay: PathBuf,
    /// Only families with constraint-based placement ship one
    pub vpr_grid_map: Option<PathBuf>,
    arch_dir: PathBuf,
}

impl FileManager {
    pub fn new<P: Into<PathBuf>>(base: P, archive: Option<PathBuf>) -> Self {
        let base = base.into();
        let share = base.join("share").join("symbiflow");
        let devices = share.join("devices");
        let scripts = share.join("scripts");
        Self {
            base,
            devices,
            scripts,
            archive,
            search_path: None,
        }
    }

    pub fn with_search_path<S: Into<OsString>>(mut self, search_path: S) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn script(&self, name: &str) -> PathBuf {
        self.scripts.join(name)
    }

    pub fn arch_script_dir(&self, arch: Architecture) -> PathBuf {
        self.scripts.join(arch.name())
    }

    pub fn arch_script(&self, arch: Architecture, name: &str) -> PathBuf {
        self.arch_script_dir(arch).join(name)
    }

    pub fn yosys_script(&self, arch: Architecture, name: &str) -> PathBuf {
        self.arch_script_dir(arch).join("yosys").join(name)
    }

    /// Pull any of `paths` that are missing out of the configured archive.
    ///
    /// The archive root sits one level above the install base, so members are
    /// named relative to `base`'s parent.
    pub fn jit_extract<I, P>(&self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let Some(archive) = &self.archive else {
            return Ok(());
        };
        let extract_root = self.base.parent().unwrap_or(Path::new("/"));

        let members: Vec<String> = paths
            .into_iter()
            .filter(|p| !p.as_ref().exists())
            .map(|p| relative_member(p.as_ref(), extract_root))
            .collect();

        if members.is_empty() {
            return Ok(());
        }

        info!("Extracting arch info…");
        debug!("Members: {:?}", members);
        extract_pixz(archive, extract_root, &members)
    }

    pub fn arch_info(&self, arch: Architecture, device: &str) -> Result<ArchInfo> {
        let info = match arch {
            Architecture::Ice40 => {
                let arch_dir = self.devices.join(arch.name());
                let underscored = device.replace('-', "_");
                ArchInfo {
                    arch,
                    device: device.to_string(),
                    definition: arch_dir.join("top-routing-virt").join("arch.timing.xml"),
                    rr_graph: arch_dir.join(format!("rr_graph_{}.rr_graph.real.bin", underscored)),
                    place_delay: arch_dir.join(format!("rr_graph_{}.place_delay.bin", underscored)),
                    vpr_grid_map: None,
                    arch_dir,
                }
            }
            Architecture::Xc7 => {
                let arch_dir = self.devices.join(arch.name()).join(device);
                ArchInfo {
                    arch,
                    device: device.to_string(),
                    definition: arch_dir.join("arch.timing.xml"),
                    rr_graph: arch_dir.join(format!("rr_graph_{}.rr_graph.real.bin", device)),
                    place_delay: arch_dir.join(format!("rr_graph_{}.place_delay.bin", device)),
                    vpr_grid_map: Some(arch_dir.join("vpr_grid_map.csv")),
                    arch_dir,
                }
            }
        };

        let mut required = vec![&info.definition, &info.rr_graph, &info.place_delay];
        required.extend(info.vpr_grid_map.as_ref());
        self.jit_extract(required)?;

        Ok(info)
    }

    /// Pin map for `part`, extracted on demand.
    pub fn pinmap(&self, info: &ArchInfo, part: Option<&str>) -> Result<PathBuf> {
        let pinmap = info.pinmap_path(part)?;
        self.jit_extract([&pinmap])?;
        Ok(pinmap)
    }

    /// Module search path for the family's helper scripts.
    pub fn python_path(&self, arch: Architecture) -> Result<OsString> {
        let mut paths = vec![self.scripts.clone(), self.arch_script_dir(arch)];
        if arch == Architecture::Ice40 {
            let icebox = self
                .find_tool(ICEBOX_SCRIPT)
                .ok_or_else(|| Error::ToolNotFound(ICEBOX_SCRIPT.to_string()))?;
            if let Some(dir) = icebox.parent() {
                paths.push(dir.to_path_buf());
            }
        }
        std::env::join_paths(paths).map_err(|e| Error::Io(std::io::Error::other(e)))
    }

    fn find_tool(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(path) => which::which_in(name, Some(path), &self.base).ok(),
            None => which::which(name).ok(),
        }
    }

    pub fn python_env(&self, arch: Architecture) -> Result<BTreeMap<String, OsString>> {
        let mut env = BTreeMap::new();
        env.insert("PYTHONPATH".to_string(), self.python_path(arch)?);
        Ok(env)
    }
}

impl ArchInfo {
    /// Some families key the pin map on the package part, others only on the device.
    pub fn pinmap_path(&self, part: Option<&str>) -> Result<PathBuf> {
        match self.arch {
            Architecture::Ice40 => {
                let dotted = self.device.replace('-', ".");
                Ok(self
                    .arch_dir
                    .join("layouts")
                    .join("icebox")
                    .join(format!("{}.pinmap.csv", dotted)))
            }
            Architecture::Xc7 => {
                let part = part.ok_or_else(|| Error::missing("part"))?;
                Ok(self.arch_dir.join(part).join("pinmap.csv"))
            }
        }
    }
}

fn relative_member(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

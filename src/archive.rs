//! High-level [`NmoArchive`] API: the primary embedding surface.
//!
//! ```no_run
//! use nemofi::archive::{ExtractOptions, NmoArchive};
//!
//! let mut ar = NmoArchive::open("level.nmo")?;
//! let opts = ExtractOptions { output_root: "Dump".into(), list_only: false };
//! let (decoded, report) = ar.extract(&opts)?;
//! println!("{} files written", report.written.len());
//! # Ok::<(), nemofi::NmoError>(())
//! ```

use log::{info, warn};
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io_stream::stream_len;
use crate::sanitize::sanitize_file_name;
use crate::slice::ObjectSlice;
use crate::strict::StrictContents;
use crate::variant::{decode, detect, ContainerVariant, DecodedContainer, TableContents};

pub const MANIFEST_NAME:   &str = "manifest.tsv";
pub const OBJECTS_DIR:     &str = "objects";
pub const COMPONENTS_FILE: &str = "components.bin";
pub const OBJECTS_FILE:    &str = "objects.bin";

// ── ExtractOptions ────────────────────────────────────────────────────────────

/// Run configuration, built once and passed to every output step.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub output_root: PathBuf,
    /// When set, nothing at all is written (not even directories).
    pub list_only:   bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("Dump"),
            list_only:   false,
        }
    }
}

// ── ExtractReport ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// Directory the per-input outputs went to.
    pub output_dir:  Option<PathBuf>,
    /// Every payload file written, in write order.
    pub written:     Vec<PathBuf>,
    pub manifest:    Option<PathBuf>,
    /// Targets written more than once because two entry names sanitized to
    /// the same file name.  The last entry wins.
    pub overwritten: Vec<PathBuf>,
}

// ── NmoArchive ────────────────────────────────────────────────────────────────

/// An opened input file plus the variant detected for it.
///
/// The file handle is owned here and released when the archive is dropped.
pub struct NmoArchive {
    path:    PathBuf,
    file:    File,
    len:     u64,
    variant: ContainerVariant,
}

impl NmoArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let mut file = File::open(&path)?;
        let len = stream_len(&mut file)?;
        let variant = detect(&mut file)?;
        info!("opened {} ({} B, {})", path.display(), len, variant.name());
        Ok(Self { path, file, len, variant })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn len(&self) -> u64 { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn variant(&self) -> &ContainerVariant { &self.variant }

    /// Run the detected strategy.  No output is written.
    pub fn decode(&mut self) -> Result<DecodedContainer> {
        decode(&mut self.file, &self.variant)
    }

    /// Write the outputs for `decoded` under `opts.output_root`.
    ///
    /// In list-only mode this is a no-op returning an empty report.  Files
    /// are written one at a time; on error, files already written remain.
    pub fn write_outputs(&mut self, decoded: &DecodedContainer, opts: &ExtractOptions) -> Result<ExtractReport> {
        if opts.list_only {
            return Ok(ExtractReport::default());
        }
        match decoded {
            DecodedContainer::Strict(contents) => {
                let out_dir = opts.output_root.join(self.stem());
                write_strict(contents, &out_dir)
            }
            DecodedContainer::Table(table) => self.write_table(table, &opts.output_root),
        }
    }

    /// [`decode`](Self::decode) followed by [`write_outputs`](Self::write_outputs).
    pub fn extract(&mut self, opts: &ExtractOptions) -> Result<(DecodedContainer, ExtractReport)> {
        let decoded = self.decode()?;
        let report  = self.write_outputs(&decoded, opts)?;
        Ok((decoded, report))
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_owned())
    }

    fn write_table(&mut self, table: &TableContents, root: &Path) -> Result<ExtractReport> {
        fs::create_dir_all(root)?;
        let mut report = ExtractReport { output_dir: Some(root.to_owned()), ..Default::default() };
        let mut seen = HashSet::new();
        for entry in &table.entries {
            let data = entry.read_payload(&mut self.file)?;
            let out  = root.join(sanitize_file_name(&entry.name));
            if !seen.insert(out.clone()) {
                warn!("entry {:?} overwrites {}", entry.name, out.display());
                report.overwritten.push(out.clone());
            }
            fs::write(&out, &data)?;
            report.written.push(out);
        }
        Ok(report)
    }
}

fn write_strict(contents: &StrictContents, out_dir: &Path) -> Result<ExtractReport> {
    let objects_dir = out_dir.join(OBJECTS_DIR);
    fs::create_dir_all(&objects_dir)?;

    fs::write(out_dir.join(COMPONENTS_FILE), &contents.components)?;
    fs::write(out_dir.join(OBJECTS_FILE), &contents.objects)?;

    let mut report = ExtractReport { output_dir: Some(out_dir.to_owned()), ..Default::default() };
    for slice in &contents.slices {
        let bytes = slice.bytes(&contents.objects)?;
        let out   = objects_dir.join(slice.file_name());
        fs::write(&out, bytes)?;
        report.written.push(out);
    }

    let manifest = out_dir.join(MANIFEST_NAME);
    fs::write(&manifest, manifest_tsv(&contents.slices))?;
    report.manifest = Some(manifest);
    Ok(report)
}

// ── Manifest ──────────────────────────────────────────────────────────────────

/// Tab-separated manifest: one header line, then one row per slice.
pub fn manifest_tsv(slices: &[ObjectSlice]) -> String {
    let mut out = String::from("index\tstart\tsize\ttype\tid\tname\tfile\n");
    for s in slices {
        // Keep one row per line whatever the name contains.
        let name: String = s.name.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}/{}\n",
            s.index, s.start, s.size, s.type_name(), s.id, name, OBJECTS_DIR, s.file_name(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_rows() {
        let slices = vec![
            ObjectSlice { index: 0, class_id: 4, id: 0, name: "PARAMETEROPERATION".into(), start: 0, size: 0 },
            ObjectSlice { index: 1, class_id: 32, id: 17, name: "Box\tMesh".into(), start: 0, size: 40 },
        ];
        let tsv = manifest_tsv(&slices);
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "index\tstart\tsize\ttype\tid\tname\tfile");
        assert_eq!(
            lines[1],
            "0\t0\t0\tPARAMETEROPERATION\t0\tPARAMETEROPERATION\tobjects/0000_PARAMETEROPERATION_0_PARAMETEROPERATION.bin",
        );
        assert_eq!(lines[2], "1\t0\t40\tMESH\t17\tBox Mesh\tobjects/0001_MESH_17_Box_Mesh.bin");
    }

    #[test]
    fn default_options() {
        let o = ExtractOptions::default();
        assert_eq!(o.output_root, PathBuf::from("Dump"));
        assert!(!o.list_only);
    }
}

use crate::capture::CaptureSession;
use crate::error::DatasetError;
use crate::manifest::DatasetManifest;
use chrono::{DateTime, Utc};
use constants::capture::{
    ARCHIVE_COMPRESSION_LEVEL, FALLBACK_DELIVERY_PAUSE_MS, MANIFEST_FILE_NAME,
};
use constants::pose_grid::DEFAULT_EXPORT_CAPTIONS;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Destination of exported files: a directory, a browser download, memory.
pub trait DeliverySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DatasetError>;

    /// Spacing between consecutive captures when files are delivered one by one.
    fn pause(&mut self, _duration: Duration) {}
}

/// An archive being assembled in memory.
pub trait ArchiveBuilder {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), DatasetError>;

    fn finalize(self: Box<Self>, compression_level: i64) -> Result<Vec<u8>, DatasetError>;
}

pub trait ArchiveFactory: Send + Sync {
    fn create_archive(&self) -> Result<Box<dyn ArchiveBuilder>, DatasetError>;
}

/// DEFLATE zip archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveFactory;

impl ArchiveFactory for ZipArchiveFactory {
    fn create_archive(&self) -> Result<Box<dyn ArchiveBuilder>, DatasetError> {
        Ok(Box::new(ZipArchiveBuilder::default()))
    }
}

/// Buffers entries until the compression level is known at finalize time.
#[derive(Default)]
struct ZipArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), DatasetError> {
        self.entries.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn finalize(self: Box<Self>, compression_level: i64) -> Result<Vec<u8>, DatasetError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level));

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| DatasetError::Packaging(format!("{}: {}", name, e)))?;
            writer.write_all(&bytes)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| DatasetError::Packaging(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Writes every delivered file into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DatasetError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| DatasetError::Delivery {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Keeps delivered files in memory, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
    pub pauses: Vec<Duration>,
}

impl MemorySink {
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(file_name, _)| file_name == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl DeliverySink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DatasetError> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub export_captions: bool,
    pub inter_capture_pause: Duration,
    pub compression_level: i64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_captions: DEFAULT_EXPORT_CAPTIONS,
            inter_capture_pause: Duration::from_millis(FALLBACK_DELIVERY_PAUSE_MS),
            compression_level: ARCHIVE_COMPRESSION_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportPath {
    Archive { file_name: String },
    Individual { files: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: ExportPath,
    pub captures: usize,
    pub manifest: DatasetManifest,
}

type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Assembles a capture session into a dataset.
///
/// With an archive factory the dataset is delivered as a single zip. If no
/// factory is configured, or packaging or delivering the archive fails, every
/// file is delivered on its own followed by a standalone manifest.
///
/// ```text
/// archive                                 individual fallback
/// lora_dataset_<trigger>_<date>.zip       0001-xxxxxx_start.png
///   0001-xxxxxx_start.png                 0001-xxxxxx_end.png
///   0001-xxxxxx_end.png                   0001-xxxxxx.txt
///   0001-xxxxxx.txt                       ... (pause between captures)
///   ...                                   lora_dataset_<trigger>_config.json
///   dataset_config.json
/// ```
#[derive(Clone, Default)]
pub struct DatasetPackager {
    options: ExportOptions,
    archive: Option<Arc<dyn ArchiveFactory>>,
    on_status: Option<StatusCallback>,
}

impl DatasetPackager {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            archive: None,
            on_status: None,
        }
    }

    pub fn with_archive(mut self, factory: Arc<dyn ArchiveFactory>) -> Self {
        self.archive = Some(factory);
        self
    }

    /// Receives human-readable progress while exporting.
    ///
    /// Called synchronously from `export`, so it must not lock anything the
    /// caller holds during the export.
    pub fn on_status(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(callback));
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn export(
        &self,
        session: &CaptureSession,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, DatasetError> {
        self.export_at(session, sink, Utc::now())
    }

    pub fn export_at(
        &self,
        session: &CaptureSession,
        sink: &mut dyn DeliverySink,
        created_at: DateTime<Utc>,
    ) -> Result<ExportReport, DatasetError> {
        if session.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }

        let manifest =
            DatasetManifest::from_session(session, self.options.export_captions, created_at);
        let manifest_json = manifest.to_json()?;

        match &self.archive {
            Some(factory) => {
                let file_name = format!(
                    "lora_dataset_{}_{}.zip",
                    file_name_token(&manifest.trigger_word),
                    created_at.format("%Y-%m-%d")
                );
                let delivered = self
                    .build_archive(factory.as_ref(), session, &manifest_json)
                    .and_then(|bytes| sink.deliver(&file_name, &bytes));

                match delivered {
                    Ok(()) => {
                        info!("Exported {} ({} captures)", file_name, session.len());
                        self.status(&format!("Archive exported ({} captures)", session.len()));
                        return Ok(ExportReport {
                            path: ExportPath::Archive { file_name },
                            captures: session.len(),
                            manifest,
                        });
                    }
                    Err(e) => {
                        warn!("Archive export failed, falling back to individual files: {}", e);
                        self.status("Archive failed, delivering individual files...");
                    }
                }
            }
            None => info!("No archive support configured, delivering individual files"),
        }

        let files = self.deliver_individually(session, sink, &manifest, &manifest_json)?;
        self.status(&format!(
            "Exported {} captures as individual files",
            session.len()
        ));

        Ok(ExportReport {
            path: ExportPath::Individual { files },
            captures: session.len(),
            manifest,
        })
    }

    fn build_archive(
        &self,
        factory: &dyn ArchiveFactory,
        session: &CaptureSession,
        manifest_json: &str,
    ) -> Result<Vec<u8>, DatasetError> {
        let extension = session
            .config()
            .map(|config| config.encoding.extension())
            .unwrap_or("png");
        let mut archive = factory.create_archive()?;

        let total = session.len();
        for (i, capture) in session.captures().iter().enumerate() {
            self.status(&format!("Adding to archive {}/{}...", i + 1, total));

            archive.add_file(&capture.id.start_image_name(extension), &capture.start_image)?;
            archive.add_file(&capture.id.end_image_name(extension), &capture.end_image)?;
            if self.options.export_captions {
                archive.add_file(&capture.id.caption_file_name(), capture.caption.as_bytes())?;
            }
        }
        archive.add_file(MANIFEST_FILE_NAME, manifest_json.as_bytes())?;

        self.status("Compressing archive...");
        archive.finalize(self.options.compression_level)
    }

    fn deliver_individually(
        &self,
        session: &CaptureSession,
        sink: &mut dyn DeliverySink,
        manifest: &DatasetManifest,
        manifest_json: &str,
    ) -> Result<Vec<String>, DatasetError> {
        let total = session.len();
        let mut files = Vec::with_capacity(total * 3 + 1);

        for (i, (capture, entry)) in session
            .captures()
            .iter()
            .zip(manifest.captures.iter())
            .enumerate()
        {
            sink.deliver(&entry.start_image, &capture.start_image)?;
            files.push(entry.start_image.clone());

            sink.deliver(&entry.end_image, &capture.end_image)?;
            files.push(entry.end_image.clone());

            if let Some(prompt_file) = &entry.prompt_file {
                sink.deliver(prompt_file, capture.caption.as_bytes())?;
                files.push(prompt_file.clone());
            }

            self.status(&format!("Delivering {}/{}...", i + 1, total));
            sink.pause(self.options.inter_capture_pause);
        }

        let manifest_name = format!(
            "lora_dataset_{}_config.json",
            file_name_token(&manifest.trigger_word)
        );
        sink.deliver(&manifest_name, manifest_json.as_bytes())?;
        files.push(manifest_name);

        info!("Delivered {} captures as {} files", total, files.len());
        Ok(files)
    }

    fn status(&self, status: &str) {
        if let Some(callback) = &self.on_status {
            callback(status);
        }
    }
}

/// Trigger token as it may appear in a delivered file name. Anything but
/// ASCII alphanumerics, `-` and `_` becomes `_`.
fn file_name_token(trigger: &str) -> String {
    trigger
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

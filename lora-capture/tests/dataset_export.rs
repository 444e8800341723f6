mod common;

use chrono::{TimeZone, Utc};
use common::{ScriptedDriver, config};
use lora_capture::{
    ArchiveBuilder, ArchiveFactory, CaptureScheduler, CaptureSession, DatasetError,
    DatasetManifest, DatasetPackager, DeliverySink, ExportOptions, ExportPath, MemorySink,
    ZipArchiveFactory,
};
use parking_lot::Mutex;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

async fn captured_session(elevations: &str, azimuths: &str) -> CaptureSession {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    scheduler
        .start_capture(&config(elevations, azimuths, false), &mut driver)
        .await
        .unwrap();
    scheduler.session().clone()
}

struct BrokenArchiveFactory;

impl ArchiveFactory for BrokenArchiveFactory {
    fn create_archive(&self) -> Result<Box<dyn ArchiveBuilder>, DatasetError> {
        Err(DatasetError::Packaging("archive support unavailable".to_string()))
    }
}

/// Refuses anything that looks like an archive.
#[derive(Default)]
struct NoZipSink(MemorySink);

impl DeliverySink for NoZipSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DatasetError> {
        if file_name.ends_with(".zip") {
            return Err(DatasetError::Delivery {
                file: file_name.to_string(),
                reason: "download blocked".to_string(),
            });
        }
        self.0.deliver(file_name, bytes)
    }

    fn pause(&mut self, duration: Duration) {
        self.0.pause(duration);
    }
}

#[tokio::test]
async fn archive_contains_pairs_captions_and_manifest() {
    let session = captured_session("0, 30", "0, 90, 180").await;
    let packager = DatasetPackager::new(ExportOptions::default())
        .with_archive(Arc::new(ZipArchiveFactory));
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

    let mut sink = MemorySink::default();
    let report = packager.export_at(&session, &mut sink, created_at).unwrap();

    assert_eq!(
        report.path,
        ExportPath::Archive {
            file_name: "lora_dataset_sks_2024-05-01.zip".to_string()
        }
    );
    assert_eq!(report.captures, 6);
    assert_eq!(sink.files.len(), 1);
    assert!(sink.pauses.is_empty());

    let bytes = sink.file("lora_dataset_sks_2024-05-01.zip").unwrap().to_vec();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 6 * 3 + 1);

    let mut manifest_json = String::new();
    archive
        .by_name("dataset_config.json")
        .unwrap()
        .read_to_string(&mut manifest_json)
        .unwrap();
    let manifest: DatasetManifest = serde_json::from_str(&manifest_json).unwrap();
    assert_eq!(manifest.total_captures, 6);
    assert_eq!(manifest.captures.len(), 6);
    assert_eq!(manifest.trigger_word, "sks");
    assert_eq!(manifest.elevations, "0, 30");

    let first = &session.captures()[0];
    let mut caption = String::new();
    archive
        .by_name(&first.id.caption_file_name())
        .unwrap()
        .read_to_string(&mut caption)
        .unwrap();
    assert_eq!(caption, first.caption);

    let mut start = Vec::new();
    archive
        .by_name(&first.id.start_image_name("png"))
        .unwrap()
        .read_to_end(&mut start)
        .unwrap();
    assert_eq!(start.as_slice(), &*first.start_image);
}

#[tokio::test]
async fn broken_archive_falls_back_to_individual_files() {
    let session = captured_session("0", "0, 90").await;
    let statuses = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = statuses.clone();
    let packager = DatasetPackager::new(ExportOptions::default())
        .with_archive(Arc::new(BrokenArchiveFactory))
        .on_status(move |status| recorder.lock().push(status.to_string()));

    let mut sink = MemorySink::default();
    let report = packager.export(&session, &mut sink).unwrap();

    let ids: Vec<String> = session.captures().iter().map(|c| c.id.to_string()).collect();
    let expected = vec![
        format!("{}_start.png", ids[0]),
        format!("{}_end.png", ids[0]),
        format!("{}.txt", ids[0]),
        format!("{}_start.png", ids[1]),
        format!("{}_end.png", ids[1]),
        format!("{}.txt", ids[1]),
        "lora_dataset_sks_config.json".to_string(),
    ];
    assert_eq!(sink.file_names(), expected);
    assert_eq!(report.path, ExportPath::Individual { files: expected });
    assert_eq!(sink.pauses, vec![Duration::from_millis(200); 2]);

    let statuses = statuses.lock();
    assert!(statuses.contains(&"Archive failed, delivering individual files...".to_string()));
    assert_eq!(
        statuses.last().map(String::as_str),
        Some("Exported 2 captures as individual files")
    );
}

#[tokio::test]
async fn failed_archive_delivery_falls_back() {
    let session = captured_session("0", "0").await;
    let packager = DatasetPackager::new(ExportOptions::default())
        .with_archive(Arc::new(ZipArchiveFactory));

    let mut sink = NoZipSink::default();
    let report = packager.export(&session, &mut sink).unwrap();

    assert!(matches!(report.path, ExportPath::Individual { .. }));
    assert_eq!(sink.0.files.len(), 4);
}

#[tokio::test]
async fn missing_archive_support_delivers_individually() {
    let session = captured_session("0", "0, 180").await;
    let packager = DatasetPackager::new(ExportOptions::default());

    let mut sink = MemorySink::default();
    packager.export(&session, &mut sink).unwrap();

    let manifest: DatasetManifest =
        serde_json::from_slice(sink.file("lora_dataset_sks_config.json").unwrap()).unwrap();
    assert_eq!(manifest.total_captures, 2);
    assert_eq!(manifest.captures[1].id, session.captures()[1].id.to_string());
}

#[tokio::test]
async fn captions_can_be_left_out() {
    let session = captured_session("0", "0, 90").await;
    let options = ExportOptions {
        export_captions: false,
        ..ExportOptions::default()
    };
    let packager = DatasetPackager::new(options).with_archive(Arc::new(ZipArchiveFactory));

    let mut sink = MemorySink::default();
    let report = packager.export(&session, &mut sink).unwrap();

    assert!(!report.manifest.txt_captions_included);
    assert!(report.manifest.captures.iter().all(|c| c.prompt_file.is_none()));

    let bytes = sink.files[0].1.clone();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2 * 2 + 1);
    assert!(archive.file_names().all(|name| !name.ends_with(".txt")));
}

#[test]
fn empty_session_is_not_exported() {
    let packager = DatasetPackager::new(ExportOptions::default())
        .with_archive(Arc::new(ZipArchiveFactory));
    let mut sink = MemorySink::default();

    let result = packager.export(&CaptureSession::default(), &mut sink);

    assert!(matches!(result, Err(DatasetError::EmptyDataset)));
    assert!(sink.files.is_empty());
}

#[tokio::test]
async fn path_like_trigger_stays_a_plain_file_name() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    let mut capture_config = config("0", "0", false);
    capture_config.trigger_token = "../x".to_string();
    scheduler
        .start_capture(&capture_config, &mut driver)
        .await
        .unwrap();
    let session = scheduler.session().clone();

    let mut sink = MemorySink::default();
    DatasetPackager::new(ExportOptions::default())
        .export(&session, &mut sink)
        .unwrap();

    assert!(sink.file("lora_dataset____x_config.json").is_some());
    assert!(sink.file_names().iter().all(|name| !name.contains('/')));
}

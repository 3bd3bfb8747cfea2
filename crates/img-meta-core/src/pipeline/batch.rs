//! Batch extraction over a directory with bounded concurrency.
//!
//! One tokio task is spawned per file; a semaphore admits at most
//! `concurrency` of them into the extractor at a time. Results land in
//! per-file slots so the report follows the sorted file order no matter
//! which task finishes first. The first failure aborts everything else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::{DecodeError, ExtractionError, ExtractionResult};
use crate::types::{AggregateReport, ImageMetadata};

use super::discovery::{relative_key, FileDiscovery};
use super::processor::ImageProcessor;

/// Directory-level pipeline: discover, extract, assemble.
#[derive(Clone)]
pub struct BatchPipeline {
    processor: ImageProcessor,
    discovery: FileDiscovery,
    concurrency: usize,
}

impl BatchPipeline {
    /// Create a pipeline. A `concurrency` of zero is treated as one.
    pub fn new(processor: ImageProcessor, discovery: FileDiscovery, concurrency: usize) -> Self {
        Self {
            processor,
            discovery,
            concurrency: concurrency.max(1),
        }
    }

    /// Pipeline using the file decoder and the configured extensions/concurrency.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ImageProcessor::default(),
            FileDiscovery::new(&config.processing.extensions),
            config.processing.concurrency,
        )
    }

    /// Maximum number of extractions in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Sorted list of supported files under `root`.
    pub fn discover(&self, root: &Path) -> ExtractionResult<Vec<PathBuf>> {
        self.discovery.discover(root)
    }

    /// Discover and extract everything under `root`.
    pub async fn run(&self, root: &Path) -> ExtractionResult<AggregateReport> {
        let files = self.discover(root)?;
        self.process_files(root, files, |_| {}).await
    }

    /// Extract already-discovered `files` and key them relative to `root`.
    ///
    /// `on_complete` is called once per successfully extracted file, in
    /// completion order.
    pub async fn process_files<F>(
        &self,
        root: &Path,
        files: Vec<PathBuf>,
        on_complete: F,
    ) -> ExtractionResult<AggregateReport>
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        tracing::info!("Extracting metadata for {} file(s)", files.len());
        let start = std::time::Instant::now();

        let metadata = self.extract_all(&files, on_complete).await?;

        let mut report = AggregateReport::with_capacity(files.len());
        for (path, meta) in files.iter().zip(metadata) {
            let key = relative_key(root, path);
            if !report.push(key.clone(), meta) {
                return Err(ExtractionError::DuplicateKey {
                    path: path.clone(),
                    key,
                });
            }
        }

        tracing::info!(
            "Extracted {} image(s) in {:?}",
            report.len(),
            start.elapsed()
        );
        Ok(report)
    }

    /// Run the extractor over `files`, returning results in input order.
    async fn extract_all<F>(
        &self,
        files: &[PathBuf],
        on_complete: F,
    ) -> ExtractionResult<Vec<ImageMetadata>>
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let on_complete = Arc::new(on_complete);
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::with_capacity(files.len());

        for (index, path) in files.iter().enumerate() {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let on_complete = on_complete.clone();
            let path = path.clone();

            let handle = tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => processor.extract(&path).await,
                    Err(_) => Err(ExtractionError::DecodeFailure {
                        path: path.clone(),
                        source: DecodeError::Join("concurrency gate closed".to_string()),
                    }),
                };
                if result.is_ok() {
                    on_complete(&path);
                }
                (index, result)
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<ImageMetadata>> = vec![None; files.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(meta))) => slots[index] = Some(meta),
                Ok((_, Err(e))) => {
                    tracing::error!("Aborting batch: {}", e);
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    let path = task_index
                        .get(&e.id())
                        .map(|&i| files[i].clone())
                        .unwrap_or_default();
                    return Err(ExtractionError::DecodeFailure {
                        path,
                        source: DecodeError::Join(e.to_string()),
                    });
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{format_report, OutputFormat};
    use crate::pipeline::decode::ImageDecoder;
    use crate::types::DecodedImageInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Decoder stub: per-file delay, optional failing file, and a record of
    /// how many decodes were running at once.
    #[derive(Default)]
    struct StubDecoder {
        slow_file: Option<&'static str>,
        failing_file: Option<&'static str>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageDecoder for StubDecoder {
        async fn decode(&self, path: &Path) -> Result<DecodedImageInfo, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let delay = if Some(name) == self.slow_file {
                self.delay * 10
            } else {
                self.delay
            };
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if Some(name) == self.failing_file {
                return Err(DecodeError::Other("Input file is corrupt".into()));
            }
            Ok(DecodedImageInfo {
                width: Some(name.len() as u32),
                height: Some(1),
                ..Default::default()
            })
        }
    }

    fn touch_all(root: &Path, names: &[String]) {
        for name in names {
            std::fs::write(root.join(name), b"").unwrap();
        }
    }

    fn pipeline(decoder: Arc<StubDecoder>, concurrency: usize) -> BatchPipeline {
        BatchPipeline::new(
            ImageProcessor::new(decoder),
            FileDiscovery::new(["jpg", "jpeg", "png", "ico"]),
            concurrency,
        )
    }

    #[tokio::test]
    async fn test_order_independent_of_completion() {
        let dir = tempfile::tempdir().unwrap();
        touch_all(dir.path(), &["b.jpg".into(), "a.jpg".into(), "c.jpg".into()]);

        let decoder = Arc::new(StubDecoder {
            slow_file: Some("b.jpg"),
            delay: Duration::from_millis(5),
            ..Default::default()
        });
        let report = pipeline(decoder, 20).run(dir.path()).await.unwrap();

        assert_eq!(
            report.keys().collect::<Vec<_>>(),
            vec!["/a.jpg", "/b.jpg", "/c.jpg"]
        );
    }

    #[tokio::test]
    async fn test_single_failure_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..50).map(|i| format!("img_{i:02}.jpg")).collect();
        touch_all(dir.path(), &names);

        let decoder = Arc::new(StubDecoder {
            failing_file: Some("img_17.jpg"),
            delay: Duration::from_millis(1),
            ..Default::default()
        });
        let err = pipeline(decoder, 20).run(dir.path()).await.unwrap_err();

        match &err {
            ExtractionError::DecodeFailure { path, .. } => {
                assert_eq!(path, &dir.path().join("img_17.jpg"));
            }
            other => panic!("expected DecodeFailure, got {other:?}"),
        }
        assert!(err.to_string().contains("img_17.jpg"));
    }

    #[tokio::test]
    async fn test_concurrency_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..40).map(|i| format!("{i:02}.png")).collect();
        touch_all(dir.path(), &names);

        let decoder = Arc::new(StubDecoder {
            delay: Duration::from_millis(5),
            ..Default::default()
        });
        let report = pipeline(decoder.clone(), 4).run(dir.path()).await.unwrap();

        assert_eq!(report.len(), 40);
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 40);
        let max = decoder.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {max} concurrent decodes");
        assert!(max > 1, "decodes never overlapped");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_ceiling_multi_thread() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..60).map(|i| format!("{i:02}.jpg")).collect();
        touch_all(dir.path(), &names);

        let decoder = Arc::new(StubDecoder {
            delay: Duration::from_millis(2),
            ..Default::default()
        });
        pipeline(decoder.clone(), 3).run(dir.path()).await.unwrap();

        assert!(decoder.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_progress_callback_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..7).map(|i| format!("{i}.jpg")).collect();
        touch_all(dir.path(), &names);

        let pipeline = pipeline(Arc::new(StubDecoder::default()), 2);
        let files = pipeline.discover(dir.path()).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();
        pipeline
            .process_files(dir.path(), files, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert_eq!(done.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_empty_directory_gives_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = pipeline(Arc::new(StubDecoder::default()), 20)
            .run(dir.path())
            .await
            .unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root() {
        let err = pipeline(Arc::new(StubDecoder::default()), 20)
            .run(Path::new("/nonexistent/img-meta-root"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::RootUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_key_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        touch_all(dir.path(), &["a.jpg".into()]);
        let file = dir.path().join("a.jpg");

        let err = pipeline(Arc::new(StubDecoder::default()), 2)
            .process_files(dir.path(), vec![file.clone(), file.clone()], |_| {})
            .await
            .unwrap_err();

        match err {
            ExtractionError::DuplicateKey { path, key } => {
                assert_eq!(path, file);
                assert_eq!(key, "/a.jpg");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exif_from_jpeg_files() {
        use crate::pipeline::decode::tests::{orientation_block, write_jpeg_with_exif};
        use crate::pipeline::metadata::tests::prague_block;

        let dir = tempfile::tempdir().unwrap();
        write_jpeg_with_exif(&dir.path().join("rotated.jpg"), 40, 30, &orientation_block(6));
        write_jpeg_with_exif(&dir.path().join("trip.jpg"), 24, 12, &prague_block("S", "W"));

        let report = BatchPipeline::from_config(&Config::default())
            .run(dir.path())
            .await
            .unwrap();

        let rotated = report.get("/rotated.jpg").unwrap();
        assert_eq!((rotated.width, rotated.height), (30, 40));
        assert_eq!(rotated.map_link, None);

        let trip = report.get("/trip.jpg").unwrap();
        assert_eq!((trip.width, trip.height), (24, 12));
        assert_eq!(trip.captured_at.as_deref(), Some("2021-05-03T10:20:30.000Z"));
        assert!(trip
            .map_link
            .as_deref()
            .unwrap()
            .ends_with("-50.0868417,-14.4208667"));
    }

    #[tokio::test]
    async fn test_runs_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        for (name, w, h) in [("z.png", 8, 2), ("nested/m.png", 3, 9), ("a.png", 1, 1)] {
            image::RgbImage::new(w, h).save(dir.path().join(name)).unwrap();
        }

        let pipeline = BatchPipeline::from_config(&Config::default());
        let invocation = vec!["img-meta".to_string(), "public".to_string()];

        let first = pipeline.run(dir.path()).await.unwrap();
        let second = pipeline.run(dir.path()).await.unwrap();
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["/a.png", "/nested/m.png", "/z.png"]
        );
        assert_eq!(first.get("/nested/m.png").map(|m| (m.width, m.height)), Some((3, 9)));

        for format in [OutputFormat::Data, OutputFormat::Source] {
            assert_eq!(
                format_report(&first, format, &invocation).unwrap(),
                format_report(&second, format, &invocation).unwrap()
            );
        }
    }
}

//! Cross-stage tests: fetch record in, final report out.

#[cfg(test)]
mod tests {
    use crate::analysis::{CorpusAnalysis, CorpusAnalyzer};
    use crate::cancellation::CancellationToken;
    use crate::config::PipelineConfig;
    use crate::coordination::{completion_channel, FetchItem, ProcessItem, ProcessRecord, StorageLayout};
    use crate::core::{ItemStatus, StageKind, StageOutcome};
    use crate::errors::CorpusflowError;
    use crate::process::{DocumentProcessor, ProcessedDocument};
    use crate::stages::{run_in_process, run_stage, PipelineOutcome};
    use crate::storage::{read_json, FsStorage, MemoryStorage, MockStorage, Storage};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_config(root: impl Into<std::path::PathBuf>) -> PipelineConfig {
        PipelineConfig::default()
            .with_root(root)
            .with_poll_interval_ms(10)
    }

    /// A fetch record as the upstream fetcher writes it, extra fields included.
    fn fetch_record_json(items: &[(&str, &str)]) -> Vec<u8> {
        let results: Vec<_> = items
            .iter()
            .map(|(file, status)| {
                json!({ "url": format!("http://example.com/{file}"), "file": file, "status": status })
            })
            .collect();
        let successful = items.iter().filter(|(_, s)| *s == "success").count();
        serde_json::to_vec(&json!({
            "timestamp": "2024-05-01T12:00:00.000000+00:00",
            "urls_processed": items.len(),
            "successful": successful,
            "failed": items.len() - successful,
            "results": results,
        }))
        .unwrap()
    }

    fn seed_memory(storage: &MemoryStorage, docs: &[(&str, &str)]) {
        for (file, html) in docs {
            storage.insert(format!("/shared/raw/{file}"), *html);
        }
        let items: Vec<(&str, &str)> = docs.iter().map(|(file, _)| (*file, "success")).collect();
        storage.insert(
            "/shared/status/fetch_complete.json",
            fetch_record_json(&items),
        );
    }

    #[tokio::test]
    async fn test_fetch_to_report_over_memory_storage() {
        let storage = Arc::new(MemoryStorage::new());
        seed_memory(
            &storage,
            &[
                ("page_1.html", "<html><body><p>a b</p></body></html>"),
                ("page_2.html", "<p>a c</p><a href=\"/next\">A</a>"),
            ],
        );
        let config = test_config("/shared");
        let shared: Arc<dyn Storage> = storage.clone();
        let cancel = CancellationToken::new();

        let processed = run_stage(&DocumentProcessor::polling(Arc::clone(&shared), &config), &cancel)
            .await
            .unwrap();
        assert_eq!(processed, StageOutcome::completed(2, 0));

        let analyzed = run_stage(&CorpusAnalyzer::polling(shared, &config), &cancel)
            .await
            .unwrap();
        assert_eq!(analyzed, StageOutcome::completed(2, 0));

        let record: ProcessRecord =
            read_json(&*storage, Path::new("/shared/status/process_complete.json")).unwrap();
        assert!(record.is_consistent());
        assert_eq!(record.results[1].output_file, "page_2.json");
        assert_eq!(record.results[1].counts.map(|c| c.link_count), Some(1));

        let report: CorpusAnalysis =
            read_json(&*storage, Path::new("/shared/analysis/final_report.json")).unwrap();
        assert_eq!(report.documents_processed, 2);
        // page_2 contributes "a c a"
        assert_eq!(report.total_words, 5);
        assert_eq!(report.unique_words, 3);
        assert_eq!(report.top_words[0].word, "a");
        assert_eq!(report.top_words[0].count, 3);
        assert_eq!(report.document_similarity.len(), 1);
        assert_eq!(report.document_similarity[0].doc_a, "page_1.json");
        assert_eq!(report.document_similarity[0].doc_b, "page_2.json");
        assert!((report.document_similarity[0].similarity - 0.3333).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_stages_wait_for_upstream_on_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let layout = config.storage.clone();
        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new());
        let cancel = CancellationToken::new();

        // Downstream stages start first and wait.
        let processor = DocumentProcessor::polling(Arc::clone(&storage), &config);
        let analyzer = CorpusAnalyzer::polling(Arc::clone(&storage), &config);
        let stages = async {
            tokio::try_join!(run_stage(&processor, &cancel), run_stage(&analyzer, &cancel))
        };

        let fetcher = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::create_dir_all(layout.raw_dir()).unwrap();
            std::fs::create_dir_all(layout.status_dir()).unwrap();
            std::fs::write(layout.raw_dir().join("one.html"), "<p>shared alpha. Second line!</p>")
                .unwrap();
            std::fs::write(layout.raw_dir().join("two.html"), "<p>shared beta</p>").unwrap();
            std::fs::write(
                layout.fetch_record_path(),
                fetch_record_json(&[
                    ("one.html", "success"),
                    ("two.html", "success"),
                    ("three.html", "failed"),
                ]),
            )
            .unwrap();
        };

        let (outcomes, ()) = tokio::join!(stages, fetcher);
        let (processed, analyzed) = outcomes.unwrap();
        assert_eq!(processed, StageOutcome::completed(2, 0));
        assert_eq!(analyzed, StageOutcome::completed(2, 0));

        let doc: ProcessedDocument = serde_json::from_slice(
            &std::fs::read(layout.processed_dir().join("one.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(doc.statistics.sentence_count, 2);

        let report: CorpusAnalysis =
            serde_json::from_slice(&std::fs::read(layout.report_path()).unwrap()).unwrap();
        assert_eq!(report.documents_processed, 2);
        // {shared, alpha, second, line} vs {shared, beta}
        assert!((report.document_similarity[0].similarity - 0.2).abs() < f64::EPSILON);

        let leftovers: Vec<_> = std::fs::read_dir(layout.status_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_zero_upstream_successes() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "/shared/status/fetch_complete.json",
            fetch_record_json(&[("a.html", "failed"), ("b.html", "failed")]),
        );
        let config = test_config("/shared");
        let shared: Arc<dyn Storage> = storage.clone();

        let outcome = run_in_process(shared, &config, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PipelineOutcome {
                process: StageOutcome::completed(0, 0),
                analyze: StageOutcome::NothingToDo,
            }
        );

        let record: ProcessRecord =
            read_json(&*storage, Path::new("/shared/status/process_complete.json")).unwrap();
        assert_eq!(record.items_total, 0);
        assert!(!storage.exists(Path::new("/shared/analysis/final_report.json")));
    }

    #[tokio::test]
    async fn test_in_process_run_produces_report() {
        let storage = Arc::new(MemoryStorage::new());
        seed_memory(
            &storage,
            &[
                ("x.html", "<p>The cat sat.</p>"),
                ("y.html", "<p>The dog sat.</p>"),
                ("z.html", "<p>A bird flew.</p>"),
            ],
        );
        let config = test_config("/shared");

        let outcome = run_in_process(storage.clone(), &config, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.process, StageOutcome::completed(3, 0));
        assert_eq!(outcome.analyze, StageOutcome::completed(3, 0));

        let report: CorpusAnalysis =
            read_json(&*storage, Path::new("/shared/analysis/final_report.json")).unwrap();
        assert_eq!(report.document_similarity.len(), 3);
        assert_eq!(report.top_bigrams[0].bigram, "the cat");
        assert!(report.readability.complexity_score > 0.0);
    }

    #[tokio::test]
    async fn test_completion_record_write_failure_is_fatal() {
        let mut storage = MockStorage::new();
        storage.expect_create_dir_all().returning(|_| Ok(()));
        storage
            .expect_read()
            .returning(|_| Ok(b"<p>hello</p>".to_vec()));
        storage.expect_write_atomic().returning(|path, _| {
            if path.ends_with("process_complete.json") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
            } else {
                Ok(())
            }
        });

        let (notifier, waiter) = completion_channel(StageKind::Fetch);
        notifier.publish(crate::coordination::FetchRecord::from_results(vec![
            FetchItem::new("a.html", ItemStatus::Success),
        ]));
        let processor =
            DocumentProcessor::new(Arc::new(storage), StorageLayout::default(), Arc::new(waiter));

        let err = run_stage(&processor, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusflowError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
    }

    #[tokio::test]
    async fn test_directory_creation_failure_is_fatal() {
        let mut storage = MockStorage::new();
        storage
            .expect_create_dir_all()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")));
        let (_notifier, waiter) = completion_channel::<ProcessItem>(StageKind::Process);
        let analyzer =
            CorpusAnalyzer::new(Arc::new(storage), StorageLayout::default(), Arc::new(waiter));

        let err = run_stage(&analyzer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusflowError::Io(_)));
    }

    #[tokio::test]
    async fn test_upstream_timeout() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let config = test_config("/shared").with_timeout_secs(0);

        let err = run_stage(
            &DocumentProcessor::polling(storage, &config),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CorpusflowError::UpstreamTimeout { .. }));
    }

    #[tokio::test]
    async fn test_cancel_stops_waiting_pipeline() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let config = test_config("/shared");
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                cancel.cancel("interrupted");
            })
        };

        let err = run_in_process(storage, &config, &cancel).await.unwrap_err();
        assert!(err.is_cancellation());
        canceller.await.unwrap();
    }
}

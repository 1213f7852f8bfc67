fn main() {
    println!("Run `cargo test -p session-flow` to execute session flow tests.");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use uplift_engine::{
        BearerAuth, EngineConfig, EngineError, EngineEvent, FileCandidate, FileId,
        RequestDecorator, RequestMeta, StagedFile, UploadEngine,
    };
    use uplift_session::{ProgressSnapshot, SessionController, UploadPolicy, UploadStep};

    const MIB: u64 = 1024 * 1024;

    /// Engine double that simulates a whole transfer when `upload` is
    /// called: a progress tick per staged file, then per-file success (or
    /// one scripted failure), then the terminal event.
    struct ScriptedEngine {
        config: EngineConfig,
        tx: mpsc::UnboundedSender<EngineEvent>,
        staged: Mutex<Vec<StagedFile>>,
        fail_with: Mutex<Option<String>>,
    }

    impl ScriptedEngine {
        fn create() -> (Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>) {
            Self::with_config(EngineConfig::with_endpoint("https://upload.test/files"))
        }

        fn with_config(config: EngineConfig) -> (Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    config,
                    tx,
                    staged: Mutex::new(Vec::new()),
                    fail_with: Mutex::new(None),
                }),
                rx,
            )
        }

        fn script_failure(&self, message: &str) {
            *self.fail_with.lock().unwrap() = Some(message.to_string());
        }
    }

    impl UploadEngine for ScriptedEngine {
        fn add_file(&self, candidate: FileCandidate) -> Result<FileId, EngineError> {
            if candidate.size > self.config.max_file_size {
                let _ = self.tx.send(EngineEvent::RestrictionFailed {
                    name: candidate.name.clone(),
                    message: "exceeds engine file size limit".into(),
                });
                return Err(EngineError::Rejected(candidate.name));
            }
            let id = FileId::new();
            let staged = StagedFile::from_candidate(id.clone(), candidate);
            self.staged.lock().unwrap().push(staged.clone());
            let _ = self.tx.send(EngineEvent::FileAdded(staged));
            Ok(id)
        }

        fn upload(&self, generation: u64) -> Result<(), EngineError> {
            let files = self.staged.lock().unwrap().clone();
            let total: u64 = files.iter().map(|f| f.size).sum();
            let _ = self.tx.send(EngineEvent::UploadStarted { generation });

            let failure = self.fail_with.lock().unwrap().clone();
            let mut uploaded = 0;
            for file in &files {
                uploaded += file.size;
                let _ = self.tx.send(EngineEvent::Progress {
                    generation,
                    file: file.id.clone(),
                    bytes_uploaded: uploaded,
                    bytes_total: total,
                });
                if let Some(message) = &failure {
                    let _ = self.tx.send(EngineEvent::Failed {
                        generation,
                        file: file.id.clone(),
                        message: message.clone(),
                    });
                    return Ok(());
                }
            }
            if let Some(last) = files.last() {
                let _ = self.tx.send(EngineEvent::Succeeded {
                    generation,
                    file: last.id.clone(),
                });
            }
            Ok(())
        }

        fn pause_all(&self) -> Result<(), EngineError> {
            Ok(())
        }

        fn resume_all(&self) -> Result<(), EngineError> {
            Ok(())
        }

        fn cancel_all(&self, generation: u64) -> Result<(), EngineError> {
            self.staged.lock().unwrap().clear();
            let _ = self.tx.send(EngineEvent::CancelledAll { generation });
            Ok(())
        }

        fn remove_file(&self, id: &FileId) -> Result<(), EngineError> {
            self.staged.lock().unwrap().retain(|f| f.id != *id);
            let _ = self.tx.send(EngineEvent::FileRemoved(id.clone()));
            Ok(())
        }
    }

    fn pump(ctrl: &mut SessionController, rx: &mut mpsc::UnboundedReceiver<EngineEvent>) {
        while let Ok(ev) = rx.try_recv() {
            ctrl.handle_event(ev);
        }
    }

    fn candidate(name: &str, media_type: &str, size: u64) -> FileCandidate {
        FileCandidate::from_path(name, media_type, size, PathBuf::from(format!("/tmp/{name}")))
    }

    fn session() -> (
        SessionController,
        Arc<ScriptedEngine>,
        mpsc::UnboundedReceiver<EngineEvent>,
    ) {
        let (engine, rx) = ScriptedEngine::create();
        let ctrl = SessionController::new(engine.clone(), UploadPolicy::default());
        (ctrl, engine, rx)
    }

    #[test]
    fn multi_file_session_runs_to_completion() {
        let (mut ctrl, _engine, mut rx) = session();

        ctrl.stage_file(candidate("slides.pdf", "application/pdf", 40 * MIB))
            .unwrap();
        ctrl.stage_file(candidate("talk.mp4", "video/mp4", 300 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::AddFiles);
        assert_eq!(ctrl.files().len(), 2);
        assert_eq!(ctrl.snapshot().bytes_total, 340 * MIB);

        ctrl.start_upload();
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::UploadComplete);
        assert!(ctrl.files().is_empty());
        assert!(ctrl.error().is_none());

        ctrl.acknowledge();
        assert_eq!(ctrl.step(), UploadStep::Default);
    }

    #[test]
    fn failed_session_can_be_acknowledged_and_retried() {
        let (mut ctrl, engine, mut rx) = session();
        engine.script_failure("connection reset by peer");

        ctrl.stage_file(candidate("photo.png", "image/png", 10 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);
        ctrl.start_upload();
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::UploadError);
        assert_eq!(ctrl.error(), Some("connection reset by peer"));
        let notices = ctrl.drain_notices();
        assert!(
            notices
                .iter()
                .any(|n| n.message.contains("connection reset by peer"))
        );

        ctrl.acknowledge();
        assert_eq!(ctrl.step(), UploadStep::Default);
        assert!(ctrl.error().is_none());

        // Fresh attempt on the same controller succeeds.
        *engine.fail_with.lock().unwrap() = None;
        ctrl.stage_file(candidate("photo.png", "image/png", 10 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);
        ctrl.start_upload();
        pump(&mut ctrl, &mut rx);
        assert_eq!(ctrl.step(), UploadStep::UploadComplete);
    }

    #[test]
    fn cancel_discards_in_flight_transfer_events() {
        let (mut ctrl, _engine, mut rx) = session();

        ctrl.stage_file(candidate("talk.mp4", "video/mp4", 300 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);
        ctrl.start_upload();

        // Cancel before draining: the whole scripted transfer is queued
        // behind the cancel and must be discarded as stale.
        ctrl.cancel();
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::Default);
        assert!(ctrl.files().is_empty());
        assert_eq!(ctrl.snapshot(), ProgressSnapshot::idle());

        // The controller is immediately reusable.
        ctrl.stage_file(candidate("slides.pdf", "application/pdf", 40 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);
        ctrl.start_upload();
        pump(&mut ctrl, &mut rx);
        assert_eq!(ctrl.step(), UploadStep::UploadComplete);
    }

    #[test]
    fn policy_rejections_never_reach_the_engine() {
        let (engine, mut rx) = ScriptedEngine::create();
        let policy = UploadPolicy {
            min_size: Some(1_000_000),
            ..UploadPolicy::default()
        };
        let mut ctrl = SessionController::new(engine.clone(), policy);

        assert!(
            ctrl.stage_file(candidate("sixth.png", "image/png", 200 * MIB))
                .is_none()
        ); // over the 50 MiB image cap
        assert!(
            ctrl.stage_file(candidate("tiny.pdf", "application/pdf", 1000))
                .is_none()
        ); // below the 1 MB floor
        assert!(
            ctrl.stage_file(candidate("setup.exe", "application/x-msdownload", 5 * MIB))
                .is_none()
        );
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::Default);
        assert!(engine.staged.lock().unwrap().is_empty());
        assert_eq!(ctrl.drain_notices().len(), 3);
    }

    #[test]
    fn file_count_limit_applies_to_staged_set() {
        let (mut ctrl, _engine, mut rx) = session();

        for i in 0..5 {
            ctrl.stage_file(candidate(&format!("p{i}.png"), "image/png", 2 * MIB))
                .unwrap();
            pump(&mut ctrl, &mut rx);
        }
        assert_eq!(ctrl.files().len(), 5);

        assert!(
            ctrl.stage_file(candidate("p5.png", "image/png", 2 * MIB))
                .is_none()
        );
        let notices = ctrl.drain_notices();
        assert!(
            notices
                .last()
                .unwrap()
                .message
                .contains("no more than 5 files")
        );
    }

    #[test]
    fn engine_restrictions_apply_independently_of_policy() {
        // Engine configured tighter than the session policy.
        let (engine, mut rx) = ScriptedEngine::with_config(EngineConfig {
            max_file_size: 100 * MIB,
            ..EngineConfig::with_endpoint("https://upload.test/files")
        });
        let mut ctrl = SessionController::new(engine, UploadPolicy::default());

        // Policy allows a 200 MiB video, the engine does not.
        assert!(
            ctrl.stage_file(candidate("talk.mp4", "video/mp4", 200 * MIB))
                .is_none()
        );
        pump(&mut ctrl, &mut rx);

        assert_eq!(ctrl.step(), UploadStep::Default);
        assert!(ctrl.files().is_empty());
        let notices = ctrl.drain_notices();
        assert!(
            notices
                .iter()
                .any(|n| n.message.contains("exceeds engine file size limit"))
        );
    }

    #[test]
    fn chunk_suggestion_and_auth_flow_into_request_metadata() {
        let (mut ctrl, _engine, mut rx) = session();
        ctrl.stage_file(candidate("talk.mp4", "video/mp4", 300 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);
        ctrl.start_upload();

        let mut req = RequestMeta::new();
        BearerAuth::new("s3cr3t").decorate(&mut req);
        req.suggest_chunk_size(ctrl.chunk_size());

        assert_eq!(req.header("Authorization"), Some("Bearer s3cr3t"));
        let suggested = req.suggested_chunk_size().unwrap();
        assert!(suggested >= uplift_session::MIN_CHUNK_SIZE);
        assert!(suggested <= uplift_session::MAX_CHUNK_SIZE);
    }

    #[test]
    fn step_serializes_in_kebab_case() {
        for (step, expected) in [
            (UploadStep::Default, "\"default\""),
            (UploadStep::AddFiles, "\"add-files\""),
            (UploadStep::Uploading, "\"uploading\""),
            (UploadStep::UploadComplete, "\"upload-complete\""),
            (UploadStep::UploadError, "\"upload-error\""),
        ] {
            assert_eq!(serde_json::to_string(&step).unwrap(), expected);
        }
    }

    #[test]
    fn snapshot_serializes_in_camel_case() {
        let (mut ctrl, _engine, mut rx) = session();
        ctrl.stage_file(candidate("talk.mp4", "video/mp4", 100 * MIB))
            .unwrap();
        pump(&mut ctrl, &mut rx);

        let json = serde_json::to_value(ctrl.snapshot()).unwrap();
        assert_eq!(json["bytesTotal"], 100 * MIB);
        assert_eq!(json["bytesUploaded"], 0);
        assert!(json.get("percentage").is_some());
    }

    #[tokio::test]
    async fn run_loop_drives_a_session_end_to_end() {
        let (engine, mut rx) = ScriptedEngine::create();
        let mut ctrl = SessionController::new(engine.clone(), UploadPolicy::default());

        ctrl.stage_file(candidate("talk.mp4", "video/mp4", 300 * MIB))
            .unwrap();

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            ctrl.run(&mut rx, token).await;
            ctrl
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.cancel();
        let ctrl = handle.await.unwrap();

        // The loop folded the staged file before teardown cancelled it.
        assert_eq!(ctrl.step(), UploadStep::Default);
        assert!(engine.staged.lock().unwrap().is_empty());
    }
}

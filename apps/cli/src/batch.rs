use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use cuekit_core::{
    ConversionReport, CuekitError, SourceFormat, convert_file, save_vtt, vtt_output_path,
};
use tokio::{fs, sync::Semaphore, task::JoinSet};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub format: Option<SourceFormat>,
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub write_empty: bool,
    pub to_stdout: bool,
    pub jobs: usize,
}

#[derive(Debug)]
pub enum FileStatus {
    Written { output: PathBuf },
    Printed,
    SkippedExisting { output: PathBuf },
    Empty,
    Failed(CuekitError),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub status: FileStatus,
    pub report: Option<ConversionReport>,
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed(_))
    }
}

/// Convert one input and decide what to do with the document
pub async fn convert_one(input: &Path, options: &BatchOptions) -> FileOutcome {
    let report = match convert_file(input, options.format).await {
        Ok(report) => report,
        Err(e) => {
            tracing::debug!(input = %input.display(), error = %e, "conversion failed");
            return FileOutcome {
                input: input.to_path_buf(),
                status: FileStatus::Failed(e),
                report: None,
            };
        }
    };

    let status = if report.is_empty() && !options.write_empty {
        FileStatus::Empty
    } else if options.to_stdout {
        FileStatus::Printed
    } else {
        write_output(input, &report, options).await
    };

    FileOutcome {
        input: input.to_path_buf(),
        status,
        report: Some(report),
    }
}

async fn write_output(
    input: &Path,
    report: &ConversionReport,
    options: &BatchOptions,
) -> FileStatus {
    let output = vtt_output_path(input, options.output_dir.as_deref());

    if !options.overwrite && fs::try_exists(&output).await.unwrap_or(false) {
        return FileStatus::SkippedExisting { output };
    }

    match save_vtt(&output, &report.document).await {
        Ok(()) => FileStatus::Written { output },
        Err(e) => FileStatus::Failed(e),
    }
}

/// Convert all inputs concurrently, at most `options.jobs` at a time.
///
/// Output paths are claimed in input order before any task starts; a later
/// input whose `.vtt` path is already claimed fails with
/// [`CuekitError::OutputCollision`] and is not converted.
///
/// `on_done` sees each outcome as soon as it finishes; the returned list is in
/// input order.
pub async fn run_batch<F>(
    inputs: Vec<PathBuf>,
    options: BatchOptions,
    mut on_done: F,
) -> Result<Vec<FileOutcome>>
where
    F: FnMut(&FileOutcome),
{
    let total = inputs.len();
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let options = Arc::new(options);
    let mut set = JoinSet::new();
    let mut outcomes = Vec::with_capacity(total);
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for (position, input) in inputs.into_iter().enumerate() {
        if !options.to_stdout {
            let output = vtt_output_path(&input, options.output_dir.as_deref());
            if let Some(first) = claimed.get(&output) {
                let outcome = FileOutcome {
                    status: FileStatus::Failed(CuekitError::OutputCollision {
                        output,
                        first: first.clone(),
                    }),
                    input,
                    report: None,
                };
                on_done(&outcome);
                outcomes.push((position, outcome));
                continue;
            }
            claimed.insert(output, input.clone());
        }

        let semaphore = Arc::clone(&semaphore);
        let options = Arc::clone(&options);
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (position, convert_one(&input, &options).await)
        });
    }

    while let Some(joined) = set.join_next().await {
        let (position, outcome) = joined?;
        on_done(&outcome);
        outcomes.push((position, outcome));
    }

    outcomes.sort_by_key(|(position, _)| *position);
    Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n";
    const JSON: &str = r#"{"chunks": [{"timestamp": [0, 2.5], "text": "Hi"}]}"#;

    fn options(output_dir: Option<PathBuf>) -> BatchOptions {
        BatchOptions {
            format: None,
            output_dir,
            overwrite: false,
            write_empty: false,
            to_stdout: false,
            jobs: 2,
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let srt = dir.path().join("a.srt");
        let json = dir.path().join("b.json");
        let broken = dir.path().join("c.json");
        let unknown = dir.path().join("d.txt");
        std::fs::write(&srt, SRT).unwrap();
        std::fs::write(&json, JSON).unwrap();
        std::fs::write(&broken, "{ nope").unwrap();
        std::fs::write(&unknown, SRT).unwrap();

        let out = dir.path().join("out");
        let mut seen = 0;
        let outcomes = run_batch(
            vec![srt.clone(), json.clone(), broken.clone(), unknown.clone()],
            options(Some(out.clone())),
            |_| seen += 1,
        )
        .await
        .unwrap();

        assert_eq!(seen, 4);
        let inputs: Vec<&PathBuf> = outcomes.iter().map(|o| &o.input).collect();
        assert_eq!(inputs, vec![&srt, &json, &broken, &unknown]);

        assert!(matches!(outcomes[0].status, FileStatus::Written { .. }));
        assert!(matches!(outcomes[1].status, FileStatus::Written { .. }));
        assert!(matches!(
            outcomes[2].status,
            FileStatus::Failed(CuekitError::JsonError(_))
        ));
        assert!(matches!(
            outcomes[3].status,
            FileStatus::Failed(CuekitError::UnsupportedFormat { .. })
        ));

        assert_eq!(
            std::fs::read_to_string(out.join("a.vtt")).unwrap(),
            "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("b.vtt")).unwrap(),
            "WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.500\nHi\n\n"
        );
    }

    #[tokio::test]
    async fn test_inputs_sharing_an_output_path_do_not_clobber() {
        let dir = TempDir::new().unwrap();
        let srt = dir.path().join("talk.srt");
        let json = dir.path().join("talk.json");
        std::fs::write(&srt, SRT).unwrap();
        std::fs::write(&json, JSON).unwrap();

        let mut overwrite = options(None);
        overwrite.overwrite = true;
        let outcomes = run_batch(vec![srt.clone(), json.clone()], overwrite, |_| {})
            .await
            .unwrap();

        let output = dir.path().join("talk.vtt");
        assert!(matches!(outcomes[0].status, FileStatus::Written { .. }));
        match &outcomes[1].status {
            FileStatus::Failed(CuekitError::OutputCollision { output: o, first }) => {
                assert_eq!(o, &output);
                assert_eq!(first, &srt);
            }
            other => panic!("expected an output collision, got {other:?}"),
        }
        assert!(outcomes[1].report.is_none());
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n\n"
        );
    }

    #[tokio::test]
    async fn test_same_file_name_from_different_dirs_collides_in_output_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("x.srt");
        let second = dir.path().join("b").join("x.srt");
        std::fs::write(&first, SRT).unwrap();
        std::fs::write(&second, SRT).unwrap();

        let outcomes = run_batch(
            vec![first, second],
            options(Some(dir.path().join("out"))),
            |_| {},
        )
        .await
        .unwrap();

        assert!(matches!(outcomes[0].status, FileStatus::Written { .. }));
        assert!(matches!(
            outcomes[1].status,
            FileStatus::Failed(CuekitError::OutputCollision { .. })
        ));
    }

    #[tokio::test]
    async fn test_stdout_batch_has_no_output_collisions() {
        let dir = TempDir::new().unwrap();
        let srt = dir.path().join("talk.srt");
        let json = dir.path().join("talk.json");
        std::fs::write(&srt, SRT).unwrap();
        std::fs::write(&json, JSON).unwrap();

        let mut to_stdout = options(None);
        to_stdout.to_stdout = true;
        let outcomes = run_batch(vec![srt, json], to_stdout, |_| {}).await.unwrap();

        assert!(outcomes.iter().all(|o| matches!(o.status, FileStatus::Printed)));
    }

    #[tokio::test]
    async fn test_existing_output_is_kept_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("talk.srt");
        let output = dir.path().join("talk.vtt");
        std::fs::write(&input, SRT).unwrap();
        std::fs::write(&output, "old").unwrap();

        let outcome = convert_one(&input, &options(None)).await;
        assert!(matches!(outcome.status, FileStatus::SkippedExisting { .. }));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "old");

        let mut overwrite = options(None);
        overwrite.overwrite = true;
        let outcome = convert_one(&input, &overwrite).await;
        assert!(matches!(outcome.status, FileStatus::Written { .. }));
        assert_ne!(std::fs::read_to_string(&output).unwrap(), "old");
    }

    #[tokio::test]
    async fn test_empty_documents_written_only_on_request() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("empty.json");
        std::fs::write(&input, r#"{"chunks": []}"#).unwrap();

        let outcome = convert_one(&input, &options(None)).await;
        assert!(matches!(outcome.status, FileStatus::Empty));
        assert!(!dir.path().join("empty.vtt").exists());

        let mut write_empty = options(None);
        write_empty.write_empty = true;
        let outcome = convert_one(&input, &write_empty).await;
        assert!(matches!(outcome.status, FileStatus::Written { .. }));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("empty.vtt")).unwrap(),
            "WEBVTT\n\n"
        );
    }

    #[tokio::test]
    async fn test_stdout_mode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("talk.srt");
        std::fs::write(&input, SRT).unwrap();

        let mut to_stdout = options(None);
        to_stdout.to_stdout = true;
        let outcome = convert_one(&input, &to_stdout).await;

        assert!(matches!(outcome.status, FileStatus::Printed));
        assert!(outcome.report.is_some());
        assert!(!dir.path().join("talk.vtt").exists());
    }
}

use crate::config::{BatchConfig, CompressionOptions};
use crate::constants::{INFO_PREFIX, WARNING_PREFIX};
use crate::discovery::enumerate_tasks;
use crate::error::{CompressionError, Result};
use crate::pool::WorkerPool;
use crate::processing::{resolve_output, ImageTransformer};
use crate::report::{BatchSummary, Reporter};
use crate::task::{Outcome, Task};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Dispatches an already enumerated task list to the worker pool and hands
/// every outcome to `on_outcome` as soon as it completes.
///
/// Tasks whose final output path is already claimed by an earlier task are
/// reported as failures up front and never reach the pool.
pub fn dispatch_tasks<F>(
    config: &BatchConfig,
    tasks: Vec<Task>,
    mut on_outcome: F,
) -> Result<BatchSummary>
where
    F: FnMut(&Outcome),
{
    let start_time = Instant::now();
    let mut summary = BatchSummary::default();
    if tasks.is_empty() {
        return Ok(summary);
    }

    let pool = WorkerPool::new(config.worker_count)?;
    let (tasks, conflicts) = reject_output_conflicts(tasks, &config.options);
    for outcome in &conflicts {
        summary.record(outcome);
        on_outcome(outcome);
    }

    let transformer = ImageTransformer::new(config.options.clone());
    for outcome in pool.run(tasks, move |task| transformer.transform(task))? {
        summary.record(&outcome);
        on_outcome(&outcome);
    }

    summary.elapsed = start_time.elapsed();
    info!(
        "Batch finished: {} succeeded, {} failed in {:.2?}",
        summary.succeeded, summary.failed, summary.elapsed
    );
    Ok(summary)
}

/// Splits off tasks that would write the same final file as an earlier task,
/// which happens when conversion maps `x.jpg` and `x.png` to one `x.webp`.
/// The first task in traversal order keeps the path.
fn reject_output_conflicts(
    tasks: Vec<Task>,
    options: &CompressionOptions,
) -> (Vec<Task>, Vec<Outcome>) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(tasks.len());
    let mut accepted = Vec::with_capacity(tasks.len());
    let mut conflicts = Vec::new();

    for task in tasks {
        // Unresolvable outputs fail inside the transformer with a proper cause.
        let Ok((final_path, _)) = resolve_output(task.output_path(), options) else {
            accepted.push(task);
            continue;
        };

        match claimed.entry(final_path) {
            Entry::Occupied(first) => {
                let cause =
                    CompressionError::OutputConflict(first.key().clone(), first.get().clone());
                debug!("Skipping {}: {}", task.input_path().display(), cause);
                conflicts.push(Outcome::failure(task.input_path(), cause));
            }
            Entry::Vacant(slot) => {
                slot.insert(task.input_path().to_path_buf());
                accepted.push(task);
            }
        }
    }

    (accepted, conflicts)
}

/// Runs a whole batch: enumerate, then dispatch.
///
/// # Returns
/// * `Ok(summary)` - Once every task has produced an outcome
/// * `Err(CompressionError)` - If enumeration fails; nothing is dispatched
pub fn process_batch<F>(config: &BatchConfig, on_outcome: F) -> Result<BatchSummary>
where
    F: FnMut(&Outcome),
{
    let tasks = enumerate_tasks(&config.input_dir, &config.output_dir, &config.extensions)?;
    dispatch_tasks(config, tasks, on_outcome)
}

/// Same as [`process_batch`] but gathers the outcomes instead of reporting them.
pub fn collect_outcomes(config: &BatchConfig) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::new();
    process_batch(config, |outcome| outcomes.push(outcome.clone()))?;
    Ok(outcomes)
}

/// Console front-end for a batch run: prints one line per finished file in
/// completion order and returns the totals for the caller to print.
pub fn batch_compress_images(config: &BatchConfig, show_progress: bool) -> Result<BatchSummary> {
    println!("🚀 Starting batch compression...");
    println!("📁 Input: {}", config.input_dir.display());
    println!("📁 Output: {}", config.output_dir.display());

    let tasks = enumerate_tasks(&config.input_dir, &config.output_dir, &config.extensions)?;
    let total_files = tasks.len();

    if total_files == 0 {
        println!("{}  No image files found in the input path", WARNING_PREFIX);
        return Ok(BatchSummary::default());
    }

    println!("📊 Found {} image files to process", total_files);
    println!(
        "{} Quality {}, max dimension {}, {}",
        INFO_PREFIX,
        config.options.quality,
        config
            .options
            .max_dimension
            .map_or_else(|| "unbounded".to_string(), |d| d.to_string()),
        if config.options.convert_to_target {
            format!("converting to {}", config.options.target_format)
        } else {
            "keeping original formats".to_string()
        }
    );
    println!(
        "⚙️  Using {} worker threads",
        config.worker_count.min(total_files)
    );

    let reporter = Reporter::new(total_files, show_progress);
    let summary = dispatch_tasks(config, tasks, |outcome| reporter.report(outcome));
    reporter.finish();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::OutputFormat;

    fn options(convert: bool) -> CompressionOptions {
        CompressionOptions::new(Some(50), None, convert, Some(OutputFormat::WebP)).unwrap()
    }

    fn tasks(names: &[&str]) -> Vec<Task> {
        names
            .iter()
            .map(|name| Task::new(format!("in/{}", name), format!("out/{}", name)))
            .collect()
    }

    #[test]
    fn test_conversion_conflicts_keep_first_task() {
        let (accepted, conflicts) =
            reject_output_conflicts(tasks(&["x.jpg", "x.png", "y.png", "x.webp"]), &options(true));

        let kept: Vec<_> = accepted.iter().map(|t| t.input_path().to_path_buf()).collect();
        assert_eq!(kept, vec![PathBuf::from("in/x.jpg"), PathBuf::from("in/y.png")]);

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].input_path(), PathBuf::from("in/x.png"));
        assert_eq!(conflicts[1].input_path(), PathBuf::from("in/x.webp"));
        match &conflicts[0] {
            Outcome::Failure { cause, .. } => {
                assert!(cause.contains("out/x.webp"));
                assert!(cause.contains("in/x.jpg"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_no_conflicts_without_conversion() {
        let (accepted, conflicts) =
            reject_output_conflicts(tasks(&["x.jpg", "x.png", "x.webp"]), &options(false));
        assert_eq!(accepted.len(), 3);
        assert!(conflicts.is_empty());
    }
}

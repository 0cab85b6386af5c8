//! Execution of checks over source files, sequentially or on a worker pool.

use crate::context::EvalContext;
use crate::registry::CheckDefinition;
use crate::style::StyleResolver;
use crate::types::{EvaluationResult, Finding, SourceFile};
use crate::utils::allowance::check_allow_with_reason;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How the runner schedules work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// One thread walks every file and check in order.
    #[default]
    Sequential,
    /// A bounded pool of worker threads over disjoint file slices.
    Pool {
        /// Upper bound on workers; host concurrency when `None`.
        max_workers: Option<usize>,
    },
}

/// Runner tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Scheduling mode.
    pub parallelism: Parallelism,
    /// Below this many files the pool is not spawned.
    pub pool_threshold: usize,
    /// Files per worker used to size the pool.
    pub files_per_worker: usize,
    /// Watchdog for one (file, check) pair. A check still running when it
    /// fires is abandoned and reported as an internal error.
    pub check_timeout: Duration,
}

impl RunnerOptions {
    /// Default minimum file count for spawning a pool.
    pub const DEFAULT_POOL_THRESHOLD: usize = 100;
    /// Default files per worker.
    pub const DEFAULT_FILES_PER_WORKER: usize = 50;
    /// Default per-check watchdog.
    pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

    /// Sequential execution with default limits.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Pool execution with default limits.
    #[must_use]
    pub fn pool(max_workers: Option<usize>) -> Self {
        Self {
            parallelism: Parallelism::Pool { max_workers },
            ..Self::default()
        }
    }

    /// Number of workers for `file_count` files: one per started batch of
    /// `files_per_worker`, capped by host concurrency and `max_workers`.
    /// Returns 1 whenever the run should stay sequential.
    #[must_use]
    pub fn worker_count(&self, file_count: usize) -> usize {
        let Parallelism::Pool { max_workers } = self.parallelism else {
            return 1;
        };
        if file_count < self.pool_threshold {
            return 1;
        }
        let host = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        let wanted = file_count.div_ceil(self.files_per_worker.max(1)).max(1);
        wanted.min(host).min(max_workers.unwrap_or(usize::MAX)).max(1)
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            parallelism: Parallelism::Sequential,
            pool_threshold: Self::DEFAULT_POOL_THRESHOLD,
            files_per_worker: Self::DEFAULT_FILES_PER_WORKER,
            check_timeout: Self::DEFAULT_CHECK_TIMEOUT,
        }
    }
}

/// Cooperative, all-or-nothing cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Elements a check inspected in one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Coverage {
    /// File path.
    pub file: PathBuf,
    /// Check id.
    pub check_id: String,
    /// Elements or declarations evaluated.
    pub elements_found: usize,
}

/// Everything the runner produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Raw findings in canonical order (file, line, check, message).
    pub findings: Vec<Finding>,
    /// Applicability per (file, check) pair that evaluated successfully.
    pub coverage: Vec<Coverage>,
    /// Non-fatal warnings such as worker fallbacks.
    pub warnings: Vec<String>,
    /// Number of files processed.
    pub files_checked: usize,
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The run was cancelled; partial results were discarded.
    #[error("scan cancelled")]
    Cancelled,
}

#[derive(Debug, Default)]
struct FileOutput {
    findings: Vec<Finding>,
    coverage: Vec<Coverage>,
}

/// Result of one check on one file; `Err` holds the internal error message.
type Outcome = Result<EvaluationResult, String>;

/// Applies checks to source files.
pub struct Runner<'a> {
    checks: &'a [CheckDefinition],
    styles: Arc<StyleResolver>,
    options: RunnerOptions,
    cancel: CancelToken,
    #[cfg(test)]
    failing_worker: Option<usize>,
}

impl<'a> Runner<'a> {
    /// Creates a runner over an immutable check set and resolver.
    #[must_use]
    pub fn new(
        checks: &'a [CheckDefinition],
        styles: Arc<StyleResolver>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            checks,
            styles,
            options,
            cancel: CancelToken::new(),
            #[cfg(test)]
            failing_worker: None,
        }
    }

    /// Uses a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs every applicable check on every file.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Cancelled`] if the token was cancelled.
    pub fn run(&self, files: &[SourceFile]) -> Result<RunOutput, RunError> {
        let workers = self.options.worker_count(files.len());
        let mut output = if workers > 1 {
            info!("Running {} file(s) on {} worker(s)", files.len(), workers);
            self.run_pool(files, workers)?
        } else {
            debug!("Running {} file(s) sequentially", files.len());
            let mut out = RunOutput::default();
            for file in files {
                self.ensure_not_cancelled()?;
                merge(&mut out, self.run_file(file));
            }
            out
        };

        self.ensure_not_cancelled()?;
        output.files_checked = files.len();
        output.findings.sort_by(|a, b| {
            (&a.source_file, a.line, &a.check_id, &a.message)
                .cmp(&(&b.source_file, b.line, &b.check_id, &b.message))
                .then_with(|| a.cmp(b))
        });
        output.coverage.sort();
        Ok(output)
    }

    fn ensure_not_cancelled(&self) -> Result<(), RunError> {
        if self.cancel.is_cancelled() {
            warn!("Run cancelled, discarding partial results");
            return Err(RunError::Cancelled);
        }
        Ok(())
    }

    fn run_pool(&self, files: &[SourceFile], workers: usize) -> Result<RunOutput, RunError> {
        let chunk_size = files.len().div_ceil(workers);
        let (tx, rx) = crossbeam_channel::unbounded::<(usize, FileOutput)>();
        let mut warnings = Vec::new();

        thread::scope(|scope| {
            let mut handles = Vec::new();
            for (worker, chunk) in files.chunks(chunk_size).enumerate() {
                let tx = tx.clone();
                let start = worker * chunk_size;
                let spawned = thread::Builder::new()
                    .name(format!("a11y-lint-worker-{worker}"))
                    .spawn_scoped(scope, move || self.worker(worker, start, chunk, &tx));
                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(e) => {
                        warn!("Failed to spawn worker {}: {}", worker, e);
                        warnings.push(format!("worker {worker} could not be started: {e}"));
                    }
                }
            }
            drop(tx);
            for (worker, handle) in handles {
                if handle.join().is_err() {
                    warn!("Worker {} failed", worker);
                    warnings.push(format!("worker {worker} failed"));
                }
            }
        });

        let mut results: Vec<Option<FileOutput>> = files.iter().map(|_| None).collect();
        for (index, out) in rx.try_iter() {
            results[index] = Some(out);
        }

        let mut output = RunOutput::default();
        let mut recovered = 0usize;
        for (file, result) in files.iter().zip(results) {
            let out = match result {
                Some(out) => out,
                None => {
                    self.ensure_not_cancelled()?;
                    recovered += 1;
                    self.run_file(file)
                }
            };
            merge(&mut output, out);
        }
        if recovered > 0 {
            warn!("Processed {} file(s) sequentially after worker failure", recovered);
            warnings.push(format!(
                "fell back to sequential execution for {recovered} file(s)"
            ));
        }
        output.warnings = warnings;
        Ok(output)
    }

    fn worker(
        &self,
        worker: usize,
        start: usize,
        chunk: &[SourceFile],
        tx: &Sender<(usize, FileOutput)>,
    ) {
        debug!("Worker {} processing {} file(s)", worker, chunk.len());
        for (offset, file) in chunk.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return;
            }
            #[cfg(test)]
            if self.failing_worker == Some(worker) && offset == 1 {
                panic!("injected worker failure");
            }
            // The receiver outlives the scope.
            let _ = tx.send((start + offset, self.run_file(file)));
        }
    }

    /// Runs every check matching the file's content type, isolating failures.
    ///
    /// Checks are evaluated in order on a detached helper thread. When one
    /// outlives the watchdog the helper is abandoned and a fresh one picks up
    /// the remaining checks.
    fn run_file(&self, file: &SourceFile) -> FileOutput {
        let checks: Vec<CheckDefinition> = self
            .checks
            .iter()
            .filter(|d| d.content_type() == file.content_type)
            .cloned()
            .collect();
        let mut out = FileOutput::default();
        if checks.is_empty() {
            return out;
        }

        let file = Arc::new(file.clone());
        let timeout = self.options.check_timeout;
        let mut next = 0;
        while next < checks.len() {
            let rx = self.spawn_evaluator(&file, &checks[next..]);
            while next < checks.len() {
                let def = &checks[next];
                next += 1;
                let failure = match rx.recv_timeout(timeout) {
                    Ok(Ok(result)) => {
                        out.coverage.push(Coverage {
                            file: file.path.clone(),
                            check_id: def.id().to_string(),
                            elements_found: result.elements_found,
                        });
                        out.findings
                            .extend(self.post_process(def, &file, result.findings));
                        None
                    }
                    Ok(Err(message)) => Some(message),
                    Err(RecvTimeoutError::Timeout) => Some(format!(
                        "check exceeded the {} ms watchdog",
                        timeout.as_millis()
                    )),
                    Err(RecvTimeoutError::Disconnected) => {
                        Some("check evaluator stopped unexpectedly".to_string())
                    }
                };

                if let Some(message) = failure {
                    warn!("{} on {}: {}", def.id(), file.path.display(), message);
                    out.findings
                        .push(Finding::internal_error(def.id(), &file.path, message));
                    // The helper may still be busy; later checks get a new one.
                    break;
                }
            }
        }
        out
    }

    /// Starts evaluating `checks` on `file` and returns the outcome stream.
    /// Falls back to evaluating inline if no thread can be spawned.
    fn spawn_evaluator(
        &self,
        file: &Arc<SourceFile>,
        checks: &[CheckDefinition],
    ) -> Receiver<Outcome> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let timeout = self.options.check_timeout;
        let spawned = {
            let file = Arc::clone(file);
            let styles = Arc::clone(&self.styles);
            let checks = checks.to_vec();
            thread::Builder::new()
                .name("a11y-lint-eval".to_string())
                .spawn(move || evaluate_checks(&file, &styles, &checks, timeout, &tx))
        };
        match spawned {
            Ok(_detached) => rx,
            Err(e) => {
                warn!("Failed to spawn evaluator for {}: {}", file.path.display(), e);
                let (tx, rx) = crossbeam_channel::unbounded();
                evaluate_checks(file, &self.styles, checks, timeout, &tx);
                rx
            }
        }
    }

    /// Drops findings suppressed by allow directives and applies severity overrides.
    fn post_process(
        &self,
        def: &CheckDefinition,
        file: &SourceFile,
        findings: Vec<Finding>,
    ) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|f| {
                let Some(line) = f.line else { return true };
                let allowed = check_allow_with_reason(&file.content, line, &f.check_id);
                if allowed.is_allowed() {
                    debug!(
                        "Suppressed {} at {}:{} ({})",
                        f.check_id,
                        file.path.display(),
                        line,
                        allowed.reason().unwrap_or("no reason given")
                    );
                }
                !allowed.is_allowed()
            })
            .map(|mut f| {
                if let Some(severity) = def.severity_override() {
                    if !f.internal {
                        f.severity = severity;
                    }
                }
                f
            })
            .collect()
    }
}

/// Evaluates `checks` in order on one shared context, sending one outcome
/// per check. Stops early once the runner stops listening.
fn evaluate_checks(
    file: &SourceFile,
    styles: &StyleResolver,
    checks: &[CheckDefinition],
    timeout: Duration,
    tx: &Sender<Outcome>,
) {
    let ctx = EvalContext::new(file, styles);
    for def in checks {
        ctx.set_deadline(Instant::now().checked_add(timeout));
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| def.evaluate(&ctx))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(format!("check failed: {e}")),
            Err(payload) => Err(format!("check panicked: {}", panic_message(&*payload))),
        };
        ctx.set_deadline(None);
        if tx.send(outcome).is_err() {
            debug!("Abandoned evaluation of {} on {}", def.id(), file.path.display());
            return;
        }
    }
}

fn merge(output: &mut RunOutput, file: FileOutput) {
    output.findings.extend(file.findings);
    output.coverage.extend(file.coverage);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

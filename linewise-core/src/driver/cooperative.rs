//! Cooperative per-line iteration on the tokio runtime
//!
//! A traversal runs as its own task. Between two lines the task yields back
//! to the scheduler, so arbitrarily long inputs neither grow the stack nor
//! starve other tasks.

use super::{Flow, Traversal};
use crate::async_reader::AsyncLineReader;
use crate::config::ReaderConfig;
use crate::error::{LineError, Result};
use crate::source::{AsyncByteSource, TokioFileSource};
use std::future::{self, Future};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Decides whether a traversal continues after a line was delivered.
///
/// Handed to consumers of [`each_line_with_continuation`]. It may be moved
/// elsewhere and resolved later; the traversal waits until it is. Dropping it
/// unresolved stops the traversal.
#[derive(Debug)]
pub struct Continuation {
    tx: oneshot::Sender<bool>,
}

impl Continuation {
    /// Continue unless `keep_going` is `false`
    pub fn resume(self, keep_going: bool) {
        // the traversal may already be gone; nothing left to resume then
        let _ = self.tx.send(keep_going);
    }

    /// Deliver the next line
    pub fn proceed(self) {
        self.resume(true);
    }

    /// Stop the traversal and close the source
    pub fn stop(self) {
        self.resume(false);
    }
}

/// What a consumer decided about the line it was handed
enum Decision {
    Now(Flow),
    Later(oneshot::Receiver<bool>),
}

impl Decision {
    async fn resolve(self) -> Flow {
        match self {
            Decision::Now(flow) => flow,
            Decision::Later(rx) => match rx.await {
                Ok(keep_going) => Flow::from(keep_going),
                Err(_) => Flow::Stop,
            },
        }
    }
}

/// Runs the user callback synchronously; only waiting for a later decision
/// is asynchronous
trait LineConsumer: Send + 'static {
    fn deliver(&mut self, line: String, last: bool) -> Decision;
}

/// Consumer whose return value decides
struct Returning<F>(F);

impl<F, R> LineConsumer for Returning<F>
where
    F: FnMut(String, bool) -> R + Send + 'static,
    R: Into<Flow>,
{
    fn deliver(&mut self, line: String, last: bool) -> Decision {
        Decision::Now((self.0)(line, last).into())
    }
}

/// Consumer that decides through a [`Continuation`]
struct Continuing<F>(F);

impl<F> LineConsumer for Continuing<F>
where
    F: FnMut(String, bool, Continuation) + Send + 'static,
{
    fn deliver(&mut self, line: String, last: bool) -> Decision {
        let (tx, rx) = oneshot::channel();
        (self.0)(line, last, Continuation { tx });
        Decision::Later(rx)
    }
}

type CompletionFn = Box<dyn FnOnce(&Traversal) + Send>;

enum CompletionState {
    Pending(Option<CompletionFn>),
    Done(Traversal),
}

/// Completion callback slot shared between a traversal task and its handle
struct Completion {
    state: Mutex<CompletionState>,
}

impl Completion {
    fn new() -> Self {
        Self {
            state: Mutex::new(CompletionState::Pending(None)),
        }
    }

    fn register(&self, callback: CompletionFn) {
        let done = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                CompletionState::Pending(slot) => {
                    *slot = Some(callback);
                    return;
                }
                CompletionState::Done(traversal) => *traversal,
            }
        };
        // registered after the traversal already finished
        callback(&done);
    }

    fn finish(&self, traversal: Traversal) {
        let callback = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *state, CompletionState::Done(traversal)) {
                CompletionState::Pending(callback) => callback,
                CompletionState::Done(_) => None,
            }
        };
        if let Some(callback) = callback {
            callback(&traversal);
        }
    }
}

/// Handle to a running traversal.
///
/// Awaiting it yields the traversal summary or the error that aborted it.
/// [`then`](Self::then) registers a completion callback instead.
#[must_use = "a traversal's errors are only observable by awaiting its handle"]
pub struct EachLine {
    task: JoinHandle<Result<Traversal>>,
    completion: Arc<Completion>,
}

impl EachLine {
    /// Register `callback` to run once the traversal completes, either
    /// because every line was delivered or because the consumer stopped it.
    ///
    /// Registering after completion runs `callback` immediately. A later
    /// registration replaces an earlier one that has not run yet. Traversals
    /// aborted by an error never run it.
    pub fn then<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Traversal) + Send + 'static,
    {
        self.completion.register(Box::new(callback));
        self
    }

    /// True once the traversal task has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl std::fmt::Debug for EachLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EachLine")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Future for EachLine {
    type Output = Result<Traversal>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_panic() => panic::resume_unwind(e.into_panic()),
            Poll::Ready(Err(_)) => Poll::Ready(Err(LineError::Cancelled)),
        }
    }
}

/// Deliver every line of the file at `path` to `consumer` together with
/// whether it is the last one.
///
/// Returning `false` (or [`Flow::Stop`]) stops early and closes the file;
/// returning `()` or `true` continues. Must be called from within a tokio
/// runtime.
///
/// ```no_run
/// # async fn run() -> linewise_core::Result<()> {
/// use linewise_core::{each_line, ReaderConfig};
///
/// let traversal = each_line("server.log", &ReaderConfig::default(), |line, _last| {
///     !line.contains("FATAL")
/// });
/// traversal.then(|summary| println!("read {} lines", summary.lines));
/// traversal.await?;
/// # Ok(())
/// # }
/// ```
pub fn each_line<P, F, R>(path: P, config: &ReaderConfig, consumer: F) -> EachLine
where
    P: AsRef<Path>,
    F: FnMut(String, bool) -> R + Send + 'static,
    R: Into<Flow>,
{
    spawn_traversal(open_file(path, config), Returning(consumer))
}

/// Like [`each_line`], but the consumer decides through a [`Continuation`],
/// possibly after doing asynchronous work of its own.
pub fn each_line_with_continuation<P, F>(path: P, config: &ReaderConfig, consumer: F) -> EachLine
where
    P: AsRef<Path>,
    F: FnMut(String, bool, Continuation) + Send + 'static,
{
    spawn_traversal(open_file(path, config), Continuing(consumer))
}

/// [`each_line`] over an already open reader
pub fn each_line_from_reader<S, F, R>(reader: AsyncLineReader<S>, consumer: F) -> EachLine
where
    S: AsyncByteSource + 'static,
    F: FnMut(String, bool) -> R + Send + 'static,
    R: Into<Flow>,
{
    spawn_traversal(future::ready(Ok(reader)), Returning(consumer))
}

/// [`each_line_with_continuation`] over an already open reader
pub fn each_line_with_continuation_from_reader<S, F>(
    reader: AsyncLineReader<S>,
    consumer: F,
) -> EachLine
where
    S: AsyncByteSource + 'static,
    F: FnMut(String, bool, Continuation) + Send + 'static,
{
    spawn_traversal(future::ready(Ok(reader)), Continuing(consumer))
}

fn open_file(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
) -> impl Future<Output = Result<AsyncLineReader<TokioFileSource>>> + Send + 'static {
    let path = path.as_ref().to_path_buf();
    let config = config.clone();
    async move { AsyncLineReader::open(&path, &config).await }
}

fn spawn_traversal<S, O, C>(open: O, consumer: C) -> EachLine
where
    S: AsyncByteSource + 'static,
    O: Future<Output = Result<AsyncLineReader<S>>> + Send + 'static,
    C: LineConsumer,
{
    let completion = Arc::new(Completion::new());
    let task = tokio::spawn(run(open, consumer, Arc::clone(&completion)));
    EachLine { task, completion }
}

async fn run<S, O, C>(open: O, consumer: C, completion: Arc<Completion>) -> Result<Traversal>
where
    S: AsyncByteSource,
    O: Future<Output = Result<AsyncLineReader<S>>>,
    C: LineConsumer,
{
    let reader = open.await?;
    let traversal = drive(reader, consumer).await?;
    completion.finish(traversal);
    Ok(traversal)
}

async fn drive<S, C>(mut reader: AsyncLineReader<S>, mut consumer: C) -> Result<Traversal>
where
    S: AsyncByteSource,
    C: LineConsumer,
{
    let mut traversal = Traversal::default();

    while reader.has_next_line() {
        tokio::task::yield_now().await;

        let line = match reader.next_line().await {
            Ok(line) => line,
            Err(e) => {
                if let Err(close_err) = reader.close().await {
                    log::warn!("closing after failed read also failed: {close_err}");
                }
                return Err(e);
            }
        };
        let last = !reader.has_next_line();
        traversal.lines += 1;

        let delivered = panic::catch_unwind(AssertUnwindSafe(|| consumer.deliver(line, last)));
        let decision = match delivered {
            Ok(decision) => decision,
            Err(payload) => {
                if let Err(close_err) = reader.close().await {
                    log::warn!("closing after consumer panic also failed: {close_err}");
                }
                panic::resume_unwind(payload);
            }
        };
        if decision.resolve().await.is_stop() {
            log::debug!("consumer stopped after {} lines", traversal.lines);
            traversal.stopped_early = true;
            break;
        }
    }

    reader.close().await?;
    Ok(traversal)
}

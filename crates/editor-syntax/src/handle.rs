//! A message-passing front end for [`SyntaxClient`].
//!
//! [`SyntaxHandle`] moves a client onto a dedicated worker thread and feeds it commands through
//! an unbounded queue, so edits are applied in submission order and never overlap a highlight
//! pass. Highlight requests reply through a oneshot channel; dropping the returned future cancels
//! the pass.

use std::ops::Range;
use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::client::{IngestMode, SyntaxClient, SyntaxClientConfig};
use crate::edit::TextEdit;
use crate::highlight::HighlightResult;
use crate::layer::LanguageLayer;
use crate::range::RangeSet;

const LOG_TARGET: &str = "editor_syntax::handle";

type DynLayer = Box<dyn LanguageLayer>;

enum Command {
    IngestEdit {
        edit: TextEdit,
        content: String,
    },
    NoteEdit(TextEdit),
    Update(String),
    ReplaceLayer(DynLayer),
    Highlights {
        content: String,
        range: Range<usize>,
        reply: oneshot::Sender<Option<HighlightResult>>,
    },
    Snapshot(oneshot::Sender<ClientSnapshot>),
}

/// A copy of the worker-side client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    /// Mirrored content.
    pub content: String,
    /// Line starts of the mirrored content.
    pub line_starts: Vec<usize>,
    /// Regions still owed a reparse.
    pub affected: RangeSet,
    /// How the last ingestion was handled.
    pub last_ingest_mode: IngestMode,
}

/// Cloneable handle to a [`SyntaxClient`] running on its own thread.
///
/// The worker exits once every handle is dropped.
#[derive(Clone)]
pub struct SyntaxHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SyntaxHandle {
    /// Spawn a worker owning a client for `content`.
    pub fn spawn<L>(
        layer: L,
        content: impl Into<String>,
        config: SyntaxClientConfig,
    ) -> std::io::Result<Self>
    where
        L: LanguageLayer + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let content = content.into();

        thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || {
                let layer: DynLayer = Box::new(layer);
                let client = SyntaxClient::new(layer, &content, config);
                run_worker(client, rx);
            })?;

        Ok(Self { tx })
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::warn!(target: LOG_TARGET, "syntax worker is gone, dropping command");
        }
    }

    /// Queue an edit notification with the editor's post-edit content. Never fails.
    pub fn ingest_edit(&self, edit: TextEdit, content: impl Into<String>) {
        self.send(Command::IngestEdit {
            edit,
            content: content.into(),
        });
    }

    /// Queue an edit notification without a content snapshot.
    ///
    /// An edit the worker cannot apply is logged and dropped; the next highlight request
    /// resyncs from its content.
    pub fn note_edit(&self, edit: TextEdit) {
        self.send(Command::NoteEdit(edit));
    }

    /// Queue a whole-content update.
    pub fn update(&self, content: impl Into<String>) {
        self.send(Command::Update(content.into()));
    }

    /// Queue a switch to another language layer.
    pub fn replace_layer<L>(&self, layer: L)
    where
        L: LanguageLayer + 'static,
    {
        self.send(Command::ReplaceLayer(Box::new(layer)));
    }

    /// Highlight `range` of `content`.
    ///
    /// Returns `None` if the future is dropped before the worker finishes, or if the worker is
    /// gone.
    pub async fn highlights(
        &self,
        content: impl Into<String>,
        range: Range<usize>,
    ) -> Option<HighlightResult> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Highlights {
                content: content.into(),
                range,
                reply,
            })
            .ok()?;
        rx.await.ok().flatten()
    }

    /// Read the worker-side state once every previously queued command has run.
    pub async fn snapshot(&self) -> Option<ClientSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot(reply)).ok()?;
        rx.await.ok()
    }
}

fn run_worker(mut client: SyntaxClient<DynLayer>, mut rx: mpsc::UnboundedReceiver<Command>) {
    tracing::debug!(target: LOG_TARGET, "syntax worker started");

    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::IngestEdit { edit, content } => client.ingest_edit(&edit, &content),
            Command::NoteEdit(edit) => {
                if let Err(err) = client.note_edit(&edit) {
                    tracing::debug!(target: LOG_TARGET, error = %err, "dropping edit");
                }
            }
            Command::Update(content) => client.update(&content),
            Command::ReplaceLayer(layer) => {
                client.replace_layer(layer);
            }
            Command::Highlights {
                content,
                range,
                reply,
            } => {
                let result = client.parse_highlights(&content, range, || reply.is_closed());
                if result.is_none() {
                    tracing::debug!(target: LOG_TARGET, "highlight request cancelled");
                }
                let _ = reply.send(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(ClientSnapshot {
                    content: client.content().to_string(),
                    line_starts: client.position_index().line_starts().to_vec(),
                    affected: client.affected_ranges().ranges().clone(),
                    last_ingest_mode: client.last_ingest_mode(),
                });
            }
        }
    }

    tracing::debug!(target: LOG_TARGET, "syntax worker stopped");
}

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use editor_syntax::{
    EditDescriptor, IngestMode, LanguageLayer, NamedRange, RangeSet, SyntaxClientConfig,
    SyntaxHandle, SyntaxType, TextEdit,
};

/// Captures every occurrence of `word` as a keyword. `hold` blocks reparse until cleared.
struct WordLayer {
    word: &'static str,
    hold: Arc<AtomicBool>,
    reparses: Arc<AtomicUsize>,
}

impl WordLayer {
    fn new(word: &'static str) -> Self {
        Self {
            word,
            hold: Arc::new(AtomicBool::new(false)),
            reparses: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl LanguageLayer for WordLayer {
    fn apply_edit(&mut self, _: &EditDescriptor) {}

    fn reparse(&mut self, _: &str, affecting: &RangeSet, _: bool) -> RangeSet {
        while self.hold.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(2));
        }
        self.reparses.fetch_add(1, Ordering::SeqCst);
        affecting.clone()
    }

    fn captures(&self, range: Range<usize>, text: &str) -> Vec<NamedRange> {
        if self.word.is_empty() {
            return Vec::new();
        }
        text.match_indices(self.word)
            .map(|(i, m)| i..i + m.len())
            .filter(|r| r.start < range.end && r.end > range.start)
            .map(|r| NamedRange::new("keyword", r))
            .collect()
    }

    fn replace_content(&mut self, _: &str) {}
}

#[tokio::test]
async fn test_edits_apply_in_submission_order() {
    let handle =
        SyntaxHandle::spawn(WordLayer::new("fn"), "", SyntaxClientConfig::default()).unwrap();

    let mut text = String::new();
    for (i, piece) in ["fn", " main", "()", "\n", "fn", " x"].iter().enumerate() {
        let offset = text.len();
        text.push_str(piece);
        handle.ingest_edit(TextEdit::insert(offset, *piece), text.clone());
        if i == 3 {
            let snapshot = handle.snapshot().await.unwrap();
            assert_eq!(snapshot.content, "fn main()\n");
            assert_eq!(snapshot.last_ingest_mode, IngestMode::Incremental);
        }
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.content, "fn main()\nfn x");
    assert_eq!(snapshot.line_starts, vec![0, 10]);
    assert_eq!(snapshot.last_ingest_mode, IngestMode::Incremental);
    assert_eq!(snapshot.affected.ranges(), &[0..14]);

    let result = handle.highlights(text.clone(), 0..text.len()).await.unwrap();
    let ranges: Vec<_> = result.highlights.iter().map(|s| s.range.clone()).collect();
    assert_eq!(ranges, vec![0..2, 10..12]);
    assert!(result.highlights.iter().all(|s| s.category == SyntaxType::Keywords));
}

#[tokio::test]
async fn test_note_edit_and_update() {
    let handle = SyntaxHandle::spawn(
        WordLayer::new("let"),
        "x",
        SyntaxClientConfig::new().with_worker_name("syntax-test"),
    )
    .unwrap();

    handle.note_edit(TextEdit::insert(0, "let "));
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.content, "let x");

    // Inconsistent raw edits are dropped without touching the state.
    handle.note_edit(TextEdit::new(0..1, 0, "yy"));
    assert_eq!(handle.snapshot().await.unwrap().content, "let x");

    handle.update("let x\nlet y");
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.line_starts, vec![0, 6]);

    let result = handle.highlights("let x\nlet y", 6..11).await.unwrap();
    assert_eq!(result.update_range, 0..11);
    assert_eq!(result.highlights.len(), 2);
}

#[tokio::test]
async fn test_replace_layer_clears_old_highlights() {
    let handle =
        SyntaxHandle::spawn(WordLayer::new("foo"), "foo bar", SyntaxClientConfig::default())
            .unwrap();

    let first = handle.highlights("foo bar", 0..7).await.unwrap();
    assert_eq!(first.highlights.len(), 1);

    handle.replace_layer(WordLayer::new(""));
    let second = handle.highlights("foo bar", 0..7).await.unwrap();
    assert!(second.highlights.is_empty());
    assert_eq!(second.update_range, 0..7);
}

#[tokio::test]
async fn test_dropped_request_keeps_pending_work() {
    let layer = WordLayer::new("fn");
    let hold = layer.hold.clone();
    let reparses = layer.reparses.clone();
    let handle = SyntaxHandle::spawn(layer, "", SyntaxClientConfig::default()).unwrap();

    handle.ingest_edit(TextEdit::insert(0, "fn"), "fn");
    hold.store(true, Ordering::SeqCst);

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), handle.highlights("fn", 0..2)).await;
    assert!(timed_out.is_err());
    hold.store(false, Ordering::SeqCst);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.affected.ranges(), &[0..2]);

    let result = handle.highlights("fn", 0..2).await.unwrap();
    assert_eq!(result.highlights.len(), 1);
    assert!(reparses.load(Ordering::SeqCst) >= 1);

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.affected.is_empty());
}

#[tokio::test]
async fn test_clones_share_one_worker() {
    let handle =
        SyntaxHandle::spawn(WordLayer::new("a"), "", SyntaxClientConfig::default()).unwrap();
    let other = handle.clone();

    handle.ingest_edit(TextEdit::insert(0, "a"), "a");
    other.ingest_edit(TextEdit::insert(1, "a"), "aa");

    let result = other.highlights("aa", 0..2).await.unwrap();
    assert_eq!(result.highlights.len(), 2);
    drop(handle);
    assert_eq!(other.snapshot().await.unwrap().content, "aa");
}

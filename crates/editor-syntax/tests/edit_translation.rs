use editor_syntax::{AffectedRanges, MirroredContent, Point, PositionIndex, TextEdit};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAGMENTS: &[&str] = &[
    "a", "fn", " ", "é", "你好", "\n", "\r", "\r\n", "\n\n", "let x = 1;\r\n", "line\rnext\n",
];

fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

fn random_text(rng: &mut StdRng, pieces: usize) -> String {
    (0..pieces)
        .map(|_| FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())])
        .collect()
}

fn random_edit(rng: &mut StdRng, text: &str) -> TextEdit {
    let boundaries = char_boundaries(text);
    let a = boundaries[rng.gen_range(0..boundaries.len())];
    let b = boundaries[rng.gen_range(0..boundaries.len())];
    let replaced = a.min(b)..a.max(b);

    let pieces = rng.gen_range(1..4);
    match rng.gen_range(0..4) {
        0 => TextEdit::insert(replaced.start, random_text(rng, pieces)),
        1 => TextEdit::delete(replaced.start, replaced.len()),
        2 => TextEdit::replace(replaced, random_text(rng, pieces)),
        _ => TextEdit::insert(replaced.start, "\r\n\n\r"),
    }
}

fn apply_to_string(text: &mut String, edit: &TextEdit) {
    let replaced = edit.pre_edit_range().expect("consistent edit");
    text.replace_range(replaced, &edit.inserted_text);
}

#[test]
fn test_incremental_index_matches_rebuild() {
    for seed in 0..64u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut reference = random_text(&mut rng, 20);
        let mut content = MirroredContent::new(reference.clone());

        for step in 0..200 {
            let edit = random_edit(&mut rng, &reference);
            content
                .apply_edit(&edit)
                .unwrap_or_else(|err| panic!("seed {seed} step {step}: {err}"));
            apply_to_string(&mut reference, &edit);

            assert_eq!(content.text(), reference, "seed {seed} step {step}");
            assert_eq!(
                content.index(),
                &PositionIndex::from_text(&reference),
                "seed {seed} step {step} after {edit:?}"
            );
        }
    }
}

#[test]
fn test_descriptor_points_match_rebuilt_indexes() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut content = MirroredContent::new(random_text(&mut rng, 30));

    for _ in 0..300 {
        let old_index = PositionIndex::from_text(content.text());
        let edit = random_edit(&mut rng, content.text());
        let descriptor = content.apply_edit(&edit).unwrap();
        let new_index = PositionIndex::from_text(content.text());

        assert_eq!(
            Some(descriptor.start_position),
            old_index.point_for_offset(descriptor.start_byte)
        );
        assert_eq!(
            Some(descriptor.old_end_position),
            old_index.point_for_offset(descriptor.old_end_byte)
        );
        assert_eq!(
            Some(descriptor.new_end_position),
            new_index.point_for_offset(descriptor.new_end_byte)
        );
    }
}

#[test]
fn test_insert_newline_matches_rebuild() {
    let mut content = MirroredContent::new("abc");
    content.apply_edit(&TextEdit::new(3..4, 1, "\n")).unwrap();

    assert_eq!(content.index(), &PositionIndex::from_text("abc\n"));
    assert_eq!(content.index().line_starts(), &[0, 4]);
}

#[test]
fn test_round_trip_after_edits() {
    let mut content = MirroredContent::new("alpha\r\nbeta\ngamma\rdelta");
    content.apply_edit(&TextEdit::insert(7, "\r")).unwrap();
    content.apply_edit(&TextEdit::replace(0..2, "A\nB")).unwrap();

    let text = content.text().to_string();
    for offset in 0..=text.len() {
        let point = content.index().point_for_offset(offset).unwrap();
        assert_eq!(content.index().offset_for_point(point), Some(offset));
    }
    assert_eq!(
        content.index().point_for_offset(text.len()),
        Some(Point::new(content.index().line_count() - 1, "delta".len()))
    );
}

#[test]
fn test_union_range_contains_every_edit() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut text = random_text(&mut rng, 40);
    let mut tracker = AffectedRanges::new();
    // Every edited range so far, mapped into the current coordinates.
    let mut edited: Vec<std::ops::Range<usize>> = Vec::new();

    for _ in 0..50 {
        let edit = random_edit(&mut rng, &text);
        let pre_edit = edit.pre_edit_range().unwrap();
        for range in &mut edited {
            *range = editor_syntax::map_range(range, &pre_edit, &edit.edited_range);
        }
        edited.push(edit.edited_range.clone());

        apply_to_string(&mut text, &edit);
        tracker.append(edit.edited_range.clone(), edit.delta);

        let union = tracker.union_range().unwrap();
        for range in &edited {
            assert!(
                union.start <= range.start && range.end <= union.end,
                "{range:?} outside {union:?}"
            );
            assert!(tracker.ranges().intersects(range));
        }
    }

    tracker.clear();
    assert_eq!(tracker.union_range(), None);
}

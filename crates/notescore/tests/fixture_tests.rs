//! End-to-end scoring of the JSON fixtures in tests/fixtures/.

use std::path::{Path, PathBuf};

use notescore::{evaluate_corpus, report, Error, NoteCollection, Tier};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> NoteCollection {
    NoteCollection::load(&fixture(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

#[test]
fn fixture_corpus_report() {
    let reference = load("annotations.json");
    let estimate = load("predictions.json");

    let evaluation = evaluate_corpus(&reference, &estimate, 0.05).unwrap();

    // Prediction order, minus "4" (no annotation); "3" has no prediction.
    assert_eq!(evaluation.song_ids, vec!["2".to_string(), "1".to_string()]);

    let expected = "         Precision Recall F1-score\n\
                    COnPOff  0.375000 0.416667 0.392857\n\
                    COnP     0.750000 0.833333 0.785714\n\
                    COn      0.750000 0.833333 0.785714\n\
                    gt note num: 5 pred note num: 6\n\
                    song number: 2\n";
    assert_eq!(report::render(&evaluation.result), expected);
}

#[test]
fn fixture_per_song_records() {
    let reference = load("annotations.json");
    let estimate = load("predictions.json");
    let evaluation = evaluate_corpus(&reference, &estimate, 0.05).unwrap();

    // Song 2: the second note's offset is 0.7 s late, so it only counts without offsets.
    let song2 = &evaluation.records[0];
    assert_eq!(song2.reference_count, 2);
    assert_eq!(song2.matched(Tier::OnsetPitchOffset), 1);
    assert_eq!(song2.matched(Tier::OnsetPitch), 2);

    // Song 1: one wrong pitch and one spurious note.
    let song1 = &evaluation.records[1];
    assert_eq!(song1.reference_count, 3);
    assert_eq!(song1.estimate_count, 4);
    assert_eq!(song1.onset_pitch.precision, 0.5);
    assert_eq!(song1.matched(Tier::Onset), 2);
}

#[test]
fn fixture_wider_tolerance_recovers_nothing_extra() {
    // The remaining misses are pitch and offset errors, not onset errors.
    let reference = load("annotations.json");
    let estimate = load("predictions.json");

    let tight = evaluate_corpus(&reference, &estimate, 0.05).unwrap();
    let wide = evaluate_corpus(&reference, &estimate, 0.1).unwrap();
    assert_eq!(tight.result, wide.result);
}

#[test]
fn fixture_malformed_note_names_song() {
    let err = NoteCollection::load(&fixture("malformed_predictions.json")).unwrap_err();
    match err {
        Error::MalformedSong { song, origin, .. } => {
            assert_eq!(song, "2");
            assert!(origin.ends_with("malformed_predictions.json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn fixture_missing_file() {
    let err = NoteCollection::load(&fixture("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert!(err.to_string().contains("does_not_exist.json"));
}

#[test]
fn fixture_no_shared_songs() {
    let reference = load("annotations.json");
    let estimate = load("unrelated_predictions.json");

    let err = evaluate_corpus(&reference, &estimate, 0.05).unwrap_err();
    assert!(matches!(err, Error::EmptyCorpus));
}

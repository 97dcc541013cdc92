//! Note-level scoring of automatic music transcription.
//!
//! Reference and estimate notes are matched one-to-one under onset, pitch and
//! offset tolerances. Each song yields precision/recall/F-measure for three
//! tiers (COnPOff, COnP, COn), and a corpus result averages those rates over
//! songs while summing note counts.
//!
//! ```
//! use notescore::{score, Note, ScoreParams, Tier};
//!
//! let reference = vec![Some(Note::new(0.0, 1.0, 60.0)), Some(Note::new(2.0, 3.0, 62.0))];
//! let estimate = vec![Some(Note::new(0.02, 1.0, 60.0)), Some(Note::new(2.5, 3.0, 62.0))];
//!
//! let record = score(&reference, &estimate, &ScoreParams::default());
//! assert_eq!(record.tier(Tier::Onset).recall, 0.5);
//! ```

pub mod aggregate;
pub mod corpus;
pub mod matching;
pub mod note;
pub mod prepare;
pub mod report;
pub mod score;

pub use aggregate::{CorpusAggregator, CorpusResult};
pub use corpus::{evaluate_corpus, evaluate_corpus_with, pair_songs, CorpusEvaluation, NoteCollection};
pub use matching::{maximum_bipartite_match, Matching};
pub use note::{midi_to_hz, Note, NoteList, NoteSet};
pub use prepare::{prepare, PreparedNotes};
pub use score::{f_measure, score, ScoreParams, ScoreRecord, Tier, TierScores, RECORD_LEN};

use std::path::PathBuf;

/// Errors from loading and scoring note collections.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a JSON object of song IDs: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed notes for song {song} in {origin}: {source}")]
    MalformedSong {
        origin: String,
        song: String,
        source: serde_json::Error,
    },

    #[error("reference and estimate collections share no song IDs")]
    EmptyCorpus,
}

pub type Result<T> = std::result::Result<T, Error>;

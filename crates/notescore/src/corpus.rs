//! Song collections and corpus-wide evaluation.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{CorpusAggregator, CorpusResult};
use crate::note::NoteList;
use crate::score::{score, ScoreParams, ScoreRecord, Tier};
use crate::{Error, Result};

/// Song ID → note list, in file order.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    songs: Vec<(String, NoteList)>,
    index: HashMap<String, usize>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a song. Replacing keeps the song's original position.
    pub fn insert(&mut self, id: impl Into<String>, notes: NoteList) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&i) => self.songs[i].1 = notes,
            None => {
                self.index.insert(id.clone(), self.songs.len());
                self.songs.push((id, notes));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&NoteList> {
        self.index.get(id).map(|&i| &self.songs[i].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.songs.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NoteList)> {
        self.songs.iter().map(|(id, notes)| (id.as_str(), notes))
    }

    /// Read a collection file: a JSON object mapping song ID to a list of
    /// `[onset, offset, pitch]` triples or `null`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let songs: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_map(songs, &path.display().to_string())
    }

    /// Parse a collection from JSON text. `origin` names the source in errors.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self> {
        let songs: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(text).map_err(|source| Error::Json {
                path: origin.into(),
                source,
            })?;

        Self::from_map(songs, origin)
    }

    fn from_map(songs: serde_json::Map<String, serde_json::Value>, origin: &str) -> Result<Self> {
        let mut collection = Self::new();
        for (id, value) in songs {
            let notes: NoteList =
                serde_json::from_value(value).map_err(|source| Error::MalformedSong {
                    origin: origin.to_string(),
                    song: id.clone(),
                    source,
                })?;
            collection.insert(id, notes);
        }
        Ok(collection)
    }
}

impl<S: Into<String>> FromIterator<(S, NoteList)> for NoteCollection {
    fn from_iter<I: IntoIterator<Item = (S, NoteList)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (id, notes) in iter {
            collection.insert(id, notes);
        }
        collection
    }
}

/// Songs present in both collections, in the estimate's order.
///
/// IDs found on only one side are left out; this is the intersection policy,
/// not an error.
pub fn pair_songs<'a>(
    reference: &'a NoteCollection,
    estimate: &'a NoteCollection,
) -> Vec<(&'a str, &'a NoteList, &'a NoteList)> {
    let mut pairs = Vec::new();
    for (id, est_notes) in estimate.iter() {
        match reference.get(id) {
            Some(ref_notes) => pairs.push((id, ref_notes, est_notes)),
            None => debug!(song = id, "no reference annotation, skipping"),
        }
    }

    let unpredicted = reference.ids().filter(|id| !estimate.contains(id)).count();
    if unpredicted > 0 {
        debug!(count = unpredicted, "reference songs without an estimate");
    }

    pairs
}

/// Result of scoring a whole corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusEvaluation {
    pub result: CorpusResult,
    /// Song IDs that were scored, in scoring order.
    pub song_ids: Vec<String>,
    /// Per-song records, parallel to `song_ids`.
    pub records: Vec<ScoreRecord>,
}

/// Score every shared song with default tolerances except `onset_tolerance`.
pub fn evaluate_corpus(
    reference: &NoteCollection,
    estimate: &NoteCollection,
    onset_tolerance: f64,
) -> Result<CorpusEvaluation> {
    let params = ScoreParams::default().with_onset_tolerance(onset_tolerance);
    evaluate_corpus_with(reference, estimate, &params)
}

/// Score every shared song and aggregate. Fails with [`Error::EmptyCorpus`]
/// when the collections share no song IDs.
pub fn evaluate_corpus_with(
    reference: &NoteCollection,
    estimate: &NoteCollection,
    params: &ScoreParams,
) -> Result<CorpusEvaluation> {
    let pairs = pair_songs(reference, estimate);

    let mut aggregator = CorpusAggregator::new();
    let mut song_ids = Vec::with_capacity(pairs.len());
    let mut records = Vec::with_capacity(pairs.len());

    for (id, ref_notes, est_notes) in pairs {
        let record = score(ref_notes, est_notes, params);

        if record.reference_count == 0 {
            warn!(song = id, "no valid reference notes, recall is 0 for this song");
        }
        debug!(
            song = id,
            reference = record.reference_count,
            estimate = record.estimate_count,
            matched_conpoff = record.matched(Tier::OnsetPitchOffset),
            matched_conp = record.matched(Tier::OnsetPitch),
            matched_con = record.matched(Tier::Onset),
            "scored song"
        );

        aggregator.push(&record);
        song_ids.push(id.to_string());
        records.push(record);
    }

    let result = aggregator.finish()?;
    info!(
        songs = result.song_count,
        reference_notes = result.reference_count,
        estimate_notes = result.estimate_count,
        "corpus evaluated"
    );

    Ok(CorpusEvaluation {
        result,
        song_ids,
        records,
    })
}

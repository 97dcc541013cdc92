use serde::{Deserialize, Serialize};

use crate::score::{ScoreRecord, Tier, TierScores, RECORD_LEN};
use crate::{Error, Result};

/// Corpus-level scores.
///
/// Rates are the mean of per-song rates (every song weighs the same, including
/// songs with no reference notes). Counts are plain totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusResult {
    pub onset_pitch_offset: TierScores,
    pub onset_pitch: TierScores,
    pub onset: TierScores,
    pub reference_count: usize,
    pub estimate_count: usize,
    pub matched_onset_pitch_offset: usize,
    pub matched_onset_pitch: usize,
    pub matched_onset: usize,
    pub song_count: usize,
}

impl CorpusResult {
    pub fn tier(&self, tier: Tier) -> &TierScores {
        match tier {
            Tier::OnsetPitchOffset => &self.onset_pitch_offset,
            Tier::OnsetPitch => &self.onset_pitch,
            Tier::Onset => &self.onset,
        }
    }

    pub fn matched(&self, tier: Tier) -> usize {
        match tier {
            Tier::OnsetPitchOffset => self.matched_onset_pitch_offset,
            Tier::OnsetPitch => self.matched_onset_pitch,
            Tier::Onset => self.matched_onset,
        }
    }

    /// Same layout as [`ScoreRecord::to_array`].
    pub fn to_array(&self) -> [f64; RECORD_LEN] {
        ScoreRecord {
            onset_pitch_offset: self.onset_pitch_offset,
            onset_pitch: self.onset_pitch,
            onset: self.onset,
            reference_count: self.reference_count,
            estimate_count: self.estimate_count,
            matched_onset_pitch_offset: self.matched_onset_pitch_offset,
            matched_onset_pitch: self.matched_onset_pitch,
            matched_onset: self.matched_onset,
        }
        .to_array()
    }
}

/// Running sum of per-song records.
#[derive(Debug, Clone, Default)]
pub struct CorpusAggregator {
    sum: ScoreRecord,
    songs: usize,
}

impl CorpusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &ScoreRecord) {
        add_scores(&mut self.sum.onset_pitch_offset, &record.onset_pitch_offset);
        add_scores(&mut self.sum.onset_pitch, &record.onset_pitch);
        add_scores(&mut self.sum.onset, &record.onset);
        self.sum.reference_count += record.reference_count;
        self.sum.estimate_count += record.estimate_count;
        self.sum.matched_onset_pitch_offset += record.matched_onset_pitch_offset;
        self.sum.matched_onset_pitch += record.matched_onset_pitch;
        self.sum.matched_onset += record.matched_onset;
        self.songs += 1;
    }

    /// Average the rates over songs. Fails with [`Error::EmptyCorpus`] when
    /// nothing was pushed, since a mean over zero songs is undefined.
    pub fn finish(self) -> Result<CorpusResult> {
        if self.songs == 0 {
            return Err(Error::EmptyCorpus);
        }

        let n = self.songs as f64;
        Ok(CorpusResult {
            onset_pitch_offset: mean_scores(&self.sum.onset_pitch_offset, n),
            onset_pitch: mean_scores(&self.sum.onset_pitch, n),
            onset: mean_scores(&self.sum.onset, n),
            reference_count: self.sum.reference_count,
            estimate_count: self.sum.estimate_count,
            matched_onset_pitch_offset: self.sum.matched_onset_pitch_offset,
            matched_onset_pitch: self.sum.matched_onset_pitch,
            matched_onset: self.sum.matched_onset,
            song_count: self.songs,
        })
    }
}

impl<'a> Extend<&'a ScoreRecord> for CorpusAggregator {
    fn extend<I: IntoIterator<Item = &'a ScoreRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }
}

fn add_scores(total: &mut TierScores, scores: &TierScores) {
    total.precision += scores.precision;
    total.recall += scores.recall;
    total.f_measure += scores.f_measure;
}

fn mean_scores(total: &TierScores, n: f64) -> TierScores {
    TierScores {
        precision: total.precision / n,
        recall: total.recall / n,
        f_measure: total.f_measure / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(rates: [f64; 9], counts: [usize; 5]) -> ScoreRecord {
        let tier = |i: usize| TierScores {
            precision: rates[i],
            recall: rates[i + 1],
            f_measure: rates[i + 2],
        };
        ScoreRecord {
            onset_pitch_offset: tier(0),
            onset_pitch: tier(3),
            onset: tier(6),
            reference_count: counts[0],
            estimate_count: counts[1],
            matched_onset_pitch_offset: counts[2],
            matched_onset_pitch: counts[3],
            matched_onset: counts[4],
        }
    }

    #[test]
    fn rates_are_averaged_and_counts_summed() {
        let r1 = record([0.5, 0.25, 0.1, 0.6, 0.3, 0.2, 0.7, 0.35, 0.3], [4, 2, 1, 1, 1]);
        let r2 = record([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9], [10, 12, 2, 5, 8]);

        let mut aggregator = CorpusAggregator::new();
        aggregator.extend([&r1, &r2]);
        let result = aggregator.finish().unwrap();

        let a1 = r1.to_array();
        let a2 = r2.to_array();
        let got = result.to_array();
        for i in 0..9 {
            assert_eq!(got[i], (a1[i] + a2[i]) / 2.0, "field {i}");
        }
        for i in 9..RECORD_LEN {
            assert_eq!(got[i], a1[i] + a2[i], "field {i}");
        }
        assert_eq!(result.song_count, 2);
    }

    #[test]
    fn song_without_reference_notes_still_counts() {
        let perfect = record([1.0; 9], [3, 3, 3, 3, 3]);
        let silent = ScoreRecord::default();

        let mut aggregator = CorpusAggregator::new();
        aggregator.push(&perfect);
        aggregator.push(&silent);
        let result = aggregator.finish().unwrap();

        assert_eq!(result.onset_pitch.recall, 0.5);
        assert_eq!(result.reference_count, 3);
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let err = CorpusAggregator::new().finish().unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }
}

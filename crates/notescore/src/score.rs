//! Three-tier note matching and per-song precision/recall/F-measure.

use scoreconf::ScoreConfig;
use serde::{Deserialize, Serialize};

use crate::matching::{maximum_bipartite_match, Matching};
use crate::note::Note;
use crate::prepare::{prepare, PreparedNotes};

/// Number of fields in the flat vector view of a [`ScoreRecord`].
pub const RECORD_LEN: usize = 14;

/// Distances are rounded to this many decimals before tolerance tests, so
/// e.g. `|0.02 - 0.07|` counts as exactly 0.05.
const DISTANCE_DECIMALS: i32 = 7;

/// Tolerances and corrections used when scoring one song.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreParams {
    /// Maximum onset distance in seconds. Default: 0.05
    pub onset_tolerance: f64,
    /// Maximum pitch distance in cents. Default: 50
    pub pitch_tolerance_cents: f64,
    /// Offset window as a fraction of reference duration. Default: 0.2
    pub offset_ratio: f64,
    /// Minimum offset window in seconds. Default: 0.05
    pub offset_min_tolerance: f64,
    /// Clock offset between the two sides in seconds. Default: 0
    pub time_shift: f64,
    /// Semitones added to every reference pitch. Default: 0
    pub pitch_shift_semitones: f64,
    /// Compare with `<` instead of `<=`.
    pub strict: bool,
    /// Whether the onset tier also requires a pitch hit. Default: true
    pub onset_tier_checks_pitch: bool,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            onset_tolerance: 0.05,
            pitch_tolerance_cents: 50.0,
            offset_ratio: 0.2,
            offset_min_tolerance: 0.05,
            time_shift: 0.0,
            pitch_shift_semitones: 0.0,
            strict: false,
            onset_tier_checks_pitch: true,
        }
    }
}

impl ScoreParams {
    pub fn with_onset_tolerance(mut self, onset_tolerance: f64) -> Self {
        self.onset_tolerance = onset_tolerance;
        self
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = time_shift;
        self
    }

    pub fn with_pitch_shift(mut self, semitones: f64) -> Self {
        self.pitch_shift_semitones = semitones;
        self
    }

    fn within(&self, distance: f64, tolerance: f64) -> bool {
        if self.strict {
            distance < tolerance
        } else {
            distance <= tolerance
        }
    }
}

impl From<&ScoreConfig> for ScoreParams {
    fn from(config: &ScoreConfig) -> Self {
        Self {
            onset_tolerance: config.tolerance.onset,
            pitch_tolerance_cents: config.tolerance.pitch_cents,
            offset_ratio: config.tolerance.offset_ratio,
            offset_min_tolerance: config.tolerance.offset_min,
            time_shift: config.shift.time,
            pitch_shift_semitones: config.shift.pitch_semitones,
            strict: config.tolerance.strict,
            onset_tier_checks_pitch: config.tolerance.onset_tier_checks_pitch,
        }
    }
}

/// Matching criteria, from strictest to most relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Onset, pitch and offset must all match (COnPOff).
    OnsetPitchOffset,
    /// Onset and pitch must match (COnP).
    OnsetPitch,
    /// Onset must match; pitch too unless disabled in [`ScoreParams`] (COn).
    Onset,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::OnsetPitchOffset, Tier::OnsetPitch, Tier::Onset];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::OnsetPitchOffset => "COnPOff",
            Tier::OnsetPitch => "COnP",
            Tier::Onset => "COn",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierScores {
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

impl TierScores {
    /// Rates for `matched` pairs out of `n_reference` / `n_estimate` notes.
    /// An empty side yields a rate of 0 rather than a division by zero.
    pub fn from_match_count(matched: usize, n_reference: usize, n_estimate: usize) -> Self {
        let precision = ratio(matched, n_estimate);
        let recall = ratio(matched, n_reference);
        Self {
            precision,
            recall,
            f_measure: f_measure(precision, recall),
        }
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Harmonic mean of precision and recall, 0 when both are 0.
pub fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Scores for one song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub onset_pitch_offset: TierScores,
    pub onset_pitch: TierScores,
    pub onset: TierScores,
    pub reference_count: usize,
    pub estimate_count: usize,
    /// `round(recall * reference_count)` per tier.
    pub matched_onset_pitch_offset: usize,
    pub matched_onset_pitch: usize,
    pub matched_onset: usize,
}

impl ScoreRecord {
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

    fn set_tier(&mut self, tier: Tier, scores: TierScores) {
        let matched = (scores.recall * self.reference_count as f64).round() as usize;
        match tier {
            Tier::OnsetPitchOffset => {
                self.onset_pitch_offset = scores;
                self.matched_onset_pitch_offset = matched;
            }
            Tier::OnsetPitch => {
                self.onset_pitch = scores;
                self.matched_onset_pitch = matched;
            }
            Tier::Onset => {
                self.onset = scores;
                self.matched_onset = matched;
            }
        }
    }

    /// Flat view: P/R/F for COnPOff, COnP, COn, then reference count,
    /// estimate count, and the three matched counts.
    pub fn to_array(&self) -> [f64; RECORD_LEN] {
        let t = [&self.onset_pitch_offset, &self.onset_pitch, &self.onset];
        [
            t[0].precision,
            t[0].recall,
            t[0].f_measure,
            t[1].precision,
            t[1].recall,
            t[1].f_measure,
            t[2].precision,
            t[2].recall,
            t[2].f_measure,
            self.reference_count as f64,
            self.estimate_count as f64,
            self.matched_onset_pitch_offset as f64,
            self.matched_onset_pitch as f64,
            self.matched_onset as f64,
        ]
    }
}

/// Score one song's estimate against its reference.
///
/// Notes are filtered and clock-aligned by `params.time_shift`, reference
/// pitches are moved by `params.pitch_shift_semitones`, and each tier is
/// scored from a maximum matching under its compatibility rule. With no
/// valid estimate notes only `reference_count` is set.
pub fn score(reference: &[Option<Note>], estimate: &[Option<Note>], params: &ScoreParams) -> ScoreRecord {
    let mut prepared = prepare(reference, estimate, params.time_shift);
    prepared.reference.shift_pitches(params.pitch_shift_semitones);

    let mut record = ScoreRecord {
        reference_count: prepared.reference.len(),
        ..ScoreRecord::default()
    };

    if prepared.estimate.is_empty() {
        return record;
    }
    record.estimate_count = prepared.estimate.len();

    let hits = HitMatrix::compute(&prepared, params);
    for tier in Tier::ALL {
        let matching = hits.match_tier(tier, params.onset_tier_checks_pitch);
        let scores = TierScores::from_match_count(
            matching.len(),
            record.reference_count,
            record.estimate_count,
        );
        record.set_tier(tier, scores);
    }

    record
}

/// Pairwise onset/pitch/offset hit tests, row-major by reference index.
struct HitMatrix {
    n_reference: usize,
    n_estimate: usize,
    onset: Vec<bool>,
    pitch: Vec<bool>,
    offset: Vec<bool>,
}

impl HitMatrix {
    fn compute(prepared: &PreparedNotes, params: &ScoreParams) -> Self {
        let reference = &prepared.reference;
        let estimate = &prepared.estimate;
        let ref_hz = reference.pitches_hz();
        let est_hz = estimate.pitches_hz();

        let size = reference.len() * estimate.len();
        let mut onset = Vec::with_capacity(size);
        let mut pitch = Vec::with_capacity(size);
        let mut offset = Vec::with_capacity(size);

        for (r, ref_iv) in reference.intervals.iter().enumerate() {
            let ref_cents = 1200.0 * ref_hz[r].log2();
            let offset_window = (params.offset_ratio * (ref_iv[1] - ref_iv[0])).max(params.offset_min_tolerance);

            for (e, est_iv) in estimate.intervals.iter().enumerate() {
                let onset_distance = round_distance((ref_iv[0] - est_iv[0]).abs());
                let cents_distance = round_distance((ref_cents - 1200.0 * est_hz[e].log2()).abs());
                let offset_distance = round_distance((ref_iv[1] - est_iv[1]).abs());

                onset.push(params.within(onset_distance, params.onset_tolerance));
                pitch.push(params.within(cents_distance, params.pitch_tolerance_cents));
                offset.push(params.within(offset_distance, offset_window));
            }
        }

        Self {
            n_reference: reference.len(),
            n_estimate: estimate.len(),
            onset,
            pitch,
            offset,
        }
    }

    fn match_tier(&self, tier: Tier, onset_tier_checks_pitch: bool) -> Matching {
        let n = self.n_estimate;
        maximum_bipartite_match(self.n_reference, self.n_estimate, |r, e| {
            let i = r * n + e;
            match tier {
                Tier::OnsetPitchOffset => self.onset[i] && self.pitch[i] && self.offset[i],
                Tier::OnsetPitch => self.onset[i] && self.pitch[i],
                Tier::Onset => self.onset[i] && (!onset_tier_checks_pitch || self.pitch[i]),
            }
        })
    }
}

fn round_distance(distance: f64) -> f64 {
    let scale = 10f64.powi(DISTANCE_DECIMALS);
    (distance * scale).round() / scale
}

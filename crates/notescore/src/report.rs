//! Plain-text console report.

use std::fmt::Write;

use crate::aggregate::CorpusResult;
use crate::score::{ScoreRecord, Tier};

/// Render the corpus summary table.
///
/// ```text
///          Precision Recall F1-score
/// COnPOff  0.512345 0.498765 0.505432
/// COnP     0.734567 0.712345 0.723287
/// COn      0.734567 0.712345 0.723287
/// gt note num: 1234 pred note num: 1201
/// song number: 10
/// ```
pub fn render(result: &CorpusResult) -> String {
    let mut out = String::new();
    out.push_str("         Precision Recall F1-score\n");
    for tier in Tier::ALL {
        let scores = result.tier(tier);
        let _ = writeln!(
            out,
            "{:<9}{:.6} {:.6} {:.6}",
            tier.label(),
            scores.precision,
            scores.recall,
            scores.f_measure
        );
    }
    let _ = writeln!(
        out,
        "gt note num: {} pred note num: {}",
        result.reference_count, result.estimate_count
    );
    let _ = writeln!(out, "song number: {}", result.song_count);
    out
}

/// One line per song: ID, note counts, then F-measure per tier.
pub fn render_song(id: &str, record: &ScoreRecord) -> String {
    let mut line = format!(
        "{id}\tgt={} pred={}",
        record.reference_count, record.estimate_count
    );
    for tier in Tier::ALL {
        let _ = write!(line, " {}={:.6}", tier.label(), record.tier(tier).f_measure);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::TierScores;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_layout() {
        let result = CorpusResult {
            onset_pitch_offset: TierScores {
                precision: 0.5,
                recall: 0.25,
                f_measure: 1.0 / 3.0,
            },
            onset_pitch: TierScores {
                precision: 1.0,
                recall: 0.5,
                f_measure: 2.0 / 3.0,
            },
            onset: TierScores {
                precision: 1.0,
                recall: 0.5,
                f_measure: 2.0 / 3.0,
            },
            reference_count: 8,
            estimate_count: 4,
            matched_onset_pitch_offset: 2,
            matched_onset_pitch: 4,
            matched_onset: 4,
            song_count: 2,
        };

        let expected = "         Precision Recall F1-score\n\
                        COnPOff  0.500000 0.250000 0.333333\n\
                        COnP     1.000000 0.500000 0.666667\n\
                        COn      1.000000 0.500000 0.666667\n\
                        gt note num: 8 pred note num: 4\n\
                        song number: 2\n";
        assert_eq!(render(&result), expected);
    }

    #[test]
    fn song_line() {
        let record = ScoreRecord {
            reference_count: 3,
            estimate_count: 0,
            ..ScoreRecord::default()
        };
        assert_eq!(
            render_song("42", &record),
            "42\tgt=3 pred=0 COnPOff=0.000000 COnP=0.000000 COn=0.000000"
        );
    }
}

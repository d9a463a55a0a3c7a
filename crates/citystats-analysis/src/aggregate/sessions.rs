//! Views over session scores and metadata.

use std::collections::{BTreeMap, HashMap};

use chrono::TimeDelta;
use citystats_stats::{
    descriptive::DescriptiveStats,
    percentiles::{Percentiles, compute_percentile},
};
use serde::{Deserialize, Serialize};

use crate::context::Snapshot;

/// Percentile ranks reported for the session score distribution.
pub const PERCENTILE_RANKS: [u8; 20] = [
    10, 20, 30, 40, 50, 60, 70, 80, 90, 91, 92, 93, 94, 95, 96, 97, 98, 99, 25, 75,
];

/// Session score percentiles keyed by rank label (`"50"`, `"99"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScorePercentiles {
    values: BTreeMap<String, f64>,
}

impl ScorePercentiles {
    #[must_use]
    pub fn get(&self, rank: u8) -> Option<f64> {
        self.values.get(&rank.to_string()).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Median score and number of sessions for one nationality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NationalityStats {
    pub median: f64,
    pub sessions: usize,
}

/// Session counts used for the snapshot overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub sessions: usize,
    pub with_ip: usize,
    pub with_country: usize,
    pub with_time: usize,
}

/// Distribution of time spent per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSummary {
    pub sessions: usize,
    pub median: TimeDelta,
    pub max: TimeDelta,
}

#[expect(clippy::cast_precision_loss)]
fn sorted_scores<I>(scores: I) -> Vec<f64>
where
    I: IntoIterator<Item = usize>,
{
    let mut scores: Vec<f64> = scores.into_iter().map(|s| s as f64).collect();
    scores.sort_by(f64::total_cmp);
    scores
}

/// Percentiles of the number of cities guessed per session.
#[must_use]
pub fn percentiles(snapshot: &Snapshot) -> ScorePercentiles {
    let scores = sorted_scores(snapshot.sessions.iter().map(|s| s.score()));
    let ranks = PERCENTILE_RANKS.map(f64::from);
    let values = Percentiles::from_sorted(&scores, &ranks)
        .iter()
        .map(|(rank, value)| (rank.to_string(), value))
        .collect();
    ScorePercentiles { values }
}

/// Median score and session volume per resolved country.
#[must_use]
pub fn nationalities(snapshot: &Snapshot) -> BTreeMap<String, NationalityStats> {
    let mut scores_by_country = HashMap::<&str, Vec<usize>>::new();
    for session in &snapshot.sessions {
        let Some(country) = session.country.as_deref() else {
            continue;
        };
        scores_by_country
            .entry(country)
            .or_default()
            .push(session.score());
    }

    scores_by_country
        .into_iter()
        .filter_map(|(country, scores)| {
            let sessions = scores.len();
            let median = compute_percentile(&sorted_scores(scores), 50.0)?;
            Some((country.to_owned(), NationalityStats { median, sessions }))
        })
        .collect()
}

/// Nationalities with at least `min_sessions` sessions, ascending by
/// median score and then by volume.
#[must_use]
pub fn rank_nationalities(
    nationalities: &BTreeMap<String, NationalityStats>,
    min_sessions: usize,
) -> Vec<(&str, NationalityStats)> {
    let mut ranked: Vec<(&str, NationalityStats)> = nationalities
        .iter()
        .filter(|(_, stats)| stats.sessions >= min_sessions)
        .map(|(country, stats)| (country.as_str(), *stats))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| {
        a.median
            .total_cmp(&b.median)
            .then(a.sessions.cmp(&b.sessions))
    });
    ranked
}

#[must_use]
pub fn summary(snapshot: &Snapshot) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        sessions: snapshot.sessions.len(),
        ..SnapshotSummary::default()
    };
    for session in &snapshot.sessions {
        summary.with_ip += usize::from(session.ip.is_some());
        summary.with_country += usize::from(session.country.is_some());
        summary.with_time += usize::from(session.duration().is_some());
    }
    summary
}

/// Median and maximum session duration over sessions with both timestamps.
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
#[must_use]
pub fn session_durations(snapshot: &Snapshot) -> Option<DurationSummary> {
    let millis = snapshot
        .sessions
        .iter()
        .filter_map(|session| session.duration())
        .map(|duration| duration.num_milliseconds() as f64);
    let stats = DescriptiveStats::new(millis)?;
    Some(DurationSummary {
        sessions: stats.count,
        median: TimeDelta::milliseconds(stats.median.round() as i64),
        max: TimeDelta::milliseconds(stats.max as i64),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::test_support::{session, snapshot};

    fn scored(id: &str, score: usize, country: Option<&str>) -> crate::record::Session {
        let cities: Vec<String> = (0..score).map(|i| format!("c{i}")).collect();
        let refs: Vec<&str> = cities.iter().map(String::as_str).collect();
        session(id, &refs, country)
    }

    #[test]
    fn test_percentiles_interpolate() {
        let sessions = [1, 2, 3, 4, 5, 100]
            .iter()
            .enumerate()
            .map(|(i, &score)| scored(&format!("s{i}"), score, None))
            .collect();
        let view = percentiles(&snapshot(vec![], sessions));
        assert_eq!(view.get(50), Some(3.5));
        assert_eq!(view.get(25), Some(2.25));
        assert!(view.get(99).unwrap() > 90.0);
        assert_eq!(view.get(33), None);
    }

    #[test]
    fn test_percentiles_without_sessions_is_empty() {
        assert!(percentiles(&snapshot(vec![], vec![])).is_empty());
    }

    #[test]
    fn test_nationalities_skip_unknown_country() {
        let view = nationalities(&snapshot(
            vec![],
            vec![
                scored("a", 10, Some("France")),
                scored("b", 20, Some("France")),
                scored("c", 30, Some("Spain")),
                scored("d", 40, None),
            ],
        ));
        assert_eq!(view.len(), 2);
        assert_eq!(
            view["France"],
            NationalityStats {
                median: 15.0,
                sessions: 2
            }
        );
        assert_eq!(view["Spain"].sessions, 1);
    }

    #[test]
    fn test_rank_nationalities_filters_and_orders() {
        let mut view = BTreeMap::new();
        view.insert(
            "A".to_owned(),
            NationalityStats {
                median: 30.0,
                sessions: 150,
            },
        );
        view.insert(
            "B".to_owned(),
            NationalityStats {
                median: 20.0,
                sessions: 500,
            },
        );
        view.insert(
            "C".to_owned(),
            NationalityStats {
                median: 10.0,
                sessions: 99,
            },
        );
        view.insert(
            "D".to_owned(),
            NationalityStats {
                median: 20.0,
                sessions: 100,
            },
        );
        let ranked: Vec<&str> = rank_nationalities(&view, 100)
            .into_iter()
            .map(|(country, _)| country)
            .collect();
        assert_eq!(ranked, vec!["D", "B", "A"]);
    }

    #[test]
    fn test_summary_and_durations() {
        let start: DateTime<Utc> = "2021-02-23T10:00:00Z".parse().unwrap();
        let mut a = scored("a", 10, Some("France"));
        a.ip = Some("203.0.113.1".to_owned());
        a.started_at = Some(start);
        a.saved_at = Some(start + TimeDelta::minutes(10));
        let mut b = scored("b", 10, None);
        b.started_at = Some(start);
        b.saved_at = Some(start + TimeDelta::minutes(20));
        let mut c = scored("c", 10, None);
        c.started_at = Some(start);

        let snapshot = snapshot(vec![], vec![a, b, c]);
        assert_eq!(
            summary(&snapshot),
            SnapshotSummary {
                sessions: 3,
                with_ip: 1,
                with_country: 1,
                with_time: 2,
            }
        );
        let durations = session_durations(&snapshot).unwrap();
        assert_eq!(durations.sessions, 2);
        assert_eq!(durations.median, TimeDelta::minutes(15));
        assert_eq!(durations.max, TimeDelta::minutes(20));
    }
}

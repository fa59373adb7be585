//! Offset-histogram scoring.

use std::collections::{BTreeMap, HashMap};

use fingerprint::{FingerprintHash, Fingerprints, SongId};
use index::FingerprintIndex;

use crate::types::MatchResult;

/// One query hash that also occurs in a reference recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evidence {
    pub hash: FingerprintHash,
    /// Anchor time bin in the query.
    pub sample_time: u32,
    /// Anchor time bin in the reference.
    pub ref_time: u32,
}

impl Evidence {
    pub fn offset(&self) -> i64 {
        i64::from(self.ref_time) - i64::from(self.sample_time)
    }
}

/// Group every query/reference collision by song.
///
/// Within a song, evidence is ordered by ascending query hash, then by the
/// insertion order of the index bucket.
pub fn collect_evidence(
    query: &Fingerprints,
    index: &FingerprintIndex,
) -> BTreeMap<SongId, Vec<Evidence>> {
    let mut by_song: BTreeMap<SongId, Vec<Evidence>> = BTreeMap::new();
    for (hash, entry) in query {
        for hit in index.get(hash) {
            by_song.entry(hit.song_id).or_default().push(Evidence {
                hash: *hash,
                sample_time: entry.time_bin,
                ref_time: hit.time_bin,
            });
        }
    }
    by_song
}

/// Score every song that shares at least one hash with `query`.
///
/// A song's score is the height of the tallest bucket of its
/// `ref_time - sample_time` histogram; ties go to the offset encountered
/// first. Results are sorted by score descending, then by song id. A query
/// with no collisions yields an empty vector.
pub fn score_matches(query: &Fingerprints, index: &FingerprintIndex) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = collect_evidence(query, index)
        .into_iter()
        .filter_map(|(song_id, evidence)| {
            modal_offset(&evidence).map(|(offset, score)| MatchResult {
                song_id,
                offset,
                score,
            })
        })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score).then(a.song_id.cmp(&b.song_id)));
    results
}

fn modal_offset(evidence: &[Evidence]) -> Option<(i64, usize)> {
    let mut counts: HashMap<i64, usize> = HashMap::with_capacity(evidence.len());
    for e in evidence {
        *counts.entry(e.offset()).or_default() += 1;
    }

    // Walk in encounter order so the first offset reaching the max wins.
    let mut best: Option<(i64, usize)> = None;
    for e in evidence {
        let offset = e.offset();
        let count = counts[&offset];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((offset, count));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerprint::HashEntry;
    use index::IndexEntry;

    fn h(raw: u32) -> FingerprintHash {
        FingerprintHash::from_raw(raw).unwrap()
    }

    fn query(pairs: &[(u32, u32)]) -> Fingerprints {
        pairs
            .iter()
            .map(|&(raw, time_bin)| (h(raw), HashEntry { time_bin, song_id: None }))
            .collect()
    }

    fn push(index: &mut FingerprintIndex, raw: u32, song: u32, time_bin: u32) {
        index.push(h(raw), IndexEntry { time_bin, song_id: SongId(song) });
    }

    #[test]
    fn empty_index_yields_no_results() {
        let q = query(&[(1, 0), (2, 3)]);
        assert!(score_matches(&q, &FingerprintIndex::new()).is_empty());
        assert!(score_matches(&Fingerprints::new(), &FingerprintIndex::new()).is_empty());
    }

    #[test]
    fn modal_offset_wins() {
        let mut index = FingerprintIndex::new();
        // Song 0: three hashes agree on +5, one on +1.
        push(&mut index, 1, 0, 5);
        push(&mut index, 2, 0, 7);
        push(&mut index, 3, 0, 9);
        push(&mut index, 4, 0, 4);
        let q = query(&[(1, 0), (2, 2), (3, 4), (4, 3)]);

        assert_eq!(
            score_matches(&q, &index),
            vec![MatchResult { song_id: SongId(0), offset: 5, score: 3 }]
        );
    }

    #[test]
    fn negative_offsets_are_scored() {
        let mut index = FingerprintIndex::new();
        push(&mut index, 1, 2, 0);
        push(&mut index, 2, 2, 1);
        let q = query(&[(1, 4), (2, 5)]);
        assert_eq!(
            score_matches(&q, &index),
            vec![MatchResult { song_id: SongId(2), offset: -4, score: 2 }]
        );
    }

    #[test]
    fn offset_tie_goes_to_first_encountered() {
        let mut index = FingerprintIndex::new();
        // Query hashes iterate ascending: hash 1 (offset +7) before hash 2 (+3).
        push(&mut index, 2, 0, 3);
        push(&mut index, 1, 0, 7);
        let q = query(&[(2, 0), (1, 0)]);
        let results = score_matches(&q, &index);
        assert_eq!(results, vec![MatchResult { song_id: SongId(0), offset: 7, score: 1 }]);

        // Within one bucket, insertion order decides.
        let mut index = FingerprintIndex::new();
        push(&mut index, 9, 1, 12);
        push(&mut index, 9, 1, 2);
        let q = query(&[(9, 1)]);
        assert_eq!(score_matches(&q, &index)[0].offset, 11);
    }

    #[test]
    fn results_sorted_by_score_then_song_id() {
        let mut index = FingerprintIndex::new();
        push(&mut index, 1, 3, 0);
        push(&mut index, 1, 1, 0);
        push(&mut index, 2, 1, 1);
        push(&mut index, 1, 2, 0);
        push(&mut index, 1, 0, 0);
        let q = query(&[(1, 0), (2, 1)]);

        let order: Vec<(u32, usize)> = score_matches(&q, &index)
            .iter()
            .map(|r| (r.song_id.0, r.score))
            .collect();
        assert_eq!(order, vec![(1, 2), (0, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn evidence_groups_by_song_in_query_order() {
        let mut index = FingerprintIndex::new();
        push(&mut index, 5, 0, 10);
        push(&mut index, 5, 1, 11);
        push(&mut index, 3, 0, 2);
        let q = query(&[(5, 4), (3, 1), (8, 0)]);
        let evidence = collect_evidence(&q, &index);

        assert_eq!(evidence.len(), 2);
        let song0: Vec<(u32, u32, u32)> = evidence[&SongId(0)]
            .iter()
            .map(|e| (e.hash.raw(), e.sample_time, e.ref_time))
            .collect();
        assert_eq!(song0, vec![(3, 1, 2), (5, 4, 10)]);
        assert_eq!(evidence[&SongId(1)][0].offset(), 7);
    }
}

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PostingStatistics;
use crate::{
    Candidate, CandidateId, JobPosting, PostingId, PostingStatus, StoredMatch,
    matching::match_percentage,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCandidate {
    pub candidate_id: CandidateId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub avg_match_percentage: f64,
    pub total_matches: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentMatch {
    pub id: i64,
    pub posting_id: PostingId,
    pub job_title: String,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub match_score: f64,
    pub match_percentage: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerDashboard {
    pub job_postings: PostingStatistics,
    pub total_matches: u64,
    pub top_candidates: Vec<TopCandidate>,
    pub recent_matches: Vec<RecentMatch>,
}

/// Employer-facing summary over stored matches.
///
/// Matches whose candidate or posting is no longer in the inputs are counted
/// in `total_matches` but left out of both lists.
pub fn employer_dashboard(
    postings: &[JobPosting],
    candidates: &[Candidate],
    stored_matches: &[StoredMatch],
    limit: usize,
) -> EmployerDashboard {
    let postings_by_id: HashMap<PostingId, &JobPosting> =
        postings.iter().map(|posting| (posting.id, posting)).collect();
    let candidates_by_id: HashMap<CandidateId, &Candidate> = candidates
        .iter()
        .map(|candidate| (candidate.id, candidate))
        .collect();

    // candidate id -> (score sum, count)
    let mut per_candidate: BTreeMap<CandidateId, (f64, u64)> = BTreeMap::new();
    for stored in stored_matches {
        if candidates_by_id.contains_key(&stored.candidate_id) {
            let entry = per_candidate.entry(stored.candidate_id).or_insert((0.0, 0));
            entry.0 += stored.match_score;
            entry.1 += 1;
        }
    }

    let mut averages: Vec<(CandidateId, f64, u64)> = per_candidate
        .into_iter()
        .map(|(id, (sum, count))| (id, sum / count as f64, count))
        .collect();
    averages.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let top_candidates = averages
        .into_iter()
        .take(limit)
        .filter_map(|(id, avg, count)| {
            let candidate = candidates_by_id.get(&id)?;
            Some(TopCandidate {
                candidate_id: id,
                name: candidate.name.clone(),
                city: candidate.city.clone(),
                state: candidate.state.clone(),
                avg_match_percentage: match_percentage(avg),
                total_matches: count,
            })
        })
        .collect();

    let mut recent: Vec<&StoredMatch> = stored_matches
        .iter()
        .filter(|stored| {
            postings_by_id.contains_key(&stored.posting_id)
                && candidates_by_id.contains_key(&stored.candidate_id)
        })
        .collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

    let recent_matches = recent
        .into_iter()
        .take(limit)
        .filter_map(|stored| {
            let posting = postings_by_id.get(&stored.posting_id)?;
            let candidate = candidates_by_id.get(&stored.candidate_id)?;
            Some(RecentMatch {
                id: stored.id,
                posting_id: stored.posting_id,
                job_title: posting.title.clone(),
                candidate_id: stored.candidate_id,
                candidate_name: candidate.name.clone(),
                match_score: stored.match_score,
                match_percentage: stored.match_percentage(),
                created_at: stored.created_at,
            })
        })
        .collect();

    EmployerDashboard {
        job_postings: PostingStatistics {
            total: postings.len() as u64,
            active: postings
                .iter()
                .filter(|posting| posting.status == PostingStatus::Active)
                .count() as u64,
        },
        total_matches: stored_matches.len() as u64,
        top_candidates,
        recent_matches,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::matching::ScoreBreakdown;

    fn stored(id: i64, posting_id: PostingId, candidate_id: CandidateId, score: f64, minutes: i64) -> StoredMatch {
        StoredMatch {
            id,
            posting_id,
            candidate_id,
            match_score: score,
            score_breakdown: ScoreBreakdown {
                skills: 0.0,
                location: 0.0,
                salary: 0.0,
                experience: 0.0,
                diploma: 0.0,
            },
            reasons: vec![],
            generation_id: "01J00000000000000000000000".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes),
            accepted: false,
        }
    }

    fn fixtures() -> (Vec<JobPosting>, Vec<Candidate>) {
        let postings = vec![
            JobPosting {
                id: 1,
                title: "Solar Technician".into(),
                ..JobPosting::default()
            },
            JobPosting {
                id: 2,
                title: "Electrician".into(),
                status: PostingStatus::Inactive,
                ..JobPosting::default()
            },
        ];
        let candidates = (1..=3)
            .map(|id| Candidate {
                id,
                name: format!("candidate-{id}"),
                ..Candidate::default()
            })
            .collect();
        (postings, candidates)
    }

    #[test]
    fn ranks_candidates_by_average_score() {
        let (postings, candidates) = fixtures();
        let matches = vec![
            stored(1, 1, 1, 0.9, 0),
            stored(2, 2, 1, 0.3, 1),
            stored(3, 1, 2, 0.8, 2),
            stored(4, 1, 3, 0.7, 3),
            stored(5, 2, 3, 0.7, 4),
        ];

        let dashboard = employer_dashboard(&postings, &candidates, &matches, 10);

        assert_eq!(dashboard.job_postings, PostingStatistics { total: 2, active: 1 });
        assert_eq!(dashboard.total_matches, 5);
        let ids: Vec<_> = dashboard.top_candidates.iter().map(|c| c.candidate_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(dashboard.top_candidates[1].avg_match_percentage, 70.0);
        assert_eq!(dashboard.top_candidates[2].avg_match_percentage, 60.0);
        assert_eq!(dashboard.top_candidates[1].total_matches, 2);
    }

    #[test]
    fn recent_matches_are_newest_first_and_limited() {
        let (postings, candidates) = fixtures();
        let matches = vec![
            stored(1, 1, 1, 0.9, 0),
            stored(2, 2, 2, 0.5, 10),
            stored(3, 1, 3, 0.8, 5),
        ];

        let dashboard = employer_dashboard(&postings, &candidates, &matches, 2);
        let ids: Vec<_> = dashboard.recent_matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(dashboard.recent_matches[0].job_title, "Electrician");
        assert_eq!(dashboard.recent_matches[1].match_percentage, 80.0);
        assert_eq!(dashboard.top_candidates.len(), 2);
    }

    #[test]
    fn ignores_matches_for_missing_records() {
        let (postings, candidates) = fixtures();
        let matches = vec![stored(1, 99, 1, 0.9, 0), stored(2, 1, 42, 0.9, 1)];

        let dashboard = employer_dashboard(&postings, &candidates, &matches, 10);
        assert_eq!(dashboard.total_matches, 2);
        assert!(dashboard.recent_matches.is_empty());
        assert_eq!(dashboard.top_candidates.len(), 1);
    }
}

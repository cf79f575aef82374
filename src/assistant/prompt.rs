//! Prompt text sent to the language model.

use crate::domain::catalog::category_label;
use crate::domain::Worker;

/// Upper bound on candidates described in one recommendation prompt.
const MAX_CANDIDATES: usize = 10;

pub(super) fn recommendation(need: &str, candidates: &[Worker]) -> String {
    let listing = candidates
        .iter()
        .take(MAX_CANDIDATES)
        .map(|worker| {
            format!(
                "- {} | {} | {} | rating {:.1} | {} jobs",
                worker.user.full_name(),
                worker.primary_category().map_or("-", category_label),
                worker.user.location.label(),
                worker.rating,
                worker.completed_jobs,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You help customers in Algeria choose a craftsman.\n\
         Customer need: {need}\n\
         Candidates:\n{listing}\n\
         Recommend the most suitable candidate by name and explain why in two or \
         three sentences. Answer in Arabic."
    )
}

pub(super) fn bio(category: &str, skills: &[String]) -> String {
    let skills = if skills.is_empty() {
        "-".to_string()
    } else {
        skills.join(", ")
    };
    format!(
        "Write a short, professional profile bio for an Algerian craftsman.\n\
         Craft: {}\n\
         Skills: {skills}\n\
         Keep it under 60 words, first person, in Arabic.",
        category_label(category)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, User};

    #[test]
    fn recommendation_lists_candidates() {
        let worker = Worker {
            user: User::new("w1", "Karim", "Saadi", "0550", Role::Worker),
            categories: vec!["plumbing".to_string()],
            skills: vec![],
            rating: 4.3,
            completed_jobs: 3,
            reviews: vec![],
            verified: None,
        };
        let prompt = recommendation("leaking sink", &[worker]);
        assert!(prompt.contains("Customer need: leaking sink"));
        assert!(prompt.contains("- Karim Saadi | Plumbing |"));
        assert!(prompt.contains("rating 4.3"));
    }

    #[test]
    fn bio_uses_category_label() {
        let prompt = bio("tiling", &["bathrooms".to_string()]);
        assert!(prompt.contains("Craft: Tiling"));
        assert!(prompt.contains("Skills: bathrooms"));
    }
}

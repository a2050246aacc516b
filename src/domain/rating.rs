//! Derived rating maintenance.
//!
//! Recomputation is an explicit function invoked by the write path inside the
//! same transaction as the review mutation, never an implicit storage hook.

use crate::domain::product::{Rating, Review};

/// Recomputes the rating summary from the full review list: unweighted mean
/// at full precision (rounding is a presentation concern), {0, 0} when empty.
pub fn recompute_rating(reviews: &[Review]) -> Rating {
    if reviews.is_empty() {
        return Rating::zero();
    }
    let total: i64 = reviews.iter().map(|r| r.rating as i64).sum();
    Rating {
        average: total as f64 / reviews.len() as f64,
        count: reviews.len() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn review(rating: i32) -> Review {
        Review {
            id: Uuid::new_v4(),
            name: "Reviewer".to_string(),
            rating,
            date: Utc::now(),
            comment: "ok".to_string(),
            verified: false,
        }
    }

    #[test]
    fn empty_reviews_reset_to_zero() {
        assert_eq!(recompute_rating(&[]), Rating::zero());
    }

    #[test]
    fn average_is_unweighted_full_precision_mean() {
        let reviews = vec![review(5), review(4), review(4)];
        let r = recompute_rating(&reviews);
        assert_eq!(r.count, 3);
        assert!((r.average - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn count_tracks_review_length() {
        let mut reviews = vec![review(2)];
        assert_eq!(recompute_rating(&reviews).count, 1);
        reviews.push(review(4));
        let r = recompute_rating(&reviews);
        assert_eq!(r.count, 2);
        assert_eq!(r.average, 3.0);
    }
}

use crate::database::{CatalogDb, FeedbackDb};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovieStats {
    pub average: f64,
    pub count: u64,
}

/// Recompute a movie's aggregate rating from every feedback row that
/// references it and write the result back to the catalog.
///
/// Full rescan on every call, so the result depends only on the feedback
/// store's current contents for that movie. The average is rounded to one
/// decimal place; a movie without feedback aggregates to 0.0 / 0.
pub fn recompute_movie_stats<E, D>(db: &D, movie_id: u64) -> Result<MovieStats, E>
where
    D: CatalogDb<Error = E> + FeedbackDb<Error = E>,
{
    let rows = db.feedback_for_movie(movie_id)?;
    let count = rows.len() as u64;
    let average = if count == 0 {
        0.0
    } else {
        let sum: u64 = rows.iter().map(|(_, f)| f.rating as u64).sum();
        (sum as f64 / count as f64 * 10.0).round() / 10.0
    };
    db.update_movie_stats(movie_id, average, count)?;
    Ok(MovieStats { average, count })
}

/// Per-movie locks serializing the insert/recompute/write-back window of a
/// feedback submission. Concurrent submissions for the same movie would
/// otherwise interleave their rescans and lose an update.
#[derive(Default)]
pub struct MovieLocks {
    inner: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl MovieLocks {
    pub fn new() -> MovieLocks {
        MovieLocks::default()
    }

    pub fn for_movie(&self, movie_id: u64) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(movie_id).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{CatalogDb, FeedbackDb};
    use crate::model::{Feedback, Movie};

    fn test_db() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    fn submit(db: &sled::Db, movie_id: u64, rating: u8) {
        db.add_feedback(&Feedback {
            username: "User".to_owned(),
            email: "user@cinemapulse.com".to_owned(),
            movie_id,
            rating,
            comments: String::new(),
            created_at: 0,
        })
        .unwrap();
    }

    #[test]
    fn average_tracks_each_insert() {
        let db = test_db();
        let id = db.add_movie(&Movie::new("Eleven", "")).unwrap();

        submit(&db, id, 4);
        let stats = recompute_movie_stats(&db, id).unwrap();
        assert_eq!(stats, MovieStats { average: 4.0, count: 1 });

        submit(&db, id, 5);
        let stats = recompute_movie_stats(&db, id).unwrap();
        assert_eq!(stats, MovieStats { average: 4.5, count: 2 });

        let movie = db.get_movie(id).unwrap().unwrap();
        assert_eq!(movie.average_rating, 4.5);
        assert_eq!(movie.total_reviews, 2);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let db = test_db();
        let id = db.add_movie(&Movie::new("Stephen", "")).unwrap();
        submit(&db, id, 5);
        submit(&db, id, 5);
        submit(&db, id, 4);
        // 14 / 3 = 4.666... rounds to 4.7
        let stats = recompute_movie_stats(&db, id).unwrap();
        assert_eq!(stats, MovieStats { average: 4.7, count: 3 });
    }

    #[test]
    fn recompute_is_idempotent() {
        let db = test_db();
        let id = db.add_movie(&Movie::new("Indra", "")).unwrap();
        submit(&db, id, 3);
        submit(&db, id, 4);
        let first = recompute_movie_stats(&db, id).unwrap();
        let second = recompute_movie_stats(&db, id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn no_feedback_means_zero_aggregate() {
        let db = test_db();
        let id = db.add_movie(&Movie::new("Kaantha", "")).unwrap();
        let stats = recompute_movie_stats(&db, id).unwrap();
        assert_eq!(stats, MovieStats { average: 0.0, count: 0 });
    }

    #[test]
    fn locks_are_shared_per_movie() {
        let locks = MovieLocks::new();
        let a = locks.for_movie(1);
        let b = locks.for_movie(1);
        let c = locks.for_movie(2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}

use crate::model::*;
use sled::transaction::{TransactionError, Transactional};

fn serialize_id(id: u64) -> [u8; 8] {
    id.to_le_bytes()
}

fn deserialize_id<V: AsRef<[u8]>>(id: V) -> u64 {
    use std::convert::TryInto;
    u64::from_le_bytes(id.as_ref().try_into().unwrap())
}

/// Credential store. Users are created at seed time and never change.
pub trait CredentialDb {
    type Error;
    fn add_user(&self, user: &User) -> Result<Option<u64>, Self::Error>;
    fn get_user(&self, id: u64) -> Result<Option<User>, Self::Error>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<(u64, User)>, Self::Error>;
    fn list_users(&self) -> Result<Vec<(u64, User)>, Self::Error>;

    /// Exact, case-sensitive match against the stored password.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<(u64, User)>, Self::Error> {
        Ok(self
            .get_user_by_email(email)?
            .filter(|(_, user)| user.password == password))
    }
}

/// Catalog store. Aggregate fields are written only through
/// [`CatalogDb::update_movie_stats`].
pub trait CatalogDb {
    type Error;
    fn add_movie(&self, movie: &Movie) -> Result<u64, Self::Error>;
    fn get_movie(&self, id: u64) -> Result<Option<Movie>, Self::Error>;
    /// All movies, ordered by title ascending.
    fn list_movies(&self) -> Result<Vec<(u64, Movie)>, Self::Error>;
    fn update_movie_stats(&self, id: u64, average: f64, count: u64) -> Result<(), Self::Error>;
}

/// Feedback store. Rows are append-only; referential validity of
/// `movie_id` and the rating bound are the caller's responsibility.
pub trait FeedbackDb {
    type Error;
    fn add_feedback(&self, feedback: &Feedback) -> Result<u64, Self::Error>;
    fn feedback_for_movie(&self, movie_id: u64) -> Result<Vec<(u64, Feedback)>, Self::Error>;
    /// All feedback joined with movie titles, newest first.
    fn list_feedback_with_titles(&self) -> Result<Vec<FeedbackWithTitle>, Self::Error>;
}

const USERS: &'static [u8] = b"users";
const USERS_USERNAME: &'static [u8] = b"users_username";
const USERS_EMAIL: &'static [u8] = b"users_email";
const MOVIES: &'static [u8] = b"movies";
const FEEDBACKS: &'static [u8] = b"feedbacks";
const FEEDBACKS_MOVIE: &'static [u8] = b"feedbacks_movie";

impl CredentialDb for sled::Db {
    type Error = sled::Error;

    fn add_user(&self, user: &User) -> sled::Result<Option<u64>> {
        let users = self.open_tree(USERS)?;
        let users_username = self.open_tree(USERS_USERNAME)?;
        let users_email = self.open_tree(USERS_EMAIL)?;
        let id = self.generate_id()?;
        if let Err(err) = (&users, &users_username, &users_email).transaction(
            |(users, users_username, users_email)| {
                users.insert(&serialize_id(id)[..], bincode::serialize(user).unwrap())?;
                if users_username
                    .insert(user.username.as_bytes(), serialize_id(id).to_vec())?
                    .is_some()
                {
                    sled::transaction::abort(())?;
                }
                if users_email
                    .insert(user.email.as_bytes(), serialize_id(id).to_vec())?
                    .is_some()
                {
                    sled::transaction::abort(())?;
                }
                Ok(())
            },
        ) {
            match err {
                TransactionError::Storage(e) => return Err(e),
                TransactionError::Abort(_) => return Ok(None),
            };
        }
        Ok(Some(id))
    }

    fn get_user(&self, id: u64) -> sled::Result<Option<User>> {
        let users = self.open_tree(USERS)?;
        Ok(users
            .get(serialize_id(id))?
            .map(|d| bincode::deserialize(&d).unwrap()))
    }

    fn get_user_by_email(&self, email: &str) -> sled::Result<Option<(u64, User)>> {
        let users_email = self.open_tree(USERS_EMAIL)?;
        let users = self.open_tree(USERS)?;
        if let Some(id) = users_email.get(email)? {
            let user =
                bincode::deserialize(&users.get(&id)?.expect("Bad index users_email")).unwrap();
            Ok(Some((deserialize_id(id), user)))
        } else {
            Ok(None)
        }
    }

    fn list_users(&self) -> sled::Result<Vec<(u64, User)>> {
        let users = self.open_tree(USERS)?;
        let mut ret = Vec::new();
        for entry in users.iter() {
            let (id, data) = entry?;
            ret.push((deserialize_id(id), bincode::deserialize(&data).unwrap()));
        }
        Ok(ret)
    }
}

impl CatalogDb for sled::Db {
    type Error = sled::Error;

    fn add_movie(&self, movie: &Movie) -> sled::Result<u64> {
        let movies = self.open_tree(MOVIES)?;
        let id = self.generate_id()?;
        movies.insert(&serialize_id(id)[..], bincode::serialize(movie).unwrap())?;
        Ok(id)
    }

    fn get_movie(&self, id: u64) -> sled::Result<Option<Movie>> {
        let movies = self.open_tree(MOVIES)?;
        Ok(movies
            .get(serialize_id(id))?
            .map(|d| bincode::deserialize(&d).unwrap()))
    }

    fn list_movies(&self) -> sled::Result<Vec<(u64, Movie)>> {
        let movies = self.open_tree(MOVIES)?;
        let mut ret: Vec<(u64, Movie)> = Vec::new();
        for entry in movies.iter() {
            let (id, data) = entry?;
            ret.push((deserialize_id(id), bincode::deserialize(&data).unwrap()));
        }
        ret.sort_by(|(_, a), (_, b)| a.title.cmp(&b.title));
        Ok(ret)
    }

    fn update_movie_stats(&self, id: u64, average: f64, count: u64) -> sled::Result<()> {
        let movies = self.open_tree(MOVIES)?;
        if let Some(data) = movies.get(serialize_id(id))? {
            let mut movie: Movie = bincode::deserialize(&data).unwrap();
            movie.average_rating = average;
            movie.total_reviews = count;
            movies.insert(&serialize_id(id)[..], bincode::serialize(&movie).unwrap())?;
        }
        Ok(())
    }
}

impl FeedbackDb for sled::Db {
    type Error = sled::Error;

    fn add_feedback(&self, feedback: &Feedback) -> sled::Result<u64> {
        let feedbacks = self.open_tree(FEEDBACKS)?;
        let feedbacks_movie = self.open_tree(FEEDBACKS_MOVIE)?;
        let id = self.generate_id()?;
        let mut index_key = serialize_id(feedback.movie_id).to_vec();
        index_key.extend_from_slice(&serialize_id(id));
        (&feedbacks, &feedbacks_movie)
            .transaction(|(feedbacks, feedbacks_movie)| {
                feedbacks.insert(&serialize_id(id)[..], bincode::serialize(feedback).unwrap())?;
                feedbacks_movie.insert(index_key.as_slice(), serialize_id(id).to_vec())?;
                Ok(())
            })
            .map_err(|e: TransactionError<()>| match e {
                TransactionError::Storage(s) => s,
                _ => unreachable!(),
            })?;
        Ok(id)
    }

    fn feedback_for_movie(&self, movie_id: u64) -> sled::Result<Vec<(u64, Feedback)>> {
        let feedbacks = self.open_tree(FEEDBACKS)?;
        let feedbacks_movie = self.open_tree(FEEDBACKS_MOVIE)?;
        let mut ret = Vec::new();
        for entry in feedbacks_movie.scan_prefix(serialize_id(movie_id)) {
            let (_, id) = entry?;
            let data = feedbacks.get(&id)?.expect("Bad index feedbacks_movie");
            ret.push((deserialize_id(&id), bincode::deserialize(&data).unwrap()));
        }
        Ok(ret)
    }

    fn list_feedback_with_titles(&self) -> sled::Result<Vec<FeedbackWithTitle>> {
        let feedbacks = self.open_tree(FEEDBACKS)?;
        let movies = self.open_tree(MOVIES)?;
        let mut ret = Vec::new();
        for entry in feedbacks.iter() {
            let (id, data) = entry?;
            let feedback: Feedback = bincode::deserialize(&data).unwrap();
            let movie_title = movies
                .get(serialize_id(feedback.movie_id))?
                .map(|d| bincode::deserialize::<Movie>(&d).unwrap().title)
                .unwrap_or_else(|| "(unknown)".to_owned());
            ret.push(FeedbackWithTitle {
                id: deserialize_id(id),
                username: feedback.username,
                email: feedback.email,
                movie_id: feedback.movie_id,
                movie_title,
                rating: feedback.rating,
                comments: feedback.comments,
                created_at: feedback.created_at,
            });
        }
        ret.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(ret)
    }
}

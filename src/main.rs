mod config;
mod database;
mod error;
mod model;
mod notify;
mod seed;
mod session;
mod stats;

use actix_identity::{CookieIdentityPolicy, Identity, IdentityService};
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use database::{CatalogDb, CredentialDb, FeedbackDb};
use error::AppError;
use model::*;
use notify::SharedNotifier;
use serde::{Deserialize, Serialize};
use stats::MovieLocks;
use std::sync::Arc;

type Tera = web::Data<tera::Tera>;
type Db = web::Data<sled::Db>;

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found().header("location", location).finish()
}

fn render(tera: &tera::Tera, template: &str, ctx: &tera::Context) -> Result<HttpResponse, AppError> {
    let body = tera.render(template, ctx)?;
    Ok(HttpResponse::Ok().content_type("text/html").body(body))
}

/// Movie together with its id, as handed to templates.
#[derive(Serialize)]
struct MovieView {
    id: u64,
    title: String,
    description: String,
    average_rating: f64,
    total_reviews: u64,
}

impl MovieView {
    fn new(id: u64, movie: Movie) -> MovieView {
        MovieView {
            id,
            title: movie.title,
            description: movie.description,
            average_rating: movie.average_rating,
            total_reviews: movie.total_reviews,
        }
    }
}

#[derive(Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

async fn login_page(tera: Tera, query: web::Query<LoginQuery>) -> Result<HttpResponse, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("error", &query.error.is_some());
    render(&tera, "login.html", &ctx)
}

#[derive(Serialize, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_post(
    form: web::Form<LoginForm>,
    id: Identity,
    db: Db,
    notifier: web::Data<SharedNotifier>,
) -> Result<HttpResponse, AppError> {
    match db.authenticate(form.email.trim(), form.password.trim())? {
        Some((user_id, user)) => {
            session::sign_in(&id, user_id, &user);
            notify::send(
                notifier.get_ref().as_ref(),
                "User Login",
                &format!("User {} logged in", user.username),
            );
            Ok(redirect("/about"))
        }
        None => Ok(redirect("/?error=invalid")),
    }
}

async fn about(id: Identity, tera: Tera) -> Result<HttpResponse, AppError> {
    let user = session::require_authenticated(&id)?;
    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    render(&tera, "about.html", &ctx)
}

async fn home(id: Identity, tera: Tera, db: Db) -> Result<HttpResponse, AppError> {
    let user = session::require_authenticated(&id)?;
    let movies: Vec<MovieView> = db
        .list_movies()?
        .into_iter()
        .map(|(movie_id, movie)| MovieView::new(movie_id, movie))
        .collect();
    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("movies", &movies);
    render(&tera, "home.html", &ctx)
}

async fn feedback_page(
    path: web::Path<u64>,
    id: Identity,
    tera: Tera,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let user = session::require_authenticated(&id)?;
    let movie_id = path.into_inner();
    let movie = db.get_movie(movie_id)?.ok_or(AppError::NotFound("movie"))?;
    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("movie", &MovieView::new(movie_id, movie));
    render(&tera, "feedback.html", &ctx)
}

#[derive(Serialize, Deserialize)]
struct FeedbackForm {
    username: String,
    email: String,
    rating: u8,
    comments: String,
}

async fn feedback_post(
    path: web::Path<u64>,
    form: web::Form<FeedbackForm>,
    id: Identity,
    db: Db,
    locks: web::Data<MovieLocks>,
    notifier: web::Data<SharedNotifier>,
) -> Result<HttpResponse, AppError> {
    session::require_authenticated(&id)?;
    let movie_id = path.into_inner();
    let movie = db.get_movie(movie_id)?.ok_or(AppError::NotFound("movie"))?;
    if form.username.trim().is_empty() || form.email.trim().is_empty() {
        return Err(AppError::Validation(
            "username and email are required".to_owned(),
        ));
    }
    if !(1..=5).contains(&form.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_owned(),
        ));
    }
    // Hold the movie's lock across insert and recompute so concurrent
    // submissions cannot lose an update.
    let lock = locks.for_movie(movie_id);
    {
        let _guard = lock.lock().unwrap();
        db.add_feedback(&Feedback {
            username: form.username.trim().to_owned(),
            email: form.email.trim().to_owned(),
            movie_id,
            rating: form.rating,
            comments: form.comments.clone(),
            created_at: now_secs(),
        })?;
        stats::recompute_movie_stats(db.get_ref(), movie_id)?;
    }
    notify::send(
        notifier.get_ref().as_ref(),
        "New Feedback",
        &format!("New feedback for {} - Rating: {}", movie.title, form.rating),
    );
    Ok(redirect(&format!("/thankyou/{}", movie_id)))
}

async fn thankyou(
    path: web::Path<u64>,
    id: Identity,
    tera: Tera,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let user = session::require_authenticated(&id)?;
    let movie_id = path.into_inner();
    let movie = db.get_movie(movie_id)?.ok_or(AppError::NotFound("movie"))?;
    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("movie", &MovieView::new(movie_id, movie));
    render(&tera, "thankyou.html", &ctx)
}

async fn admin_panel(id: Identity, tera: Tera, db: Db) -> Result<HttpResponse, AppError> {
    let user = session::require_role(&id, Role::Admin)?;
    let feedbacks = db.list_feedback_with_titles()?;
    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("feedbacks", &feedbacks);
    render(&tera, "admin.html", &ctx)
}

async fn logout(id: Identity) -> HttpResponse {
    session::sign_out(&id);
    redirect("/")
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(login_page))
        .route("/login", web::post().to(login_post))
        .route("/about", web::get().to(about))
        .route("/home", web::get().to(home))
        .route("/feedback/{movie_id}", web::get().to(feedback_page))
        .route("/feedback/{movie_id}", web::post().to(feedback_post))
        .route("/thankyou/{movie_id}", web::get().to(thankyou))
        .route("/admin", web::get().to(admin_panel))
        .route("/logout", web::get().to(logout));
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    env_logger::from_env(
        env_logger::Env::default().default_filter_or("cinemapulse=debug,actix_web=info"),
    )
    .init();

    let config = config::Config::from_env();
    let db = match &config.db_path {
        Some(path) => sled::open(path),
        None => sled::Config::new().temporary(true).open(),
    }
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    seed::seed(&db).map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let locks = web::Data::new(MovieLocks::new());
    let notifier: web::Data<SharedNotifier> = web::Data::new(Arc::new(notify::LogNotifier));
    let session_key = config.session_key;

    HttpServer::new(move || {
        let tera = tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*")).unwrap();
        App::new()
            .wrap(Logger::default())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&session_key)
                    .name("auth-cookie")
                    .secure(false),
            ))
            .data(tera)
            .data(db.clone())
            .app_data(locks.clone())
            .app_data(notifier.clone())
            .configure(routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}

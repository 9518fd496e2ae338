use crate::database::{CatalogDb, CredentialDb};
use crate::model::{Movie, Role, User};
use log::info;

const CATALOG: &[(&str, &str)] = &[
    (
        "Parashakthi",
        "Sivakarthikeyan's historical action epic about brothers clashing during Tamil Nadu's 1965 Anti-Hindi protests, directed by Sudha Kongara.",
    ),
    (
        "Lara",
        "Ashok Kumar hunts a mysterious killer amid corruption—pure detective noir suspense.",
    ),
    (
        "Eleven",
        "Skilled officer tackles brutal serial killings with psychological twists.",
    ),
    (
        "Kaantha",
        "1950s Madras mystery blending social drama and hidden crimes.",
    ),
    (
        "Stephen",
        "Psychiatrist unravels a killer's mind in a chilling evaluation gone wrong.",
    ),
    (
        "Show Time",
        "Naveen Chandra in a tense crime unraveling full of betrayals.",
    ),
    (
        "Vikram",
        "Kamal Haasan as a brooding cop in gritty action-noir, echoing Batman's intensity.",
    ),
    (
        "Blackmail",
        "GV Prakash in a drama-thriller of deceit and dark secrets.",
    ),
    (
        "Maargan",
        "Vijay Antony's crime-mystery with supernatural detective edges.",
    ),
    (
        "Ace",
        "Vijay Sethupathi as a crime-busting anti-hero in high-stakes action-noir.",
    ),
    (
        "Narivettai",
        "Tovino Thomas in a revenge-fueled crime probe.",
    ),
    (
        "Indra",
        "Vasanth Ravi's suspenseful pursuit through betrayal webs.",
    ),
    (
        "Sleepwalker",
        "Psychological thriller about a mother caught in grief and blurred reality after her daughters loss.",
    ),
    (
        "28 Years Later: The Bone Temple",
        "A post-apocalyptic survival horror sequel that follows humanity struggle to survive decades after a devastating global outbreak.",
    ),
    (
        "Return to Silent Hill",
        "Horror film based on the classic video game franchise Silent Hill with atmospheric thrills.",
    ),
];

/// Load the fixed catalog and the two demo accounts. Skipped entirely when
/// the catalog already has entries, so restarts keep accumulated feedback.
pub fn seed(db: &sled::Db) -> sled::Result<()> {
    if !db.list_movies()?.is_empty() {
        return Ok(());
    }
    for (title, description) in CATALOG {
        db.add_movie(&Movie::new(title, description))?;
    }
    db.add_user(&User {
        username: "Admin".to_owned(),
        email: "admin@cinemapulse.com".to_owned(),
        password: "admin123".to_owned(),
        role: Role::Admin,
    })?;
    db.add_user(&User {
        username: "User".to_owned(),
        email: "user@cinemapulse.com".to_owned(),
        password: "user123".to_owned(),
        role: Role::User,
    })?;
    info!("{} movies loaded", CATALOG.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_loads_catalog_and_accounts() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        seed(&db).unwrap();
        assert_eq!(db.list_movies().unwrap().len(), 15);
        let (_, admin) = db
            .get_user_by_email("admin@cinemapulse.com")
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        let (_, user) = db
            .get_user_by_email("user@cinemapulse.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn seed_is_idempotent() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        seed(&db).unwrap();
        seed(&db).unwrap();
        assert_eq!(db.list_movies().unwrap().len(), 15);
    }
}

//! Shared fixtures for the unit and handler tests.

use axum_test::TestServer;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::db::{self, queries::questions::create_question, NewQuestion};
use crate::server::app::build_router;

/// (category, question, answer, difficulty) inserted in order, so ids run from 1.
const FIXTURE: &[(i64, &str, &str, i64)] = &[
    (1, "What is the heaviest organ in the human body?", "The Liver", 4),
    (1, "Who discovered penicillin?", "Alexander Fleming", 3),
    (1, "Hematology is a branch of medicine involving the study of what?", "Blood", 4),
    (2, "Which Dutch graphic artist, initials M C, was a creator of optical illusions?", "Escher", 1),
    (2, "La Giaconda is better known as what?", "Mona Lisa", 3),
    (6, "Which is the only team to play in every soccer World Cup tournament?", "Brazil", 3),
    (6, "Which country won the first ever soccer World Cup in 1930?", "Uruguay", 4),
    (6, "How many players does an ice hockey team have on the ice?", "Six", 2),
    (3, "What is the largest lake in Africa?", "Lake Victoria", 2),
    (3, "The Taj Mahal is located in which Indian city?", "Agra", 2),
    (4, "Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 2),
    (4, "Which dung beetle was worshipped by the ancient Egyptians?", "Scarab", 4),
    (5, "What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 4),
    (5, "What actor did author Anne Rice first denounce, then praise in the role of her beloved Lestat?", "Tom Cruise", 4),
    (5, "What was the title of the 1990 fantasy directed by Tim Burton about a young man with multi-bladed appendages?", "Edward Scissorhands", 3),
];

pub const SEEDED_QUESTIONS: usize = FIXTURE.len();

// in-memory databases live as long as their connection, so pin the pool to one
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn create_test_server() -> (TestServer, SqlitePool) {
    let pool = memory_pool().await;
    let server = TestServer::new(build_router(pool.clone())).unwrap();
    (server, pool)
}

pub async fn seed_questions(pool: &SqlitePool) {
    for (category, question, answer, difficulty) in FIXTURE {
        create_question(
            pool,
            &NewQuestion {
                question: (*question).to_owned(),
                answer: (*answer).to_owned(),
                difficulty: *difficulty,
                category: *category,
            },
        )
        .await
        .unwrap();
    }
}

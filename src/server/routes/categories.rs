use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question,
    },
    server::{
        app::AppState,
        error::{ApiError, StoreResultExt},
        extract::{ApiPath, ApiQuery},
        pagination::Pagination,
    },
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(
    State(pool): State<SqlitePool>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResponse<CategoriesList> {
    let all = categories::get_all_categories(&pool).await.or_not_found()?;
    // the page only decides whether there is anything to show, the mapping is always complete
    if pagination.range(all.len()).is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {} of categories",
            pagination.page
        )));
    }
    Ok(Json(CategoriesList {
        success: true,
        categories: all.into_iter().map(|c| (c.id, c.kind)).collect(),
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResponse<CategoryQuestions> {
    let category = categories::get_category(&pool, id).await.or_not_found()?;
    let in_category = questions::get_questions_for_category(&pool, category.id)
        .await
        .or_not_found()?;
    let total_questions = in_category.len();

    Ok(Json(CategoryQuestions {
        success: true,
        questions: pagination.slice(in_category),
        total_questions,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}

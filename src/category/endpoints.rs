//! Category endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        Category, CategoryForm, CategoryName, DEFAULT_CATEGORY_COLOR, create_category,
        get_categories, get_category, update_category,
    },
    database_id::CategoryId,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's categories.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_categories(user_id, &connection).map(Json)
}

/// Create a category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&form.name)?;
    let color = form.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_category(user_id, name, color, &connection)
        .map(|category| (StatusCode::CREATED, Json(category)))
}

/// Rename or recolor a category.
///
/// Omitting the color keeps the current one.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&form.name)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let color = match form.color {
        Some(color) => color,
        None => match get_category(user_id, category_id, &connection) {
            Ok(category) => category.color,
            Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
            Err(error) => return Err(error),
        },
    };

    update_category(user_id, category_id, name, &color, &connection).map(Json)
}

#[cfg(test)]
mod category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryForm, DEFAULT_CATEGORY_COLOR},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        CategoryState, create_category_endpoint, get_categories_endpoint,
        update_category_endpoint,
    };

    fn get_state() -> (CategoryState, UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);

        (
            CategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn create_then_list() {
        let (state, user_id) = get_state();

        let (status, Json(category)) = create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(CategoryForm {
                name: " Groceries ".to_owned(),
                color: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(category.name.as_ref(), "Groceries");
        assert_eq!(category.color, DEFAULT_CATEGORY_COLOR);

        let Json(categories) = get_categories_endpoint(State(state), Extension(user_id))
            .await
            .unwrap();
        assert_eq!(categories, vec![category]);
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let (state, user_id) = get_state();

        let result = create_category_endpoint(
            State(state),
            Extension(user_id),
            Json(CategoryForm {
                name: "  ".to_owned(),
                color: None,
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::EmptyCategoryName));
    }

    #[tokio::test]
    async fn update_keeps_color_when_omitted() {
        let (state, user_id) = get_state();
        let (_, Json(category)) = create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(CategoryForm {
                name: "Food".to_owned(),
                color: Some("#ff0000".to_owned()),
            }),
        )
        .await
        .unwrap();

        let Json(updated) = update_category_endpoint(
            State(state),
            Extension(user_id),
            Path(category.id),
            Json(CategoryForm {
                name: "Eating out".to_owned(),
                color: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.name.as_ref(), "Eating out");
        assert_eq!(updated.color, "#ff0000");
    }

    #[tokio::test]
    async fn update_missing_category_is_an_error() {
        let (state, user_id) = get_state();

        let result = update_category_endpoint(
            State(state),
            Extension(user_id),
            Path(41),
            Json(CategoryForm {
                name: "Food".to_owned(),
                color: None,
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::UpdateMissingCategory));
    }
}

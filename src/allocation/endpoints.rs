//! Allocation rule endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    allocation::{
        AllocationRule, AllocationRuleForm, create_allocation_rule, delete_allocation_rule,
        get_allocation_rules,
    },
    auth::UserID,
    category::CategoryName,
    database_id::AllocationRuleId,
};

/// The state needed for the allocation rule endpoints.
#[derive(Debug, Clone)]
pub struct AllocationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AllocationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's allocation rules.
pub async fn get_allocation_rules_endpoint(
    State(state): State<AllocationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<AllocationRule>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_allocation_rules(user_id, &connection).map(Json)
}

/// Create an allocation rule.
pub async fn create_allocation_rule_endpoint(
    State(state): State<AllocationState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<AllocationRuleForm>,
) -> Result<(StatusCode, Json<AllocationRule>), Error> {
    let category = CategoryName::new(&form.category)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_allocation_rule(user_id, category, form.percent, &connection)
        .map(|rule| (StatusCode::CREATED, Json(rule)))
}

/// Delete an allocation rule.
pub async fn delete_allocation_rule_endpoint(
    State(state): State<AllocationState>,
    Extension(user_id): Extension<UserID>,
    Path(rule_id): Path<AllocationRuleId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_allocation_rule(user_id, rule_id, &connection).map(|_| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod allocation_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        allocation::AllocationRuleForm,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        AllocationState, create_allocation_rule_endpoint, delete_allocation_rule_endpoint,
        get_allocation_rules_endpoint,
    };

    #[tokio::test]
    async fn create_list_delete() {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);
        let state = AllocationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let (status, Json(rule)) = create_allocation_rule_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(AllocationRuleForm {
                category: " Savings ".to_owned(),
                percent: 25.0,
            }),
        )
        .await
        .unwrap();
        let Json(rules) = get_allocation_rules_endpoint(State(state.clone()), Extension(user_id))
            .await
            .unwrap();
        let deleted =
            delete_allocation_rule_endpoint(State(state), Extension(user_id), Path(rule.id)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rule.category.as_ref(), "Savings");
        assert_eq!(rules, vec![rule]);
        assert_eq!(deleted, Ok(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn create_rejects_blank_category() {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);
        let state = AllocationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = create_allocation_rule_endpoint(
            State(state),
            Extension(user_id),
            Json(AllocationRuleForm {
                category: "".to_owned(),
                percent: 25.0,
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::EmptyCategoryName));
    }
}

//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryName},
    database_id::CategoryId,
};

/// Initialize the category table.
///
/// Names are unique per user once normalized, see [CategoryName::normalized].
/// The normalized name is computed in Rust because SQLite only folds ASCII case.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            color TEXT NOT NULL,
            UNIQUE(user_id, name_key),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_unique_violation(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(name.to_string()),
        error => error.into(),
    }
}

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category with this name.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    color: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name, name_key, color) VALUES (?1, ?2, ?3, ?4);",
            (user_id.as_i64(), &name, name.normalized(), color),
        )
        .map_err(|error| map_unique_violation(error, &name))?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        color: color.to_owned(),
    })
}

/// Retrieve one of the user's categories by ID.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, user_id, name, color FROM category WHERE id = ?1 AND user_id = ?2;")?
        .query_row((category_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, color FROM category WHERE user_id = ?1 \
            ORDER BY name_key ASC;",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename or recolor a category.
///
/// Budgets and transactions refer to categories by name, so a rename leaves
/// rows using the old name pointing at nothing. A warning is logged when this
/// happens.
///
/// # Errors
///
/// Returns [Error::UpdateMissingCategory] if the user has no category with this ID,
/// or [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    name: CategoryName,
    color: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let existing = match get_category(user_id, category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    };

    connection
        .execute(
            "UPDATE category SET name = ?1, name_key = ?2, color = ?3 WHERE id = ?4 AND user_id = ?5",
            (&name, name.normalized(), color, category_id, user_id.as_i64()),
        )
        .map_err(|error| map_unique_violation(error, &name))?;

    if existing.name != name {
        tracing::warn!(
            "Category {category_id} renamed from \"{}\" to \"{}\" for user {user_id}. \
            Budgets and transactions using \"{}\" keep the old name.",
            existing.name,
            name,
            existing.name
        );
    }

    Ok(Category {
        id: category_id,
        user_id,
        name,
        color: color.to_owned(),
    })
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryName, create_category, get_categories, get_category, update_category},
        test_utils::{create_test_user, get_test_connection},
    };

    fn setup() -> (Connection, UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);
        (connection, user_id)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user_id) = setup();
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(user_id, name.clone(), "#00ff00", &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(get_category(user_id, category.id, &connection), Ok(category));
    }

    #[test]
    fn duplicate_name_ignores_case() {
        let (connection, user_id) = setup();
        create_category(user_id, CategoryName::new_unchecked("Rent"), "red", &connection).unwrap();

        let result = create_category(user_id, CategoryName::new_unchecked("RENT"), "red", &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("RENT".to_owned())));
    }

    #[test]
    fn duplicate_name_ignores_non_ascii_case() {
        let (connection, user_id) = setup();
        create_category(user_id, CategoryName::new_unchecked("Épicerie"), "green", &connection)
            .unwrap();

        let result =
            create_category(user_id, CategoryName::new_unchecked("épicerie"), "green", &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("épicerie".to_owned()))
        );
    }

    #[test]
    fn users_can_share_category_names() {
        let (connection, user_id) = setup();
        let other_user = create_test_user("sam", &connection);
        create_category(user_id, CategoryName::new_unchecked("Rent"), "red", &connection).unwrap();

        let result = create_category(other_user, CategoryName::new_unchecked("Rent"), "red", &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_categories_only_returns_own_sorted() {
        let (connection, user_id) = setup();
        let other_user = create_test_user("sam", &connection);
        let want = vec![
            create_category(user_id, CategoryName::new_unchecked("apples"), "a", &connection)
                .unwrap(),
            create_category(user_id, CategoryName::new_unchecked("Bananas"), "b", &connection)
                .unwrap(),
        ];
        create_category(other_user, CategoryName::new_unchecked("Cherries"), "c", &connection)
            .unwrap();

        let got = get_categories(user_id, &connection).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn get_other_users_category_is_not_found() {
        let (connection, user_id) = setup();
        let other_user = create_test_user("sam", &connection);
        let category =
            create_category(user_id, CategoryName::new_unchecked("Rent"), "red", &connection)
                .unwrap();

        assert_eq!(
            get_category(other_user, category.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_category_renames_and_recolors() {
        let (connection, user_id) = setup();
        let category =
            create_category(user_id, CategoryName::new_unchecked("Food"), "red", &connection)
                .unwrap();

        let updated = update_category(
            user_id,
            category.id,
            CategoryName::new_unchecked("Groceries"),
            "blue",
            &connection,
        )
        .unwrap();

        assert_eq!(get_category(user_id, category.id, &connection), Ok(updated.clone()));
        assert_eq!(updated.name.as_ref(), "Groceries");
        assert_eq!(updated.color, "blue");
    }

    #[test]
    fn update_missing_category_fails() {
        let (connection, user_id) = setup();

        let result = update_category(
            user_id,
            999,
            CategoryName::new_unchecked("Food"),
            "red",
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }
}

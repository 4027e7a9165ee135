//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/budgets/{budget_id}', use [format_endpoint].

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT_API: &str = "/api/log_out";
/// The route to list the budget summary for a month or create a category budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to set the monthly (global) budget.
pub const GLOBAL_BUDGET_API: &str = "/api/budgets/global";
/// The route to update or delete a single budget.
pub const BUDGET_API: &str = "/api/budgets/{budget_id}";
/// The route to list or create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";
/// The route to list or create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update a single category.
pub const CATEGORY_API: &str = "/api/categories/{category_id}";
/// The route to read or change the budget settings.
pub const SETTINGS_API: &str = "/api/settings";
/// The route to list or create auto-allocation rules.
pub const ALLOCATION_RULES_API: &str = "/api/allocation_rules";
/// The route to delete a single auto-allocation rule.
pub const ALLOCATION_RULE_API: &str = "/api/allocation_rules/{rule_id}";
/// The route to run monthly maintenance on demand.
pub const MAINTENANCE_API: &str = "/api/maintenance";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT_API);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_API);
        assert_endpoint_is_valid_uri(endpoints::GLOBAL_BUDGET_API);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_API);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_API);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_API);
        assert_endpoint_is_valid_uri(endpoints::SETTINGS_API);
        assert_endpoint_is_valid_uri(endpoints::ALLOCATION_RULES_API);
        assert_endpoint_is_valid_uri(endpoints::ALLOCATION_RULE_API);
        assert_endpoint_is_valid_uri(endpoints::MAINTENANCE_API);
    }

    #[test]
    fn formats_budget_endpoint() {
        assert_eq!(format_endpoint(endpoints::BUDGET_API, -3), "/api/budgets/-3");
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}

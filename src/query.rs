use serde::Deserialize;

/// SQL query builder for constructing parameterized product queries
/// Builds a single SQL query with filters, sorting, and pagination
pub struct SQLQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u32,
}

impl SQLQueryBuilder {
    /// Creates a new SQLQueryBuilder with default values
    pub fn new() -> Self {
        Self {
            base_query: "SELECT * FROM products".to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
            limit: 20,
            offset: 0,
        }
    }

    /// Adds a search filter for partial name matching (case-insensitive)
    /// Uses ILIKE for PostgreSQL case-insensitive pattern matching
    pub fn add_search_filter(&mut self, search: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("name ILIKE ${}", param_index));
        self.params.push(format!("%{}%", search));
    }

    /// Adds a category filter for exact category matching
    pub fn add_category_filter(&mut self, category_id: i32) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("category_id = ${}::int4", param_index));
        self.params.push(category_id.to_string());
    }

    /// Restricts results to active products
    pub fn add_active_filter(&mut self) {
        self.where_clauses.push("is_active = TRUE".to_string());
    }

    /// Restricts results to featured products
    pub fn add_featured_filter(&mut self) {
        self.where_clauses.push("is_featured = TRUE".to_string());
    }

    /// Restricts results to vegetarian products
    pub fn add_vegetarian_filter(&mut self) {
        self.where_clauses.push("is_vegetarian = TRUE".to_string());
    }

    /// Adds base-price range filters (min and/or max)
    /// Both bounds are inclusive; params are cast because they travel as text
    pub fn add_price_range(&mut self, min: Option<f64>, max: Option<f64>) {
        if let Some(min_price) = min {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("price >= ${}::numeric", param_index));
            self.params.push(min_price.to_string());
        }

        if let Some(max_price) = max {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("price <= ${}::numeric", param_index));
            self.params.push(max_price.to_string());
        }
    }

    /// Sets the sort order for the query
    /// Adds an ORDER BY clause with the specified field and order
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::DisplayOrder => "display_order",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        self.order_clause = Some(format!("{} {}", field_name, order_str));
    }

    /// Sets pagination parameters
    /// Calculates LIMIT and OFFSET based on page number and limit
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1) * limit;
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        // LIMIT and OFFSET are appended directly (not as bound parameters);
        // PostgreSQL requires these to be integers, not text
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

/// Query parameters extracted from HTTP request
/// All fields are optional to support flexible querying
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Search term for partial name matching (case-insensitive)
    pub search: Option<String>,
    /// Filter by category id
    pub category: Option<i32>,
    /// Only include active products
    pub active: Option<bool>,
    /// Only include featured products
    pub featured: Option<bool>,
    /// Only include vegetarian products
    pub vegetarian: Option<bool>,
    /// Minimum base price filter (inclusive)
    pub min_price: Option<f64>,
    /// Maximum base price filter (inclusive)
    pub max_price: Option<f64>,
    /// Sort field: "name", "price" or "display_order"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 20)
    pub limit: Option<u32>,
}

/// Sort field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    DisplayOrder,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    /// Normalized search term (trimmed, None if empty)
    pub search: Option<String>,
    /// Category filter
    pub category: Option<i32>,
    /// Active-only flag
    pub active_only: bool,
    /// Featured-only flag
    pub featured_only: bool,
    /// Vegetarian-only flag
    pub vegetarian_only: bool,
    /// Minimum price filter (validated as positive)
    pub min_price: Option<f64>,
    /// Maximum price filter (validated as positive and >= min_price)
    pub max_price: Option<f64>,
    /// Sort field (None means display-order sorting)
    pub sort_field: Option<SortField>,
    /// Sort order (defaults based on sort field)
    pub sort_order: SortOrder,
    /// Page number (validated as positive, defaults to 1)
    pub page: u32,
    /// Items per page (validated as positive, defaults to 20)
    pub limit: u32,
}

/// Validation error type
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters
    /// Returns ValidatedQuery on success or ValidationError on failure
    pub fn validate(params: QueryParams) -> Result<ValidatedQuery, ValidationError> {
        let search = Self::normalize_string(params.search);

        if let Some(category_id) = params.category {
            if category_id <= 0 {
                return Err(ValidationError {
                    message: "category must be a positive id".to_string(),
                });
            }
        }

        let min_price = if let Some(price) = params.min_price {
            Self::validate_price(price, "min_price")?;
            Some(price)
        } else {
            None
        };

        let max_price = if let Some(price) = params.max_price {
            Self::validate_price(price, "max_price")?;
            Some(price)
        } else {
            None
        };

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(ValidationError {
                    message: "min_price cannot be greater than max_price".to_string(),
                });
            }
        }

        let sort_field = if let Some(sort_str) = params.sort {
            Some(Self::parse_sort_field(&sort_str)?)
        } else {
            None
        };

        let sort_order = if let Some(order_str) = params.order {
            Self::parse_sort_order(&order_str)?
        } else {
            // Default order depends on sort field
            match sort_field {
                Some(SortField::Price) => SortOrder::Asc,
                Some(SortField::Name) => SortOrder::Asc,
                Some(SortField::DisplayOrder) | None => SortOrder::Asc,
            }
        };

        let page = if let Some(p) = params.page {
            Self::validate_pagination_param(p, "page")?;
            p
        } else {
            1
        };

        let limit = if let Some(l) = params.limit {
            Self::validate_pagination_param(l, "limit")?;
            l
        } else {
            20
        };

        Ok(ValidatedQuery {
            search,
            category: params.category,
            active_only: params.active.unwrap_or(false),
            featured_only: params.featured.unwrap_or(false),
            vegetarian_only: params.vegetarian.unwrap_or(false),
            min_price,
            max_price,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Normalizes string parameters by trimming whitespace
    /// Returns None if the string is empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Validates that a price filter is positive
    fn validate_price(price: f64, param_name: &str) -> Result<(), ValidationError> {
        if price <= 0.0 {
            return Err(ValidationError {
                message: format!("{} must be a positive number", param_name),
            });
        }
        if price.is_nan() || price.is_infinite() {
            return Err(ValidationError {
                message: format!("{} must be a valid number", param_name),
            });
        }
        Ok(())
    }

    /// Parses sort field string to SortField enum
    fn parse_sort_field(s: &str) -> Result<SortField, ValidationError> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "display_order" => Ok(SortField::DisplayOrder),
            _ => Err(ValidationError {
                message: format!(
                    "Invalid sort field '{}'. Must be 'name', 'price' or 'display_order'",
                    s
                ),
            }),
        }
    }

    /// Parses sort order string to SortOrder enum
    fn parse_sort_order(s: &str) -> Result<SortOrder, ValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    /// Validates pagination parameters (page and limit)
    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_builder_basic_query() {
        let builder = SQLQueryBuilder::new();
        let (query, params) = builder.build();

        assert!(query.contains("SELECT * FROM products"));
        assert!(query.contains("LIMIT 20"));
        assert!(query.contains("OFFSET 0"));
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_sql_builder_with_search() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter("calabresa");
        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains("name ILIKE $1"));
        assert_eq!(params[0], "%calabresa%");
    }

    #[test]
    fn test_sql_builder_with_category_filter() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_category_filter(3);
        let (query, params) = builder.build();

        assert!(query.contains("category_id = $1::int4"));
        assert_eq!(params[0], "3");
    }

    #[test]
    fn test_sql_builder_with_flags() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_active_filter();
        builder.add_featured_filter();
        let (query, params) = builder.build();

        assert!(query.contains("is_active = TRUE"));
        assert!(query.contains("is_featured = TRUE"));
        assert!(query.contains(" AND "));
        assert!(params.is_empty());
    }

    #[test]
    fn test_sql_builder_with_price_range() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_price_range(Some(20.0), Some(50.0));
        let (query, params) = builder.build();

        assert!(query.contains("price >= $1::numeric"));
        assert!(query.contains("price <= $2::numeric"));
        assert_eq!(params[0], "20");
        assert_eq!(params[1], "50");
    }

    #[test]
    fn test_sql_builder_with_sorting() {
        let mut builder = SQLQueryBuilder::new();
        builder.set_sort(SortField::Price, SortOrder::Desc);
        let (query, _) = builder.build();

        assert!(query.contains("ORDER BY price DESC"));
    }

    #[test]
    fn test_sql_builder_with_pagination() {
        let mut builder = SQLQueryBuilder::new();
        builder.set_pagination(3, 15);
        let (query, _params) = builder.build();

        assert!(query.contains("LIMIT 15"));
        assert!(query.contains("OFFSET 30"));
    }

    #[test]
    fn test_validator_defaults() {
        let params = QueryParams {
            search: None,
            category: None,
            active: None,
            featured: None,
            vegetarian: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        };

        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 20);
        assert!(!validated.active_only);
        assert_eq!(validated.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_validator_normalizes_search() {
        let params = QueryParams {
            search: Some("   ".to_string()),
            category: None,
            active: None,
            featured: None,
            vegetarian: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        };

        let validated = QueryValidator::validate(params).unwrap();
        assert!(validated.search.is_none());
    }

    #[test]
    fn test_validator_rejects_inverted_price_range() {
        let params = QueryParams {
            search: None,
            category: None,
            active: None,
            featured: None,
            vegetarian: None,
            min_price: Some(50.0),
            max_price: Some(10.0),
            sort: None,
            order: None,
            page: None,
            limit: None,
        };

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_validator_rejects_unknown_sort_field() {
        let params = QueryParams {
            search: None,
            category: None,
            active: None,
            featured: None,
            vegetarian: None,
            min_price: None,
            max_price: None,
            sort: Some("rating".to_string()),
            order: None,
            page: None,
            limit: None,
        };

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_validator_rejects_zero_page() {
        let params = QueryParams {
            search: None,
            category: None,
            active: None,
            featured: None,
            vegetarian: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: Some(0),
            limit: None,
        };

        assert!(QueryValidator::validate(params).is_err());
    }
}

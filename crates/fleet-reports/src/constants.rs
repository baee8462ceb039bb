//! Centralized constants for the reporting engine
//!
//! Endpoint paths and category labels are part of the contract with the
//! backend and the charting layer. Deployment-specific values (base URL,
//! timeouts) are loaded from config.toml by the CLI.

// =============================================================================
// API Endpoints
// =============================================================================

/// Default reports backend (the dashboard's local API server)
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Revenue per date bucket, keyed by category
pub const REVENUE_OVER_TIME_PATH: &str = "/reports/revenue-over-time";

/// Revenue per mile with the raw revenue and miles columns
pub const REVENUE_PER_MILE_PATH: &str = "/reports/revenue-per-mile";

/// Miles driven per date bucket
pub const MILES_PATH: &str = "/reports/miles";

/// Loads delivered per date bucket
pub const LOAD_COUNT_PATH: &str = "/reports/load-count";

/// Expense totals by category
pub const EXPENSES_PATH: &str = "/reports/expenses";

/// Driver records (used to populate the driver filter)
pub const DRIVERS_PATH: &str = "/drivers";

// =============================================================================
// Series Keys
// =============================================================================

/// Category label used when no driver filter is active
pub const CUMULATIVE_CATEGORY: &str = "Cumulative";

/// Value key of the revenue-per-mile series
pub const REVENUE_PER_MILE_KEY: &str = "Revenue per mile";

/// Raw revenue column of the revenue-per-mile series
pub const REVENUE_KEY: &str = "revenue";

/// Raw miles column of the revenue-per-mile series
pub const MILES_COLUMN_KEY: &str = "miles";

/// Value key of the miles series
pub const MILES_KEY: &str = "Miles";

/// Value key of the load-count series
pub const LOADS_KEY: &str = "Loads";

// =============================================================================
// Defaults
// =============================================================================

/// Per-fetch timeout so a cycle can never stay `Refreshing` forever
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// Width of the default date range, ending today
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Colors assigned to expense categories the backend sends without one
pub const DEFAULT_EXPENSE_PALETTE: [&str; 3] = ["cyan", "#6686DC", "fuchsia"];

/// Date format used in query parameters and ISO date-bucket labels
pub const DATE_FORMAT: &str = "%Y-%m-%d";

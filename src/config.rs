use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

/// Per-type yearly allowances and the named validations applied at creation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeavePolicy {
    #[schema(example = 12)]
    pub casual_days: u32,
    #[schema(example = 5)]
    pub medical_days: u32,
    #[schema(example = 3)]
    pub emergency_days: u32,
    /// Reject requests whose end date precedes the start date
    pub enforce_date_order: bool,
    /// Reject requests exceeding the remaining yearly allowance
    pub enforce_balance: bool,
    /// Hours an exit pass stays valid after approval
    #[schema(example = 24)]
    pub pass_ttl_hours: i64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            casual_days: 12,
            medical_days: 5,
            emergency_days: 3,
            enforce_date_order: true,
            enforce_balance: false,
            pass_ttl_hours: 24,
        }
    }
}

/// Longest pass lifetime accepted from the environment, one year.
pub const MAX_PASS_TTL_HOURS: i64 = 24 * 366;

/// Pass lifetimes must be positive and bounded so `now + ttl` stays representable.
pub fn check_pass_ttl(hours: i64) -> Result<i64, String> {
    if (1..=MAX_PASS_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(format!(
            "PASS_TTL_HOURS must be between 1 and {}, got {}",
            MAX_PASS_TTL_HOURS, hours
        ))
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_verify_per_min: u32,

    pub api_prefix: String,

    pub college_name: String,
    pub academic_year: String,
    pub policy: LeavePolicy,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} has an invalid value: {}", key, raw)),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("mysql") | Err(_) => StoreBackend::MySql,
            Ok(other) => panic!("STORE_BACKEND must be mysql or memory, got {}", other),
        };
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            panic!("DATABASE_URL must be set");
        }

        let defaults = LeavePolicy::default();
        let pass_ttl_hours = check_pass_ttl(var_or("PASS_TTL_HOURS", defaults.pass_ttl_hours))
            .unwrap_or_else(|e| panic!("{}", e));

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url,
            store_backend,
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000),
            rate_verify_per_min: var_or("RATE_VERIFY_PER_MIN", 120),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            college_name: env::var("COLLEGE_NAME").unwrap_or_else(|_| "College".to_string()),
            academic_year: env::var("ACADEMIC_YEAR").unwrap_or_default(),
            policy: LeavePolicy {
                casual_days: var_or("CASUAL_LEAVE_DAYS", defaults.casual_days),
                medical_days: var_or("MEDICAL_LEAVE_DAYS", defaults.medical_days),
                emergency_days: var_or("EMERGENCY_LEAVE_DAYS", defaults.emergency_days),
                enforce_date_order: var_or("ENFORCE_DATE_ORDER", defaults.enforce_date_order),
                enforce_balance: var_or("ENFORCE_LEAVE_BALANCE", defaults.enforce_balance),
                pass_ttl_hours,
            },
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            store_backend: StoreBackend::Memory,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            rate_protected_per_min: 1000,
            rate_verify_per_min: 1000,
            api_prefix: "/api".to_string(),
            college_name: "Test College".to_string(),
            academic_year: "2024-2025".to_string(),
            policy: LeavePolicy::default(),
        }
    }
}

// Standardized error codes returned in the `code` field of API error bodies

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const DUPLICATE_EMAIL: &str = "VALIDATION_1004";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_INVALID: &str = "AUTH_2002";
    pub const MISSING_TOKEN: &str = "AUTH_2003";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RESOURCE_4001";
}

pub mod system {
    pub const SERVICE_UNAVAILABLE: &str = "SYSTEM_5001";
    pub const INTERNAL: &str = "SYSTEM_5002";
}

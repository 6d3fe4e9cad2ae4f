// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Header carrying the Open Service Broker API version on every OSB call
pub const API_VERSION_HEADER: &str = "X-Broker-API-Version";

/// OSB API version sent when none is configured
pub const DEFAULT_API_VERSION: &str = "2.13";

/// Service Broker registry host used to build broker URLs from a project and broker name
pub const DEFAULT_HOST: &str = "https://servicebroker.googleapis.com";

/// OAuth scope requested for broker calls
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Query parameter keys used by the OSB endpoints
pub mod query {
    pub const ACCEPTS_INCOMPLETE: &str = "accepts_incomplete";
    pub const SERVICE_ID: &str = "service_id";
    pub const PLAN_ID: &str = "plan_id";
    pub const OPERATION: &str = "operation";
}

/// Last-operation polling configuration
pub mod poll {
    /// Delay before the first last-operation call, in milliseconds
    pub const INITIAL_DELAY_MS: u64 = 100;
    /// Maximum delay between two last-operation calls (exponential backoff cap)
    pub const MAX_DELAY_SECS: u64 = 6;
}

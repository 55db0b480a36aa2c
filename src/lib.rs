// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Credential Audit Library
 * Exposes the scan pipeline for the CLI and integration tests
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod csrf;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod http_client;
pub mod matcher;
pub mod reporting;
pub mod scanners;
pub mod targets;
pub mod types;

pub use engine::{ScanEngine, ScanSummary};
pub use errors::{ScannerError, ScannerResult};

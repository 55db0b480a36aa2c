// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{
    AppConfig, OutputConfig, OutputFormat, ProfileSelection, ScannerConfig, TargetSources,
};

pub use loader::{apply_env_overrides, ConfigFormat, ConfigLoader, ProfileLoader};

pub use validation::ConfigValidator;

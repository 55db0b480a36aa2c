// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::types::ScanResult;
use anyhow::Result;
use csv::Writer;

pub struct CsvReportGenerator;

impl CsvReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, results: &[ScanResult]) -> Result<Vec<u8>> {
        let mut wtr = Writer::from_writer(vec![]);

        wtr.write_record([
            "Profile",
            "Category",
            "Target",
            "URL",
            "Auth Type",
            "Username",
            "Password",
            "Evidence",
            "Found At",
        ])?;

        for result in results {
            wtr.write_record([
                &result.profile,
                &result.category,
                &result.target,
                &result.url,
                &result.auth_type,
                &result.username,
                &result.password,
                &result.evidence,
                &result.found_at,
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(data)
    }
}

impl Default for CsvReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

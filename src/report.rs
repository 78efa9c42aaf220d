//! Console rendering of lookup results.

use serde::Serialize;
use std::io::{self, Write};

use crate::extract::Advisory;
use crate::pypi::PackageInfo;

/// Machine-readable summary of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub package: String,
    pub version: String,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

/// Print the version, summary and author lines.
pub fn write_metadata(out: &mut impl Write, name: &str, info: &PackageInfo) -> io::Result<()> {
    writeln!(out, "Latest version of '{}': {}", name, info.version)?;
    writeln!(out, "Summary: {}", or_default(info.summary.as_deref(), "No summary"))?;
    writeln!(out, "Author: {}", or_default(info.author.as_deref(), "Unknown"))
}

/// Print the dependency list, or a fixed message when it is empty.
pub fn write_dependencies(out: &mut impl Write, dependencies: &[String]) -> io::Result<()> {
    if dependencies.is_empty() {
        return writeln!(out, "No dependencies found.");
    }

    writeln!(out, "Dependencies:")?;
    for dep in dependencies {
        writeln!(out, " - {}", dep)?;
    }
    Ok(())
}

pub fn write_advisories(out: &mut impl Write, advisories: &[Advisory]) -> io::Result<()> {
    for advisory in advisories {
        writeln!(out, "Warning: {}", advisory)?;
    }
    Ok(())
}

/// Print `summary` as pretty JSON.
pub fn write_summary(out: &mut impl Write, summary: &PackageSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}

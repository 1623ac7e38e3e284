//! Fixture loading and management.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use setfmt_core::{Convention, FormatArg};

use crate::error::HarnessError;

/// One argument of a fixture case, tagged with its C type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Character code: a byte for `%c`, a code point for `%lc`.
    Char(u32),
    Str(String),
    /// A null `char *`.
    NullStr,
    /// Wide string as code units; a 0 unit terminates early.
    WideStr(Vec<u32>),
    Pointer(usize),
}

impl FixtureArg {
    #[must_use]
    pub fn as_format_arg(&self) -> FormatArg<'_> {
        match self {
            Self::Int(v) => FormatArg::SignedInt(*v),
            Self::Uint(v) => FormatArg::UnsignedInt(*v),
            Self::Float(v) => FormatArg::Float(*v),
            Self::Char(c) => FormatArg::Char(*c),
            Self::Str(s) => FormatArg::Str(Some(s.as_bytes())),
            Self::NullStr => FormatArg::Str(None),
            Self::WideStr(units) => FormatArg::WideStr(Some(units)),
            Self::Pointer(addr) => FormatArg::Pointer(*addr),
        }
    }
}

/// `TYPE:VALUE` as accepted by `harness render --arg`.
impl FromStr for FixtureArg {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || HarnessError::BadArgument(s.to_string());
        if s == "null" {
            return Ok(Self::NullStr);
        }
        let (kind, value) = s.split_once(':').ok_or_else(bad)?;
        let arg = match kind {
            "i" => Self::Int(value.parse().map_err(|_| bad())?),
            "u" => Self::Uint(value.parse().map_err(|_| bad())?),
            "f" => Self::Float(value.parse().map_err(|_| bad())?),
            "c" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c as u32),
                    _ => return Err(bad()),
                }
            }
            "s" => Self::Str(value.to_string()),
            "p" => {
                let hex = value.trim_start_matches("0x");
                Self::Pointer(usize::from_str_radix(hex, 16).map_err(|_| bad())?)
            }
            _ => return Err(bad()),
        };
        Ok(arg)
    }
}

/// Which delivery conventions a case applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseConvention {
    Terminated,
    Sized,
    Both,
}

impl CaseConvention {
    #[must_use]
    pub fn includes(self, convention: Convention) -> bool {
        match self {
            Self::Both => true,
            Self::Terminated => convention == Convention::Terminated,
            Self::Sized => convention == Convention::Sized,
        }
    }
}

impl FromStr for CaseConvention {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            other => match Convention::from_str_loose(other) {
                Some(Convention::Terminated) => Ok(Self::Terminated),
                Some(Convention::Sized) => Ok(Self::Sized),
                None => Err(HarnessError::UnknownConvention(s.to_string())),
            },
        }
    }
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    pub convention: CaseConvention,
    /// First-attempt capacity; the default (1024) when absent.
    #[serde(default)]
    pub initial_capacity: Option<usize>,
    /// Make the n-th allocation (1-based) and every later one fail.
    #[serde(default)]
    pub fail_on_attempt: Option<u32>,
    /// Text the sink must receive; `None` means the sink must not be called.
    pub expected_output: Option<String>,
    /// Integer a sized-convention caller would see. Under the terminated
    /// convention a negative value is expected as 0.
    pub expected_result: i32,
    /// Exact capacities requested, in order, when the case pins them.
    #[serde(default)]
    pub expected_requests: Option<Vec<usize>>,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Every `*.json` file in `dir`, sorted by path.
pub fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = std::fs::read_dir(dir).map_err(|source| HarnessError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(HarnessError::NoFixtures(dir.to_path_buf()));
    }
    Ok(paths)
}

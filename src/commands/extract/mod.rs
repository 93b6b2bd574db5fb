use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use regex::Regex;
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::commands::inventory;
use crate::model::{
    ChapterReport, ChapterReportsManifest, ExtractCounts, ExtractPaths, ExtractRunManifest,
    HeadingReferenceManifest, ToolVersions, TranscriptEntry, TranscriptInventoryManifest,
};
use crate::util::{
    ensure_directory, normalize_chapter_key, now_utc_string, utc_compact_string, write_json_pretty,
};

const DB_SCHEMA_VERSION: &str = "0.1.0";

mod db_setup;
mod heading_pattern;
mod locate;
mod normalize;
mod pipeline;
mod questions;
mod recover;
mod reference_table;
mod run;
mod segment;
#[cfg(test)]
mod tests;
mod types;

pub use reference_table::{HeadingReferencePlan, load_heading_reference};
pub use run::run;
pub use types::ChapterHeading;

use db_setup::*;
use heading_pattern::*;
use locate::*;
use normalize::*;
use pipeline::*;
use questions::*;
use recover::*;
use segment::*;
use types::*;

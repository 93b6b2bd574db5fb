use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::VerifyArgs;
use crate::commands::extract::{HeadingReferencePlan, load_heading_reference};
use crate::util::{now_utc_string, write_json_pretty};

const TOPIC_COVERAGE_MIN: f64 = 0.90;
const EMPTY_BODY_RATIO_MAX: f64 = 0.05;
const QUESTION_CHAPTER_COVERAGE_MIN: f64 = 0.50;
const CHAPTER_PRESENCE_MIN: f64 = 1.0;

mod checks;
mod run;

pub use run::run;

use checks::*;

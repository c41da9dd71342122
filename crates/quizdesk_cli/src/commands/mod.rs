//! Subcommand implementations.

pub mod authoring;
pub mod listing;
pub mod store;

use crate::config::GlobalOpts;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use log::debug;
use quizdesk_core::{
    sample_seed, AssessmentError, AssessmentService, ErrorKind, FileRepository, QuestionDraft,
};
use serde_json::Value;

/// Exactly one acting principal.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Principal {
    /// Act as this teacher
    #[arg(long)]
    pub teacher: Option<String>,

    /// Act as this student
    #[arg(long)]
    pub student: Option<String>,
}

/// A principal acting on one test.
#[derive(Args, Debug)]
pub struct Scope {
    #[arg(long)]
    pub test: String,

    #[command(flatten)]
    pub principal: Principal,
}

/// Parses `"<points>:<prompt>"` into a question draft.
pub fn parse_question_draft(raw: &str) -> Result<QuestionDraft, String> {
    let (points, prompt) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `<points>:<prompt>`, got `{raw}`"))?;
    let points = points
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid points `{}`: {err}", points.trim()))?;
    Ok(QuestionDraft::new(prompt, points))
}

pub(crate) fn open_store(opts: &GlobalOpts) -> Result<FileRepository> {
    debug!(
        "event=cli_open module=cli status=start path={}",
        opts.data_path.display()
    );
    FileRepository::open(&opts.data_path, sample_seed())
        .with_context(|| format!("failed to open store at {}", opts.data_path.display()))
}

pub(crate) fn open_service(opts: &GlobalOpts) -> Result<AssessmentService<FileRepository>> {
    Ok(AssessmentService::new(open_store(opts)?))
}

/// Wraps a service error with its category so scripts can branch on it.
pub(crate) fn service_error(err: AssessmentError) -> anyhow::Error {
    let kind = match err.kind() {
        ErrorKind::NotFound => "not_found",
        ErrorKind::Validation => "validation",
        ErrorKind::AssignmentViolation => "not_assigned",
        ErrorKind::Authorization => "forbidden",
        ErrorKind::Infrastructure => "infrastructure",
    };
    anyhow!(err).context(format!("kind={kind}"))
}

pub(crate) fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! qabrief core: bidirectional ticket/briefing transforms.
//!
//! - [`issue::simplify_issue`]: ticket payload → flat record and model briefing
//! - [`steps::parse_test_steps`]: model reply → normalised test steps
//! - [`render::render_summary`]: labelled model summary → comment document
//!
//! All transforms are synchronous, pure and allocate fresh output per call.
//! Network collaborators live in `qabrief-agent`.

pub mod adf;
pub mod criteria;
pub mod error;
pub mod extract;
pub mod issue;
pub mod obs;
pub mod prompt;
pub mod render;
pub mod steps;
pub mod telemetry;

pub use adf::{ListItem, Node};
pub use criteria::mine_acceptance_criteria;
pub use error::{BriefError, Result};
pub use extract::extract_text;
pub use issue::{context_before_criteria, simplify_issue, SimplifiedIssue};
pub use prompt::{
    issue_prompt, summarize_results_prompt, test_steps_prompt, PromptFields, SUMMARY_SYSTEM,
    TEST_STEPS_SYSTEM,
};
pub use render::{mark_for, render_summary, RenderedSections, SectionLabel, FAIL_MARK, PASS_MARK};
pub use steps::{
    parse_test_steps, parse_test_steps_detailed, strip_code_fence, ParseRecoveryNotice,
    StepParseOutcome, TestStep,
};
pub use telemetry::init_tracing;

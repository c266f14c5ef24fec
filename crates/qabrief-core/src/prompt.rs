//! Prompt templates handed to the language model.
//!
//! Only the interpolation points are load-bearing; the surrounding wording
//! can change without affecting any transform.

/// System message for test-step generation.
pub const TEST_STEPS_SYSTEM: &str = "You are an expert QA tester.";

/// System message for result summarisation.
pub const SUMMARY_SYSTEM: &str = "You are a senior QA engineer.";

/// Values interpolated into the ticket briefing.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub summary: &'a str,
    pub status: &'a str,
    pub assignee: &'a str,
    pub context: &'a str,
    pub acceptance_text: &'a str,
    pub comments_text: &'a str,
}

/// Build the ticket briefing from simplified ticket fields.
pub fn issue_prompt(fields: &PromptFields<'_>) -> String {
    format!(
        "You are a QA automation assistant.\n\
         Below is a ticket summary and its relevant details.\n\
         \n\
         ---\n\
         **Summary:** {summary}\n\
         \n\
         **Status:** {status}\n\
         **Assignee:** {assignee}\n\
         \n\
         **Context & Description:**\n\
         {context}\n\
         \n\
         **Acceptance Criteria:**\n\
         {acceptance}\n\
         \n\
         **Developer Comments:**\n\
         {comments}\n\
         ---\n\
         \n\
         Using the above details, generate automated QA test scenarios that validate each acceptance criterion.",
        summary = fields.summary,
        status = fields.status,
        assignee = fields.assignee,
        context = fields.context,
        acceptance = fields.acceptance_text,
        comments = fields.comments_text,
    )
}

/// Wrap a ticket briefing in instructions asking for a bare JSON array of
/// test steps.
pub fn test_steps_prompt(briefing: &str) -> String {
    format!(
        "Based on the ticket details provided below, generate clear, structured test steps \
         that validate each acceptance criterion.\n\
         \n\
         Follow these instructions exactly:\n\
         1. Respond with a valid JSON array only.\n\
         2. Each item must be an object with:\n\
         \x20  - \"step\": the exact user action to perform.\n\
         \x20  - \"expected_result\": what should happen after the step.\n\
         3. Do not add explanations, markdown code fences or comments.\n\
         4. Do not wrap the array inside another object.\n\
         5. Use concise, testable phrasing suitable for browser automation.\n\
         \n\
         Ticket details:\n\
         ---\n\
         {briefing}\n\
         ---"
    )
}

/// Ask for a labelled summary of execution results, in the section
/// vocabulary understood by [`crate::render::render_summary`].
pub fn summarize_results_prompt(results: &str) -> String {
    format!(
        "Summarize the following automated test results into a concise, professional QA \
         feedback comment.\n\
         \n\
         Use exactly these labelled sections, in this order, each label on its own line:\n\
         Summary: one short paragraph.\n\
         Details: one entry per test case, each written as \
         \"Test Case ID: <ID>. Purpose: <what it checks>. Result: <Passed or Failed>.\"\n\
         Overall Status: one sentence that says whether the run passed or failed.\n\
         Next Steps: short sentences, each ending with a period.\n\
         Disclaimer: one sentence.\n\
         \n\
         Do not use HTML, markdown fences or any other labels.\n\
         \n\
         Test results:\n\
         ---\n\
         {results}\n\
         ---"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_prompt_interpolates_every_field() {
        let prompt = issue_prompt(&PromptFields {
            summary: "Fix login",
            status: "In Progress",
            assignee: "Ada",
            context: "Users cannot log in.",
            acceptance_text: "- Login works",
            comments_text: "No comments found.",
        });
        assert!(prompt.contains("**Summary:** Fix login"));
        assert!(prompt.contains("**Status:** In Progress"));
        assert!(prompt.contains("**Assignee:** Ada"));
        assert!(prompt.contains("**Context & Description:**\nUsers cannot log in."));
        assert!(prompt.contains("**Acceptance Criteria:**\n- Login works"));
        assert!(prompt.contains("**Developer Comments:**\nNo comments found."));
    }

    #[test]
    fn test_step_prompt_embeds_briefing() {
        let prompt = test_steps_prompt("BRIEFING");
        assert!(prompt.contains("---\nBRIEFING\n---"));
        assert!(prompt.contains("\"expected_result\""));
    }

    #[test]
    fn test_summary_prompt_names_all_sections() {
        let prompt = summarize_results_prompt("[]");
        for label in [
            "Summary:",
            "Details:",
            "Overall Status:",
            "Next Steps:",
            "Disclaimer:",
            "Test Case ID:",
        ] {
            assert!(prompt.contains(label), "missing {label}");
        }
    }
}

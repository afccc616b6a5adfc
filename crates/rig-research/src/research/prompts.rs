//! Research workflow prompt templates
//!
//! One system prompt per model call in the workflow:
//! - Planner: outlines the report
//! - Query writers: turn a plan or a critique into search queries
//! - Writer: drafts the report from the gathered content
//! - Reviewer: critiques a draft
//! - Editor: decides whether the report is finished

use chrono::Utc;

/// Prompt templates for the research workflow
pub struct ResearchPrompts;

impl ResearchPrompts {
    /// Get the current date formatted for prompts
    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Planner prompt: task in, report outline out
    pub fn plan() -> String {
        format!(
            r#"You are an expert research planner. For context, today's date is {date}.

Write a high level outline for a report on the topic the user provides.
Give the report's main sections, with short notes on what each section must cover
and which facts or figures it will need. Keep the outline focused on the user's request."#,
            date = Self::current_date()
        )
    }

    /// Query writer for the initial research pass
    pub fn research_plan() -> String {
        r#"You are a researcher charged with providing information that can be used
when writing the following report. Using the task and the plan you are given,
generate a list of search queries that will gather the relevant information.
Only generate 3 queries max."#
            .to_string()
    }

    /// Writer prompt with the gathered research embedded
    pub fn write(content: &str) -> String {
        format!(
            r#"You are a research assistant tasked with writing excellent reports.
Generate the best report possible for the user's request and the initial outline.
If the user provides critique, respond with a revised version of your previous attempt.

Guidelines:
- Use Markdown with clear section headings
- Write in paragraph form, not just bullet points
- Cite the information below where you use it
- Do not use self-referential language ("I found...", "I researched...")

Utilize all the information below as needed:

------

{content}"#
        )
    }

    /// Reviewer prompt: draft in, critique out
    pub fn review() -> String {
        r#"You are a senior editor grading a report submission.
Generate critique and recommendations for the submission.
Provide detailed recommendations, including requests for length, depth, style,
missing evidence and factual accuracy."#
            .to_string()
    }

    /// Query writer for the revision pass
    pub fn research_critique() -> String {
        r#"You are a researcher charged with providing information that can be used
when making any requested revisions (as outlined below).
Generate a list of search queries that will gather any relevant information.
Only generate 3 queries max."#
            .to_string()
    }

    /// Editor prompt for the accept/continue decision
    pub fn editor() -> String {
        r#"You are an editor deciding whether a report is ready to publish.
You are given the reviewer's latest critique and the research gathered so far.
Answer with state = true if the critique only asks for minor changes and the report
can be finalized, or state = false if another revision is needed."#
            .to_string()
    }
}

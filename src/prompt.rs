//! Prompt assembly for agent invocations.
//!
//! The prompt is a pure function of the backlog, the learnings log, and
//! the fixed behavioral rules - no I/O here. The agent, not the
//! controller, picks which pending story to address: the prompt states a
//! preference for the lowest priority value but grants explicit license
//! to pick a different one if that unblocks progress. The controller only
//! validates afterward that exactly one eligible story changed.

use crate::config::RunConfig;
use crate::ledger::Ledger;

/// Build the full prompt for one agent invocation.
#[must_use]
pub fn build_prompt(ledger: &Ledger, ledger_text: &str, log_text: &str, config: &RunConfig) -> String {
    let mut pending = String::new();
    for story in ledger.pending_stories() {
        pending.push_str(&format!(
            "- {} (priority {}): {}\n",
            story.id, story.priority, story.title
        ));
        for criterion in &story.acceptance_criteria {
            pending.push_str(&format!("    - {criterion}\n"));
        }
    }

    let log_section = if log_text.is_empty() {
        "(no learnings recorded yet)"
    } else {
        log_text
    };

    format!(
        "You are executing ONE atomic user story from the backlog below.\n\
         \n\
         Pending stories (prefer the lowest priority value, but you may pick\n\
         a different pending story if that unblocks progress):\n\
         {pending}\n\
         Rules:\n\
         - Implement exactly ONE pending story, nothing more\n\
         - Do NOT refactor unrelated code\n\
         - Do NOT touch other stories in {ledger_path}\n\
         - In {ledger_path} you may only set the chosen story's \"passes\" to true\n\
           and/or add to its \"notes\"; every other byte must stay identical\n\
         - You MAY append factual notes to {log_path}\n\
         - You MUST NOT edit or delete existing content in {log_path}\n\
         - When the story is complete, output a line containing exactly: {sentinel}\n\
         \n\
         --- FULL BACKLOG ({ledger_path}) ---\n\
         {ledger_text}\n\
         \n\
         --- EXISTING LEARNINGS ({log_path}, READ-ONLY) ---\n\
         {log_section}\n",
        ledger_path = config.ledger_path.display(),
        log_path = config.log_path.display(),
        sentinel = config.done_sentinel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Story;

    fn sample() -> (Ledger, String) {
        let ledger = Ledger {
            branch_name: "feature/run".into(),
            user_stories: vec![
                Story {
                    id: "US-001".into(),
                    title: "Add login".into(),
                    description: "Users can log in".into(),
                    priority: 1,
                    acceptance_criteria: vec!["login form exists".into()],
                    passes: None,
                    notes: None,
                },
                Story {
                    id: "US-002".into(),
                    title: "Add logout".into(),
                    description: "Users can log out".into(),
                    priority: 2,
                    acceptance_criteria: vec![],
                    passes: Some(true),
                    notes: None,
                },
            ],
        };
        let text = serde_json::to_string_pretty(&ledger).unwrap();
        (ledger, text)
    }

    #[test]
    fn test_prompt_lists_only_pending_stories() {
        let (ledger, text) = sample();
        let prompt = build_prompt(&ledger, &text, "", &RunConfig::default());
        assert!(prompt.contains("US-001 (priority 1): Add login"));
        assert!(!prompt.contains("US-002 (priority 2)"));
    }

    #[test]
    fn test_prompt_carries_full_backlog_and_log() {
        let (ledger, text) = sample();
        let prompt = build_prompt(&ledger, &text, "Learning A\n", &RunConfig::default());
        assert!(prompt.contains(&text));
        assert!(prompt.contains("Learning A"));
    }

    #[test]
    fn test_prompt_states_sentinel_and_rules() {
        let (ledger, text) = sample();
        let prompt = build_prompt(&ledger, &text, "", &RunConfig::default());
        assert!(prompt.contains("exactly: DONE"));
        assert!(prompt.contains("MUST NOT edit or delete"));
        assert!(prompt.contains("backlog.json"));
        assert!(prompt.contains("learnings.md"));
    }

    #[test]
    fn test_prompt_includes_acceptance_criteria() {
        let (ledger, text) = sample();
        let prompt = build_prompt(&ledger, &text, "", &RunConfig::default());
        assert!(prompt.contains("login form exists"));
    }

    #[test]
    fn test_empty_log_placeholder() {
        let (ledger, text) = sample();
        let prompt = build_prompt(&ledger, &text, "", &RunConfig::default());
        assert!(prompt.contains("(no learnings recorded yet)"));
    }
}

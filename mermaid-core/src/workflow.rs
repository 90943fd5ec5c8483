//! Workflow diagram templates.
//!
//! One template per [`WorkflowFormat`]; the steps come from the
//! [`WorkflowType`].

use std::fmt::Write;

use crate::diagram::{WorkflowFormat, WorkflowType};

/// Steps and the single decision point of a workflow.
struct Playbook {
    /// Actor driving the workflow (sequence diagrams).
    actor: &'static str,
    /// System the actor talks to (sequence diagrams).
    system: &'static str,
    /// Ordered steps.
    steps: [&'static str; 6],
    /// Question asked after `decision_after`.
    decision: &'static str,
    /// Index of the step that precedes the decision.
    decision_after: usize,
    /// Step index to return to when the decision fails.
    retry_from: usize,
    /// What happens on the failing branch.
    on_failure: &'static str,
}

const fn playbook(kind: WorkflowType) -> Playbook {
    match kind {
        WorkflowType::Git => Playbook {
            actor: "Developer",
            system: "Repository",
            steps: [
                "Create feature branch",
                "Commit changes",
                "Push to remote",
                "Open pull request",
                "Code review",
                "Merge to main",
            ],
            decision: "Review approved?",
            decision_after: 4,
            retry_from: 1,
            on_failure: "Address feedback",
        },
        WorkflowType::Cicd => Playbook {
            actor: "Developer",
            system: "Pipeline",
            steps: [
                "Push commit",
                "Build",
                "Run tests",
                "Security scan",
                "Deploy to staging",
                "Deploy to production",
            ],
            decision: "Tests passed?",
            decision_after: 2,
            retry_from: 0,
            on_failure: "Fix failing build",
        },
        WorkflowType::Business => Playbook {
            actor: "Requester",
            system: "Approver",
            steps: [
                "Submit request",
                "Initial review",
                "Manager approval",
                "Process request",
                "Notify requester",
                "Close request",
            ],
            decision: "Approved?",
            decision_after: 2,
            retry_from: 0,
            on_failure: "Request changes",
        },
        WorkflowType::Development => Playbook {
            actor: "Team",
            system: "Codebase",
            steps: [
                "Gather requirements",
                "Design",
                "Implement",
                "Write tests",
                "Code review",
                "Release",
            ],
            decision: "Tests pass?",
            decision_after: 3,
            retry_from: 2,
            on_failure: "Fix defects",
        },
        WorkflowType::Deployment => Playbook {
            actor: "Operator",
            system: "Cluster",
            steps: [
                "Prepare release",
                "Provision infrastructure",
                "Deploy artifacts",
                "Run smoke tests",
                "Switch traffic",
                "Monitor",
            ],
            decision: "Healthy?",
            decision_after: 3,
            retry_from: 2,
            on_failure: "Rollback",
        },
    }
}

/// Build a workflow diagram.
#[must_use]
pub fn build(
    description: &str,
    kind: WorkflowType,
    include_decisions: bool,
    format: WorkflowFormat,
) -> String {
    let book = playbook(kind);
    let title = sanitize_label(description);
    match format {
        WorkflowFormat::Flowchart => flowchart(&book, &title, include_decisions),
        WorkflowFormat::Sequence => sequence(&book, &title, include_decisions),
        WorkflowFormat::State => state(&book, &title, include_decisions),
        WorkflowFormat::Gantt => gantt(&book, &title, kind, include_decisions),
    }
}

fn flowchart(book: &Playbook, title: &str, decisions: bool) -> String {
    let mut out = format!("flowchart TD\n    %% {title}\n    Start([Start])\n");
    // Left-hand side of the next edge, e.g. `S3 -->` or `D1 -->|Yes|`.
    let mut link = "Start -->".to_string();
    for (idx, step) in book.steps.iter().enumerate() {
        let id = format!("S{}", idx + 1);
        let _ = writeln!(out, "    {link} {id}[{step}]");
        link = format!("{id} -->");
        if decisions && idx == book.decision_after {
            let _ = writeln!(out, "    {id} --> D1{{{}}}", book.decision);
            let _ = writeln!(out, "    D1 -->|No| F1[{}]", book.on_failure);
            let _ = writeln!(out, "    F1 --> S{}", book.retry_from + 1);
            link = "D1 -->|Yes|".to_string();
        }
    }
    let _ = writeln!(out, "    {link} Done([Done])");
    out
}

fn sequence(book: &Playbook, title: &str, decisions: bool) -> String {
    let (actor, system) = (book.actor, book.system);
    let mut out = format!(
        "sequenceDiagram\n    title {title}\n    participant {actor}\n    participant {system}\n"
    );
    for (idx, step) in book.steps.iter().enumerate() {
        let _ = writeln!(out, "    {actor}->>{system}: {step}");
        if decisions && idx == book.decision_after {
            let _ = writeln!(out, "    alt {}", book.decision);
            let _ = writeln!(out, "        {system}-->>{actor}: Continue");
            out.push_str("    else\n");
            let _ = writeln!(out, "        {system}-->>{actor}: {}", book.on_failure);
            out.push_str("    end\n");
        }
    }
    let _ = writeln!(out, "    {system}-->>{actor}: Complete");
    out
}

fn state(book: &Playbook, title: &str, decisions: bool) -> String {
    let ids: Vec<String> = book.steps.iter().map(|s| state_id(s)).collect();
    let mut out = format!("stateDiagram-v2\n    %% {title}\n");
    for (id, step) in ids.iter().zip(book.steps) {
        let _ = writeln!(out, "    {id} : {step}");
    }
    let _ = writeln!(out, "    [*] --> {}", ids[0]);
    for idx in 0..ids.len() - 1 {
        if decisions && idx == book.decision_after {
            let _ = writeln!(out, "    state Decision <<choice>>");
            let _ = writeln!(out, "    {} --> Decision", ids[idx]);
            let _ = writeln!(out, "    Decision --> {} : yes", ids[idx + 1]);
            let _ = writeln!(
                out,
                "    Decision --> {} : no, {}",
                ids[book.retry_from],
                book.on_failure.to_lowercase()
            );
        } else {
            let _ = writeln!(out, "    {} --> {}", ids[idx], ids[idx + 1]);
        }
    }
    let _ = writeln!(out, "    {} --> [*]", ids[ids.len() - 1]);
    out
}

fn gantt(book: &Playbook, title: &str, kind: WorkflowType, decisions: bool) -> String {
    let mut out = format!(
        "gantt\n    title {title}\n    dateFormat YYYY-MM-DD\n    axisFormat %m-%d\n    section {}\n",
        kind.as_str()
    );
    for (idx, step) in book.steps.iter().enumerate() {
        let id = format!("t{}", idx + 1);
        if idx == 0 {
            let _ = writeln!(out, "    {step} :{id}, 2024-01-01, 2d");
        } else {
            let _ = writeln!(out, "    {step} :{id}, after t{idx}, 2d");
        }
        if decisions && idx == book.decision_after {
            let _ = writeln!(
                out,
                "    {} :milestone, m1, after {id}, 0d",
                book.decision.trim_end_matches('?')
            );
        }
    }
    out
}

fn state_id(step: &str) -> String {
    step.split_whitespace()
        .map(|word| {
            let mut chars = word.chars().filter(|c| c.is_alphanumeric());
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Make free text safe inside a Mermaid label or comment.
#[must_use]
pub fn sanitize_label(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '"' | '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>' | '|' | ';' | '#' | '\n'
            | '\r' => ' ',
            c => c,
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut label: String = collapsed.chars().take(60).collect();
    if label.is_empty() {
        label.push_str("Workflow");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gantt_has_date_format() {
        let out = build("x", WorkflowType::Cicd, true, WorkflowFormat::Gantt);
        assert!(out.starts_with("gantt"));
        assert!(out.contains("dateFormat"));
        assert!(out.contains("Run tests :t3, after t2, 2d"));
        assert!(out.contains(":milestone"));
    }

    #[test]
    fn test_flowchart_decision_branch() {
        let out = build("Ship it", WorkflowType::Git, true, WorkflowFormat::Flowchart);
        assert!(out.starts_with("flowchart TD"));
        assert!(out.contains("D1{Review approved?}"));
        assert!(out.contains("D1 -->|No| F1[Address feedback]"));
        assert!(out.contains("D1 -->|Yes| S6[Merge to main]"));
        assert!(out.contains("S6 --> Done([Done])"));
        assert!(!out.lines().any(|l| l.trim_start().starts_with("-->")));
    }

    #[test]
    fn test_flowchart_without_decisions() {
        let out = build("Ship it", WorkflowType::Git, false, WorkflowFormat::Flowchart);
        assert!(!out.contains("D1"));
        assert!(out.contains("S5[Code review]\n    S5 --> S6[Merge to main]"));
    }

    #[test]
    fn test_sequence_uses_actors() {
        let out = build("Release", WorkflowType::Deployment, true, WorkflowFormat::Sequence);
        assert!(out.contains("participant Operator"));
        assert!(out.contains("alt Healthy?"));
        assert!(out.contains("Cluster-->>Operator: Rollback"));
    }

    #[test]
    fn test_state_choice() {
        let out = build("Loop", WorkflowType::Development, true, WorkflowFormat::State);
        assert!(out.starts_with("stateDiagram-v2"));
        assert!(out.contains("state Decision <<choice>>"));
        assert!(out.contains("[*] --> GatherRequirements"));
        assert!(out.contains("Release --> [*]"));
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("a [b]\n(c)"), "a b c");
        assert_eq!(sanitize_label("   "), "Workflow");
    }
}

// Prompt templates for LLM interactions
//
// This module contains all prompt templates used by the crew.
// Prompts are versioned so a changed wording is visible in logs.

use std::collections::HashMap;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: &'static str,
    pub template: &'static str,
}

impl PromptTemplate {
    /// Name and version, as shown in logs
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Render the template, replacing each `{{key}}` with its value
    ///
    /// Placeholders without a value are left as they are.
    pub fn render(&self, variables: &HashMap<&str, &str>) -> String {
        tracing::debug!(prompt = %self.id(), "Rendering prompt");

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match variables.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn agent_system() -> PromptTemplate {
        PromptTemplate {
            name: "agent_system",
            version: "1.0.0",
            template: "You are {{role}}. {{backstory}}\n\
                       Your personal goal is: {{goal}}\n\
                       Keep your answer short and concrete.",
        }
    }

    pub fn task() -> PromptTemplate {
        PromptTemplate {
            name: "task",
            version: "1.0.0",
            template: "Current Task: {{description}}\n\n\
                       This is the expected criteria for your final answer: {{expected_output}}\n\
                       You MUST return the actual complete content as the final answer, not a summary.\
                       {{context}}\n\n\
                       Begin! Use the tools available if they help, then give your best final answer.",
        }
    }

    pub fn context_section() -> PromptTemplate {
        PromptTemplate {
            name: "context_section",
            version: "1.0.0",
            template: "\n\nThis is the context you're working with:\n{{context}}",
        }
    }

    pub fn force_final_answer() -> PromptTemplate {
        PromptTemplate {
            name: "force_final_answer",
            version: "1.0.0",
            template: "Now it's time you MUST give your absolute best final answer. \
                       Stop using tools and return your final answer for: {{expected_output}}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn render_substitutes_variables() {
        let rendered = library::agent_system().render(&vars(&[
            ("role", "Researcher"),
            ("backstory", "Market analyst."),
            ("goal", "Find 2 competitors for AI travel"),
        ]));

        assert!(rendered.starts_with("You are Researcher. Market analyst.\n"));
        assert!(rendered.contains("Your personal goal is: Find 2 competitors for AI travel"));
    }

    #[test]
    fn id_carries_name_and_version() {
        assert_eq!(library::task().id(), "task@1.0.0");
        assert_eq!(library::force_final_answer().id(), "force_final_answer@1.0.0");
    }

    #[test]
    fn render_keeps_unknown_placeholders() {
        let template = PromptTemplate {
            name: "t",
            version: "0",
            template: "a {{known}} b {{unknown}} c",
        };

        assert_eq!(
            template.render(&vars(&[("known", "1")])),
            "a 1 b {{unknown}} c"
        );
    }

    #[test]
    fn render_does_not_rescan_substituted_values() {
        let template = PromptTemplate {
            name: "t",
            version: "0",
            template: "idea: {{idea}}!",
        };

        assert_eq!(
            template.render(&vars(&[("idea", "{{idea}} loops")])),
            "idea: {{idea}} loops!"
        );
    }

    #[test]
    fn render_tolerates_unclosed_braces() {
        let template = PromptTemplate {
            name: "t",
            version: "0",
            template: "open {{ never closed",
        };

        assert_eq!(template.render(&HashMap::new()), "open {{ never closed");
    }

    #[test]
    fn empty_context_leaves_no_gap_marker() {
        let rendered = library::task().render(&vars(&[
            ("description", "Identify 2 competitors for X."),
            ("expected_output", "A bulleted list of 2 competitors."),
            ("context", ""),
        ]));

        assert!(!rendered.contains("{{"));
        assert!(!rendered.contains("context you're working with"));
    }
}

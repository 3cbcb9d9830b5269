//! Prompt text for each kind of agent request.
//!
//! The agent is steered entirely through natural language, so this wording
//! is load-bearing: the closing sentence of the extraction request is what
//! keeps validation out of the first round trip.

use mandate_core::rule::Rule;

/// The extraction request sent right after a guideline document upload.
pub fn extraction_request(filename: &str) -> String {
  format!(
    "Extract all compliance rules from the uploaded investment guidelines \
     document: {filename}. Only extract rules with confidence scores and \
     source traceability. Do not validate against portfolio yet."
  )
}

/// The validation request sent once a reviewer approves an extracted rule
/// set.
pub fn validation_request(rules: &[Rule]) -> String {
  format!(
    "Validate these compliance rules against our portfolio holdings: {}. \
     Provide detailed compliance score and breach analysis for all funds.",
    rule_descriptions(rules)
  )
}

/// Rules serialized as `Name: threshold` fragments joined by `; `.
pub fn rule_descriptions(rules: &[Rule]) -> String {
  rules
    .iter()
    .map(|r| format!("{}: {}", r.name, r.threshold))
    .collect::<Vec<_>>()
    .join("; ")
}

#[cfg(test)]
mod tests {
  use mandate_core::rule::RuleCategory;

  use super::*;

  fn rules() -> Vec<Rule> {
    vec![
      Rule::new("R01", "Cash limit", RuleCategory::Limit, "≤10%", 95),
      Rule::new("R02", "Rating floor", RuleCategory::Requirement, "BBB-", 88),
    ]
  }

  #[test]
  fn extraction_request_names_the_file_and_defers_validation() {
    let prompt = extraction_request("guidelines_2025.pdf");
    assert!(prompt.contains("guidelines_2025.pdf"));
    assert!(prompt.ends_with("Do not validate against portfolio yet."));
  }

  #[test]
  fn validation_request_embeds_rule_descriptions() {
    let prompt = validation_request(&rules());
    assert!(prompt.contains("Cash limit: ≤10%; Rating floor: BBB-"));
    assert!(prompt.starts_with("Validate these compliance rules"));
  }

  #[test]
  fn rule_descriptions_of_nothing_is_empty() {
    assert_eq!(rule_descriptions(&[]), "");
  }
}

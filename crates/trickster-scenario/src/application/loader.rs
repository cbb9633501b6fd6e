//! Scenario loading from YAML.

use std::path::Path;

use tracing::info;
use trickster_core::error::DomainError;

use crate::domain::scenario::Scenario;

const BUILTIN_SCENARIO: &str = include_str!("../../scenarios/mawei.yaml");

/// Parses and validates a scenario from YAML text.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the YAML does not describe a
/// scenario or the scenario fails validation.
pub fn parse(yaml: &str) -> Result<Scenario, DomainError> {
    let scenario: Scenario = serde_yaml::from_str(yaml)
        .map_err(|e| DomainError::Validation(format!("scenario parse failed: {e}")))?;
    scenario.validate()?;
    Ok(scenario)
}

/// Returns the built-in scenario.
///
/// # Errors
///
/// Returns `DomainError::Validation` only if the embedded file is broken.
pub fn builtin() -> Result<Scenario, DomainError> {
    parse(BUILTIN_SCENARIO)
}

/// Reads a scenario file from disk.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read and
/// `DomainError::Validation` if its contents are not a valid scenario.
pub fn load_from_path(path: &Path) -> Result<Scenario, DomainError> {
    let yaml = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read scenario {}: {e}", path.display()))
    })?;
    let scenario = parse(&yaml)?;
    info!(title = %scenario.title, path = %path.display(), "loaded scenario");
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenario_parses() {
        let scenario = builtin().unwrap();
        assert_eq!(scenario.title, "马嵬坡");
        assert_eq!(scenario.cast.player, "高力士");
        assert_eq!(scenario.cast.npc, "杨玉环");
        assert!(scenario.prompts.judge.contains("{utterance}"));
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        let result = parse("title: [unterminated");
        assert!(matches!(
            result,
            Err(DomainError::Validation(msg)) if msg.starts_with("scenario parse failed")
        ));
    }

    #[test]
    fn test_load_from_missing_path_is_infrastructure_error() {
        let result = load_from_path(Path::new("/nonexistent/scenario.yaml"));
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}

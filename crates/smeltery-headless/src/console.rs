//! Line-oriented commands read from stdin while the economy runs.
//!
//! ```text
//! upgrade <resource>   request an upgrade, same replies as the request layer
//! dashboard            print the dashboard as JSON
//! save                 run the save hook now
//! quit                 save and exit
//! ```

use smeltery_core::api::{self, UpgradeRequest};
use smeltery_core::{Economy, SaveHook};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upgrade(String),
    Dashboard,
    Save,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: upgrade <resource>")]
    MissingResource,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let command = match verb.to_ascii_lowercase().as_str() {
            "upgrade" => Command::Upgrade(
                words
                    .next()
                    .ok_or(CommandError::MissingResource)?
                    .to_string(),
            ),
            "dashboard" => Command::Dashboard,
            "save" => Command::Save,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Run a non-terminal command and return the text to print.
///
/// `Quit` is handled by the caller and returns an empty reply here.
pub fn execute(economy: &Economy, hook: &mut dyn SaveHook, command: &Command) -> String {
    match command {
        Command::Upgrade(resource) => {
            let request = UpgradeRequest {
                resource: resource.clone(),
            };
            match api::handle_upgrade(economy, &request) {
                Ok(reply) => reply.message,
                Err(rejection) => rejection.message,
            }
        }
        Command::Dashboard => {
            let dashboard = api::handle_dashboard(economy);
            serde_json::to_string_pretty(&dashboard)
                .unwrap_or_else(|e| format!("could not encode dashboard: {e}"))
        }
        Command::Save => match economy.save_state(hook) {
            Ok(_) => "saved".to_string(),
            Err(e) => format!("save failed: {e}"),
        },
        Command::Quit => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smeltery_core::test_utils::{fast_economy, rich};
    use smeltery_core::{EconomySnapshot, ResourceMap, SaveError};

    fn discard() -> impl FnMut(&EconomySnapshot) -> Result<(), SaveError> {
        |_: &EconomySnapshot| Ok(())
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::parse("upgrade Iron").unwrap(),
            Some(Command::Upgrade("Iron".to_string()))
        );
        assert_eq!(Command::parse("  DASHBOARD ").unwrap(), Some(Command::Dashboard));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Command::parse("upgrade"), Err(CommandError::MissingResource));
        assert_eq!(
            Command::parse("smelt iron"),
            Err(CommandError::Unknown("smelt".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn upgrade_replies_like_the_request_layer() {
        let economy = fast_economy(rich());
        let mut hook = discard();

        let ok = execute(&economy, &mut hook, &Command::Upgrade("gold".into()));
        assert_eq!(ok, "Successfully upgraded gold");

        let bad = execute(&economy, &mut hook, &Command::Upgrade("dragon".into()));
        assert_eq!(bad, "enum is not valid");

        let busy = execute(&economy, &mut hook, &Command::Upgrade("gold".into()));
        assert_eq!(busy, "upgrade already in progress for gold");
    }

    #[test]
    fn dashboard_is_json() {
        let economy = fast_economy(ResourceMap::new(1, 2, 3));
        let text = execute(&economy, &mut discard(), &Command::Dashboard);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["resources"]["copper"], 2);
    }

    #[test]
    fn save_runs_the_hook() {
        let economy = fast_economy(ResourceMap::new(4, 5, 6));
        let mut seen = Vec::new();
        let mut hook = |s: &EconomySnapshot| -> Result<(), SaveError> {
            seen.push(s.balances);
            Ok(())
        };
        assert_eq!(execute(&economy, &mut hook, &Command::Save), "saved");
        assert_eq!(seen, vec![ResourceMap::new(4, 5, 6)]);
    }
}

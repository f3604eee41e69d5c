use crate::core::config::data::Config;

fn masked(secret: &str) -> String {
    let visible: String = secret.chars().take(6).collect();
    if secret.chars().count() <= 6 {
        return "*".repeat(secret.chars().count());
    }
    format!("{visible}…")
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.api_key {
            Some(key) => println!("  api-key: {}", masked(key)),
            None => println!("  api-key: (unset)"),
        }
        match &self.workspace_id {
            Some(workspace) => println!("  workspace-id: {workspace}"),
            None => println!("  workspace-id: (unset)"),
        }
        match &self.default_assistant {
            Some(assistant) => println!("  default-assistant: {assistant}"),
            None => println!("  default-assistant: (unset)"),
        }
        match self.dev.unwrap_or(false) {
            true => println!("  dev: on"),
            false => println!("  dev: off"),
        }
        match self.request_timeout_secs {
            Some(secs) => println!("  request-timeout: {secs}s"),
            None => println!("  request-timeout: (default)"),
        }
        match self.stream_timeout_secs {
            Some(secs) => println!("  stream-timeout: {secs}s"),
            None => println!("  stream-timeout: (default)"),
        }
    }
}

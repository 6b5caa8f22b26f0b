use super::{ClassifierBackend, Config};

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = first_env(&["CALMLINE_API_KEY", "MISTRAL_API_KEY"]) {
            self.api_key = Some(key);
        }

        if let Some(model) = first_env(&["CALMLINE_MODEL", "MISTRAL_MODEL"]) {
            self.model = Some(model);
        }

        if let Some(host) = first_env(&["CALMLINE_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(port_str) = first_env(&["CALMLINE_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(backend) = first_env(&["CALMLINE_CLASSIFIER"]) {
            match backend.parse::<ClassifierBackend>() {
                Ok(backend) => self.classifier.backend = backend,
                Err(error) => tracing::warn!(%error, "ignoring CALMLINE_CLASSIFIER"),
            }
        }

        if let Some(token) = first_env(&["HF_API_TOKEN"]) {
            self.classifier.api_token = Some(token);
        }

        if let Some(turns_str) = first_env(&["CALMLINE_MAX_TURNS"])
            && let Ok(turns) = turns_str.parse::<usize>()
        {
            self.history.max_turns = Some(turns);
        }

        if let Some(sessions_str) = first_env(&["CALMLINE_MAX_SESSIONS"])
            && let Ok(sessions) = sessions_str.parse::<usize>()
        {
            self.history.max_sessions = sessions;
        }

        if let Some(level) = first_env(&["CALMLINE_LOG"]) {
            self.log_level = level.to_ascii_lowercase();
        }
    }
}

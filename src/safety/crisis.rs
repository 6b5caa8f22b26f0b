use crate::config::SafetyConfig;

/// Phrases that divert a message away from the model entirely.
///
/// Matching is a lowercase substring test against the raw input, so a
/// phrase inside a benign sentence still trips the filter.
pub const CRISIS_KEYWORDS: [&str; 10] = [
    "kill myself",
    "suicide",
    "end my life",
    "hurt others",
    "no reason live",
    "want to die",
    "kill everyone",
    "ending the world",
    "i will kill",
    "i hate my life",
];

/// Static keyword guard run before any classifier or upstream call.
#[derive(Debug, Clone)]
pub struct CrisisFilter {
    keywords: Vec<String>,
    safe_reply: String,
}

impl CrisisFilter {
    /// Built-in keywords plus `extra`, all lowercased. Blank extras are dropped.
    pub fn new<I, S>(extra: I, safe_reply: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = CRISIS_KEYWORDS.iter().map(|k| (*k).to_string()).collect();
        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Self {
            keywords,
            safe_reply: safe_reply.into(),
        }
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(&config.extra_keywords, config.safe_reply.clone())
    }

    /// First keyword contained in `input`, if any.
    pub fn matched_keyword(&self, input: &str) -> Option<&str> {
        let lowered = input.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn is_crisis(&self, input: &str) -> bool {
        self.matched_keyword(input).is_some()
    }

    pub fn safe_reply(&self) -> &str {
        &self.safe_reply
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for CrisisFilter {
    fn default() -> Self {
        Self::from_config(&SafetyConfig::default())
    }
}

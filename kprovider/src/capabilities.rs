//! Name-based model capability detection.
//!
//! ```rust
//! use kprovider::CapabilityDetector;
//!
//! let detector = CapabilityDetector::default();
//! let caps = detector.detect("LLaVA:7b");
//! assert!(caps.vision && caps.multimodal && caps.streaming);
//! assert!(!caps.tools);
//! ```

/// Feature flags derived from a model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    pub vision: bool,
    pub tools: bool,
    pub multimodal: bool,
    pub streaming: bool,
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self {
            vision: false,
            tools: false,
            multimodal: false,
            streaming: true,
        }
    }
}

pub const DEFAULT_VISION_KEYWORDS: &[&str] =
    &["vision", "llava", "bakllava", "moondream", "minicpm-v"];

pub const DEFAULT_TOOL_KEYWORDS: &[&str] = &[
    "functionary",
    "hermes",
    "mistral",
    "mixtral",
    "codellama",
    "llama3",
    "qwen",
];

/// Matches model names against two keyword tables, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDetector {
    vision_keywords: Vec<String>,
    tool_keywords: Vec<String>,
}

impl Default for CapabilityDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_VISION_KEYWORDS.iter().copied(),
            DEFAULT_TOOL_KEYWORDS.iter().copied(),
        )
    }
}

impl CapabilityDetector {
    pub fn new<V, T, S>(vision_keywords: V, tool_keywords: T) -> Self
    where
        V: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vision_keywords: normalize(vision_keywords),
            tool_keywords: normalize(tool_keywords),
        }
    }

    pub fn with_tool_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.tool_keywords.push(keyword.into().to_lowercase());
        self
    }

    pub fn with_vision_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.vision_keywords.push(keyword.into().to_lowercase());
        self
    }

    pub fn detect(&self, model_name: &str) -> CapabilitySet {
        let name = model_name.to_lowercase();
        let vision = matches_any(&name, &self.vision_keywords);
        let tools = matches_any(&name, &self.tool_keywords);

        CapabilitySet {
            vision,
            tools,
            multimodal: vision,
            streaming: true,
        }
    }
}

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keywords
        .into_iter()
        .map(|keyword| keyword.into().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

fn matches_any(name: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| name.contains(keyword.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vision_keyword_enables_vision_and_multimodal() {
        let detector = CapabilityDetector::default();
        for keyword in DEFAULT_VISION_KEYWORDS {
            let upper = format!("Org/{}-Latest", keyword.to_uppercase());
            let caps = detector.detect(&upper);
            assert!(caps.vision, "{upper} should have vision");
            assert!(caps.multimodal, "{upper} should be multimodal");
            assert!(caps.streaming);
        }
    }

    #[test]
    fn tool_keywords_enable_tools_only() {
        let detector = CapabilityDetector::default();
        for name in ["llama3.1:8b", "codellama:13b", "mistral:7b", "Qwen2.5", "nous-hermes2"] {
            let caps = detector.detect(name);
            assert!(caps.tools, "{name} should support tools");
            assert!(!caps.vision, "{name} should not have vision");
        }
    }

    #[test]
    fn unrecognized_name_only_streams() {
        let caps = CapabilityDetector::default().detect("tinyllama:1b");
        assert_eq!(caps, CapabilitySet::default());
    }

    #[test]
    fn multiple_keyword_hits_use_union_semantics() {
        let caps = CapabilityDetector::default().detect("llava-llama3-vision");
        assert!(caps.vision);
        assert!(caps.tools);
    }

    #[test]
    fn injected_tables_replace_defaults() {
        let detector = CapabilityDetector::new(["eyes"], ["phi"]).with_tool_keyword("Gemma");
        assert!(detector.detect("phi3:mini").tools);
        assert!(detector.detect("gemma2:9b").tools);
        assert!(detector.detect("big-EYES").vision);
        assert!(!detector.detect("llava:7b").vision);
    }
}

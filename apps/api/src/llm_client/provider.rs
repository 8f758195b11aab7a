use serde::{Serialize, Serializer};

/// The model dropdown. Each choice maps to exactly one vendor provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModelChoice {
    #[default]
    OpenAi,
    Claude,
    Gemini,
}

impl ModelChoice {
    /// The label shown in the model dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::OpenAi => "Open AI",
            ModelChoice::Claude => "Claude AI",
            ModelChoice::Gemini => "Gemini AI",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ModelChoice::OpenAi => "openai",
            ModelChoice::Claude => "claude",
            ModelChoice::Gemini => "gemini",
        }
    }

    /// Resolves a dropdown label or short id, ignoring case and surrounding
    /// whitespace. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(name) || c.id().eq_ignore_ascii_case(name))
    }

    pub fn all() -> [ModelChoice; 3] {
        [ModelChoice::OpenAi, ModelChoice::Claude, ModelChoice::Gemini]
    }
}

impl Serialize for ModelChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

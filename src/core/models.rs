use serde::{Deserialize, Serialize};

/// One summarized point of a sermon, in narrative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPoint {
    pub heading: String,
    pub explanation: String,
}

/// Structured summary of a single transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SermonSection {
    pub title: String,
    #[serde(alias = "summary")]
    pub points: Vec<SummaryPoint>,
    /// Quote picked for the poster. Its length is only a hint to the generator.
    #[serde(
        default,
        alias = "bestQuote",
        alias = "quote",
        skip_serializing_if = "Option::is_none"
    )]
    pub highlight_quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub title: String,
    pub text: String,
}

/// The structured result of summarizing the two sermon transcripts.
///
/// Produced only by a successful summarization call and replaced wholesale on
/// the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub impactful_title: String,
    #[serde(alias = "khutbah1")]
    pub section_a: SermonSection,
    #[serde(alias = "khutbah2")]
    pub section_b: SermonSection,
    #[serde(alias = "overallSummary")]
    pub overall: OverallSummary,
}

impl SummaryRecord {
    /// Checks the invariants serde cannot express: both sections carry points.
    ///
    /// # Errors
    ///
    /// Returns the name of the offending section.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.section_a.points.is_empty() {
            return Err("sectionA.points is empty".to_string());
        }
        if self.section_b.points.is_empty() {
            return Err("sectionB.points is empty".to_string());
        }
        Ok(())
    }

    /// Both sections in display order, paired with their kind.
    #[must_use]
    pub fn sections(&self) -> [(SectionKind, &SermonSection); 2] {
        [
            (SectionKind::Religious, &self.section_a),
            (SectionKind::Political, &self.section_b),
        ]
    }
}

/// Which sermon a section summarizes. The first sermon is religious/ethical,
/// the second political/social.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Religious,
    Political,
}

impl SectionKind {
    /// Label prefix used in headings ("first sermon" / "second sermon").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Religious => "خطبه اول",
            Self::Political => "خطبه دوم",
        }
    }

    /// Stable ASCII slug used in file names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Religious => "religious",
            Self::Political => "political",
        }
    }
}

/// Body accepted by the summarization endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(alias = "khutbah1Text")]
    pub text_a: String,
    #[serde(alias = "khutbah2Text")]
    pub text_b: String,
}

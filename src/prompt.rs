use crate::markup::extract_tag;

pub const DEFAULT_HEADLINE: &str = "<h1>Headline</h1>";
pub const DEFAULT_SUBHEADLINE: &str = "<p>Subheadline</p>";
pub const DEFAULT_HEADLINE_TAG: &str = "h1";
pub const DEFAULT_SUBHEADLINE_TAG: &str = "p";

pub const COPYWRITER_SYSTEM: &str =
    "You are an expert copywriter specializing in e-commerce headlines and subheadlines.";

/// The headline/subheadline fragments currently on the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalHeadline {
    pub headline: Option<String>,
    pub subheadline: Option<String>,
}

impl OriginalHeadline {
    pub fn new(headline: impl Into<String>, subheadline: impl Into<String>) -> Self {
        Self {
            headline: Some(headline.into()),
            subheadline: Some(subheadline.into()),
        }
    }

    pub fn headline(&self) -> &str {
        self.headline.as_deref().unwrap_or(DEFAULT_HEADLINE)
    }

    pub fn subheadline(&self) -> &str {
        self.subheadline.as_deref().unwrap_or(DEFAULT_SUBHEADLINE)
    }

    pub fn headline_tag(&self) -> &str {
        extract_tag(self.headline(), DEFAULT_HEADLINE_TAG)
    }

    pub fn subheadline_tag(&self) -> &str {
        extract_tag(self.subheadline(), DEFAULT_SUBHEADLINE_TAG)
    }
}

/// Builds the copywriting instruction sent as the user message.
pub fn build_prompt(description: &str, insights: &[String], original: &OriginalHeadline) -> String {
    let insights = insights.join(", ");
    let headline_tag = original.headline_tag();
    let subheadline_tag = original.subheadline_tag();

    let mut result = String::with_capacity(description.len() + insights.len() + 900);
    result.push_str("You are an expert copywriter for an e-commerce landing page. Based on the following information, generate a personalized headline and subheadline:\n");
    result.push_str(&format!("IMAGE DESCRIPTION: {}\n", description));
    result.push_str(&format!("MARKETING INSIGHTS: {}\n", insights));
    result.push_str("ORIGINAL STRUCTURE:\n");
    result.push_str(&format!("- Headline: {}\n", original.headline()));
    result.push_str(&format!("- Subheadline: {}\n", original.subheadline()));
    result.push_str("Requirements:\n");
    result.push_str(&format!(
        "1. Match the HTML structure (use <{}> and <{}> tags)\n",
        headline_tag, subheadline_tag
    ));
    result.push_str("2. Keep similar length and style as the original\n");
    result.push_str("3. Incorporate themes from the image description\n");
    result.push_str("4. Address pain points and benefits from marketing insights\n");
    result.push_str("5. Make it engaging and conversion-focused\n");
    result.push_str("Return ONLY the JSON with \"headline\" and \"subheadline\" keys containing the HTML:\n");
    result
}

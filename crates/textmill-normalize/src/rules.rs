//! The fixed cleanup rule table

use regex::Regex;

/// Identifies one cleanup rule, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// International phone numbers such as `+1 (555) 123-4567`
    PhoneNumbers,
    /// Email addresses
    EmailAddresses,
    /// Horizontal rules drawn with underscores
    UnderscoreRules,
    /// Bare `http(s)://` and `www.` links
    BareUrls,
    /// Numeric footnote markers such as `[3]`
    FootnoteMarkers,
    /// Lines carrying a copyright notice with a year
    CopyrightLines,
    /// Lines containing "all rights reserved"
    RightsReservedLines,
    /// Dates written as `01/02/2020`
    SlashDates,
    /// Dates written as `01.02.2020`
    DottedDates,
    /// Lines starting with a `*` or `•` bullet
    BulletLines,
    /// "Follow us on ..." social lines
    FollowUsLines,
    /// Runs of two or more spaces or tabs
    RepeatedSpaces,
    /// Runs of blank lines
    BlankLines,
}

impl RuleKind {
    /// Stable snake_case name, used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::PhoneNumbers => "phone_numbers",
            RuleKind::EmailAddresses => "email_addresses",
            RuleKind::UnderscoreRules => "underscore_rules",
            RuleKind::BareUrls => "bare_urls",
            RuleKind::FootnoteMarkers => "footnote_markers",
            RuleKind::CopyrightLines => "copyright_lines",
            RuleKind::RightsReservedLines => "rights_reserved_lines",
            RuleKind::SlashDates => "slash_dates",
            RuleKind::DottedDates => "dotted_dates",
            RuleKind::BulletLines => "bullet_lines",
            RuleKind::FollowUsLines => "follow_us_lines",
            RuleKind::RepeatedSpaces => "repeated_spaces",
            RuleKind::BlankLines => "blank_lines",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// URL stripping must stay ahead of the whitespace rules, otherwise the gap a
// removed link leaves behind is never collapsed. Bullet lines come after
// every token rule, since stripping a leading token can expose a bullet.
const RULE_SOURCES: &[(RuleKind, &str, &str)] = &[
    (
        RuleKind::PhoneNumbers,
        r"\+\d{1,3}[ .-]?\(?\d{1,4}\)?(?:[ .-]?\d{2,4}){2,3}|\(\d{3}\)[ .-]?\d{3}[ .-]\d{4}",
        "",
    ),
    (
        RuleKind::EmailAddresses,
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
        "",
    ),
    (RuleKind::UnderscoreRules, r"_{2,}", ""),
    (RuleKind::BareUrls, r"https?://\S+|\bwww\.\S+", ""),
    (RuleKind::FootnoteMarkers, r"\[\d+\]", ""),
    (
        RuleKind::CopyrightLines,
        r"(?im)^[^\n]*(?:©|\(c\)|copyright)[ \t]*\d{4}[^\n]*(?:\n|$)",
        "",
    ),
    (
        RuleKind::RightsReservedLines,
        r"(?im)^[^\n]*all rights reserved[^\n]*(?:\n|$)",
        "",
    ),
    (RuleKind::SlashDates, r"\b\d{1,2}/\d{1,2}/\d{2,4}\b", ""),
    (RuleKind::DottedDates, r"\b\d{1,2}\.\d{1,2}\.\d{2,4}\b", ""),
    (RuleKind::BulletLines, r"(?m)^[ \t]*[*•] [^\n]*(?:\n|$)", ""),
    (
        RuleKind::FollowUsLines,
        r"(?im)^[^\n]*follow us on[^\n]*(?:\n|$)",
        "",
    ),
    (RuleKind::RepeatedSpaces, r"[ \t]{2,}", " "),
    (RuleKind::BlankLines, r"\n\s*\n", "\n"),
];

/// A compiled cleanup rule
pub struct Rule {
    kind: RuleKind,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    /// Which rule this is
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Apply the rule to `text`
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

/// Compile the rule table in application order
pub(crate) fn compile() -> Result<Vec<Rule>, regex::Error> {
    RULE_SOURCES
        .iter()
        .map(|(kind, source, replacement)| {
            Ok(Rule {
                kind: *kind,
                pattern: Regex::new(source)?,
                replacement,
            })
        })
        .collect()
}

/// Rule kinds in the order they are applied
pub(crate) fn order() -> impl Iterator<Item = RuleKind> {
    RULE_SOURCES.iter().map(|(kind, _, _)| *kind)
}

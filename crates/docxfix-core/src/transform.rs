//! WordprocessingML markup rewriting.
//!
//! Two literal rewrites applied to the `word/document.xml` payload of a
//! document, always in this order:
//!
//! 1. [`replace_dividing_lines`] turns the horizontal rule drawing that some
//!    editors emit for a dividing line into a plain `---` text run.
//! 2. [`strip_hyperlink_underlines`] removes the single-underline run
//!    property from runs inside hyperlinks, leaving underlines elsewhere in
//!    the document alone.
//!
//! Both are plain substring operations. No XML parsing takes place.

/// Horizontal rule run as emitted for a dividing line.
pub const DIVIDING_LINE: &str = r##"<w:r w:rsidDel="00000000" w:rsidR="00000000" w:rsidRPr="00000000"><w:pict><v:rect style="width:0.0pt;height:1.5pt" o:hr="t" o:hrstd="t" o:hralign="center" fillcolor="#A0A0A0" stroked="f"/></w:pict></w:r>"##;

/// Text run holding three dashes, the replacement for [`DIVIDING_LINE`].
pub const DASHES: &str = r#"<w:r w:rsidDel="00000000" w:rsidR="00000000" w:rsidRPr="00000000"><w:rPr><w:rtl w:val="0"/></w:rPr><w:t xml:space="preserve">---</w:t></w:r>"#;

/// Single-underline run property.
pub const HYPERLINK_UNDERLINE: &str = r#"<w:u w:val="single"/>"#;

/// Hyperlink start tag without attributes.
pub const HYPERLINK_OPENING_TAG: &str = "<w:hyperlink>";

/// Hyperlink end tag.
pub const HYPERLINK_CLOSING_TAG: &str = "</w:hyperlink>";

/// Split marker for hyperlink starts: the opening tag without its final `>`,
/// so `<w:hyperlink r:id="rId4">` matches as well.
const HYPERLINK_OPENING_MARKER: &str = "<w:hyperlink";

/// Counts of the rewrites performed by [`transform_with_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Dividing lines replaced with dashes.
    pub dividing_lines: usize,
    /// Underline properties removed from hyperlinks.
    pub underlines_removed: usize,
}

impl TransformStats {
    /// Returns `true` if the transform changed nothing.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.dividing_lines == 0 && self.underlines_removed == 0
    }
}

/// Replaces every dividing line with a dashes run.
///
/// # Examples
///
/// ```
/// use docxfix_core::transform::{DASHES, DIVIDING_LINE, replace_dividing_lines};
///
/// let xml = format!("<w:p>{DIVIDING_LINE}</w:p>");
/// assert_eq!(replace_dividing_lines(&xml), format!("<w:p>{DASHES}</w:p>"));
/// ```
#[must_use]
pub fn replace_dividing_lines(content: &str) -> String {
    content.replace(DIVIDING_LINE, DASHES)
}

/// Removes underline properties inside hyperlink spans.
///
/// A span starts at a hyperlink start tag and ends at the next end tag. An
/// unterminated span runs to the next start tag or to the end of the text.
/// Text before the first hyperlink and after each end tag is left untouched.
///
/// # Examples
///
/// ```
/// use docxfix_core::transform::strip_hyperlink_underlines;
///
/// let xml = r#"A<w:hyperlink>B<w:u w:val="single"/>C</w:hyperlink>D<w:u w:val="single"/>E"#;
/// assert_eq!(
///     strip_hyperlink_underlines(xml),
///     r#"A<w:hyperlink>BC</w:hyperlink>D<w:u w:val="single"/>E"#
/// );
/// ```
#[must_use]
pub fn strip_hyperlink_underlines(content: &str) -> String {
    strip_counting(content).0
}

/// Applies both rewrites, dividing lines first.
#[must_use]
pub fn transform(content: &str) -> String {
    transform_with_stats(content).0
}

/// Applies both rewrites and reports how many replacements each made.
#[must_use]
pub fn transform_with_stats(content: &str) -> (String, TransformStats) {
    let dividing_lines = content.matches(DIVIDING_LINE).count();
    let replaced = replace_dividing_lines(content);
    let (stripped, underlines_removed) = strip_counting(&replaced);

    (
        stripped,
        TransformStats {
            dividing_lines,
            underlines_removed,
        },
    )
}

fn strip_counting(content: &str) -> (String, usize) {
    let mut segments = content.split(HYPERLINK_OPENING_MARKER);
    let mut output = String::with_capacity(content.len());
    let mut removed = 0;

    if let Some(head) = segments.next() {
        output.push_str(head);
    }

    for segment in segments {
        output.push_str(HYPERLINK_OPENING_MARKER);

        let (inside, rest) = match segment.split_once(HYPERLINK_CLOSING_TAG) {
            Some((inside, rest)) => (inside, Some(rest)),
            None => (segment, None),
        };

        removed += inside.matches(HYPERLINK_UNDERLINE).count();
        output.push_str(&inside.replace(HYPERLINK_UNDERLINE, ""));

        if let Some(rest) = rest {
            output.push_str(HYPERLINK_CLOSING_TAG);
            output.push_str(rest);
        }
    }

    (output, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hyperlink(inner: &str) -> String {
        format!(r#"<w:hyperlink r:id="rId5">{inner}</w:hyperlink>"#)
    }

    #[test]
    fn test_opening_marker_drops_closing_bracket() {
        assert_eq!(
            HYPERLINK_OPENING_MARKER,
            &HYPERLINK_OPENING_TAG[..HYPERLINK_OPENING_TAG.len() - 1]
        );
    }

    #[test]
    fn test_replace_dividing_lines_all_occurrences() {
        let xml = format!("a{DIVIDING_LINE}b{DIVIDING_LINE}c");
        let out = replace_dividing_lines(&xml);
        assert_eq!(out, format!("a{DASHES}b{DASHES}c"));
        assert!(!out.contains(DIVIDING_LINE));
    }

    #[test]
    fn test_replace_dividing_lines_without_match() {
        let xml = "<w:p><w:r><w:t>plain</w:t></w:r></w:p>";
        assert_eq!(replace_dividing_lines(xml), xml);
    }

    #[test]
    fn test_strip_only_inside_hyperlink() {
        let xml = format!(
            "A{}D{HYPERLINK_UNDERLINE}E",
            hyperlink(&format!("B{HYPERLINK_UNDERLINE}C"))
        );
        let expected = format!("A{}D{HYPERLINK_UNDERLINE}E", hyperlink("BC"));
        assert_eq!(strip_hyperlink_underlines(&xml), expected);
    }

    #[test]
    fn test_strip_bare_opening_tag() {
        let xml = format!(
            "{HYPERLINK_OPENING_TAG}x{HYPERLINK_UNDERLINE}y{HYPERLINK_CLOSING_TAG}"
        );
        let expected = format!("{HYPERLINK_OPENING_TAG}xy{HYPERLINK_CLOSING_TAG}");
        assert_eq!(strip_hyperlink_underlines(&xml), expected);
    }

    #[test]
    fn test_strip_leaves_text_before_first_hyperlink() {
        let xml = format!(
            "{HYPERLINK_UNDERLINE}{}",
            hyperlink(HYPERLINK_UNDERLINE)
        );
        let expected = format!("{HYPERLINK_UNDERLINE}{}", hyperlink(""));
        assert_eq!(strip_hyperlink_underlines(&xml), expected);
    }

    #[test]
    fn test_strip_unterminated_hyperlink() {
        let xml = format!(
            "<w:hyperlink r:id=\"rId1\">a{HYPERLINK_UNDERLINE}b{HYPERLINK_UNDERLINE}"
        );
        assert_eq!(
            strip_hyperlink_underlines(&xml),
            "<w:hyperlink r:id=\"rId1\">ab"
        );
    }

    #[test]
    fn test_strip_multiple_runs_in_one_hyperlink() {
        let inner = format!(
            "<w:r><w:rPr>{HYPERLINK_UNDERLINE}</w:rPr></w:r><w:r><w:rPr>{HYPERLINK_UNDERLINE}</w:rPr></w:r>"
        );
        let xml = hyperlink(&inner);
        let out = strip_hyperlink_underlines(&xml);
        assert!(!out.contains(HYPERLINK_UNDERLINE));
        assert_eq!(out, hyperlink("<w:r><w:rPr></w:rPr></w:r><w:r><w:rPr></w:rPr></w:r>"));
    }

    #[test]
    fn test_strip_consecutive_hyperlinks() {
        let xml = format!(
            "{}{HYPERLINK_UNDERLINE}{}",
            hyperlink(HYPERLINK_UNDERLINE),
            hyperlink(HYPERLINK_UNDERLINE)
        );
        let expected = format!("{}{HYPERLINK_UNDERLINE}{}", hyperlink(""), hyperlink(""));
        assert_eq!(strip_hyperlink_underlines(&xml), expected);
    }

    #[test]
    fn test_strip_empty_input() {
        assert_eq!(strip_hyperlink_underlines(""), "");
    }

    #[test]
    fn test_transform_applies_both_rules() {
        let xml = format!(
            "<w:body>{DIVIDING_LINE}{}</w:body>",
            hyperlink(HYPERLINK_UNDERLINE)
        );
        let (out, stats) = transform_with_stats(&xml);
        assert_eq!(out, format!("<w:body>{DASHES}{}</w:body>", hyperlink("")));
        assert_eq!(
            stats,
            TransformStats {
                dividing_lines: 1,
                underlines_removed: 1
            }
        );
        assert_eq!(transform(&xml), out);
    }

    #[test]
    fn test_transform_unchanged_stats() {
        let (out, stats) = transform_with_stats("<w:body/>");
        assert_eq!(out, "<w:body/>");
        assert!(stats.is_unchanged());
    }
}

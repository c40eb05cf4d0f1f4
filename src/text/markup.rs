//! The substitution battery that turns OpenDocument `content.xml` into
//! plain text.

use crate::buffer::GrowableBuffer;
use crate::error::Result;
use crate::rewrite::{MatchSpans, Mode, Replacement, Rule, rewrite};
use crate::utf8;

use super::FormatOptions;
use super::lookalike::select;

/// Upper bound for a single `<text:s text:c="N"/>` run.
const MAX_SPACES: usize = 1024;

/// Build the ordered rule list for `opts`.
pub fn document_rules(opts: &FormatOptions) -> Vec<Rule> {
    let mut rules = vec![
        // headings
        Rule::new(
            r#"<text:h\s[^>]*text:outline-level="1"[^>]*>([^<]*)<[^>]*>"#,
            Mode::All,
            Replacement::transform(h1),
        ),
        Rule::new(
            r"<text:h(?:\s[^>]*)?>([^<]*)<[^>]*>",
            Mode::All,
            Replacement::transform(h2),
        ),
        // paragraphs
        Rule::all(r"<text:p(?:\s[^>]*)?/?>", "\n\n"),
        Rule::all(r"</text:p>", "\n\n"),
        // whitespace
        Rule::all(r"<text:tab(?:-stop)?/>", "  "),
        Rule::all(r"<text:line-break/>", "\n"),
        Rule::new(
            r#"<text:s\s+text:c="(\d+)"\s*/>"#,
            Mode::All,
            Replacement::transform(spaces),
        ),
        Rule::all(r"<text:s/>", " "),
        // images
        Rule::new(
            r#"<draw:frame\s[^>]*draw:name="([^"]*)"[^>]*>"#,
            Mode::All,
            Replacement::transform(image),
        ),
    ];

    rules.extend(
        select(opts.look_alikes, opts.subst, opts.charset)
            .map(|entry| Rule::literal(entry.utf8, Mode::All, entry.ascii)),
    );
    rules.extend(
        opts.symbol_font
            .iter()
            .map(|entry| Rule::literal(entry.utf8, Mode::All, entry.ascii)),
    );

    rules.extend([
        Rule::all(r"<[^>]*>", ""),
        Rule::all(r"&apos;", "'"),
        Rule::all(r"&quot;", "\""),
        Rule::all(r"&gt;", ">"),
        Rule::all(r"&lt;", "<"),
        Rule::all(r"&amp;", "&"),
        Rule::all(r"\n{3,}", "\n\n"),
    ]);

    rules
}

/// Rewrite `buf` from XML markup to plain text in place.
///
/// Returns the total number of substitutions performed.
pub fn format_document(buf: &mut GrowableBuffer, opts: &FormatOptions) -> Result<usize> {
    rewrite(buf, &document_rules(opts))
}

/// `text` followed by a line of `linechar` as long as `text` is in
/// characters, and a blank line. Empty text stays empty.
pub fn underline(linechar: u8, text: &[u8]) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }

    let width = utf8::char_count(text);
    let mut out = Vec::with_capacity(text.len() + width + 3);
    out.extend_from_slice(text);
    out.push(b'\n');
    out.resize(out.len() + width, linechar);
    out.extend_from_slice(b"\n\n");
    out
}

fn group<'a>(buf: &'a [u8], spans: &MatchSpans, i: usize) -> &'a [u8] {
    spans.get(i).map_or(&[][..], |span| span.slice(buf))
}

fn h1(buf: &[u8], spans: &MatchSpans, _offset: usize) -> Vec<u8> {
    underline(b'=', group(buf, spans, 1))
}

fn h2(buf: &[u8], spans: &MatchSpans, _offset: usize) -> Vec<u8> {
    underline(b'-', group(buf, spans, 1))
}

fn image(buf: &[u8], spans: &MatchSpans, _offset: usize) -> Vec<u8> {
    let name = String::from_utf8_lossy(group(buf, spans, 1));
    format!("[-- Image: {name} --]").into_bytes()
}

fn spaces(buf: &[u8], spans: &MatchSpans, _offset: usize) -> Vec<u8> {
    let count = std::str::from_utf8(group(buf, spans, 1))
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .unwrap_or(1)
        .min(MAX_SPACES);
    vec![b' '; count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Charset, SubstMode};

    fn format(xml: &str, subst: SubstMode, charset: Charset) -> String {
        let opts = FormatOptions {
            subst,
            charset,
            ..FormatOptions::default()
        };
        let mut buf = GrowableBuffer::from(xml);
        format_document(&mut buf, &opts).unwrap();
        String::from_utf8(buf.into_raw()).unwrap()
    }

    fn plain(xml: &str) -> String {
        format(xml, SubstMode::None, Charset::Utf8)
    }

    #[test]
    fn underline_counts_characters() {
        assert_eq!(underline(b'=', b"Title"), b"Title\n=====\n\n");
        assert_eq!(underline(b'-', "Grüße".as_bytes()), "Grüße\n-----\n\n".as_bytes());
        assert!(underline(b'=', b"").is_empty());
    }

    #[test]
    fn headings() {
        assert_eq!(
            plain(r#"<text:h text:style-name="H1" text:outline-level="1">Title</text:h><text:p>Body</text:p>"#),
            "Title\n=====\n\nBody\n\n"
        );
        assert_eq!(
            plain(r#"<text:h text:outline-level="2">Intro</text:h>"#),
            "Intro\n-----\n\n"
        );
        assert_eq!(plain(r#"<text:h text:outline-level="3"></text:h>x"#), "x");
    }

    #[test]
    fn paragraphs_and_whitespace() {
        let xml = concat!(
            "<office:text>",
            r#"<text:p text:style-name="P1">A&amp;B<text:tab/>c<text:s text:c="2"/>d</text:p>"#,
            "<text:p>x<text:line-break/>y<text:s/>&lt;z&gt;</text:p>",
            "<text:p/>",
            "</office:text>",
        );
        assert_eq!(plain(xml), "\n\nA&B  c  d\n\nx\ny <z>\n\n");
    }

    #[test]
    fn images() {
        let xml = r#"<text:p><draw:frame draw:style-name="fr1" draw:name="Logo 1" svg:width="2cm"><draw:image xlink:href="Pictures/1.png"/></draw:frame></text:p>"#;
        assert_eq!(plain(xml), "\n\n[-- Image: Logo 1 --]\n\n");
    }

    #[test]
    fn entities_are_decoded_once() {
        assert_eq!(plain("&amp;lt; &quot;&apos;"), "&lt; \"'");
        // entities that spell out markup are not stripped as tags
        assert_eq!(plain("&lt;b&gt;"), "<b>");
    }

    #[test]
    fn look_alikes_follow_mode() {
        let xml = "<text:p>\u{201C}Hi\u{201D} \u{2014} there\u{2192}</text:p>";
        assert_eq!(
            format(xml, SubstMode::Some, Charset::Ascii),
            "\n\n``Hi'' -- there->\n\n"
        );
        assert_eq!(
            format(xml, SubstMode::None, Charset::Ascii),
            "\n\n\u{201C}Hi\u{201D} \u{2014} there\u{2192}\n\n"
        );

        let latin1 = Charset::for_label("latin1").unwrap();
        assert_eq!(
            format(xml, SubstMode::Some, latin1),
            "\n\n\u{201C}Hi\u{201D} \u{2014} there->\n\n"
        );
        assert_eq!(
            format(xml, SubstMode::All, Charset::Utf8),
            "\n\n``Hi'' -- there->\n\n"
        );
    }

    #[test]
    fn symbol_font_arrows_always_replaced() {
        assert_eq!(plain("a\u{F0AE}b\u{F0AC}c\u{F0AB}"), "a->b<-c<->");
    }

    #[test]
    fn blank_lines_collapse() {
        assert_eq!(plain("a\n\n\n\n\nb"), "a\n\nb");
    }
}

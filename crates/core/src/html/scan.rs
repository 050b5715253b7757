use std::ops::Range;

/// One attribute of a scanned tag. `value` is the byte range of the raw
/// (still entity-encoded) value inside the source, without quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute {
    pub name: String,
    pub value: Option<Range<usize>>,
}

/// A start or end tag found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    /// Lowercased element name.
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    /// Byte range from `<` to just past `>`.
    pub span: Range<usize>,
    pub attributes: Vec<Attribute>,
}

impl Tag {
    pub fn attribute<'s>(&self, source: &'s str, name: &str) -> Option<&'s str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .and_then(|attr| attr.value.clone())
            .map(|range| &source[range])
    }

    pub fn is_open(&self) -> bool {
        !self.closing && !self.self_closing && !is_void(&self.name)
    }
}

/// Lenient scanner over the tags of an HTML document.
///
/// Only tag boundaries and attributes are recognised; text, comments,
/// doctypes and the bodies of `script`/`style` elements are skipped.
pub(crate) struct TagScanner<'a> {
    src: &'a str,
    pos: usize,
    raw_text: Option<&'static str>,
}

impl<'a> TagScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text: None,
        }
    }

    fn finish(&mut self) -> Option<Tag> {
        self.pos = self.src.len();
        None
    }
}

impl Iterator for TagScanner<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        let src = self.src;
        let bytes = src.as_bytes();
        let len = bytes.len();

        loop {
            if self.pos >= len {
                return None;
            }

            if let Some(element) = self.raw_text.take() {
                let needle = format!("</{element}");
                let haystack = src[self.pos..].to_ascii_lowercase();
                match haystack.find(&needle) {
                    Some(offset) => self.pos += offset,
                    None => return self.finish(),
                }
            }

            let Some(offset) = src[self.pos..].find('<') else {
                return self.finish();
            };
            let start = self.pos + offset;
            let rest = &src[start..];

            if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => {
                        self.pos = start + end + 3;
                        continue;
                    }
                    None => return self.finish(),
                }
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                match rest.find('>') {
                    Some(end) => {
                        self.pos = start + end + 1;
                        continue;
                    }
                    None => return self.finish(),
                }
            }

            let closing = rest.starts_with("</");
            let name_start = start + if closing { 2 } else { 1 };
            if name_start >= len || !bytes[name_start].is_ascii_alphabetic() {
                self.pos = start + 1;
                continue;
            }
            let name_len = bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':'))
                .count();
            let name = src[name_start..name_start + name_len].to_ascii_lowercase();

            let mut i = name_start + name_len;
            let mut attributes = Vec::new();
            let mut self_closing = false;

            loop {
                while i < len && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i >= len {
                    return self.finish();
                }
                match bytes[i] {
                    b'>' => {
                        i += 1;
                        break;
                    }
                    b'/' => {
                        i += 1;
                        if i < len && bytes[i] == b'>' {
                            self_closing = true;
                            i += 1;
                            break;
                        }
                    }
                    _ => {
                        let attr_start = i;
                        while i < len
                            && !bytes[i].is_ascii_whitespace()
                            && !matches!(bytes[i], b'=' | b'>' | b'/')
                        {
                            i += 1;
                        }
                        let attr_name = src[attr_start..i].to_ascii_lowercase();
                        while i < len && bytes[i].is_ascii_whitespace() {
                            i += 1;
                        }

                        let mut value = None;
                        if i < len && bytes[i] == b'=' {
                            i += 1;
                            while i < len && bytes[i].is_ascii_whitespace() {
                                i += 1;
                            }
                            if i < len && matches!(bytes[i], b'"' | b'\'') {
                                let quote = bytes[i] as char;
                                let value_start = i + 1;
                                match src[value_start..].find(quote) {
                                    Some(end) => {
                                        value = Some(value_start..value_start + end);
                                        i = value_start + end + 1;
                                    }
                                    None => return self.finish(),
                                }
                            } else {
                                let value_start = i;
                                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                                {
                                    i += 1;
                                }
                                value = Some(value_start..i);
                            }
                        }

                        attributes.push(Attribute {
                            name: attr_name,
                            value,
                        });
                    }
                }
            }

            self.pos = i;
            if !closing && !self_closing {
                self.raw_text = match name.as_str() {
                    "script" => Some("script"),
                    "style" => Some("style"),
                    _ => None,
                };
            }

            return Some(Tag {
                name,
                closing,
                self_closing,
                span: start..i,
                attributes,
            });
        }
    }
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

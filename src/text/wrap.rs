//! Greedy word wrapping with a two-space left margin.

use crate::buffer::GrowableBuffer;
use crate::utf8;

const LINE_BREAK: &[u8] = b"\n  ";

/// Wrap `text` to `width` characters per line.
///
/// Every line is indented by two spaces, leading spaces of each input line
/// are dropped and the result ends in a newline. A word longer than `width`
/// is kept whole and the line breaks at the next space. With no width the
/// text is copied unchanged.
pub fn wrap(text: &[u8], width: Option<usize>) -> GrowableBuffer {
    let mut out = GrowableBuffer::with_capacity(text.len() + text.len() / 8 + 4);
    let Some(width) = width else {
        out.append(text);
        return out;
    };

    for line in text.split(|&b| b == b'\n') {
        out.append(LINE_BREAK);
        wrap_line(&mut out, trim_leading_spaces(line), width);
    }
    out.append(b"\n");
    out
}

fn wrap_line(out: &mut GrowableBuffer, line: &[u8], width: usize) {
    let mut rest = line;
    while let Some(at) = break_point(rest, width) {
        out.append(&rest[..at]);
        out.append(LINE_BREAK);
        rest = trim_leading_spaces(&rest[at..]);
    }
    out.append(rest);
}

/// Byte index of the space to break `line` at: the last one within `width`
/// characters, or failing that the first one after it. `None` if the line
/// fits or has no space to break at.
///
/// Scanning stops one character past `width` once a break is known, so each
/// call only looks at the next output line.
fn break_point(line: &[u8], width: usize) -> Option<usize> {
    let mut last_space = None;
    let mut chars = 0;
    let mut i = 0;

    while i < line.len() {
        if chars > width && last_space.is_some() {
            return last_space;
        }
        if line[i] == b' ' {
            if chars <= width {
                last_space = Some(i);
            } else {
                return Some(i);
            }
        }
        i += utf8::char_len(line[i]);
        chars += 1;
    }

    if chars > width { last_space } else { None }
}

fn trim_leading_spaces(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|&b| b != b' ').unwrap_or(line.len());
    &line[start..]
}
